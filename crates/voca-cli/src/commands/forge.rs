use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use tracing::info;

use voca_config::VocaConfig;
use voca_core::{SkillResult, VocaError};
use voca_forge::{CreateQuestionRequest, EvaluateRequest, Forge, TranslationService};
use voca_store::SkillStore;

fn build_forge(config: &VocaConfig) -> voca_core::Result<Forge> {
    let store = SkillStore::open(&config.store.path)?;
    Forge::from_config(config, store)
}

pub(super) async fn cmd_generate(
    config: VocaConfig,
    word: &str,
    meaning: &str,
    out: Option<PathBuf>,
    json: bool,
) -> voca_core::Result<()> {
    if word.trim().is_empty() || meaning.trim().is_empty() {
        return Err(VocaError::InvalidRequest("word and meaning must not be blank".into()));
    }

    let forge = build_forge(&config)?;
    let result = forge.skills.generate_skill(word, meaning).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if let Some(path) = out {
        write_image(&result, &path)?;
    }
    Ok(())
}

fn print_result(result: &SkillResult) {
    println!("{} ({})  [{:?}]", result.name, result.word, result.origin);
    println!("   Damage:      {}", result.damage);
    println!("   Description: {}", result.description);
    println!("   Image:       {}", result.image_desc);
    match &result.image_error {
        None => println!("   Image status: SUCCESS"),
        Some(e) => println!("   Image status: FAILED ({e})"),
    }
}

fn write_image(result: &SkillResult, path: &Path) -> voca_core::Result<()> {
    let Some(b64) = result.image_base64.as_deref() else {
        return Err(VocaError::InvalidRequest(format!(
            "no image to write for '{}'",
            result.word
        )));
    };
    let bytes = STANDARD
        .decode(b64.trim())
        .map_err(|e| VocaError::MalformedOutput(format!("stored image is not valid base64: {e}")))?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "image written");
    println!("   Saved image to {}", path.display());
    Ok(())
}

/// Translation calls report failures in-band; surface the message as-is.
fn upstream_failure(error: Option<String>) -> VocaError {
    VocaError::Other(anyhow::anyhow!(
        error.unwrap_or_else(|| "translation request failed".into())
    ))
}

pub(super) async fn cmd_question(
    config: VocaConfig,
    word: String,
    level: Option<String>,
) -> voca_core::Result<()> {
    let resp = TranslationService::from_config(&config)?
        .create_question(&CreateQuestionRequest {
            target_word: word,
            user_level: level,
        })
        .await;

    if !resp.success {
        return Err(upstream_failure(resp.error));
    }
    println!("Translate: {}", resp.korean_sentence.unwrap_or_default());
    println!("   Hint:  {}", resp.word_hint.unwrap_or_default());
    println!("   Ideal: {}", resp.ideal.unwrap_or_default());
    Ok(())
}

pub(super) async fn cmd_evaluate(config: VocaConfig, req: EvaluateRequest) -> voca_core::Result<()> {
    let resp = TranslationService::from_config(&config)?.evaluate(&req).await;

    if !resp.success {
        return Err(upstream_failure(resp.error));
    }
    println!("Score: {}/100", resp.score.unwrap_or_default());
    if let Some(breakdown) = &resp.breakdown {
        for (part, points) in breakdown {
            println!("   {part:<12} {points}");
        }
    }
    println!("Feedback: {}", resp.feedback.unwrap_or_default());
    if let Some(correction) = resp.correction {
        println!("Correction: {correction}");
    }
    Ok(())
}

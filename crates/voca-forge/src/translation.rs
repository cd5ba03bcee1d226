//! Translation practice: question generation and answer scoring.
//!
//! Both operations are single chat calls with no retry and no persistence.
//! Failures never escape; they come back as `success: false` with the
//! error text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use voca_core::{Result, VocaError};
use voca_llm::{ChatProvider, ChatRequest};

use crate::parse;
use crate::prompts;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    pub target_word: String,
    #[serde(default)]
    pub user_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionResponse {
    pub success: bool,
    pub korean_sentence: Option<String>,
    pub target_word: Option<String>,
    pub word_hint: Option<String>,
    /// Model translation; front-ends may keep it hidden until evaluation.
    pub ideal: Option<String>,
    pub error: Option<String>,
}

impl CreateQuestionResponse {
    fn failure(error: &VocaError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub korean_sentence: String,
    pub user_answer: String,
    pub ideal_translation: String,
    pub target_word: String,
    #[serde(default)]
    pub user_level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    pub success: bool,
    pub score: Option<i32>,
    /// meaning / grammar / word_usage / naturalness
    pub breakdown: Option<BTreeMap<String, i32>>,
    pub feedback: Option<String>,
    pub correction: Option<String>,
    pub ideal_answer: Option<String>,
    pub error: Option<String>,
}

impl EvaluateResponse {
    fn failure(error: &VocaError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub struct TranslationService {
    chat: Arc<dyn ChatProvider>,
    model: String,
}

impl TranslationService {
    pub fn new(chat: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Translation practice against the configured API. Needs no skill store.
    pub fn from_config(config: &voca_config::VocaConfig) -> Result<Self> {
        let provider = crate::openai_provider(config)?;
        Ok(Self::new(provider, &config.openai.translation_model))
    }

    async fn ask(&self, prompt: String, system: Option<&str>) -> Result<serde_json::Value> {
        let mut request = ChatRequest::new(&self.model, prompt)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(MAX_TOKENS)
            .json();
        if let Some(system) = system {
            request = request.with_system(system);
        }
        let reply = self.chat.complete(&request).await?;
        parse::json_object(&reply)
    }

    /// Create a Korean sentence whose English translation needs `target_word`.
    pub async fn create_question(&self, req: &CreateQuestionRequest) -> CreateQuestionResponse {
        match self.try_create_question(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(target_word = %req.target_word, error = %e, "question generation failed");
                CreateQuestionResponse::failure(&e)
            }
        }
    }

    async fn try_create_question(&self, req: &CreateQuestionRequest) -> Result<CreateQuestionResponse> {
        let prompt = prompts::question_prompt(&req.target_word, req.user_level.as_deref());
        let json = self.ask(prompt, None).await?;
        debug!(target_word = %req.target_word, "question generated");
        Ok(CreateQuestionResponse {
            success: true,
            korean_sentence: Some(parse::text_field(&json, "korean_sentence")?),
            target_word: Some(req.target_word.clone()),
            word_hint: Some(parse::text_field(&json, "word_hint")?),
            ideal: Some(parse::text_field(&json, "ideal_translation")?),
            error: None,
        })
    }

    /// Score a learner's translation.
    pub async fn evaluate(&self, req: &EvaluateRequest) -> EvaluateResponse {
        match self.try_evaluate(req).await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(target_word = %req.target_word, error = %e, "translation evaluation failed");
                EvaluateResponse::failure(&e)
            }
        }
    }

    async fn try_evaluate(&self, req: &EvaluateRequest) -> Result<EvaluateResponse> {
        let prompt = prompts::evaluation_prompt(
            &req.korean_sentence,
            &req.user_answer,
            &req.ideal_translation,
            &req.target_word,
            req.user_level.as_deref(),
        );
        let json = self.ask(prompt, Some(prompts::EVALUATION_SYSTEM)).await?;

        let breakdown = json["breakdown"]
            .as_object()
            .ok_or_else(|| VocaError::MalformedOutput("missing field 'breakdown'".into()))?
            .iter()
            .map(|(key, value)| parse::int_value(value, key).map(|v| (key.clone(), v)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(EvaluateResponse {
            success: true,
            score: Some(parse::int_field(&json, "score")?),
            breakdown: Some(breakdown),
            feedback: Some(parse::text_field(&json, "feedback")?),
            correction: parse::optional_text_field(&json, "correction")?,
            ideal_answer: Some(req.ideal_translation.clone()),
            error: None,
        })
    }
}

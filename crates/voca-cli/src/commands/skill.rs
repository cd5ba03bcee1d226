use voca_config::VocaConfig;
use voca_core::{Skill, SkillOrigin, SkillResult, VocaError};
use voca_store::SkillStore;

pub(super) fn cmd_show(config: &VocaConfig, word: &str, json: bool) -> voca_core::Result<()> {
    let store = SkillStore::open(&config.store.path)?;
    let skill = store
        .find_by_word(word)?
        .ok_or_else(|| VocaError::InvalidRequest(format!("no skill stored for word '{word}'")))?;

    if json {
        let result = SkillResult::from_stored(skill, SkillOrigin::Cached);
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_skill(&skill);
    }
    Ok(())
}

pub(super) fn cmd_list(config: &VocaConfig, limit: usize) -> voca_core::Result<()> {
    let store = SkillStore::open(&config.store.path)?;
    let skills = store.recent(limit)?;
    if skills.is_empty() {
        println!("No skills stored yet.");
        return Ok(());
    }

    println!("{:<6} {:<18} {:<28} {:>6}  IMAGE", "ID", "WORD", "NAME", "DAMAGE");
    for s in &skills {
        println!(
            "{:<6} {:<18} {:<28} {:>6}  {}",
            s.id,
            s.word,
            s.name,
            s.damage,
            if s.has_image() { "yes" } else { "no" }
        );
    }
    println!("\n{} of {} skill(s)", skills.len(), store.count()?);
    Ok(())
}

pub(super) fn print_skill(skill: &Skill) {
    println!("{} ({})", skill.name, skill.word);
    println!("   Damage:      {}", skill.damage);
    println!("   Description: {}", skill.description);
    println!("   Image:       {}", skill.image_desc);
    if !skill.has_image() {
        println!("   (no image stored)");
    }
}

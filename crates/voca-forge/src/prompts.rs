//! Prompt templates sent to the chat and image models.
//!
//! The game is Korean-facing, so skill descriptions, translation questions,
//! and feedback are requested in Korean; image prompts are English.

/// Appended to every image prompt.
pub const STYLE_SUFFIX: &str = ", 2D pixel art, no background, absolutely no text or letters, RPG game skill effect, clean and not excessive";

/// Appended to the original description when the prompt rewrite fails.
pub const SAFE_FALLBACK_SUFFIX: &str = ", safe version";

// ── Skill generation ───────────────────────────────────────────

pub const SKILL_SYSTEM: &str = "당신은 2D 픽셀 RPG 게임의 스킬 디자이너입니다. \
사용자가 제공한 단어와 그 뜻으로 스킬을 창작하고, 반드시 JSON 객체로만 답변합니다.";

pub fn skill_user_prompt(word: &str, meaning_ko: &str) -> String {
    format!(
        "단어 '{word}'와 그 뜻 '{meaning_ko}'로 RPG 공격 스킬을 하나 만들어라. \
반드시 아래 JSON 형식으로만 답하고, 다른 말이나 항목 누락은 금지한다. \
{{\"name\": \"스킬명\", \"description\": \"설명\", \"damage\": \"숫자\", \"image_desc\": \"짧은 영어 이미지 묘사\"}} \
name: 최대 2단어의 영어이며, 단어 '{word}'를 원형 그대로 반드시 포함해야 한다. 비슷한 뜻의 다른 단어로 바꾸지 마라. \
게임 속 주문처럼 외치기 좋아야 하고, Strike나 Blast 같은 뻔한 단어를 붙이기보다 창의적인 이름을 지어라. \
description: 스킬 이름을 바탕으로 뜻 '{meaning_ko}'를 문장 안에 자연스럽게 넣어, 멋지거나 웃긴 공격 기술을 한국어 한 문장으로 설명하라. \
말투는 '~다.'로 끝내고, 특수문자(특히 *)는 쓰지 마라. 읽을 때 어색함이 없도록 검수하라. \
damage: 10에서 100 사이의 정수. 더 강력한 공격일수록 확실히 높은 값을 주고, 기본값은 30이다. \
image_desc: 스킬 이펙트의 모습을 영어로 명료하게 묘사하라. 2D 픽셀 RPG 게임의 도트 이펙트에 어울려야 한다. \
이미지 생성 모델의 안전 규정(content_policy_violation)에 걸리지 않도록 자극적인 표현은 피하라. \
결과 JSON에는 name, description, damage, image_desc 네 항목이 모두 있어야 한다."
    )
}

// ── Prompt sanitizer ───────────────────────────────────────────

pub const SANITIZE_SYSTEM: &str = "You rewrite image-generation prompts so they comply with the \
image model's content policy while keeping their visual intent.";

pub fn sanitize_user_prompt(description: &str) -> String {
    format!(
        "The following English image description was rejected by the image model's safety system. \
Keep its meaning, but remove or soften anything that could violate the content policy. \
Reply with exactly one rewritten English description and nothing else: no explanations, no labels, no extra sentences. \
Original description: \"{description}\""
    )
}

// ── Translation practice ───────────────────────────────────────

/// Sentence difficulty for a learner level. Unknown levels read as intermediate.
pub fn level_description(level: Option<&str>) -> &'static str {
    match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("beginner") => "초등학생도 이해할 수 있는 쉽고 짧은 문장 (5-8단어)",
        Some("advanced") => "대학생이나 성인 수준의 복잡한 문장 (12-18단어)",
        _ => "고등학생 수준의 일상적인 문장 (8-12단어)",
    }
}

pub fn question_prompt(target_word: &str, level: Option<&str>) -> String {
    format!(
        "영어 단어 '{target_word}'를 사용해야만 영어로 번역할 수 있는 한국어 문장을 하나 만들어 주세요.\n\
\n\
난이도: {}\n\
\n\
요구사항:\n\
1. 한국어 문장은 자연스럽고 일상적이어야 합니다.\n\
2. 영어로 번역할 때 반드시 '{target_word}' 단어가 쓰여야 합니다.\n\
3. 모범 영어 번역과 단어 힌트를 함께 제공하세요.\n\
\n\
반드시 아래 JSON 형식으로만 응답하세요:\n\
{{\"korean_sentence\":\"...\", \"ideal_translation\":\"...\", \"word_hint\":\"...\"}}",
        level_description(level)
    )
}

pub const EVALUATION_SYSTEM: &str = "당신은 영어 학습 앱의 번역 평가자입니다.\n\
규칙:\n\
1. 반드시 JSON만 응답한다.\n\
2. 점수는 0-100점이다.\n\
3. 피드백은 한국어로 작성한다.";

pub fn evaluation_prompt(
    korean_sentence: &str,
    user_answer: &str,
    ideal_translation: &str,
    target_word: &str,
    level: Option<&str>,
) -> String {
    format!(
        "[평가 대상]\n\
- 한국어 원문: {korean_sentence}\n\
- 학습 단어: {target_word}\n\
- 사용자 번역: {user_answer}\n\
- 모범 답안: {ideal_translation}\n\
- 학습자 수준: {}\n\
\n\
JSON:\n\
{{\"score\":0,\"breakdown\":{{\"meaning\":0,\"grammar\":0,\"word_usage\":0,\"naturalness\":0}},\"feedback\":\"...\",\"correction\":null}}",
        level_description(level)
    )
}

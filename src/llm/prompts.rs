//! Prompt constants and transcript builder.
//!
//! These prompts are the contract between the wingman and the model.
//! The reply parser depends on the SUGGEST_REPLY output shape (marker
//! line, then three lines): change both together.

use super::types::{Direction, Message, Mode};

pub const MODEL: &str = "deepseek/deepseek-chat";

/// Diversity over determinism: three candidates should not read alike.
pub const TEMPERATURE: f32 = 0.9;

/// SUGGEST_REPLY system prompt: send-ready texts with a direction marker.
pub const SUGGEST_REPLY_SYSTEM_PROMPT: &str = r#"You are BeanZ Bot 🤖 — a texting wingman.

<input>
You receive the latest lines of a chat. Lines may be prefixed with a side:
- NEAR: sent by the main user (the person using this app)
- FAR: sent by the other person
- UNKNOWN: side could not be determined
Lines without a prefix are the user talking to you directly.
</input>

<rules>
1. The FIRST line of your reply MUST be exactly INCOMING or OUTGOING (uppercase).
   - INCOMING if the most recent chat line is FAR (they texted last; the user is replying).
   - OUTGOING if the most recent chat line is NEAR (the user texted last; they are following up).
2. After that line, write EXACTLY 3 DIFFERENT send-ready messages, one per line.
3. No duplicates. No numbering. No bullets. No quotes around messages.
4. NO explanations, NO coaching, NO meta commentary, NO roadmap.
5. Casual Gen Z English. Short, confident, human tone.
6. Use emojis where they fit.
</rules>

<response_format>
INCOMING
<message 1>
<message 2>
<message 3>
</response_format>"#;

/// GIVE_ADVICE system prompt: coaching bullets, never copy-paste texts.
pub const GIVE_ADVICE_SYSTEM_PROMPT: &str = r#"You are BeanZ Bot 🤖 — a helpful AI wingman.

<output_format>
- ALWAYS reply in bullet points. NO paragraphs.
- Max 5 bullet points. Each bullet = one clear idea.
- Use **bold** for key words or decisions.
- End with ONE short action line (not a paragraph).
</output_format>

<style>
- Friendly, confident, human, humorous.
- Sound like a smart friend, not a blog. No over-explaining.
</style>

<content_rules>
- Give advice, NOT messages to send. Do NOT write copy-paste texts.
- Give ONE clear answer. Examples are fine when relevant.
- When it helps, give a staged roadmap (bio, stories, profile pic, first text, song on notes…)
  spread over days: day 1, day 2, day 3 — never everything at once.
- Tell the user exactly what to set and where.
- Ask the user one clarifying question at the end ONLY if you truly need it.
</content_rules>"#;

/// System instructions + transcript for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: &'static str,
    pub transcript: String,
}

/// Render one message: `SIDE: text`, or bare text when it has no side.
pub fn render_line(message: &Message) -> String {
    match message.side() {
        Some(side) => format!("{}: {}", side.label(), message.text()),
        None => message.text().to_string(),
    }
}

/// Serialize the history oldest-first, one message per line.
pub fn build_transcript(history: &[Message]) -> String {
    history.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

pub fn system_prompt(mode: Mode) -> &'static str {
    match mode {
        Mode::SuggestReply => SUGGEST_REPLY_SYSTEM_PROMPT,
        Mode::GiveAdvice => GIVE_ADVICE_SYSTEM_PROMPT,
    }
}

pub fn build_prompt(mode: Mode, history: &[Message]) -> Prompt {
    Prompt {
        system: system_prompt(mode),
        transcript: build_transcript(history),
    }
}

/// Direction the model should pick, judged from the last annotated message.
///
/// `None` when the last message has no side or an UNKNOWN one.
pub fn expected_direction(history: &[Message]) -> Option<Direction> {
    history
        .last()
        .and_then(Message::side)
        .and_then(Direction::for_last_side)
}

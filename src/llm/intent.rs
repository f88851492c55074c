//! Intent detection: send-ready replies or coaching?

use super::types::{Message, Mode};
use crate::rules::Rules;

/// Lower-cased, space-joined text of every message, for phrase matching.
pub fn joined_text(history: &[Message]) -> String {
    history
        .iter()
        .map(Message::text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Decide the mode for a request.
///
/// An explicit `copy_mode = true` always wins. Otherwise a trigger phrase
/// anywhere in the conversation switches to SUGGEST_REPLY. Total: every
/// input yields a mode.
pub fn detect_mode(copy_mode: Option<bool>, joined_lowercase: &str, rules: &Rules) -> Mode {
    if copy_mode == Some(true) {
        return Mode::SuggestReply;
    }
    if rules.wants_reply(joined_lowercase) {
        Mode::SuggestReply
    } else {
        Mode::GiveAdvice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::Side;

    #[test]
    fn explicit_copy_mode_wins() {
        let rules = Rules::default();
        assert_eq!(detect_mode(Some(true), "hello", &rules), Mode::SuggestReply);
    }

    #[test]
    fn trigger_phrase_switches_mode_without_flag() {
        let rules = Rules::default();
        assert_eq!(detect_mode(None, "what should i text her", &rules), Mode::SuggestReply);
        assert_eq!(
            detect_mode(Some(false), "pls give me a reply for this", &rules),
            Mode::SuggestReply
        );
    }

    #[test]
    fn everything_else_is_advice() {
        let rules = Rules::default();
        assert_eq!(detect_mode(None, "how to improve my instagram?", &rules), Mode::GiveAdvice);
        assert_eq!(detect_mode(Some(false), "", &rules), Mode::GiveAdvice);
    }

    #[test]
    fn joined_text_is_lowercase_and_space_separated() {
        let history = vec![
            Message::new("What SHOULD", Side::Far).unwrap(),
            Message::plain("i text Her").unwrap(),
        ];
        let joined = joined_text(&history);
        assert_eq!(joined, "what should i text her");
        assert_eq!(detect_mode(None, &joined, &Rules::default()), Mode::SuggestReply);
    }
}

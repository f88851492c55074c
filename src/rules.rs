//! Classification rules: noise denylist and intent trigger phrases.
//!
//! Rules are plain data so they can be tuned without touching the
//! pipeline. Defaults are compiled in; a JSON file can replace any of
//! the lists. Each entry is a regex fragment, matched case-insensitively
//! anywhere in the text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Lines of chat chrome that OCR picks up alongside real messages.
pub const DEFAULT_NOISE_PATTERNS: &[&str] = &[
    "double tap",
    "today",
    "yesterday",
    r"\b(am|pm)\b",
    r"\d(am|pm)\b",
    "seen",
    "active",
    "message",
];

/// Phrases that mean "write the text for me" rather than "coach me".
pub const DEFAULT_TRIGGER_PHRASES: &[&str] = &[
    r"what should i (text|say|send|reply)",
    "what can i say",
    r"how (to|do i|should i) start",
    r"start a (convo|conversation|chat)",
    "give me a reply",
    "write a message",
    "reply to",
    r"text (her|him|them)",
    "conversation starter",
];

/// How many surviving screenshot lines are kept as context.
pub const DEFAULT_MAX_CONTEXT_LINES: usize = 6;

/// Serializable rule set, as stored in `rules.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default = "default_noise")]
    pub noise_patterns: Vec<String>,
    #[serde(default = "default_triggers")]
    pub trigger_phrases: Vec<String>,
    #[serde(default = "default_max_lines")]
    pub max_context_lines: usize,
}

fn default_noise() -> Vec<String> {
    DEFAULT_NOISE_PATTERNS.iter().map(|s| s.to_string()).collect()
}

fn default_triggers() -> Vec<String> {
    DEFAULT_TRIGGER_PHRASES.iter().map(|s| s.to_string()).collect()
}

fn default_max_lines() -> usize {
    DEFAULT_MAX_CONTEXT_LINES
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            noise_patterns: default_noise(),
            trigger_phrases: default_triggers(),
            max_context_lines: default_max_lines(),
        }
    }
}

/// Rule set compiled into matchers. Built once at startup and shared.
#[derive(Debug, Clone)]
pub struct Rules {
    noise: Option<Regex>,
    triggers: Option<Regex>,
    max_context_lines: usize,
}

impl Rules {
    /// Compile a rule set. An empty list compiles to "never matches".
    pub fn compile(set: &RuleSet) -> Result<Self, regex::Error> {
        Ok(Self {
            noise: compile_alternation(&set.noise_patterns)?,
            triggers: compile_alternation(&set.trigger_phrases)?,
            max_context_lines: set.max_context_lines,
        })
    }

    /// True if an OCR line is UI chrome rather than a message.
    pub fn is_noise(&self, line: &str) -> bool {
        self.noise.as_ref().is_some_and(|re| re.is_match(line))
    }

    /// True if the text asks for send-ready replies.
    pub fn wants_reply(&self, text: &str) -> bool {
        self.triggers.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn max_context_lines(&self) -> usize {
        self.max_context_lines
    }
}

impl Default for Rules {
    fn default() -> Self {
        // Compiled-in defaults are known-good patterns.
        Self::compile(&RuleSet::default()).unwrap_or(Self {
            noise: None,
            triggers: None,
            max_context_lines: DEFAULT_MAX_CONTEXT_LINES,
        })
    }
}

fn compile_alternation(patterns: &[String]) -> Result<Option<Regex>, regex::Error> {
    let parts: Vec<String> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("(?:{})", p))
        .collect();
    if parts.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("(?i){}", parts.join("|"))).map(Some)
}

/// Default location of the user-editable rules file.
pub fn default_rules_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rizzonator")
        .join("rules.json")
}

/// Load rules from `path`, falling back to defaults if the file is missing.
///
/// A file that exists but fails to load is an error.
pub fn load_rules(path: &Path) -> Result<Rules, String> {
    let set = match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str::<RuleSet>(&raw)
            .map_err(|e| format!("Invalid rules JSON in {}: {}", path.display(), e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("[CONFIG] No rules file at {}, using defaults", path.display());
            RuleSet::default()
        }
        Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
    };
    let rules = Rules::compile(&set)
        .map_err(|e| format!("Invalid rule pattern in {}: {}", path.display(), e))?;
    log::info!(
        "[CONFIG] Rules loaded: {} noise patterns, {} trigger phrases, keep last {}",
        set.noise_patterns.len(),
        set.trigger_phrases.len(),
        set.max_context_lines
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_noise_catches_chat_chrome() {
        let rules = Rules::default();
        assert!(rules.is_noise("Seen 2:30pm"));
        assert!(rules.is_noise("Double tap to like"));
        assert!(rules.is_noise("Active now"));
        assert!(rules.is_noise("TODAY"));
        assert!(rules.is_noise("10:42 AM"));
        assert!(rules.is_noise("Message..."));
        assert!(!rules.is_noise("I miss you"));
        assert!(!rules.is_noise("good game lol"));
    }

    #[test]
    fn default_triggers_match_variants() {
        let rules = Rules::default();
        assert!(rules.wants_reply("what should i text her"));
        assert!(rules.wants_reply("how to start a conversation?"));
        assert!(rules.wants_reply("ok so how do i start with her"));
        assert!(rules.wants_reply("can you write a message for me"));
        assert!(rules.wants_reply("need a CONVERSATION STARTER"));
        assert!(!rules.wants_reply("should i follow her on ig?"));
    }

    #[test]
    fn empty_lists_never_match() {
        let set = RuleSet {
            noise_patterns: vec![],
            trigger_phrases: vec!["  ".to_string()],
            max_context_lines: 3,
        };
        let rules = Rules::compile(&set).unwrap();
        assert!(!rules.is_noise("seen"));
        assert!(!rules.wants_reply("what should i text"));
        assert_eq!(rules.max_context_lines(), 3);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let set = RuleSet {
            noise_patterns: vec!["(unclosed".to_string()],
            ..RuleSet::default()
        };
        assert!(Rules::compile(&set).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let rules = load_rules(Path::new("/nonexistent/rizzonator/rules.json")).unwrap();
        assert_eq!(rules.max_context_lines(), DEFAULT_MAX_CONTEXT_LINES);
        assert!(rules.is_noise("seen"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{ "maxContextLines": 4 }"#).unwrap();
        let rules = load_rules(&path).unwrap();
        assert_eq!(rules.max_context_lines(), 4);
        assert!(rules.wants_reply("text him"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_rules(&path).is_err());
    }
}

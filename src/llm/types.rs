//! Conversation and reply types shared across the reply pipeline.
//!
//! Request-scoped only: nothing here is persisted. The wire shapes
//! (`RizzRequest`, `RizzResponse`) match what the mobile front end posts
//! to `/api/rizz` and renders back.

use serde::{Deserialize, Serialize};

/// Which side of the chat screen a message came from.
///
/// NEAR is the app's user (right-aligned bubbles), FAR the other party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Near,
    Far,
    Unknown,
}

impl Side {
    /// Map a free-form side label onto a `Side`.
    ///
    /// Chat UIs right-align the user's own bubbles, so RIGHT means NEAR.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "NEAR" | "RIGHT" | "ME" | "USER" | "OUTGOING" => Side::Near,
            "FAR" | "LEFT" | "THEM" | "OTHER" | "INCOMING" => Side::Far,
            _ => Side::Unknown,
        }
    }

    /// Upper-case transcript label.
    pub fn label(self) -> &'static str {
        match self {
            Side::Near => "NEAR",
            Side::Far => "FAR",
            Side::Unknown => "UNKNOWN",
        }
    }
}

/// One turn of a conversation. `text` is always trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    text: String,
    /// `None` when the turn arrived as a bare string with no side metadata.
    side: Option<Side>,
}

impl Message {
    /// Build a side-annotated message. Returns `None` for blank text.
    pub fn new(text: &str, side: Side) -> Option<Self> {
        Self::build(text, Some(side))
    }

    /// Build an unannotated message (rendered without a side prefix).
    pub fn plain(text: &str) -> Option<Self> {
        Self::build(text, None)
    }

    fn build(text: &str, side: Option<Side>) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            side,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }
}

/// Whether the user wants send-ready replies or coaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    SuggestReply,
    GiveAdvice,
}

/// Whether suggested replies answer an incoming message or follow up an
/// outgoing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Parse a direction marker line (case-insensitive prefix match).
    pub fn from_marker(line: &str) -> Option<Self> {
        let upper = line.trim().to_uppercase();
        if upper.starts_with("INCOMING") {
            Some(Direction::Incoming)
        } else if upper.starts_with("OUTGOING") {
            Some(Direction::Outgoing)
        } else {
            None
        }
    }

    /// Direction implied by the side of the most recent message.
    pub fn for_last_side(side: Side) -> Option<Self> {
        match side {
            Side::Far => Some(Direction::Incoming),
            Side::Near => Some(Direction::Outgoing),
            Side::Unknown => None,
        }
    }
}

/// Structured model output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyResult {
    ReplySet {
        direction: Option<Direction>,
        candidates: Vec<String>,
    },
    Advice {
        body: String,
    },
}

/// Why a parsed result is valid but not what the template asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// First line was not INCOMING/OUTGOING; the first lines were taken as-is.
    MissingMarker,
    /// Marker present but fewer than three distinct candidates followed.
    ShortSet { found: usize },
}

/// Friendly stand-ins shown instead of model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// No conversation supplied at all.
    Greeting,
    /// Completion came back empty, unparsable, or with nothing usable.
    EmptyCompletion,
    /// The completion service could not be reached.
    GatewayFailure,
    /// Screenshot OCR found nothing worth sending.
    NoReadableText,
    /// Screenshot could not be decoded or recognized.
    ScreenshotFailure,
}

impl Placeholder {
    pub fn message(self) -> &'static str {
        match self {
            Placeholder::Greeting => "Hey 👋 How can I help?",
            Placeholder::EmptyCompletion => "Hmm… try asking that a different way.",
            Placeholder::GatewayFailure => "Something went wrong 😅 Try again.",
            Placeholder::NoReadableText => {
                "No readable text found. Try a different screenshot or crop it."
            }
            Placeholder::ScreenshotFailure => {
                "Something went wrong. Try a smaller image or a different browser."
            }
        }
    }
}

/// Result of one pass through the reply pipeline. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Ready(ReplyResult),
    Degraded {
        result: ReplyResult,
        reason: Degradation,
    },
    Placeholder(Placeholder),
}

impl ReplyOutcome {
    /// The structured result, if the model produced anything usable.
    pub fn result(&self) -> Option<&ReplyResult> {
        match self {
            ReplyOutcome::Ready(result) | ReplyOutcome::Degraded { result, .. } => Some(result),
            ReplyOutcome::Placeholder(_) => None,
        }
    }

    /// Flatten into the strings the front end displays.
    pub fn into_replies(self) -> Vec<String> {
        match self {
            ReplyOutcome::Ready(result) | ReplyOutcome::Degraded { result, .. } => match result {
                ReplyResult::ReplySet { candidates, .. } => candidates,
                ReplyResult::Advice { body } => vec![body],
            },
            ReplyOutcome::Placeholder(p) => vec![p.message().to_string()],
        }
    }
}

// ── Wire types ──────────────────────────────────────────────────────

/// A conversation turn as posted by the front end: a bare string
/// (typed chat) or an object with an optional side (screenshot lines).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InboundMessage {
    Plain(String),
    Tagged {
        #[serde(default)]
        text: String,
        #[serde(default)]
        side: Option<String>,
    },
}

impl InboundMessage {
    /// Normalize into a `Message`, dropping blank turns.
    ///
    /// Objects without a side still render with a prefix (UNKNOWN).
    pub fn into_message(self) -> Option<Message> {
        match self {
            InboundMessage::Plain(text) => Message::plain(&text),
            InboundMessage::Tagged { text, side } => {
                let side = side.as_deref().map(Side::from_label).unwrap_or(Side::Unknown);
                Message::new(&text, side)
            }
        }
    }
}

impl From<&Message> for InboundMessage {
    fn from(m: &Message) -> Self {
        match m.side() {
            Some(side) => InboundMessage::Tagged {
                text: m.text().to_string(),
                side: Some(side.label().to_lowercase()),
            },
            None => InboundMessage::Plain(m.text().to_string()),
        }
    }
}

/// Body of `POST /api/rizz`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RizzRequest {
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Option<Vec<InboundMessage>>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub copy_mode: Option<bool>,
}

/// Anything but an array reads as "no messages". Array elements that are
/// neither strings nor objects are skipped.
fn lenient_messages<'de, D>(deserializer: D) -> Result<Option<Vec<InboundMessage>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    let messages = items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(text) => Some(InboundMessage::Plain(text)),
            serde_json::Value::Object(fields) => Some(InboundMessage::Tagged {
                text: fields
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                side: fields.get("side").and_then(|v| v.as_str()).map(str::to_string),
            }),
            _ => None,
        })
        .collect();
    Ok(Some(messages))
}

/// Only a JSON `true` or `false` counts; other values are ignored.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(serde_json::Value::deserialize(deserializer)?.as_bool())
}

/// Response body: always at least one displayable string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RizzResponse {
    pub replies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl RizzResponse {
    pub fn placeholder(p: Placeholder) -> Self {
        Self {
            replies: vec![p.message().to_string()],
            mode: None,
            direction: None,
        }
    }

    /// Build the wire response for a pipeline outcome in `mode`.
    pub fn from_outcome(mode: Mode, outcome: ReplyOutcome) -> Self {
        let direction = match outcome.result() {
            Some(ReplyResult::ReplySet { direction, .. }) => *direction,
            _ => None,
        };
        let mode = outcome.result().map(|_| mode);
        Self {
            replies: outcome.into_replies(),
            mode,
            direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_labels_follow_screen_convention() {
        assert_eq!(Side::from_label("right"), Side::Near);
        assert_eq!(Side::from_label("LEFT"), Side::Far);
        assert_eq!(Side::from_label(" near "), Side::Near);
        assert_eq!(Side::from_label("sideways"), Side::Unknown);
        assert_eq!(Side::from_label(""), Side::Unknown);
    }

    #[test]
    fn blank_messages_are_rejected() {
        assert!(Message::plain("   ").is_none());
        assert!(Message::new("\n", Side::Far).is_none());
        assert_eq!(Message::plain("  hey ").unwrap().text(), "hey");
    }

    #[test]
    fn inbound_object_without_side_is_unknown() {
        let raw: InboundMessage = serde_json::from_str(r#"{"text":"yo"}"#).unwrap();
        let m = raw.into_message().unwrap();
        assert_eq!(m.side(), Some(Side::Unknown));

        let raw: InboundMessage = serde_json::from_str(r#""yo""#).unwrap();
        assert_eq!(raw.into_message().unwrap().side(), None);
    }

    #[test]
    fn request_messages_are_read_leniently() {
        let req: RizzRequest = serde_json::from_str(r#"{"messages":"hi"}"#).unwrap();
        assert!(req.messages.is_none());

        let req: RizzRequest =
            serde_json::from_str(r#"{"messages":[1,null,"hey",{"text":"yo","side":"left"},{"text":5}],"copyMode":"yes"}"#)
                .unwrap();
        let messages: Vec<Message> = req
            .messages
            .unwrap()
            .into_iter()
            .filter_map(InboundMessage::into_message)
            .collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text(), "hey");
        assert_eq!(messages[1].side(), Some(Side::Far));
        assert!(req.copy_mode.is_none());

        let req: RizzRequest = serde_json::from_str(r#"{"copyMode":true}"#).unwrap();
        assert!(req.messages.is_none());
        assert_eq!(req.copy_mode, Some(true));
    }

    #[test]
    fn direction_marker_is_prefix_and_case_insensitive() {
        assert_eq!(Direction::from_marker("incoming:"), Some(Direction::Incoming));
        assert_eq!(Direction::from_marker("OUTGOING"), Some(Direction::Outgoing));
        assert_eq!(Direction::from_marker("Hey!"), None);
    }

    #[test]
    fn placeholder_response_has_exactly_one_reply() {
        let resp = RizzResponse::from_outcome(
            Mode::GiveAdvice,
            ReplyOutcome::Placeholder(Placeholder::GatewayFailure),
        );
        assert_eq!(resp.replies, vec!["Something went wrong 😅 Try again."]);
        assert!(resp.mode.is_none());
    }

    #[test]
    fn response_omits_absent_fields_on_the_wire() {
        let json = serde_json::to_value(RizzResponse::placeholder(Placeholder::Greeting)).unwrap();
        assert_eq!(json, serde_json::json!({ "replies": ["Hey 👋 How can I help?"] }));
    }
}

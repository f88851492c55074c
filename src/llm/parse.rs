//! Reply parsing: raw completion text back into structured results.
//!
//! Total by construction: every input maps to a `ReplyOutcome`. Models
//! drift from the requested shape, so each deviation degrades to the best
//! usable output instead of failing.

use super::types::{Degradation, Direction, Mode, Placeholder, ReplyOutcome, ReplyResult};

/// Candidates requested from the model in SUGGEST_REPLY mode.
pub const CANDIDATE_COUNT: usize = 3;

/// Trimmed, non-blank lines of a completion.
fn content_lines(raw: &str) -> Vec<&str> {
    raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Take up to `CANDIDATE_COUNT` lines, skipping exact repeats.
fn distinct_candidates<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(CANDIDATE_COUNT);
    for line in lines {
        if out.len() == CANDIDATE_COUNT {
            break;
        }
        if !out.iter().any(|c| c == line) {
            out.push(line.to_string());
        }
    }
    out
}

/// Parse a completion for `mode`.
///
/// `fallback_direction` is used when the model omits the direction marker.
pub fn parse_reply(mode: Mode, raw: &str, fallback_direction: Option<Direction>) -> ReplyOutcome {
    let lines = content_lines(raw);
    if lines.is_empty() {
        return ReplyOutcome::Placeholder(Placeholder::EmptyCompletion);
    }

    match mode {
        Mode::GiveAdvice => ReplyOutcome::Ready(ReplyResult::Advice {
            body: raw.trim().to_string(),
        }),
        Mode::SuggestReply => parse_reply_set(&lines, fallback_direction),
    }
}

fn parse_reply_set(lines: &[&str], fallback_direction: Option<Direction>) -> ReplyOutcome {
    let marker = lines.first().and_then(|l| Direction::from_marker(l));

    let (direction, candidates, degradation) = match marker {
        Some(direction) => {
            let candidates = distinct_candidates(lines.iter().skip(1).copied());
            let degradation = (candidates.len() < CANDIDATE_COUNT).then_some(Degradation::ShortSet {
                found: candidates.len(),
            });
            (Some(direction), candidates, degradation)
        }
        None => {
            log::warn!("[LLM] Reply is missing its direction marker, taking first lines as-is");
            let candidates = distinct_candidates(lines.iter().copied());
            (fallback_direction, candidates, Some(Degradation::MissingMarker))
        }
    };

    if candidates.is_empty() {
        return ReplyOutcome::Placeholder(Placeholder::EmptyCompletion);
    }

    let result = ReplyResult::ReplySet {
        direction,
        candidates,
    };
    match degradation {
        None => ReplyOutcome::Ready(result),
        Some(reason) => ReplyOutcome::Degraded { result, reason },
    }
}

//! Chat-screenshot heuristics for OCR output.
//!
//! Turns raw recognized lines into side-tagged conversation turns:
//! which bubble column a line sits in, whether it is UI chrome,
//! and how much recent context to keep.

use super::{BoundingBox, OcrLine};
use crate::llm::types::{Message, Side};
use crate::rules::Rules;

/// Which side of the screen a line sits on.
///
/// Chat apps right-align the user's own bubbles: a center right of the
/// midpoint is NEAR, anything else is FAR. Without a box or a usable
/// width the side is UNKNOWN.
pub fn detect_side(bbox: Option<&BoundingBox>, image_width: Option<u32>) -> Side {
    match (bbox, image_width) {
        (Some(bbox), Some(width)) if width > 0 => {
            if bbox.center_x() > width as f32 / 2.0 {
                Side::Near
            } else {
                Side::Far
            }
        }
        _ => Side::Unknown,
    }
}

/// Classify OCR lines into the most recent conversation turns.
///
/// Drops blank lines and chrome, keeps the last `max_context_lines`
/// survivors in screen order. Returns an empty vec when nothing usable
/// is left; the caller decides what to show.
pub fn classify_lines(lines: &[OcrLine], image_width: Option<u32>, rules: &Rules) -> Vec<Message> {
    let survivors: Vec<Message> = lines
        .iter()
        .filter(|line| !rules.is_noise(&line.text))
        .filter_map(|line| Message::new(&line.text, detect_side(line.bbox.as_ref(), image_width)))
        .collect();

    let keep = rules.max_context_lines();
    let skip = survivors.len().saturating_sub(keep);
    survivors.into_iter().skip(skip).collect()
}

/// Fallback for engines that return only flat text: one line per row,
/// no geometry.
pub fn lines_from_text(text: &str) -> Vec<OcrLine> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| OcrLine {
            text: l.to_string(),
            bbox: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x0: f32, x1: f32) -> OcrLine {
        OcrLine {
            text: text.to_string(),
            bbox: Some(BoundingBox {
                x0,
                y0: 0.0,
                x1,
                y1: 10.0,
            }),
        }
    }

    #[test]
    fn side_follows_bubble_column() {
        let rules = Rules::default();
        let lines = vec![line("hey you", 10.0, 200.0), line("hi!!", 600.0, 780.0)];
        let out = classify_lines(&lines, Some(800), &rules);
        assert_eq!(out[0].side(), Some(Side::Far));
        assert_eq!(out[1].side(), Some(Side::Near));
    }

    #[test]
    fn midpoint_counts_as_far() {
        let bbox = BoundingBox {
            x0: 300.0,
            y0: 0.0,
            x1: 500.0,
            y1: 1.0,
        };
        assert_eq!(detect_side(Some(&bbox), Some(800)), Side::Far);
    }

    #[test]
    fn missing_geometry_is_unknown() {
        let bbox = BoundingBox {
            x0: 600.0,
            y0: 0.0,
            x1: 700.0,
            y1: 1.0,
        };
        assert_eq!(detect_side(Some(&bbox), None), Side::Unknown);
        assert_eq!(detect_side(Some(&bbox), Some(0)), Side::Unknown);
        assert_eq!(detect_side(None, Some(800)), Side::Unknown);
    }

    #[test]
    fn chrome_and_blank_lines_are_dropped() {
        let rules = Rules::default();
        let lines = vec![
            line("Seen 2:30pm", 600.0, 780.0),
            line("   ", 0.0, 10.0),
            line("I miss you", 10.0, 200.0),
            line("Active now", 10.0, 200.0),
        ];
        let out = classify_lines(&lines, Some(800), &rules);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "I miss you");
    }

    #[test]
    fn keeps_last_six_in_order() {
        let rules = Rules::default();
        let lines: Vec<OcrLine> = (0..10).map(|i| line(&format!("line {}", i), 0.0, 10.0)).collect();
        let out = classify_lines(&lines, Some(800), &rules);
        let texts: Vec<&str> = out.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["line 4", "line 5", "line 6", "line 7", "line 8", "line 9"]);
    }

    #[test]
    fn classification_is_repeatable() {
        let rules = Rules::default();
        let lines = vec![line("yo", 0.0, 10.0), line("Today", 0.0, 10.0), line("sup", 700.0, 790.0)];
        assert_eq!(
            classify_lines(&lines, Some(800), &rules),
            classify_lines(&lines, Some(800), &rules)
        );
    }

    #[test]
    fn nothing_usable_yields_empty() {
        let rules = Rules::default();
        let lines = vec![line("Yesterday", 0.0, 10.0), line("", 0.0, 10.0)];
        assert!(classify_lines(&lines, Some(800), &rules).is_empty());
    }

    #[test]
    fn flat_text_becomes_unknown_lines() {
        let rules = Rules::default();
        let lines = lines_from_text("hey\n\n  what's up  \n");
        let out = classify_lines(&lines, None, &rules);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].text(), "what's up");
        assert_eq!(out[1].side(), Some(Side::Unknown));
    }
}

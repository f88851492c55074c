//! Tesseract TSV output parsing.
//!
//! `tesseract <in> <out> tsv` emits one row per page/block/paragraph/line/word:
//!
//! ```text
//! level page_num block_num par_num line_num word_num left top width height conf text
//! ```
//!
//! Only word rows (level 5) carry text. Words are grouped back into lines
//! by their (page, block, paragraph, line) key, keeping first-seen order,
//! and each line's box is the union of its word boxes.

use super::{BoundingBox, OcrLine};

const WORD_LEVEL: u32 = 5;
const COLUMNS: usize = 12;

/// Lines recovered from a TSV document plus mean word confidence (0.0–1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct TsvDocument {
    pub lines: Vec<OcrLine>,
    pub confidence: f64,
}

struct LineAcc {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    bbox: BoundingBox,
}

/// Parse TSV text. Malformed rows are skipped rather than failing the whole
/// document; OCR output is noisy by nature.
pub fn parse_tsv(tsv: &str) -> TsvDocument {
    let mut acc: Vec<LineAcc> = Vec::new();
    let mut conf_sum = 0.0;
    let mut conf_count = 0usize;

    for row in tsv.lines() {
        let cols: Vec<&str> = row.splitn(COLUMNS, '\t').collect();
        if cols.len() < COLUMNS {
            continue;
        }
        let nums: Option<Vec<i64>> = cols[..10].iter().map(|c| c.trim().parse::<i64>().ok()).collect();
        // Header row and junk fail the numeric parse.
        let Some(nums) = nums else { continue };
        if nums[0] != WORD_LEVEL as i64 {
            continue;
        }
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }

        if let Ok(conf) = cols[10].trim().parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }

        let key = (nums[1] as u32, nums[2] as u32, nums[3] as u32, nums[4] as u32);
        let (left, top, width, height) = (nums[6] as f32, nums[7] as f32, nums[8] as f32, nums[9] as f32);
        let word_box = BoundingBox {
            x0: left,
            y0: top,
            x1: left + width,
            y1: top + height,
        };

        match acc.iter_mut().find(|l| l.key == key) {
            Some(line) => {
                line.words.push(text.to_string());
                line.bbox = line.bbox.union(&word_box);
            }
            None => acc.push(LineAcc {
                key,
                words: vec![text.to_string()],
                bbox: word_box,
            }),
        }
    }

    let confidence = if conf_count == 0 {
        0.0
    } else {
        (conf_sum / conf_count as f64 / 100.0).clamp(0.0, 1.0)
    };

    TsvDocument {
        lines: acc
            .into_iter()
            .map(|l| OcrLine {
                text: l.words.join(" "),
                bbox: Some(l.bbox),
            })
            .collect(),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t800\t1200\t-1\t
4\t1\t1\t1\t1\t0\t20\t100\t180\t30\t-1\t
5\t1\t1\t1\t1\t1\t20\t100\t60\t30\t90\they
5\t1\t1\t1\t1\t2\t90\t102\t110\t28\t80\tstranger
4\t1\t2\t1\t1\t0\t520\t200\t250\t30\t-1\t
5\t1\t2\t1\t1\t1\t520\t200\t100\t30\t70\thello
5\t1\t2\t1\t1\t2\t630\t200\t140\t30\t-1\t
5\t1\t2\t1\t1\t3\t630\t201\t140\t31\t60\tthere
";

    #[test]
    fn groups_words_into_lines_with_union_box() {
        let doc = parse_tsv(SAMPLE);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].text, "hey stranger");
        let b = doc.lines[0].bbox.unwrap();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (20.0, 100.0, 200.0, 130.0));
        assert_eq!(doc.lines[1].text, "hello there");
        assert_eq!(doc.lines[1].bbox.unwrap().x1, 770.0);
    }

    #[test]
    fn confidence_is_mean_of_word_rows() {
        let doc = parse_tsv(SAMPLE);
        assert!((doc.confidence - 0.75).abs() < 1e-9);
    }

    #[test]
    fn garbage_yields_empty_document() {
        let doc = parse_tsv("not\ta tsv\nat all");
        assert!(doc.lines.is_empty());
        assert_eq!(doc.confidence, 0.0);
    }
}

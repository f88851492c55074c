//! OCR domain: external text recognition for chat screenshots.
//!
//! The recognition engine is a black box behind [`TextRecognizer`]. The
//! shipped adapter drives the `tesseract` CLI as a subprocess and reads its
//! TSV output, which carries per-word geometry.
//! External code should only use the items exported here.

pub mod heuristics;
pub mod preprocess;
pub mod tesseract;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// Axis-aligned box in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// One recognized line of text, with geometry when the engine provides it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub lines: Vec<OcrLine>,
    pub text: String,
    pub char_count: usize,
    pub latency_ms: f64,
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine not found: {0}")]
    EngineNotFound(String),
    #[error("failed to run OCR engine: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Anything that can turn PNG bytes into text lines.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, png: Vec<u8>) -> Result<OcrOutput, OcrError>;
}

/// Tesseract CLI adapter: `tesseract stdin stdout -l <lang> tsv`.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<PathBuf>, lang: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            lang: lang.into(),
        }
    }

    /// Locate the engine: explicit path first, then `PATH`.
    pub fn locate(explicit: Option<&Path>, lang: &str) -> Result<Self, OcrError> {
        let binary = match explicit {
            Some(path) if path.exists() => path.to_path_buf(),
            Some(path) => {
                return Err(OcrError::EngineNotFound(path.display().to_string()));
            }
            None => which::which("tesseract")
                .map_err(|e| OcrError::EngineNotFound(format!("tesseract ({})", e)))?,
        };
        log::info!("[OCR] Using tesseract at {}", binary.display());
        Ok(Self::new(binary, lang))
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, png: Vec<u8>) -> Result<OcrOutput, OcrError> {
        let start = std::time::Instant::now();

        let mut child = tokio::process::Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.lang, "tsv"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Engine("no stdin for tesseract".to_string()))?;
        // Write and close stdin before waiting, or tesseract never sees EOF.
        let writer = tokio::spawn(async move {
            let res = stdin.write_all(&png).await;
            drop(stdin);
            res
        });

        let output = child.wait_with_output().await?;
        match writer.await {
            Ok(res) => res?,
            Err(e) => return Err(OcrError::Engine(format!("stdin writer panicked: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let doc = tesseract::parse_tsv(&tsv);
        let text = doc
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        log::info!(
            "[OCR] Extracted {} lines ({} chars) in {:.0}ms, confidence={:.2}",
            doc.lines.len(),
            text.chars().count(),
            latency_ms,
            doc.confidence
        );

        Ok(OcrOutput {
            char_count: text.chars().count(),
            lines: doc.lines,
            text,
            latency_ms,
            confidence: doc.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_boxes() {
        let a = BoundingBox {
            x0: 10.0,
            y0: 5.0,
            x1: 20.0,
            y1: 15.0,
        };
        let b = BoundingBox {
            x0: 15.0,
            y0: 0.0,
            x1: 40.0,
            y1: 12.0,
        };
        let u = a.union(&b);
        assert_eq!((u.x0, u.y0, u.x1, u.y1), (10.0, 0.0, 40.0, 15.0));
        assert_eq!(u.center_x(), 25.0);
    }

    #[test]
    fn explicit_missing_binary_is_reported() {
        let err = TesseractRecognizer::locate(Some(Path::new("/nonexistent/tesseract")), "eng")
            .unwrap_err();
        assert!(matches!(err, OcrError::EngineNotFound(_)));
    }
}

//! OCR benchmark CLI for Rizzonator.
//!
//! Runs the screenshot half of the pipeline (downscale → tesseract → line
//! classifier) without calling the completion service.
//!
//! Usage:
//!   ocr-bench <image.png>             Single image, side-tagged lines
//!   ocr-bench <image.png> --text      Single image, raw OCR text
//!   ocr-bench --batch <directory>     All images in directory → CSV

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rizzonator_lib::ocr::preprocess::{prepare_screenshot, DEFAULT_MAX_DIM};
use rizzonator_lib::ocr::{heuristics, OcrOutput, TesseractRecognizer, TextRecognizer};
use rizzonator_lib::rules::Rules;

struct BenchResult {
    output: OcrOutput,
    width: u32,
    prep_ms: f64,
    wall_ms: f64,
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage:");
        eprintln!("  ocr-bench <image.png> [--text]");
        eprintln!("  ocr-bench --batch <directory>");
        std::process::exit(1);
    }

    let explicit = std::env::var_os("TESSERACT_PATH").map(PathBuf::from);
    let lang = std::env::var("OCR_LANG").unwrap_or_else(|_| "eng".to_string());
    let recognizer = match TesseractRecognizer::locate(explicit.as_deref(), &lang) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let rules = Rules::default();

    if args[1] == "--batch" {
        let Some(dir) = args.get(2) else {
            eprintln!("--batch requires a directory path");
            std::process::exit(1);
        };
        run_batch(&recognizer, &rules, Path::new(dir)).await;
    } else {
        let raw = args.contains(&"--text".to_string());
        run_single(&recognizer, &rules, Path::new(&args[1]), raw).await;
    }
}

async fn bench(recognizer: &TesseractRecognizer, path: &Path) -> Result<BenchResult, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    let start = Instant::now();
    let prepared = prepare_screenshot(&bytes, DEFAULT_MAX_DIM).map_err(|e| e.to_string())?;
    let prep_ms = start.elapsed().as_micros() as f64 / 1000.0;
    let width = prepared.width;

    let output = recognizer
        .recognize(prepared.png)
        .await
        .map_err(|e| e.to_string())?;
    let wall_ms = start.elapsed().as_micros() as f64 / 1000.0;

    Ok(BenchResult {
        output,
        width,
        prep_ms,
        wall_ms,
    })
}

async fn run_single(recognizer: &TesseractRecognizer, rules: &Rules, path: &Path, raw: bool) {
    let result = match bench(recognizer, path).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    eprintln!("=== {} ===", path.display());
    eprintln!("  Preprocess:  {:.1}ms", result.prep_ms);
    eprintln!("  OCR latency: {:.1}ms", result.output.latency_ms);
    eprintln!("  Wall time:   {:.1}ms", result.wall_ms);
    eprintln!("  Chars:       {}", result.output.char_count);
    eprintln!("  Confidence:  {:.3}", result.output.confidence);
    eprintln!();

    if raw {
        println!("{}", result.output.text);
        return;
    }

    for message in heuristics::classify_lines(&result.output.lines, Some(result.width), rules) {
        let side = message.side().map(|s| s.label()).unwrap_or("UNKNOWN");
        println!("{:>7}: {}", side, message.text());
    }
}

async fn run_batch(recognizer: &TesseractRecognizer, rules: &Rules, dir: &Path) {
    let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(read) => read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext == "png" || ext == "jpg" || ext == "jpeg")
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) => {
            eprintln!("Not a readable directory: {} ({})", dir.display(), e);
            std::process::exit(1);
        }
    };
    entries.sort();

    if entries.is_empty() {
        eprintln!("No image files found in {}", dir.display());
        std::process::exit(1);
    }

    println!("filename,raw_lines,kept_lines,char_count,prep_ms,ocr_ms,wall_ms,confidence");

    let mut latencies: Vec<f64> = Vec::new();
    for image_path in &entries {
        let filename = image_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let result = match bench(recognizer, image_path).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("  skipped {}: {}", filename, e);
                continue;
            }
        };
        let kept = heuristics::classify_lines(&result.output.lines, Some(result.width), rules);

        println!(
            "{},{},{},{},{:.1},{:.1},{:.1},{:.3}",
            filename,
            result.output.lines.len(),
            kept.len(),
            result.output.char_count,
            result.prep_ms,
            result.output.latency_ms,
            result.wall_ms,
            result.output.confidence
        );
        latencies.push(result.wall_ms);
        std::io::stdout().flush().ok();
    }

    eprintln!("\n--- Benchmark Summary ---");
    eprintln!("  Images processed: {}", latencies.len());
    if !latencies.is_empty() {
        print_latency_summary(&mut latencies);
    }
}

fn print_latency_summary(latencies: &mut [f64]) {
    latencies.sort_by(|a, b| a.total_cmp(b));
    let median = latencies[latencies.len() / 2];
    let p99_idx = ((latencies.len() as f64 * 0.99).ceil() as usize).min(latencies.len() - 1);
    let avg: f64 = latencies.iter().sum::<f64>() / latencies.len() as f64;

    eprintln!("    Median: {:.1}ms", median);
    eprintln!("    Average: {:.1}ms", avg);
    eprintln!("    P99: {:.1}ms", latencies[p99_idx]);
}

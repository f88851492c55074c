//! Reply pipelines.
//!
//! - reply_to_conversation: history → intent → prompt → completion → parse
//! - reply_to_screenshot: image → preprocess → OCR → line classifier → reply
//!
//! Both always produce a displayable `RizzResponse`. Failures are absorbed
//! here and turned into placeholders; nothing propagates to the caller.

use serde::{Deserialize, Serialize};

use crate::llm::{
    self, CompletionGateway, Message, Mode, Placeholder, ReplyOutcome, RizzRequest, RizzResponse,
};
use crate::ocr::{self, heuristics, OcrLine, TextRecognizer};
use crate::rules::Rules;

/// Body of `POST /api/screenshot`: raw image bytes, or OCR the client
/// already ran on-device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRequest {
    /// Base64-encoded image (PNG, JPEG, …). A `data:` URL prefix is accepted.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ocr: Option<ClientOcr>,
}

/// OCR result produced by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOcr {
    #[serde(default)]
    pub lines: Vec<OcrLine>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_width: Option<u32>,
}

/// Handle a `/api/rizz` request body.
pub async fn handle_rizz(
    gateway: &dyn CompletionGateway,
    rules: &Rules,
    request: RizzRequest,
) -> RizzResponse {
    let history: Vec<Message> = request
        .messages
        .unwrap_or_default()
        .into_iter()
        .filter_map(|m| m.into_message())
        .collect();
    reply_to_conversation(gateway, rules, &history, request.copy_mode).await
}

/// Run the reply pipeline over a normalized history.
pub async fn reply_to_conversation(
    gateway: &dyn CompletionGateway,
    rules: &Rules,
    history: &[Message],
    copy_mode: Option<bool>,
) -> RizzResponse {
    if history.is_empty() {
        log::info!("[PIPELINE] Empty conversation, greeting");
        return RizzResponse::placeholder(Placeholder::Greeting);
    }

    let (mode, outcome) = run(gateway, rules, history, copy_mode).await;
    RizzResponse::from_outcome(mode, outcome)
}

/// Intent → prompt → completion → parse, for a non-empty history.
pub async fn run(
    gateway: &dyn CompletionGateway,
    rules: &Rules,
    history: &[Message],
    copy_mode: Option<bool>,
) -> (Mode, ReplyOutcome) {
    let start = std::time::Instant::now();

    let mode = llm::detect_mode(copy_mode, &llm::joined_text(history), rules);
    let prompt = llm::build_prompt(mode, history);
    let fallback_direction = llm::expected_direction(history);
    log::info!(
        "[PIPELINE] {} messages, mode={:?}, expected direction={:?}",
        history.len(),
        mode,
        fallback_direction
    );

    let outcome = match gateway.complete(prompt.system, &prompt.transcript).await {
        Ok(raw) => llm::parse_reply(mode, &raw, fallback_direction),
        Err(e) if e.is_unreachable() => {
            log::error!("[PIPELINE] Completion service unreachable: {}", e);
            ReplyOutcome::Placeholder(Placeholder::GatewayFailure)
        }
        Err(e) => {
            log::warn!("[PIPELINE] Completion unusable, treating as empty: {}", e);
            ReplyOutcome::Placeholder(Placeholder::EmptyCompletion)
        }
    };

    match &outcome {
        ReplyOutcome::Ready(_) => log::info!("[PIPELINE] Parse result: ready"),
        ReplyOutcome::Degraded { reason, .. } => {
            log::warn!("[PIPELINE] Parse result: degraded ({:?})", reason)
        }
        ReplyOutcome::Placeholder(p) => log::warn!("[PIPELINE] Parse result: placeholder ({:?})", p),
    }
    log::info!("[PIPELINE] Total: {}ms", start.elapsed().as_millis());

    (mode, outcome)
}

/// Handle a `/api/screenshot` request body.
///
/// Screenshots always ask for send-ready replies.
pub async fn reply_to_screenshot(
    gateway: &dyn CompletionGateway,
    recognizer: Option<&dyn TextRecognizer>,
    rules: &Rules,
    request: ScreenshotRequest,
    max_dim: u32,
) -> RizzResponse {
    let (lines, width) = match extract_lines(recognizer, request, max_dim).await {
        Ok(found) => found,
        Err(e) => {
            log::error!("[PIPELINE] Screenshot failed: {}", e);
            return RizzResponse::placeholder(Placeholder::ScreenshotFailure);
        }
    };

    let history = heuristics::classify_lines(&lines, width, rules);
    log::info!(
        "[PIPELINE] Screenshot: {} raw lines → {} usable",
        lines.len(),
        history.len()
    );
    if history.is_empty() {
        return RizzResponse::placeholder(Placeholder::NoReadableText);
    }

    reply_to_conversation(gateway, rules, &history, Some(true)).await
}

/// Recognized lines plus the width their boxes are measured against.
async fn extract_lines(
    recognizer: Option<&dyn TextRecognizer>,
    request: ScreenshotRequest,
    max_dim: u32,
) -> Result<(Vec<OcrLine>, Option<u32>), String> {
    if let Some(client) = request.ocr {
        let lines = if client.lines.is_empty() {
            heuristics::lines_from_text(client.text.as_deref().unwrap_or_default())
        } else {
            client.lines
        };
        return Ok((lines, client.image_width));
    }

    let encoded = request.image.ok_or("request has neither image nor ocr")?;
    let bytes = decode_image(&encoded)?;
    let recognizer = recognizer.ok_or("no OCR engine available on this server")?;

    let prepared = ocr::preprocess::prepare_screenshot(&bytes, max_dim).map_err(|e| e.to_string())?;
    let output = recognizer
        .recognize(prepared.png)
        .await
        .map_err(|e| e.to_string())?;

    let lines = if output.lines.is_empty() {
        heuristics::lines_from_text(&output.text)
    } else {
        output.lines
    };
    Ok((lines, Some(prepared.width)))
}

/// Decode base64 image data, with or without a `data:image/...;base64,` prefix.
pub fn decode_image(encoded: &str) -> Result<Vec<u8>, String> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, cleaned)
        .map_err(|e| format!("invalid base64 image: {}", e))
}

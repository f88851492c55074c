//! HTTP server: shared state, router, listener loop.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::commands;
use crate::llm::provider::ProviderInfo;
use crate::llm::CompletionGateway;
use crate::ocr::TextRecognizer;
use crate::profile::ProfileStore;
use crate::rules::Rules;

/// Screenshots arrive base64-encoded inside JSON.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers.
pub struct AppState {
    pub gateway: Arc<dyn CompletionGateway>,
    pub provider: ProviderInfo,
    /// `None` when no OCR engine was found; image uploads then fail softly.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,
    pub rules: Arc<Rules>,
    pub profiles: ProfileStore,
    /// Serializes writes to the uid registry.
    pub registry_lock: Mutex<()>,
    pub max_image_dim: u32,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        provider: ProviderInfo,
        recognizer: Option<Arc<dyn TextRecognizer>>,
        rules: Rules,
        profiles: ProfileStore,
        max_image_dim: u32,
    ) -> Self {
        Self {
            gateway,
            provider,
            recognizer,
            rules: Arc::new(rules),
            profiles,
            registry_lock: Mutex::new(()),
            max_image_dim,
        }
    }
}

pub type SharedState = Arc<AppState>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/rizz", post(commands::rizz))
        .route("/api/screenshot", post(commands::screenshot))
        .route("/api/onboarding", get(commands::onboarding))
        .route("/api/profile", post(commands::create_profile))
        .route(
            "/api/profile/:uid",
            get(commands::get_profile).put(commands::put_profile),
        )
        .route("/health", get(commands::health))
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

/// Serve until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    log::info!("[SERVER] Listening on http://{}", addr);
    axum::serve(listener, router(state)).await
}

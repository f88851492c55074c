//! Rizzonator: dating wingman backend.
//!
//! This is the app shell that wires together all domains.
//! No business logic lives here: only module declarations, startup,
//! and state construction.
//!
//! Request handling is split across:
//!   - commands.rs: thin HTTP handlers
//!   - pipeline.rs: multi-step orchestration (conversation, screenshot)
//!   - server.rs:   router, shared state, listener

mod commands;
pub mod config;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod profile;
pub mod rules;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use config::{AppConfig, ConfigError};
use llm::{provider, CompletionGateway, GatewayError, OpenRouterGateway};
use ocr::{TesseractRecognizer, TextRecognizer};
use profile::ProfileStore;
use server::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("rules error: {0}")]
    Rules(String),
    #[error("gateway setup failed: {0}")]
    Gateway(#[from] GatewayError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Load `.env.local`, falling back to `.env`, from the working directory.
pub fn load_env_files() {
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }
}

/// Build the shared state from configuration.
///
/// A missing OCR engine is not fatal: clients can still send their own
/// OCR output to `/api/screenshot`.
pub fn build_state(config: &AppConfig) -> Result<AppState, AppError> {
    let rules = rules::load_rules(&config.rules_path).map_err(AppError::Rules)?;
    let gateway: Arc<dyn CompletionGateway> =
        Arc::new(OpenRouterGateway::new(config.gateway.clone())?);

    let recognizer: Option<Arc<dyn TextRecognizer>> =
        match TesseractRecognizer::locate(config.tesseract_path.as_deref(), &config.ocr_lang) {
            Ok(r) => Some(Arc::new(r)),
            Err(e) => {
                log::warn!("[OCR] {}, image uploads disabled", e);
                None
            }
        };

    log::info!("[PROFILE] Profile store at {}", config.data_dir.display());
    Ok(AppState::new(
        gateway,
        provider::openrouter(),
        recognizer,
        rules,
        ProfileStore::new(&config.data_dir),
        config.max_image_dim,
    ))
}

/// Entry point: called by the `rizzonator` binary.
pub async fn run() -> Result<(), AppError> {
    load_env_files();
    env_logger::init();

    log::info!("Rizzonator starting up");
    let config = AppConfig::from_env()?.with_keychain_fallback();
    log::info!(
        "[CONFIG] Model {} at {} (timeout {}s)",
        config.gateway.model,
        config.gateway.base_url,
        config.gateway.timeout.as_secs()
    );

    let state = build_state(&config)?;
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: config.listen_addr,
            source,
        })?;

    server::serve(listener, state).await.map_err(AppError::Serve)
}

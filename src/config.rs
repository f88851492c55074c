//! Runtime configuration, read from the environment.
//!
//! `.env.local` / `.env` are loaded into the environment before this runs
//! (see `lib.rs`), so everything here is a plain `std::env` lookup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::llm::gateway::{DEFAULT_BASE_URL, DEFAULT_SITE_URL};
use crate::llm::prompts::{MODEL, TEMPERATURE};
use crate::llm::{provider, GatewayConfig};
use crate::ocr::preprocess::DEFAULT_MAX_DIM;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_OCR_LANG: &str = "eng";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub gateway: GatewayConfig,
    pub data_dir: PathBuf,
    pub rules_path: PathBuf,
    pub tesseract_path: Option<PathBuf>,
    pub ocr_lang: String,
    pub max_image_dim: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let listen_addr: SocketAddr = parse(
            "RIZZ_LISTEN_ADDR",
            get("RIZZ_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
        )?;

        let temperature: f32 = parse_or("RIZZ_TEMPERATURE", get("RIZZ_TEMPERATURE"), TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                var: "RIZZ_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0 and 2".to_string(),
            });
        }

        let timeout_secs: u64 =
            parse_or("RIZZ_TIMEOUT_SECS", get("RIZZ_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "RIZZ_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let gateway = GatewayConfig {
            base_url: get("OPENROUTER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: get("OPENROUTER_API_KEY"),
            model: get("RIZZ_MODEL").unwrap_or_else(|| MODEL.to_string()),
            temperature,
            site_url: get("RIZZ_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        Ok(Self {
            listen_addr,
            gateway,
            data_dir: get("RIZZ_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            rules_path: get("RIZZ_RULES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(crate::rules::default_rules_path),
            tesseract_path: get("TESSERACT_PATH").map(PathBuf::from),
            ocr_lang: get("OCR_LANG").unwrap_or_else(|| DEFAULT_OCR_LANG.to_string()),
            max_image_dim: DEFAULT_MAX_DIM,
        })
    }

    /// Fill in the API key from the OS keychain when the env had none.
    pub fn with_keychain_fallback(mut self) -> Self {
        if self.gateway.api_key.is_none() {
            self.gateway.api_key = provider::resolve_api_key(&provider::openrouter());
        }
        if self.gateway.api_key.is_none() {
            log::warn!("[CONFIG] No OpenRouter API key, replies will use the failure placeholder");
        }
        self
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rizzonator")
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => parse(var, value),
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}

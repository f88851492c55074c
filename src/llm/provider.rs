//! Completion provider metadata and credential resolution.
//!
//! The API key is looked up in the environment first, then in the OS
//! keychain (service `rizzonator`, one entry per provider id).

use serde::{Deserialize, Serialize};

/// Keychain service name for stored API keys.
pub const KEYCHAIN_SERVICE: &str = "rizzonator";

/// Provider metadata. `id` and `name` are reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: String,
    pub env_key: String,
}

pub fn openrouter() -> ProviderInfo {
    ProviderInfo {
        id: "openrouter".to_string(),
        name: "OpenRouter (OpenAI-compatible chat completions)".to_string(),
        env_key: "OPENROUTER_API_KEY".to_string(),
    }
}

/// Find an API key for `provider`: env var, then OS keychain.
///
/// Keychain errors (no secret service, locked keyring) are logged and
/// treated as "no key".
pub fn resolve_api_key(provider: &ProviderInfo) -> Option<String> {
    if let Ok(key) = std::env::var(&provider.env_key) {
        if !key.trim().is_empty() {
            log::info!("[CONFIG] {} key loaded from {}", provider.id, provider.env_key);
            return Some(key.trim().to_string());
        }
    }

    match keyring::Entry::new(KEYCHAIN_SERVICE, &provider.id).and_then(|e| e.get_password()) {
        Ok(key) if !key.trim().is_empty() => {
            log::info!("[CONFIG] {} key loaded from OS keychain", provider.id);
            Some(key.trim().to_string())
        }
        Ok(_) => None,
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            log::warn!("[CONFIG] Keychain lookup for {} failed: {}", provider.id, e);
            None
        }
    }
}

/// Store an API key in the OS keychain for later runs.
pub fn save_api_key(provider: &ProviderInfo, api_key: &str) -> Result<(), String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, &provider.id)
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(api_key.trim())
        .map_err(|e| format!("Failed to save key: {}", e))?;
    log::info!("[CONFIG] API key saved for provider: {}", provider.id);
    Ok(())
}

/// Mask a credential for logs: first 7 chars + `***` + last 4.
/// Short keys are fully masked.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

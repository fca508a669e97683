//! Runtime settings and fixed tuning constants.
//!
//! Everything configurable comes from the process environment at startup.
//! The LLM credential is the only required value; a missing key is fatal
//! before the server binds. The generation knobs (token caps, temperature)
//! are deliberately constants: the extraction contract depends on
//! deterministic decoding, so they are not operator-tunable.

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Chemora";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ═══════════════════════════════════════════════════════════
// Fixed tuning constants
// ═══════════════════════════════════════════════════════════

/// Output-length cap for the document extraction call.
pub const EXTRACTION_MAX_TOKENS: u32 = 4000;
/// Output-length cap for chat replies.
pub const CHAT_MAX_TOKENS: u32 = 2000;
/// Deterministic decoding for both call sites.
pub const LLM_TEMPERATURE: f32 = 0.0;
/// Messages API revision sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
/// Sessions idle longer than this are swept.
pub const SESSION_IDLE_SECS: u64 = 30 * 60;
/// Multipart upload cap for order-template PDFs.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

// ═══════════════════════════════════════════════════════════
// Environment-backed settings
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Settings resolved once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    /// LLM credential. Required; absence is startup-fatal.
    pub api_key: String,
    /// Messages endpoint URL.
    pub api_url: String,
    /// Model identifier sent on every call.
    pub model: String,
    /// HTTP listen address.
    pub bind_addr: String,
    /// Optional LLM request timeout. `None` preserves the blocking
    /// no-timeout behavior of the workflow: a hung call hangs that
    /// one interaction, nothing else.
    pub llm_timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("CHEMORA_API_KEY")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar("CHEMORA_API_KEY"))?;

        let llm_timeout_secs = match lookup("CHEMORA_LLM_TIMEOUT_SECS") {
            None => None,
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                var: "CHEMORA_LLM_TIMEOUT_SECS",
                value: raw,
            })?),
        };

        Ok(Settings {
            api_key,
            api_url: lookup("CHEMORA_API_URL")
                .unwrap_or_else(|| "https://api.anthropic.com/v1/messages".into()),
            model: lookup("CHEMORA_MODEL").unwrap_or_else(|| "claude-3-opus-20240229".into()),
            bind_addr: lookup("CHEMORA_BIND").unwrap_or_else(|| "127.0.0.1:8741".into()),
            llm_timeout_secs,
        })
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

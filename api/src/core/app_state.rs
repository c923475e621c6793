use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use ai_llm_service::{AnswerGenerator, answer_service::DEFAULT_MAX_ATTACHMENT_CHARS};
use services::debug::{
    DebugRegistry,
    prettier::{self, PrettierConfig},
};
use thiserror::Error;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid {
        var: &'static str,
        reason: &'static str,
    },
}

/// Process-level settings for the HTTP layer, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Listen address, e.g. `0.0.0.0:8000`.
    pub api_address: String,
    /// Whether `/debug/{function_name}` is routed at all.
    pub debug_endpoints: bool,
    /// Request body limit for form and multipart bodies.
    pub max_upload_bytes: usize,
    /// Parent directory for per-request upload directories (system temp when `None`).
    pub upload_dir: Option<PathBuf>,
    /// Formatter used by the prettier hash operation.
    pub prettier: PrettierConfig,
    /// Characters of a text attachment inlined into the LLM prompt.
    pub max_attachment_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_address: DEFAULT_API_ADDRESS.into(),
            debug_endpoints: true,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_dir: None,
            prettier: PrettierConfig::default(),
            max_attachment_chars: DEFAULT_MAX_ATTACHMENT_CHARS,
        }
    }
}

impl AppConfig {
    /// Load settings from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| {
            std::env::var(k)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }

    /// Load settings from an arbitrary lookup (`None` for unset variables).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dflt = Self::default();

        let prettier_timeout = match get("PRETTIER_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_num("PRETTIER_TIMEOUT_SECS", &v)?),
            None => prettier::DEFAULT_TIMEOUT,
        };
        let prettier = match get("PRETTIER_COMMAND") {
            Some(cmd) => PrettierConfig::from_command_line(&cmd, prettier_timeout).ok_or(
                ConfigError::Invalid {
                    var: "PRETTIER_COMMAND",
                    reason: "expected a command line",
                },
            )?,
            None => PrettierConfig {
                timeout: prettier_timeout,
                ..dflt.prettier
            },
        };

        Ok(Self {
            api_address: get("API_ADDRESS").unwrap_or(dflt.api_address),
            debug_endpoints: match get("DEBUG_ENDPOINTS") {
                Some(v) => parse_bool("DEBUG_ENDPOINTS", &v)?,
                None => dflt.debug_endpoints,
            },
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(v) => parse_num("MAX_UPLOAD_BYTES", &v)?,
                None => dflt.max_upload_bytes,
            },
            upload_dir: get("UPLOAD_DIR").map(PathBuf::from),
            prettier,
            max_attachment_chars: match get("LLM_MAX_ATTACHMENT_CHARS") {
                Some(v) => parse_num("LLM_MAX_ATTACHMENT_CHARS", &v)?,
                None => dflt.max_attachment_chars,
            },
        })
    }
}

fn parse_bool(var: &'static str, v: &str) -> Result<bool, ConfigError> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: "expected true or false",
        }),
    }
}

fn parse_num<T: std::str::FromStr>(var: &'static str, v: &str) -> Result<T, ConfigError> {
    v.parse().map_err(|_| ConfigError::Invalid {
        var,
        reason: "expected a non-negative integer",
    })
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// LLM capability behind `/api/`.
    pub answerer: Arc<dyn AnswerGenerator>,
    /// Operations behind `/debug/{function_name}`.
    pub debug: Arc<DebugRegistry>,
    upload_dir: Option<Arc<Path>>,
}

impl AppState {
    pub fn new(answerer: Arc<dyn AnswerGenerator>, config: &AppConfig) -> Self {
        Self {
            answerer,
            debug: Arc::new(DebugRegistry::new(config.prettier.clone())),
            upload_dir: config.upload_dir.as_deref().map(Arc::from),
        }
    }

    /// Where per-request upload directories are created.
    pub fn upload_dir(&self) -> Option<&Path> {
        self.upload_dir.as_deref()
    }
}

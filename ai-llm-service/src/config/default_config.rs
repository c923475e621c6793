//! LLM configs loaded from environment variables.
//!
//! `LLM_KIND` picks the provider (`openai` by default, or `ollama`).
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TEMPERATURE`  = sampling temperature (default `0.2`, `0.0..=2.0`)
//! - `LLM_TIMEOUT_SECS` = request timeout (default `60`)
//!
//! OpenAI-compatible:
//! - `OPENAI_API_KEY` or `AIPROXY_TOKEN` = bearer token (mandatory)
//! - `OPENAI_BASE_URL`                   = base URL (default `https://api.openai.com`)
//! - `OPENAI_MODEL`                      = chat model (default `gpt-4o-mini`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = model (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, opt_env, parse_var, require, validate_http_endpoint,
        validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Builds the model config from the process environment.
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    config_from_lookup(opt_env)
}

/// Builds the model config from an arbitrary variable lookup.
///
/// `get` must return `None` for unset or blank variables.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::MissingVar`] when a provider-specific variable is absent
/// - [`ConfigError::InvalidNumber`] / [`ConfigError::OutOfRange`] for bad knobs
pub fn config_from_lookup<F>(get: F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match get("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let max_tokens = parse_var::<u32>("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), "expected u32")?;
    let temperature = parse_var::<f32>(
        "LLM_TEMPERATURE",
        get("LLM_TEMPERATURE"),
        "expected a decimal number",
    )?
    .unwrap_or(DEFAULT_TEMPERATURE);
    validate_range_f32("temperature", temperature, 0.0, 2.0)?;
    let timeout_secs = parse_var::<u64>("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), "expected u64")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let (endpoint, model, api_key) = match provider {
        LlmProvider::OpenAI => {
            let api_key = get("OPENAI_API_KEY").or_else(|| get("AIPROXY_TOKEN"));
            let api_key = require("OPENAI_API_KEY or AIPROXY_TOKEN", api_key)?;
            let endpoint =
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
            validate_http_endpoint("OPENAI_BASE_URL", &endpoint)?;
            let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            (endpoint, model, Some(api_key))
        }
        LlmProvider::Ollama => {
            let endpoint = ollama_endpoint(&get)?;
            let model = require("OLLAMA_MODEL", get("OLLAMA_MODEL"))?;
            (endpoint, model, None)
        }
    };

    if model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(get: &F) -> Result<String, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = get("OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

//! LLM answer service used by the HTTP layer.
//!
//! The crate exposes one seam, [`AnswerGenerator`], and one production
//! implementation, [`LlmAnswerService`], which talks to a single configured
//! provider (OpenAI-compatible chat completions or a local Ollama runtime).

pub mod answer_service;
pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use answer_service::{AnswerGenerator, LlmAnswerService};
pub use config::{LlmModelConfig, LlmProvider};
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};

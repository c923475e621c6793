//! Question answering on top of a single configured LLM provider.
//!
//! - Construct once, wrap in `Arc`, and share it across request handlers.
//! - Optionally inlines an attached file into the prompt.
//! - Every call is bounded by the configured timeout.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{AnswerGenerator, LlmAnswerService};
//! use ai_llm_service::config::default_config::config_from_env;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc: Arc<dyn AnswerGenerator> = Arc::new(LlmAnswerService::new(config_from_env()?)?);
//! let answer = svc.generate_answer("What is 2 + 2?", None).await?;
//! println!("{answer}");
//! # Ok(()) }
//! ```

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    config::{LlmModelConfig, LlmProvider},
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Default cap on inlined attachment text.
pub const DEFAULT_MAX_ATTACHMENT_CHARS: usize = 20_000;

const SYSTEM_PROMPT: &str = "You are an assistant that solves assignment questions. \
Answer with the final answer only, without explanations, unless the question asks for them. \
When a file is attached, use its contents to compute the answer.";

/// Produces an answer for a question, optionally with an attached file on disk.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Returns the model's answer text.
    ///
    /// `file_path`, when present, points to a file that stays valid for the
    /// duration of the call.
    async fn generate_answer(
        &self,
        question: &str,
        file_path: Option<&Path>,
    ) -> Result<String, AiLlmError>;
}

enum Backend {
    OpenAi(OpenAiService),
    Ollama(OllamaService),
}

/// [`AnswerGenerator`] backed by OpenAI-compatible chat completions or Ollama.
pub struct LlmAnswerService {
    backend: Backend,
    timeout: Duration,
    max_attachment_chars: usize,
}

impl LlmAnswerService {
    /// Builds the provider client selected by `cfg.provider`.
    ///
    /// The outer timeout equals `cfg.timeout_secs` (60s when unset).
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));
        let backend = match cfg.provider {
            LlmProvider::OpenAI => Backend::OpenAi(OpenAiService::new(cfg)?),
            LlmProvider::Ollama => Backend::Ollama(OllamaService::new(cfg)?),
        };
        Ok(Self {
            backend,
            timeout,
            max_attachment_chars: DEFAULT_MAX_ATTACHMENT_CHARS,
        })
    }

    /// Overrides how many characters of a text attachment are inlined.
    pub fn with_max_attachment_chars(mut self, max: usize) -> Self {
        self.max_attachment_chars = max;
        self
    }

    async fn call(&self, prompt: &str) -> Result<String, AiLlmError> {
        match &self.backend {
            Backend::OpenAi(cli) => cli.generate(prompt, Some(SYSTEM_PROMPT)).await,
            Backend::Ollama(cli) => cli.generate(prompt, Some(SYSTEM_PROMPT)).await,
        }
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerService {
    async fn generate_answer(
        &self,
        question: &str,
        file_path: Option<&Path>,
    ) -> Result<String, AiLlmError> {
        let attachment = match file_path {
            Some(path) => Some(read_attachment(path).await?),
            None => None,
        };
        let prompt = build_prompt(question, attachment.as_ref(), self.max_attachment_chars);
        debug!(
            prompt_len = prompt.len(),
            has_attachment = attachment.is_some(),
            "answering question"
        );

        match tokio::time::timeout(self.timeout, self.call(&prompt)).await {
            Ok(res) => {
                if res.is_ok() {
                    info!("answer generated");
                }
                res
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "LLM call timed out");
                Err(AiLlmError::Timeout(self.timeout))
            }
        }
    }
}

/* --------------------- Prompt building --------------------- */

/// File contents loaded for prompting.
#[derive(Debug)]
struct Attachment {
    name: String,
    body: AttachmentBody,
}

#[derive(Debug)]
enum AttachmentBody {
    Text(String),
    Binary(usize),
}

async fn read_attachment(path: &Path) -> Result<Attachment, AiLlmError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AiLlmError::Attachment {
            path: path.display().to_string(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let body = match String::from_utf8(bytes) {
        Ok(text) => AttachmentBody::Text(text),
        Err(e) => AttachmentBody::Binary(e.as_bytes().len()),
    };
    Ok(Attachment { name, body })
}

fn build_prompt(question: &str, attachment: Option<&Attachment>, max_chars: usize) -> String {
    let Some(att) = attachment else {
        return question.to_string();
    };

    match &att.body {
        AttachmentBody::Text(text) => {
            let total = text.chars().count();
            let mut shown: String = text.chars().take(max_chars).collect();
            if total > max_chars {
                shown.push_str(&format!("\n[... truncated, {} of {} characters shown]", max_chars, total));
            }
            format!(
                "{question}\n\nAttached file `{}`:\n```\n{shown}\n```",
                att.name
            )
        }
        AttachmentBody::Binary(size) => format!(
            "{question}\n\nAttached file `{}` is binary ({size} bytes) and is not shown inline.",
            att.name
        ),
    }
}

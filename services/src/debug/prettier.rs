//! SHA-256 of a file as rendered by an external formatter (prettier by default).

use std::{path::Path, process::Stdio, time::Duration};

use anyhow::{Context, anyhow, bail};
use tokio::process::Command;
use tracing::{debug, info};

use crate::digest::sha256_hex;

pub const DEFAULT_COMMAND: &str = "npx -y prettier@3.4.2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Formatter invocation; the file path is appended as the last argument.
#[derive(Debug, Clone, PartialEq)]
pub struct PrettierConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl PrettierConfig {
    /// Splits a whitespace-separated command line. `None` for a blank line.
    pub fn from_command_line(command: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            timeout,
        })
    }
}

impl Default for PrettierConfig {
    fn default() -> Self {
        Self {
            program: "npx".into(),
            args: vec!["-y".into(), "prettier@3.4.2".into()],
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Runs the formatter on `path` and hashes its stdout.
pub async fn formatted_sha256(cfg: &PrettierConfig, path: &Path) -> anyhow::Result<String> {
    debug!(program = %cfg.program, path = %path.display(), "running formatter");

    let mut cmd = Command::new(&cfg.program);
    cmd.args(&cfg.args)
        .arg(path)
        .stdin(Stdio::null())
        .kill_on_drop(true);

    let output = tokio::time::timeout(cfg.timeout, cmd.output())
        .await
        .map_err(|_| anyhow!("formatter timed out after {:?}", cfg.timeout))?
        .with_context(|| format!("failed to run formatter `{}`", cfg.program))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let snippet: String = stderr.trim().chars().take(400).collect();
        bail!("formatter exited with {}: {}", output.status, snippet);
    }

    let hash = sha256_hex(&output.stdout);
    info!(%hash, bytes = output.stdout.len(), "formatted output hashed");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_command_line() {
        assert_eq!(
            PrettierConfig::from_command_line(DEFAULT_COMMAND, DEFAULT_TIMEOUT),
            Some(PrettierConfig::default())
        );
        assert_eq!(PrettierConfig::from_command_line("   ", DEFAULT_TIMEOUT), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hashes_formatter_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "hello prettier\n").unwrap();

        let cfg = PrettierConfig::from_command_line("cat", DEFAULT_TIMEOUT).unwrap();
        let hash = formatted_sha256(&cfg, &path).await.unwrap();
        assert_eq!(
            hash,
            "680110c8be382b12b7fef3afbd3e956fe83490eea5f560533f0d42ea881a4004"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_formatter_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.md");
        let cfg = PrettierConfig::from_command_line("cat", DEFAULT_TIMEOUT).unwrap();
        let err = formatted_sha256(&cfg, &missing).await.unwrap_err();
        assert!(err.to_string().contains("formatter exited with"));
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let cfg = PrettierConfig::from_command_line("definitely-not-a-formatter-bin", DEFAULT_TIMEOUT)
            .unwrap();
        let err = formatted_sha256(&cfg, Path::new("x.md")).await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to run formatter"));
    }
}

//! Closed registry of server-side operations reachable from the debug endpoint.
//!
//! Names map to [`DebugFunction`] variants in exactly one place
//! ([`DebugFunction::from_name`]); each variant binds the raw parameter bag
//! into a typed [`DebugCall`] before anything runs.

pub mod prettier;
pub mod sales;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde_json::{Map, Value};
use tracing::{debug, info};

use self::{prettier::PrettierConfig, sales::SalesQuery};

/// Caller-supplied named arguments.
pub type ParamBag = Map<String, Value>;

/// Key under which the uploaded file's path is injected into the bag.
pub const FILE_PATH_KEY: &str = "file_path";

/// Every operation the debug endpoint may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugFunction {
    AnalyzeSalesWithPhoneticClustering,
    CalculatePrettierSha256,
}

impl DebugFunction {
    pub const ALL: [DebugFunction; 2] = [
        DebugFunction::AnalyzeSalesWithPhoneticClustering,
        DebugFunction::CalculatePrettierSha256,
    ];

    /// Route name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            DebugFunction::AnalyzeSalesWithPhoneticClustering => {
                "analyze_sales_with_phonetic_clustering"
            }
            DebugFunction::CalculatePrettierSha256 => "calculate_prettier_sha256",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Binds the parameter bag to this operation's typed arguments.
    ///
    /// The prettier hash only ever uses the uploaded file, never a
    /// caller-supplied `file_path`.
    pub fn bind(self, params: ParamBag, upload: Option<&Path>) -> anyhow::Result<DebugCall> {
        match self {
            DebugFunction::AnalyzeSalesWithPhoneticClustering => {
                let query: SalesQuery = serde_json::from_value(Value::Object(params))
                    .with_context(|| format!("invalid parameters for {}", self.name()))?;
                Ok(DebugCall::AnalyzeSales(query))
            }
            DebugFunction::CalculatePrettierSha256 => Ok(DebugCall::PrettierSha256 {
                file_path: upload.map(Path::to_path_buf),
            }),
        }
    }
}

/// A registry operation with its arguments bound.
#[derive(Debug, Clone)]
pub enum DebugCall {
    AnalyzeSales(SalesQuery),
    PrettierSha256 { file_path: Option<PathBuf> },
}

/// Non-exceptional outcome of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugOutcome {
    /// The operation ran; its result.
    Completed(Value),
    /// An expected refusal (unknown function, missing file).
    Refused(String),
}

/// Runtime dependencies of the registry operations.
#[derive(Debug, Clone, Default)]
pub struct DebugRegistry {
    pub prettier: PrettierConfig,
}

impl DebugRegistry {
    pub fn new(prettier: PrettierConfig) -> Self {
        Self { prettier }
    }

    /// Parses `raw_params`, injects the upload path and runs `function_name`.
    ///
    /// # Errors
    /// Malformed params, bad arguments and operation failures. Unknown
    /// functions and a missing file are [`DebugOutcome::Refused`] instead.
    pub async fn dispatch(
        &self,
        function_name: &str,
        raw_params: &str,
        upload: Option<&Path>,
    ) -> anyhow::Result<DebugOutcome> {
        let mut params = parse_params(raw_params)?;
        if let Some(path) = upload {
            params.insert(
                FILE_PATH_KEY.to_string(),
                Value::String(path.display().to_string()),
            );
        }

        let Some(function) = DebugFunction::from_name(function_name) else {
            debug!(function_name, "unsupported debug function");
            return Ok(DebugOutcome::Refused(format!(
                "Function {function_name} not supported for direct testing"
            )));
        };

        info!(function = function.name(), has_file = upload.is_some(), "debug dispatch");
        match function.bind(params, upload)? {
            DebugCall::AnalyzeSales(query) => {
                let summary = sales::analyze(&query).await?;
                Ok(DebugOutcome::Completed(serde_json::to_value(summary)?))
            }
            DebugCall::PrettierSha256 { file_path: None } => Ok(DebugOutcome::Refused(format!(
                "No file provided for {}",
                function.name()
            ))),
            DebugCall::PrettierSha256 {
                file_path: Some(path),
            } => {
                let hash = prettier::formatted_sha256(&self.prettier, &path).await?;
                Ok(DebugOutcome::Completed(Value::String(hash)))
            }
        }
    }
}

/// Decodes the JSON parameter bag; it must be an object.
pub fn parse_params(raw: &str) -> anyhow::Result<ParamBag> {
    let value: Value = serde_json::from_str(raw).context("params must be valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("params must be a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

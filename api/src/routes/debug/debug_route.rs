//! POST /debug/{function_name}: runs one operation from the debug registry.
//!
//! Failures never change the status code: they come back as `error`
//! (expected refusals) or `error` + `traceback` (anything else).

use axum::{
    Json,
    extract::{Path, State},
};
use services::{
    debug::DebugOutcome,
    upload::{TempUpload, store_upload},
};
use tracing::warn;

use crate::core::{
    app_state::AppState,
    http::{
        form_payload::{FormPayload, UploadedFile},
        response_envelope::DebugResponse,
    },
};

/// Handler: POST /debug/{function_name}
///
/// Form fields: `params` (JSON object, default `{}`), `file` (optional upload).
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/debug/calculate_prettier_sha256 \
///   -F 'file=@README.md'
/// ```
pub async fn debug_function(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    mut form: FormPayload,
) -> Json<DebugResponse> {
    // An empty field counts as absent.
    let params = form
        .text("params")
        .filter(|p| !p.is_empty())
        .unwrap_or("{}")
        .to_string();
    let file = form.take_file("file");

    let response = match run(&state, &function_name, &params, file).await {
        Ok(DebugOutcome::Completed(result)) => DebugResponse::Result { result },
        Ok(DebugOutcome::Refused(error)) => DebugResponse::Error { error },
        Err(err) => {
            warn!(%function_name, error = %format!("{err:#}"), "debug function failed");
            DebugResponse::Failure {
                error: format!("{err:#}"),
                traceback: format!("{err:?}"),
            }
        }
    };
    Json(response)
}

async fn run(
    state: &AppState,
    function_name: &str,
    params: &str,
    file: Option<UploadedFile>,
) -> anyhow::Result<DebugOutcome> {
    let upload: Option<TempUpload> = match file {
        Some(file) => {
            Some(store_upload(state.upload_dir(), file.file_name.as_deref(), &file.bytes).await?)
        }
        None => None,
    };

    state
        .debug
        .dispatch(function_name, params, upload.as_ref().map(TempUpload::path))
        .await
}

use axum::Json;
use services::kv_json;

use crate::{
    core::http::{form_payload::FormPayload, response_envelope::AnswerResponse},
    error_handler::{AppError, AppResult},
};

/// Handler: POST /convert-json
///
/// Turns the `key=value` lines of the uploaded `file` into canonical JSON and
/// returns its SHA-256.
pub async fn convert_json(mut form: FormPayload) -> AppResult<Json<AnswerResponse<String>>> {
    let file = form.take_file("file").ok_or(AppError::MissingField("file"))?;
    let digest = kv_json::convert(&file.bytes)?;
    Ok(Json(AnswerResponse::new(digest.sha256_hex)))
}

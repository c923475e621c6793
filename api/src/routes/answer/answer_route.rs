//! POST /api/: forwards a question (and optional file) to the LLM.

use ai_llm_service::AnswerGenerator;
use axum::{Json, extract::State};
use services::upload::{TempUpload, store_upload};
use tracing::{debug, info};

use crate::{
    core::{
        app_state::AppState,
        http::{form_payload::FormPayload, response_envelope::AnswerResponse},
    },
    error_handler::AppResult,
};

/// Handler: POST /api/
///
/// Form fields: `question` (required), `file` (optional upload).
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8000/api/ \
///   -F 'question=Sum the second column' \
///   -F 'file=@data.csv'
/// ```
pub async fn answer_question(
    State(state): State<AppState>,
    mut form: FormPayload,
) -> AppResult<Json<AnswerResponse<String>>> {
    let question = form.require_non_empty("question")?.to_string();

    // Lives until the end of the handler; dropping it removes the file.
    let upload: Option<TempUpload> = match form.take_file("file") {
        Some(file) => {
            debug!(
                file_name = ?file.file_name,
                content_type = ?file.content_type,
                bytes = file.bytes.len(),
                "question has an attachment"
            );
            Some(store_upload(state.upload_dir(), file.file_name.as_deref(), &file.bytes).await?)
        }
        None => None,
    };

    let answer = state
        .answerer
        .generate_answer(&question, upload.as_ref().map(TempUpload::path))
        .await?;

    info!(answer_len = answer.len(), "question answered");
    Ok(Json(AnswerResponse::new(answer)))
}

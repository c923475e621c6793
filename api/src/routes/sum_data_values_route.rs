use axum::Json;
use services::html_sum;

use crate::{
    core::http::{form_payload::FormPayload, response_envelope::AnswerResponse},
    error_handler::AppResult,
};

/// Handler: POST /api/sum-data-values
///
/// Sums the `data-value` attributes of every `div.foo` in the `html` field.
pub async fn sum_data_values(form: FormPayload) -> AppResult<Json<AnswerResponse<f64>>> {
    let html = form.require_text("html")?;
    let total = html_sum::sum_data_values(html)?;
    Ok(Json(AnswerResponse::new(total)))
}

use axum::Json;

use crate::core::http::response_envelope::MessageResponse;

/// Handler: GET /
pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "TDS Solver API is running!",
    })
}

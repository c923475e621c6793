//! Wire shapes shared by the handlers.

use serde::Serialize;
use serde_json::Value;

/// `{ "answer": ... }` returned by `/api/`, `/api/sum-data-values` and `/convert-json`.
#[derive(Debug, Serialize)]
pub struct AnswerResponse<T>
where
    T: Serialize,
{
    pub answer: T,
}

impl<T> AnswerResponse<T>
where
    T: Serialize,
{
    pub fn new(answer: T) -> Self {
        Self { answer }
    }
}

/// `{ "message": ... }` returned by `/`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// `{ "detail": ... }` returned with every non-2xx status.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Body of `/debug/{function_name}`; always sent with HTTP 200.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DebugResponse {
    Result { result: Value },
    Error { error: String },
    Failure { error: String, traceback: String },
}

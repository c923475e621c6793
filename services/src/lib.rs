//! Request-scoped helpers behind the HTTP handlers.
//!
//! Nothing here knows about HTTP: uploads arrive as bytes, results leave as
//! plain values or typed errors.

pub mod debug;
pub mod digest;
pub mod error;
pub mod html_sum;
pub mod kv_json;
pub mod text;
pub mod upload;

pub use error::{ServiceError, UploadError};

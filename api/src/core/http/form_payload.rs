//! Form extractor accepting both `multipart/form-data` and
//! `application/x-www-form-urlencoded` bodies.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Multipart, Request},
    http::header,
};

use crate::error_handler::{AppError, AppResult};

/// A file part of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied file name, if any.
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Text fields and file parts of a form body.
///
/// Bodies of any other content type yield an empty payload, so required
/// fields are reported as missing rather than as a content-type error.
#[derive(Debug, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormPayload {
    /// Value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Value of a text field that must be present and not empty.
    ///
    /// Whitespace-only values are kept.
    pub fn require_text(&self, name: &'static str) -> AppResult<&str> {
        self.text(name)
            .filter(|v| !v.is_empty())
            .ok_or(AppError::MissingField(name))
    }

    /// Value of a text field that must be present and not blank.
    pub fn require_non_empty(&self, name: &'static str) -> AppResult<&str> {
        self.text(name)
            .filter(|v| !v.trim().is_empty())
            .ok_or(AppError::MissingField(name))
    }

    /// Removes and returns a file part.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state).await?;
            Ok(FormPayload {
                fields,
                files: HashMap::new(),
            })
        } else {
            Ok(FormPayload::default())
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<FormPayload> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty, nameless part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                payload.files.insert(
                    name,
                    UploadedFile {
                        file_name: Some(file_name).filter(|n| !n.is_empty()),
                        content_type,
                        bytes,
                    },
                );
            }
            None => {
                let text = field.text().await?;
                payload.fields.insert(name, text);
            }
        }
    }

    Ok(payload)
}

//! Scoped temporary storage for uploaded files.
//!
//! Each upload gets its own fresh directory and keeps its original (sanitized)
//! file name, so downstream tools can still infer the file type from the
//! extension. The directory is removed when the [`TempUpload`] is dropped,
//! whichever way the request ends.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::UploadError;

const FALLBACK_NAME: &str = "upload.bin";

/// An upload persisted for the lifetime of one request.
#[derive(Debug)]
pub struct TempUpload {
    // Held for its Drop: removes the directory and the file inside.
    _dir: TempDir,
    path: PathBuf,
}

impl TempUpload {
    /// Filesystem path of the stored file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Persists `data` under `root` (or the system temp dir) and returns its handle.
///
/// # Errors
/// [`UploadError::TempDir`] when the directory cannot be created,
/// [`UploadError::Write`] when the bytes cannot be written.
pub async fn store_upload(
    root: Option<&Path>,
    file_name: Option<&str>,
    data: &[u8],
) -> Result<TempUpload, UploadError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("upload-");
    let dir = match root {
        Some(root) => builder.tempdir_in(root),
        None => builder.tempdir(),
    }
    .map_err(UploadError::TempDir)?;

    let path = dir.path().join(sanitize_file_name(file_name));
    tokio::fs::write(&path, data)
        .await
        .map_err(|source| UploadError::Write {
            path: path.clone(),
            source,
        })?;

    debug!(path = %path.display(), bytes = data.len(), "upload stored");
    Ok(TempUpload { _dir: dir, path })
}

/// Keeps only the last path component of a client-supplied name.
fn sanitize_file_name(name: Option<&str>) -> String {
    let base = name
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name(Some("README.md")), "README.md");
        assert_eq!(sanitize_file_name(Some("../../etc/passwd")), "passwd");
        assert_eq!(sanitize_file_name(Some("C:\\tmp\\data.csv")), "data.csv");
        assert_eq!(sanitize_file_name(Some("..")), FALLBACK_NAME);
        assert_eq!(sanitize_file_name(None), FALLBACK_NAME);
    }

    #[tokio::test]
    async fn upload_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let upload = store_upload(Some(root.path()), Some("notes.txt"), b"hello")
            .await
            .unwrap();
        let path = upload.path().to_path_buf();
        assert_eq!(path.file_name().unwrap(), "notes.txt");
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");

        drop(upload);
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn missing_root_fails() {
        let err = store_upload(Some(Path::new("/definitely/not/here")), None, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TempDir(_)));
    }
}

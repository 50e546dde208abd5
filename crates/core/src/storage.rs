//! Filesystem blob storage keyed by relative path.
//!
//! Blobs are written under a root directory and served by the web binaries
//! at a public base URL, so `download_url("shoes/x/default/a.jpg")` is
//! `{public_url}/shoes/x/default/a.jpg`. Uploading to an existing path
//! overwrites it.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob store rooted at a directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
    public_url: String,
}

impl BlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write bytes at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::InvalidPath` for unsafe paths and `BlobError::Io`
    /// if the write fails.
    pub async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, BlobError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        tracing::info!(path, size = bytes.len(), "blob uploaded");
        Ok(self.download_url(path))
    }

    /// Public URL for a blob path. Does not check that the blob exists.
    #[must_use]
    pub fn download_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.public_url, encoded.join("/"))
    }

    /// Map a URL produced by [`Self::download_url`] back to its blob path.
    #[must_use]
    pub fn path_from_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.public_url)?.strip_prefix('/')?;
        let decoded: Option<Vec<String>> = rest
            .split('/')
            .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
            .collect();
        decoded.map(|segments| segments.join("/"))
    }

    /// Delete a blob.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::NotFound` when nothing is stored at `path`.
    pub async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => {
                tracing::info!(path, "blob deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

/// Reject empty, absolute, or parent-escaping paths.
///
/// # Errors
///
/// Returns `BlobError::InvalidPath`.
pub fn validate_path(path: &str) -> Result<(), BlobError> {
    let invalid = || BlobError::InvalidPath(path.to_owned());
    if path.is_empty() || path.split('/').any(str::is_empty) || path.contains('\\') {
        return Err(invalid());
    }
    if Path::new(path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(invalid());
    }
    Ok(())
}

/// Replace `/` and `\` in a user-supplied segment (product name, color,
/// file name) so it stays one path segment.
#[must_use]
pub fn sanitize_segment(segment: &str) -> String {
    let cleaned: String = segment
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_owned(),
        _ => cleaned,
    }
}

/// Path of a product's default image.
#[must_use]
pub fn product_default_image_path(product_name: &str, file_name: &str) -> String {
    format!(
        "shoes/{}/default/{}",
        sanitize_segment(product_name),
        sanitize_segment(file_name)
    )
}

/// Path of one of a product's per-color images.
#[must_use]
pub fn product_color_image_path(product_name: &str, color: &str, file_name: &str) -> String {
    format!(
        "shoes/{}/{}/{}",
        sanitize_segment(product_name),
        sanitize_segment(color),
        sanitize_segment(file_name)
    )
}

/// Path of a profile picture uploaded at `unix_millis`.
#[must_use]
pub fn profile_picture_path(user_id: &str, unix_millis: i64) -> String {
    format!("profile-pics/{}/{unix_millis}.jpg", sanitize_segment(user_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> BlobStore {
        let dir = std::env::temp_dir().join(format!("nexura-blob-{}", uuid::Uuid::new_v4()));
        BlobStore::new(dir, "http://localhost:3000/uploads/")
    }

    #[test]
    fn test_path_builders() {
        assert_eq!(
            product_default_image_path("Air Max", "front.jpg"),
            "shoes/Air Max/default/front.jpg"
        );
        assert_eq!(
            product_color_image_path("Air/Max", "red", "../x.jpg"),
            "shoes/Air_Max/red/.._x.jpg"
        );
        assert_eq!(
            profile_picture_path("u1", 1_700_000_000_000),
            "profile-pics/u1/1700000000000.jpg"
        );
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("shoes/a/default/b.jpg").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("shoes/../../etc").is_err());
        assert!(validate_path("shoes//a").is_err());
    }

    #[test]
    fn test_download_url_round_trips() {
        let store = temp_store();
        let url = store.download_url("shoes/Air Max/red/1.jpg");
        assert_eq!(url, "http://localhost:3000/uploads/shoes/Air%20Max/red/1.jpg");
        assert_eq!(
            store.path_from_url(&url).as_deref(),
            Some("shoes/Air Max/red/1.jpg")
        );
        assert!(store.path_from_url("https://elsewhere/x.jpg").is_none());
    }

    #[tokio::test]
    async fn test_upload_and_delete() {
        let store = temp_store();
        let url = store.upload("profile-pics/u1/1.jpg", b"jpeg").await.unwrap();
        assert!(url.ends_with("/profile-pics/u1/1.jpg"));
        let on_disk = tokio::fs::read(store.root().join("profile-pics/u1/1.jpg"))
            .await
            .unwrap();
        assert_eq!(on_disk, b"jpeg");

        store.delete("profile-pics/u1/1.jpg").await.unwrap();
        assert!(matches!(
            store.delete("profile-pics/u1/1.jpg").await,
            Err(BlobError::NotFound(_))
        ));
        let _ = tokio::fs::remove_dir_all(store.root()).await;
    }
}

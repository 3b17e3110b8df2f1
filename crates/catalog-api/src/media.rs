//! Storage for uploaded images
//!
//! Files land under `<root>/<folder>/<uuid>.<ext>`. The database stores the
//! path relative to the root; responses carry it joined onto the public
//! URL prefix (served by the binary from `root`).

use std::path::{Component, Path, PathBuf};

use axum::extract::multipart::{Field, Multipart, MultipartError};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),
}

/// Image extensions accepted from upload file names; anything else is stored as `.bin`
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif"];

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

/// A file read out of a multipart body
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let mut url_prefix = url_prefix.into();
        if !url_prefix.ends_with('/') {
            url_prefix.push('/');
        }
        Self {
            root: root.into(),
            url_prefix,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Route the files are served under, when the URL prefix is local
    pub fn serve_path(&self) -> Option<&str> {
        let path = self.url_prefix.trim_end_matches('/');
        (path.starts_with('/') && path.len() > 1).then_some(path)
    }

    /// Public URL of a stored path
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with('/') {
            return path.to_string();
        }
        format!("{}{}", self.url_prefix, path)
    }

    /// URL of an optional stored path; blank paths count as absent
    pub fn url_opt(&self, path: Option<&str>) -> Option<String> {
        path.filter(|p| !p.is_empty()).map(|p| self.url(p))
    }

    /// Write `upload` into `folder` and return the stored relative path
    pub async fn save(&self, folder: &str, upload: &Upload) -> Result<String, MediaError> {
        let ext = upload
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or_else(|| "bin".to_string());

        let relative = format!("{}/{}.{}", folder, uuid::Uuid::new_v4(), ext);
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &upload.bytes).await?;

        debug!("Stored {} bytes at {}", upload.bytes.len(), target.display());
        Ok(relative)
    }

    /// Whether `path` is a relative path that stays under the root
    pub fn is_relative_path(path: &str) -> bool {
        !path.is_empty()
            && Path::new(path)
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
    }

    /// Remove a stored file; missing files are not an error
    pub async fn remove(&self, path: &str) {
        if !Self::is_relative_path(path) {
            if !path.is_empty() {
                warn!("Refusing to remove {} outside the media root", path);
            }
            return;
        }
        let target = self.root.join(path);
        if let Err(e) = tokio::fs::remove_file(&target).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", target.display(), e);
            }
        }
    }
}

/// Collect every file part of a multipart body whose field name is in `fields`
pub async fn read_uploads(
    multipart: &mut Multipart,
    fields: &[&str],
) -> Result<Vec<Upload>, MediaError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if !fields.contains(&name.as_str()) {
            continue;
        }
        uploads.push(read_field(name, field).await?);
    }
    Ok(uploads.into_iter().filter(|u| !u.bytes.is_empty()).collect())
}

async fn read_field(name: String, field: Field<'_>) -> Result<Upload, MediaError> {
    let file_name = field.file_name().map(str::to_string);
    let bytes = field.bytes().await?.to_vec();
    Ok(Upload {
        field: name,
        file_name,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let store = MediaStore::new("/srv/media", "/media");
        assert_eq!(store.url("products/a.png"), "/media/products/a.png");
        assert_eq!(store.url("https://cdn.example.com/a.png"), "https://cdn.example.com/a.png");
        assert_eq!(store.url_opt(Some("")), None);
        assert_eq!(store.url_opt(None), None);
        assert_eq!(store.serve_path(), Some("/media"));

        let remote = MediaStore::new("/srv/media", "https://cdn.example.com/");
        assert_eq!(remote.serve_path(), None);
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "/media/");

        let upload = Upload {
            field: "images".to_string(),
            file_name: Some("Photo.JPG".to_string()),
            bytes: vec![1, 2, 3],
        };
        let path = store.save("products", &upload).await.unwrap();
        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".jpg"));
        assert_eq!(std::fs::read(dir.path().join(&path)).unwrap(), vec![1, 2, 3]);

        store.remove(&path).await;
        assert!(!dir.path().join(&path).exists());
        store.remove(&path).await;
    }

    #[test]
    fn test_relative_path() {
        assert!(MediaStore::is_relative_path("products/a.png"));
        assert!(!MediaStore::is_relative_path(""));
        assert!(!MediaStore::is_relative_path("/etc/passwd"));
        assert!(!MediaStore::is_relative_path("products/../../secret"));
        assert!(!MediaStore::is_relative_path("./products/a.png"));
    }

    #[tokio::test]
    async fn test_remove_stays_inside_root() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let outside = elsewhere.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();
        std::fs::create_dir_all(root.path().join("products")).unwrap();

        let store = MediaStore::new(root.path(), "/media/");
        store.remove(outside.to_str().unwrap()).await;
        assert!(outside.exists());

        let escaping = format!(
            "products/../../{}/keep.txt",
            elsewhere.path().file_name().unwrap().to_str().unwrap()
        );
        store.remove(&escaping).await;
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_unknown_extension_is_bin() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "/media/");
        let upload = Upload {
            field: "logo".to_string(),
            file_name: Some("payload.exe".to_string()),
            bytes: vec![0],
        };
        let path = store.save("brands", &upload).await.unwrap();
        assert!(path.ends_with(".bin"));
    }
}

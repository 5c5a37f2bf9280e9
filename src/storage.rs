#![allow(async_fn_in_trait)]

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use tokio::fs;
use uuid::Uuid;

/// Public-readable file area addressed by relative paths such as
/// `products/3f2a….png`.
pub trait FileStorage: Send + Sync {
    /// Store `bytes` under `directory` with a generated name and return the
    /// relative path.
    async fn store(&self, directory: &str, extension: &str, bytes: &[u8]) -> io::Result<String>;

    fn url(&self, path: &str) -> String;

    /// Remove the file at `path`. Returns `false` when there was nothing to
    /// remove.
    async fn delete(&self, path: &str) -> io::Result<bool>;
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage path: {path}"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStorage for LocalStorage {
    async fn store(&self, directory: &str, extension: &str, bytes: &[u8]) -> io::Result<String> {
        let path = format!("{directory}/{}.{extension}", Uuid::new_v4().simple());
        let target = self.resolve(&path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;
        tracing::debug!(path = %path, size = bytes.len(), "stored file");
        Ok(path)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn delete(&self, path: &str) -> io::Result<bool> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Best-effort removal of files whose rows are already gone. Failures are
/// logged and do not fail the request. Returns how many files were removed.
pub async fn remove_files<S: FileStorage>(storage: &S, paths: &[String]) -> usize {
    let mut removed = 0;
    for path in paths {
        match storage.delete(path).await {
            Ok(true) => removed += 1,
            Ok(false) => tracing::debug!(path = %path, "file already gone"),
            Err(err) => tracing::warn!(path = %path, error = %err, "failed to remove file"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_and_deletes_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage/");

        let path = storage.store("products", "png", b"png-bytes").await.unwrap();
        assert!(path.starts_with("products/"));
        assert!(path.ends_with(".png"));
        assert!(dir.path().join(&path).exists());
        assert_eq!(storage.url(&path), format!("/storage/{path}"));

        assert!(storage.delete(&path).await.unwrap());
        assert!(!dir.path().join(&path).exists());
        assert!(!storage.delete(&path).await.unwrap());
    }

    #[tokio::test]
    async fn refuses_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage");
        let err = storage.delete("../etc/passwd").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(storage.delete("/abs/path").await.is_err());
    }

    #[tokio::test]
    async fn remove_files_counts_only_existing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "/storage");
        let kept = storage.store("brands", "jpg", b"x").await.unwrap();
        let removed = remove_files(&storage, &[kept, "brands/missing.jpg".into()]).await;
        assert_eq!(removed, 1);
    }
}

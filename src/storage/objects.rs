//! Object Store
//!
//! Input objects are addressed by `(bucket, key)` and copied to a local
//! scratch path before use; artifacts are written by file name into a
//! single output location.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::utils::error::{AppError, AppResult};

/// Where inputs come from and artifacts go
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy object `bucket/key` to the local path `dest`
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> AppResult<()>;

    /// Store an artifact and return its location
    async fn upload(&self, file_name: &str, body: &[u8]) -> AppResult<String>;
}

/// Directory-backed store: buckets are subdirectories of `input_root`.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    input_root: PathBuf,
    output_dir: PathBuf,
}

impl LocalObjectStore {
    pub fn new(input_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Resolve `bucket/key` under the input root, refusing escapes
    fn object_path(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(bucket).join(key);
        let is_plain = !bucket.is_empty()
            && !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(AppError::validation(format!(
                "invalid object reference {}/{}",
                bucket, key
            )));
        }
        Ok(self.input_root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> AppResult<()> {
        let source = self.object_path(bucket, key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match tokio::fs::copy(&source, dest).await {
            Ok(bytes) => {
                tracing::info!(bucket, key, bytes, "downloaded input object");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(format!("object {}/{}", bucket, key)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(&self, file_name: &str, body: &[u8]) -> AppResult<String> {
        let mut components = Path::new(file_name).components();
        let is_plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_plain {
            return Err(AppError::storage(format!(
                "artifact name must be a plain file name: {}",
                file_name
            )));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, body).await?;

        let location = path.to_string_lossy().into_owned();
        tracing::info!(file_name, location = %location, "uploaded artifact");
        Ok(location)
    }
}

//! src/services/local_store.rs
//!
//! Directory-backed store for development: objects of bucket `b` live at
//! `root/b/{key}` and are streamed straight off disk.

use crate::{
    models::object::{DEFAULT_CONTENT_TYPE, ObjectKey, ObjectMetadata},
    services::storage_service::{ObjectStore, ObjectStream, StoreError, StoreResult},
};
use async_trait::async_trait;
use futures::StreamExt;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Read size for each body chunk.
const CHUNK_SIZE: usize = 64 * 1024;
const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Clone)]
pub struct LocalStore {
    bucket: String,
    bucket_root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, bucket: &str) -> Self {
        let mut bucket_root = root.into();
        bucket_root.push(bucket);
        Self {
            bucket: bucket.to_string(),
            bucket_root,
        }
    }

    /// Keys that could escape the bucket directory never name an object.
    fn is_key_safe(key: &str) -> bool {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return false;
        }
        if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
            return false;
        }
        !key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    }

    fn object_path(&self, key: &ObjectKey) -> StoreResult<PathBuf> {
        if !Self::is_key_safe(key.as_str()) {
            debug!("rejecting unsafe key {}", key);
            return Err(StoreError::NotFound(key.clone()));
        }
        Ok(self.bucket_root.join(key.as_str()))
    }
}

fn classify(key: &ObjectKey, err: io::Error) -> StoreError {
    // A file component used as a directory (`a.txt/b`) surfaces as NotADirectory.
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::NotADirectory => StoreError::NotFound(key.clone()),
        _ => StoreError::backend(err),
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn stat(&self, key: &ObjectKey) -> StoreResult<ObjectMetadata> {
        let path = self.object_path(key)?;
        let meta = fs::metadata(&path).await.map_err(|err| classify(key, err))?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(key.clone()));
        }

        let content_type = mime_guess::from_path(&path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        Ok(ObjectMetadata {
            content_type,
            size_bytes: meta.len(),
        })
    }

    async fn open(&self, key: &ObjectKey) -> StoreResult<ObjectStream> {
        let path = self.object_path(key)?;
        let file = File::open(&path).await.map_err(|err| classify(key, err))?;
        Ok(ReaderStream::with_capacity(file, CHUNK_SIZE).boxed())
    }
}

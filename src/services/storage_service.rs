//! src/services/storage_service.rs
//!
//! The narrow storage capability the gateway consumes. A store is bound to a
//! single bucket at construction time and answers two independent calls:
//! `stat` for metadata and `open` for the byte stream. Nothing here assumes
//! the object stays the same between the two.

use crate::models::object::{ObjectKey, ObjectMetadata};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::io;
use thiserror::Error;

/// Object payload as a stream of bounded chunks. Dropping it releases the
/// underlying connection or file handle.
pub type ObjectStream = BoxStream<'static, io::Result<Bytes>>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object `{0}` not found")]
    NotFound(ObjectKey),
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

impl StoreError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        StoreError::Backend(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read-only access to the objects of one bucket.
///
/// Implementations must be safe to share between concurrently running
/// requests; the gateway holds a single `Arc<dyn ObjectStore>`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket this handle serves, for logging.
    fn bucket(&self) -> &str;

    /// Fetch content type and size of `key`.
    async fn stat(&self, key: &ObjectKey) -> StoreResult<ObjectMetadata>;

    /// Open `key` for reading.
    async fn open(&self, key: &ObjectKey) -> StoreResult<ObjectStream>;
}

//! Google Cloud Storage backend built on the `object_store` crate.

use crate::{
    models::object::{DEFAULT_CONTENT_TYPE, ObjectKey, ObjectMetadata},
    services::storage_service::{ObjectStore, ObjectStream, StoreError, StoreResult},
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::{
    Attribute, GetOptions, ObjectStore as _,
    gcp::{GoogleCloudStorage, GoogleCloudStorageBuilder},
    path::Path as ObjectPath,
};
use std::io;
use tracing::debug;

/// A handle on one GCS bucket. The underlying HTTP client is pooled and
/// safe to share across requests.
#[derive(Debug)]
pub struct GcsStore {
    bucket: String,
    inner: GoogleCloudStorage,
}

impl GcsStore {
    /// Build a client for `bucket`.
    ///
    /// `credentials_path` points at a service-account JSON file. Without it
    /// the usual `GOOGLE_*` environment variables are consulted.
    pub fn new(bucket: &str, credentials_path: Option<&str>) -> StoreResult<Self> {
        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);
        if let Some(path) = credentials_path {
            builder = builder.with_service_account_path(path);
        }
        let inner = builder.build().map_err(StoreError::backend)?;

        Ok(Self {
            bucket: bucket.to_string(),
            inner,
        })
    }

    /// `object_store` paths reject empty and relative segments; such keys
    /// cannot name an object.
    fn object_path(key: &ObjectKey) -> StoreResult<ObjectPath> {
        ObjectPath::parse(key.as_str()).map_err(|err| {
            debug!("key {} is not addressable: {}", key, err);
            StoreError::NotFound(key.clone())
        })
    }
}

fn classify(key: &ObjectKey, err: object_store::Error) -> StoreError {
    match err {
        object_store::Error::NotFound { .. } => StoreError::NotFound(key.clone()),
        other => StoreError::backend(other),
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn stat(&self, key: &ObjectKey) -> StoreResult<ObjectMetadata> {
        let path = Self::object_path(key)?;
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = self
            .inner
            .get_opts(&path, options)
            .await
            .map_err(|err| classify(key, err))?;

        // An object stored without a content type would otherwise go out with
        // an empty `Content-Type`; announce it as opaque bytes instead.
        let content_type = result
            .attributes
            .get(&Attribute::ContentType)
            .map(|value| AsRef::<str>::as_ref(value).to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Ok(ObjectMetadata {
            content_type,
            size_bytes: result.meta.size as u64,
        })
    }

    async fn open(&self, key: &ObjectKey) -> StoreResult<ObjectStream> {
        let path = Self::object_path(key)?;
        let result = self
            .inner
            .get(&path)
            .await
            .map_err(|err| classify(key, err))?;

        Ok(result.into_stream().map_err(io::Error::other).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_classified_as_not_found() {
        let key = ObjectKey::resolve("/missing.txt");
        let err = object_store::Error::NotFound {
            path: "missing.txt".into(),
            source: "404".into(),
        };
        assert!(classify(&key, err).is_not_found());
    }

    #[test]
    fn other_errors_are_backend_failures() {
        let key = ObjectKey::resolve("/a.txt");
        let err = object_store::Error::Generic {
            store: "GCS",
            source: "permission denied".into(),
        };
        assert!(matches!(classify(&key, err), StoreError::Backend(_)));
    }

    #[test]
    fn unaddressable_key_reports_not_found() {
        let key = ObjectKey::resolve("/a/../b");
        assert!(matches!(
            GcsStore::object_path(&key),
            Err(StoreError::NotFound(_))
        ));
    }
}

//! The per-request pipeline: authenticate, resolve the key, look up
//! metadata, then stream the object back.
//!
//! Store failures are classified by [`map_store_error`]; once headers are
//! committed, failures while copying the body are only logged.

use crate::{
    errors::AppError,
    models::{
        credentials::{Credentials, RequestContext},
        object::{DEFAULT_CONTENT_TYPE, ObjectKey, ObjectMetadata},
    },
    services::{
        auth::authorize,
        storage_service::{ObjectStore, ObjectStream, StoreError},
    },
};
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use futures::Stream;
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tracing::{Span, debug, error, warn};

/// Shared request handler state: the configured credentials and a store
/// handle for the served bucket. Cheap to clone.
#[derive(Clone)]
pub struct Gateway {
    store: Arc<dyn ObjectStore>,
    credentials: Arc<Credentials>,
}

impl Gateway {
    pub fn new(store: Arc<dyn ObjectStore>, credentials: Credentials) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
        }
    }

    /// Run one request through the pipeline.
    ///
    /// No store call is made unless the credentials match. `HEAD` requests
    /// stop after the metadata lookup.
    pub async fn serve(&self, ctx: RequestContext) -> Result<Response, AppError> {
        self.authenticate(ctx.credentials.as_ref())?;

        let key = ObjectKey::resolve(&ctx.path);
        debug!(bucket = self.store.bucket(), key = %key, "getting object");

        let meta = self.store.stat(&key).await.map_err(map_store_error)?;
        if ctx.method == Method::HEAD {
            return Ok(object_response(&meta, Body::empty()));
        }

        let stream = self.store.open(&key).await.map_err(map_store_error)?;
        Ok(stream_object(key, &meta, stream))
    }

    /// Check supplied credentials against the configured pair.
    pub fn authenticate(&self, supplied: Option<&Credentials>) -> Result<(), AppError> {
        let Some(supplied) = supplied else {
            return Err(AppError::unauthorized());
        };
        if !authorize(supplied, &self.credentials) {
            debug!("credentials rejected for user {:?}", supplied.username);
            return Err(AppError::unauthorized());
        }
        Ok(())
    }
}

/// Turn a store failure into the client-facing outcome.
///
/// Absence is routine and logged at debug; anything else is logged as an
/// error with its cause and becomes a 500.
pub fn map_store_error(err: StoreError) -> AppError {
    match &err {
        StoreError::NotFound(key) => {
            debug!(key = %key, "object not found");
            AppError::not_found(err.to_string())
        }
        StoreError::Backend(cause) => {
            error!(error = %cause, "error getting object");
            AppError::internal(err.to_string())
        }
    }
}

/// Build a 200 response whose body copies `stream` chunk by chunk.
pub fn stream_object(key: ObjectKey, meta: &ObjectMetadata, stream: ObjectStream) -> Response {
    let body = Body::from_stream(BodyCopy::new(key, meta.size_bytes, stream));
    object_response(meta, body)
}

fn object_response(meta: &ObjectMetadata, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::OK;
    set_object_headers(response.headers_mut(), meta);
    response
}

fn set_object_headers(headers: &mut HeaderMap, meta: &ObjectMetadata) {
    // Content types that cannot be encoded as a header value (CR/LF,
    // non-visible bytes) are replaced instead of passed through; everything
    // else is sent exactly as the store reported it.
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&meta.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(meta.size_bytes));
}

/// Body stream that tracks how much of the object reached the client.
///
/// The copy ends once the announced `Content-Length` has been produced;
/// bytes beyond it are cut off. Store errors, size mismatches and early
/// drops (client gone) are logged as warnings inside the originating
/// request's span. The wrapped object stream is released when this value
/// is dropped.
struct BodyCopy {
    inner: ObjectStream,
    key: ObjectKey,
    expected: u64,
    sent: u64,
    finished: bool,
    span: Span,
}

impl BodyCopy {
    fn new(key: ObjectKey, expected: u64, inner: ObjectStream) -> Self {
        Self {
            inner,
            key,
            expected,
            sent: 0,
            finished: false,
            span: Span::current(),
        }
    }

    fn size_changed(&self, produced: u64) {
        let _enter = self.span.enter();
        warn!(
            key = %self.key,
            sent = produced,
            expected = self.expected,
            "object size changed while streaming"
        );
    }
}

impl Stream for BodyCopy {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(mut chunk))) => {
                let produced = this.sent + chunk.len() as u64;
                if produced >= this.expected {
                    this.finished = true;
                    if produced > this.expected {
                        this.size_changed(produced);
                        chunk.truncate((this.expected - this.sent) as usize);
                    }
                }
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finished = true;
                let _enter = this.span.enter();
                warn!(key = %this.key, sent = this.sent, error = %err, "cannot write response body");
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                if this.sent != this.expected {
                    this.size_changed(this.sent);
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for BodyCopy {
    fn drop(&mut self) {
        if !self.finished && self.sent < self.expected {
            let _enter = self.span.enter();
            warn!(
                key = %self.key,
                sent = self.sent,
                expected = self.expected,
                "response body copy interrupted"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{StreamExt, TryStreamExt, stream};

    fn chunks(parts: Vec<io::Result<Bytes>>) -> ObjectStream {
        stream::iter(parts).boxed()
    }

    #[tokio::test]
    async fn body_copy_passes_chunks_through() {
        let copy = BodyCopy::new(
            ObjectKey::resolve("/a"),
            6,
            chunks(vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))]),
        );
        let collected: Vec<Bytes> = copy.try_collect().await.unwrap();
        assert_eq!(collected.concat(), b"abcdef");
    }

    #[tokio::test]
    async fn body_copy_stops_after_error() {
        let mut copy = BodyCopy::new(
            ObjectKey::resolve("/a"),
            6,
            chunks(vec![
                Ok(Bytes::from_static(b"abc")),
                Err(io::Error::other("connection reset")),
                Ok(Bytes::from_static(b"def")),
            ]),
        );
        assert!(copy.next().await.unwrap().is_ok());
        assert!(copy.next().await.unwrap().is_err());
        assert!(copy.next().await.is_none());
        assert_eq!(copy.sent, 3);
    }

    #[tokio::test]
    async fn body_copy_finishes_at_announced_length() {
        let mut copy = BodyCopy::new(
            ObjectKey::resolve("/a"),
            3,
            chunks(vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))]),
        );
        assert_eq!(copy.next().await.unwrap().unwrap(), "abc");
        assert!(copy.finished);
        assert!(copy.next().await.is_none());
    }

    #[tokio::test]
    async fn body_copy_cuts_off_bytes_beyond_announced_length() {
        let copy = BodyCopy::new(
            ObjectKey::resolve("/a"),
            4,
            chunks(vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))]),
        );
        let collected: Vec<Bytes> = copy.try_collect().await.unwrap();
        assert_eq!(collected.concat(), b"abcd");
    }

    #[tokio::test]
    async fn body_copy_short_stream_ends_cleanly() {
        let copy = BodyCopy::new(
            ObjectKey::resolve("/a"),
            10,
            chunks(vec![Ok(Bytes::from_static(b"abc"))]),
        );
        let collected: Vec<Bytes> = copy.try_collect().await.unwrap();
        assert_eq!(collected.concat(), b"abc");
    }

    #[test]
    fn invalid_content_type_falls_back_to_default() {
        let meta = ObjectMetadata {
            content_type: "text/html\r\nx-evil: 1".into(),
            size_bytes: 0,
        };
        let response = object_response(&meta, Body::empty());
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "0");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = map_store_error(StoreError::NotFound(ObjectKey::resolve("/x")));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_failure_maps_to_500() {
        let err = map_store_error(StoreError::backend("quota exceeded"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("quota exceeded"));
    }
}

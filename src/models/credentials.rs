//! Basic-auth credentials and the per-request context built around them.

use axum::http::Method;
use std::fmt;
use uuid::Uuid;

/// The single username/password pair requests are checked against.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the pipeline needs to know about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Correlation id attached to every log line of the request.
    pub id: Uuid,

    /// `GET`, or `HEAD` for a headers-only lookup.
    pub method: Method,

    /// Request path including its leading `/`.
    pub path: String,

    /// Credentials from the `Authorization: Basic` header, if present and
    /// well formed.
    pub credentials: Option<Credentials>,
}

impl RequestContext {
    pub fn new(
        id: Uuid,
        method: Method,
        path: impl Into<String>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            id,
            method,
            path: path.into(),
            credentials,
        }
    }
}

//! HTTP Basic authentication against the single configured user.

use crate::models::credentials::Credentials;
use axum::http::{HeaderMap, header};
use base64::{Engine as _, engine::general_purpose};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    Missing,
    #[error("malformed Basic credentials")]
    Malformed,
}

/// Extract the username/password pair from an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<Credentials, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    let (scheme, encoded) = value.trim().split_once(' ').ok_or(AuthError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthError::Malformed);
    }

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;
    let (username, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;

    Ok(Credentials::new(username, password))
}

/// True only if both fields match the configured pair exactly.
///
/// Values are compared through their BLAKE3 digests; `blake3::Hash`
/// equality runs in constant time, so neither content nor length of the
/// configured secret is observable through response timing.
pub fn authorize(supplied: &Credentials, configured: &Credentials) -> bool {
    if supplied.username.is_empty() || supplied.password.is_empty() {
        return false;
    }
    let user_ok = blake3::hash(supplied.username.as_bytes())
        == blake3::hash(configured.username.as_bytes());
    let pass_ok = blake3::hash(supplied.password.as_bytes())
        == blake3::hash(configured.password.as_bytes());
    user_ok & pass_ok
}

//! HTTP handlers for object reads.
//! Both entry points build a [`RequestContext`] and hand it to the
//! [`Gateway`] pipeline inside a per-request tracing span.

use crate::{
    errors::AppError,
    models::credentials::RequestContext,
    services::{auth::basic_credentials, gateway::Gateway},
};
use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, Method, Uri},
    response::Response,
};
use tracing::{Instrument, debug, info_span};
use uuid::Uuid;

/// `GET /` — the bucket's root index document.
pub async fn get_root(
    State(gateway): State<Gateway>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    serve(gateway, method, &uri, Ok("/".to_string()), &headers).await
}

/// `GET /{*object}` — any object, nested keys included.
///
/// The captured path is only looked at after the credentials check, so an
/// undecodable path from an anonymous client still gets the 401 challenge.
pub async fn get_object(
    State(gateway): State<Gateway>,
    method: Method,
    uri: Uri,
    object: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let path = object.map(|Path(object)| format!("/{}", object));
    serve(gateway, method, &uri, path, &headers).await
}

async fn serve(
    gateway: Gateway,
    method: Method,
    uri: &Uri,
    path: Result<String, PathRejection>,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let id = Uuid::new_v4();
    let span = info_span!("request", id = %id, path = %uri.path());
    let credentials = basic_credentials(headers);

    async move {
        let supplied = match credentials {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                debug!("rejecting request: {}", err);
                None
            }
        };
        gateway.authenticate(supplied.as_ref())?;

        let path = path.map_err(|rejection| {
            debug!("undecodable path: {}", rejection.body_text());
            AppError::new(rejection.status(), rejection.body_text())
        })?;
        gateway
            .serve(RequestContext::new(id, method, path, supplied))
            .await
    }
    .instrument(span)
    .await
}

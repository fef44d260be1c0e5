//! Defines the single read-only route of the gateway.
//!
//! - `GET /`          — index document of the bucket root
//! - `GET /{*object}` — object at the captured path (nested keys like
//!   `docs/2025/report.pdf`; a trailing `/` selects that directory's index)
//!
//! `HEAD` is answered on both with headers only.

use crate::{
    handlers::object_handlers::{get_object, get_root},
    services::gateway::Gateway,
};
use axum::{Router, routing::get};

/// Build the router. Handlers share a [`Gateway`] as state.
pub fn routes() -> Router<Gateway> {
    Router::new()
        .route("/", get(get_root))
        .route("/{*object}", get(get_object))
}

//! HTTP gateway that serves the objects of one cloud storage bucket to
//! clients holding a single shared Basic-auth credential.

use axum::Router;
use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use config::AppConfig;
use services::{
    gateway::Gateway, gcs_store::GcsStore, local_store::LocalStore,
    storage_service::ObjectStore,
};

/// Construct the store selected by `cfg`.
pub fn build_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match &cfg.local_root {
        Some(root) => Arc::new(LocalStore::new(root, &cfg.bucket)),
        None => Arc::new(GcsStore::new(&cfg.bucket, cfg.cred.as_deref())?),
    };
    Ok(store)
}

/// Build the application router around an already constructed store.
pub fn build_app(cfg: &AppConfig, store: Arc<dyn ObjectStore>) -> Router {
    let gateway = Gateway::new(store, cfg.credentials());
    routes::routes::routes().with_state(gateway)
}

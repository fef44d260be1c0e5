pub mod auth;
pub mod gateway;
pub mod gcs_store;
pub mod local_store;
pub mod storage_service;

//! Core data models for the bucket gateway.
//!
//! These are plain values that live for at most one request, except
//! `Credentials`, which is loaded once at startup and shared read-only.

pub mod credentials;
pub mod object;

//! HTTP API route handlers.
//!
//! Thin axum handlers that deserialize requests, call into the core
//! handlers, and map [`courier_core::CoreError`] into the wire-level
//! [`courier_types::ApiError`].

pub mod auth;
pub mod devices;
pub mod orders;
pub mod webhooks;

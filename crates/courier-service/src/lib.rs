//! HTTP service for the courier backend.
//!
//! Wires the configured storage backend and payment provider into the
//! core handlers and exposes them over an axum router. The binary in
//! `main.rs` is a thin shell around [`factories::build_state`] and
//! [`server::start_server`].

pub mod apis;
pub mod factories;
pub mod server;

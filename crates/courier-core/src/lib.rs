//! Core business logic for the courier backend.
//!
//! This crate owns the order lifecycle state machine and the handlers
//! behind every API operation: rider registration and login, order
//! queries and status changes, QRPH payment initiation, proof-of-delivery
//! capture, device registration, and payment webhook reconciliation.
//! The HTTP surface in the service crate is a thin mapping onto these
//! handlers.

pub mod error;
pub mod handlers;
pub mod state;

pub use error::CoreError;
pub use handlers::{AuthHandler, DeviceHandler, OrderHandler, WebhookHandler};
pub use state::OrderLifecycle;

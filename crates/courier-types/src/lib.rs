//! Common types module for the courier backend.
//!
//! This module defines the core data types and structures used throughout
//! the backend. It provides a centralized location for shared types to
//! ensure consistency across all components.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Order and order-lifecycle types.
pub mod order;
/// Payment and payment-provider types.
pub mod payment;
/// Proof-of-delivery types.
pub mod proof;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Rider account and device types.
pub mod rider;
/// Secure string type for secrets.
pub mod secret_string;
/// Storage namespace keys.
pub mod storage;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use order::*;
pub use payment::*;
pub use proof::*;
pub use registry::*;
pub use rider::*;
pub use secret_string::*;
pub use storage::*;
pub use validation::*;

//! Order lifecycle state management.

pub mod order;

pub use order::OrderLifecycle;

//! Core error types and their HTTP mapping.

use courier_auth::AuthError;
use courier_payments::PaymentProviderError;
use courier_storage::StorageError;
use courier_types::{ApiError, OrderStatus};
use thiserror::Error;

/// Errors produced by the core handlers.
///
/// Each variant maps onto one HTTP status at the API boundary; the
/// service crate never inspects anything finer-grained than this.
#[derive(Debug, Error)]
pub enum CoreError {
	/// Missing or invalid input (400).
	#[error("{0}")]
	BadRequest(String),
	/// Invalid or missing credentials (401).
	#[error("{0}")]
	Unauthorized(String),
	/// Entity absent, or present but owned by another rider (404).
	#[error("{0}")]
	NotFound(String),
	/// Duplicate unique key or a lost optimistic write (409).
	#[error("{0}")]
	Conflict(String),
	/// Status change not permitted by the lifecycle table (400).
	#[error("Cannot change status from {from} to {to}")]
	InvalidTransition {
		from: OrderStatus,
		to: OrderStatus,
	},
	/// Payment provider call failed (500).
	#[error("Payment provider error: {0}")]
	Upstream(String),
	/// Storage backend failure (500).
	#[error("Storage error: {0}")]
	Storage(String),
	/// Hashing or token signing failure (500).
	#[error("Authentication error: {0}")]
	Auth(String),
}

impl From<StorageError> for CoreError {
	fn from(err: StorageError) -> Self {
		match err {
			StorageError::NotFound => CoreError::NotFound("Not found".to_string()),
			StorageError::AlreadyExists => CoreError::Conflict("Already exists".to_string()),
			other => CoreError::Storage(other.to_string()),
		}
	}
}

impl From<AuthError> for CoreError {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::TokenExpired => CoreError::Unauthorized("Token expired".to_string()),
			AuthError::InvalidToken => CoreError::Unauthorized("Invalid token".to_string()),
			other => CoreError::Auth(other.to_string()),
		}
	}
}

impl From<PaymentProviderError> for CoreError {
	fn from(err: PaymentProviderError) -> Self {
		match err {
			PaymentProviderError::InvalidRequest(msg) => CoreError::BadRequest(msg),
			other => CoreError::Upstream(other.to_string()),
		}
	}
}

impl From<CoreError> for ApiError {
	fn from(err: CoreError) -> Self {
		match err {
			CoreError::BadRequest(msg) => ApiError::bad_request(msg),
			CoreError::Unauthorized(msg) => ApiError::unauthorized(msg),
			CoreError::NotFound(msg) => ApiError::not_found(msg),
			CoreError::Conflict(msg) => ApiError::conflict(msg),
			CoreError::InvalidTransition { from, to } => ApiError::BadRequest {
				error_type: "invalid_transition".to_string(),
				message: format!("Cannot change status from {} to {}", from, to),
				details: Some(serde_json::json!({
					"from": from.to_string(),
					"to": to.to_string(),
				})),
			},
			CoreError::Upstream(msg) | CoreError::Storage(msg) | CoreError::Auth(msg) => {
				ApiError::internal(msg)
			},
		}
	}
}

//! Request handlers for the courier API operations.

pub mod auth;
pub mod devices;
pub mod orders;
pub mod webhooks;

pub use auth::AuthHandler;
pub use devices::DeviceHandler;
pub use orders::OrderHandler;
pub use webhooks::WebhookHandler;

use crate::error::CoreError;

/// Extracts a required, non-blank string field from a request.
///
/// `name` is the wire-level field name, so it appears verbatim in the
/// error message the client sees.
pub(crate) fn require_field(value: Option<String>, name: &str) -> Result<String, CoreError> {
	match value {
		Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
		_ => Err(CoreError::BadRequest(format!("{} is required", name))),
	}
}

//! API types for the courier backend HTTP API.
//!
//! Request and response shapes for the rider-facing endpoints and the
//! payment webhook, plus the structured error type every handler maps
//! into at the HTTP boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Order, Payment, ProofOfDelivery, RiderProfile};

/// Request body for POST /api/auth/register.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
	pub name: Option<String>,
	pub phone: Option<String>,
	pub password: Option<String>,
}

/// Request body for POST /api/auth/login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
	pub phone: Option<String>,
	pub password: Option<String>,
}

/// Response body for a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
	/// Signed bearer token for subsequent requests.
	pub token: String,
	/// The authenticated rider's public profile.
	pub rider: RiderProfile,
}

/// Request body for POST /api/rider/devices/register.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
	pub device_token: Option<String>,
	pub platform: Option<String>,
}

/// Response body for device registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDeviceResponse {
	pub success: bool,
}

/// Query parameters for GET /api/rider/orders.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOrdersQuery {
	/// Optional status filter, e.g. `?status=EN_ROUTE`.
	pub status: Option<String>,
}

/// Response body for GET /api/rider/orders/{id}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailResponse {
	pub order: Order,
	pub payment: Option<Payment>,
	#[serde(rename = "proofOfDelivery")]
	pub proof_of_delivery: Option<ProofOfDelivery>,
}

/// Request body for POST /api/rider/orders/{id}/verify.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBarcodeRequest {
	pub scanned_code: Option<String>,
}

/// Response body for barcode verification. A mismatch is a valid
/// outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyBarcodeResponse {
	pub verified: bool,
}

/// Request body for PATCH /api/rider/orders/{id}/status.
///
/// The status arrives as a raw string so that an unknown value is
/// reported by the transition validator rather than rejected during
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChangeRequest {
	pub status: Option<String>,
}

/// Request body for POST /api/rider/orders/{id}/payment-method.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodRequest {
	pub method: Option<String>,
}

/// Response body for POST /api/rider/orders/{id}/payment/qrph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrphPaymentResponse {
	pub payment_id: String,
	pub qrph_payload: QrphPayload,
}

/// The scannable payload handed to the rider app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrphPayload {
	pub qr_string: String,
	pub amount: Decimal,
	pub currency: String,
	pub reference: String,
}

/// Request body for POST /api/rider/orders/{id}/proof.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachProofRequest {
	pub photo_url: Option<String>,
	pub customer_name: Option<String>,
	pub signature_url: Option<String>,
}

/// Request body for POST /api/webhooks/payrex/payment.
///
/// Everything except the reference is optional: the provider contract is
/// loose and the handler maps any status other than exactly "PAID" to a
/// failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookRequest {
	pub reference: Option<String>,
	pub status: Option<String>,
	pub amount: Option<Decimal>,
	pub paid_at: Option<DateTime<Utc>>,
}

/// Acknowledgment body returned to the payment provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookAck {
	pub received: bool,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code.
	pub error: String,
	/// Human-readable description.
	pub message: String,
	/// Additional error context.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or invalid input (400).
	BadRequest {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// Missing, invalid, or expired credential (401).
	Unauthorized { error_type: String, message: String },
	/// Entity absent or not owned by the requester (404).
	NotFound { error_type: String, message: String },
	/// Duplicate unique key (409).
	Conflict { error_type: String, message: String },
	/// Collaborator failure or misconfiguration (500).
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	pub fn bad_request(message: impl Into<String>) -> Self {
		Self::BadRequest {
			error_type: "bad_request".to_string(),
			message: message.into(),
			details: None,
		}
	}

	pub fn unauthorized(message: impl Into<String>) -> Self {
		Self::Unauthorized {
			error_type: "unauthorized".to_string(),
			message: message.into(),
		}
	}

	pub fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound {
			error_type: "not_found".to_string(),
			message: message.into(),
		}
	}

	pub fn conflict(message: impl Into<String>) -> Self {
		Self::Conflict {
			error_type: "conflict".to_string(),
			message: message.into(),
		}
	}

	pub fn internal(message: impl Into<String>) -> Self {
		Self::InternalServerError {
			error_type: "internal_error".to_string(),
			message: message.into(),
		}
	}

	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest { .. } => 400,
			ApiError::Unauthorized { .. } => 401,
			ApiError::NotFound { .. } => 404,
			ApiError::Conflict { .. } => 409,
			ApiError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		match self {
			ApiError::BadRequest {
				error_type,
				message,
				details,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: details.clone(),
			},
			ApiError::Unauthorized {
				error_type,
				message,
			}
			| ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::Conflict {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => ErrorResponse {
				error: error_type.clone(),
				message: message.clone(),
				details: None,
			},
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			ApiError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
			ApiError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			ApiError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			ApiError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		assert_eq!(ApiError::bad_request("x").status_code(), 400);
		assert_eq!(ApiError::unauthorized("x").status_code(), 401);
		assert_eq!(ApiError::not_found("x").status_code(), 404);
		assert_eq!(ApiError::conflict("x").status_code(), 409);
		assert_eq!(ApiError::internal("x").status_code(), 500);
	}

	#[test]
	fn test_error_response_shape() {
		let err = ApiError::not_found("Order not found");
		let body = err.to_error_response();
		assert_eq!(body.error, "not_found");
		assert_eq!(body.message, "Order not found");
		assert!(body.details.is_none());
	}

	#[test]
	fn test_webhook_request_accepts_minimal_body() {
		let req: PaymentWebhookRequest =
			serde_json::from_str(r#"{"reference":"ORDER-1001"}"#).unwrap();
		assert_eq!(req.reference.as_deref(), Some("ORDER-1001"));
		assert!(req.status.is_none());
		assert!(req.amount.is_none());
		assert!(req.paid_at.is_none());
	}

	#[test]
	fn test_camel_case_requests() {
		let req: RegisterDeviceRequest =
			serde_json::from_str(r#"{"deviceToken":"tok-1","platform":"android"}"#).unwrap();
		assert_eq!(req.device_token.as_deref(), Some("tok-1"));

		let req: AttachProofRequest =
			serde_json::from_str(r#"{"photoUrl":"https://cdn/p.jpg"}"#).unwrap();
		assert_eq!(req.photo_url.as_deref(), Some("https://cdn/p.jpg"));
	}
}

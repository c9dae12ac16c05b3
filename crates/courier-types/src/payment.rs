//! Payment types for the courier backend.
//!
//! Defines the persisted payment record created when a QRPH intent is
//! generated, plus the provider-facing intent type returned by payment
//! provider implementations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::PaymentMethod;

/// A payment record tied to an order.
///
/// Only QRPH payments are persisted; cash handover never creates a row.
/// The `qrph_reference` is the correlation key the provider echoes back in
/// webhook notifications, and it is stable once generated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
	/// Unique identifier for this payment.
	pub id: String,
	/// The order this payment settles.
	pub order_id: String,
	/// Payment method. Always QRPH in the persisted flow.
	pub method: PaymentMethod,
	/// Current payment status. Moves forward only.
	pub status: PaymentStatus,
	/// External reference used as the webhook correlation key.
	pub qrph_reference: String,
	/// Scannable QR payload returned by the provider.
	pub qrph_qr_string: String,
	/// Amount the QR intent was created for.
	pub amount: Decimal,
	/// When the provider reported the payment settled, if it has.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub paid_at: Option<DateTime<Utc>>,
	/// Timestamp when this payment record was created.
	pub created_at: DateTime<Utc>,
}

impl Payment {
	/// Creates a new payment record in `QR_GENERATED` status.
	pub fn new_qrph(
		order_id: impl Into<String>,
		reference: impl Into<String>,
		qr_string: impl Into<String>,
		amount: Decimal,
	) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			order_id: order_id.into(),
			method: PaymentMethod::Qrph,
			status: PaymentStatus::QrGenerated,
			qrph_reference: reference.into(),
			qrph_qr_string: qr_string.into(),
			amount,
			paid_at: None,
			created_at: Utc::now(),
		}
	}
}

/// Status of a payment record.
///
/// Transitions only forward: `QR_GENERATED -> PAID` or
/// `QR_GENERATED -> FAILED`, never reversed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
	/// A QR intent exists but the provider has not confirmed anything yet.
	QrGenerated,
	/// Provider confirmed the payment.
	Paid,
	/// Provider reported the payment failed.
	Failed,
}

impl fmt::Display for PaymentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentStatus::QrGenerated => write!(f, "QR_GENERATED"),
			PaymentStatus::Paid => write!(f, "PAID"),
			PaymentStatus::Failed => write!(f, "FAILED"),
		}
	}
}

/// A QR payment intent created at the external provider.
///
/// Returned by payment provider implementations when a scannable payload
/// is requested for an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrphIntent {
	/// Provider-side identifier for the intent.
	pub provider_intent_id: String,
	/// The scannable QR payload.
	pub qr_string: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_payment_status_wire_format() {
		let json = serde_json::to_string(&PaymentStatus::QrGenerated).unwrap();
		assert_eq!(json, "\"QR_GENERATED\"");
	}

	#[test]
	fn test_new_qrph_payment() {
		let payment = Payment::new_qrph("order-1", "ORDER-1001", "0002010102...", Decimal::ONE);
		assert_eq!(payment.status, PaymentStatus::QrGenerated);
		assert_eq!(payment.method, PaymentMethod::Qrph);
		assert!(payment.paid_at.is_none());
	}
}

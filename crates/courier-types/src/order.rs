//! Order types for the courier backend.
//!
//! This module defines the delivery order aggregate and its lifecycle status
//! enum. The transition rules themselves live in the core crate; the types
//! here only carry the data and its wire representation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A delivery order assigned to a rider.
///
/// Orders are created upstream of this service (dispatch) and progress
/// through a fixed lifecycle while the rider works them. `Payment` and
/// `ProofOfDelivery` records are owned by an order but stored independently
/// and linked by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
	/// Unique identifier for this order.
	pub id: String,
	/// The rider this order is assigned to. Ownership checks compare
	/// against this field.
	pub rider_id: String,
	/// Human-readable order number, used to derive payment references.
	pub order_number: String,
	/// Barcode on the parcel, compared against scans at handover.
	pub barcode: String,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Payment method chosen by the customer at the door, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_method: Option<PaymentMethod>,
	/// Link to the payment record once a QRPH intent has been created.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_id: Option<String>,
	/// Cash-on-delivery amount to collect.
	pub cod_amount: Decimal,
	/// Timestamp when this order was created. Immutable.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
}

impl Order {
	/// Creates a new order in `PENDING` status assigned to the given rider.
	pub fn new(
		rider_id: impl Into<String>,
		order_number: impl Into<String>,
		barcode: impl Into<String>,
		cod_amount: Decimal,
	) -> Self {
		let now = Utc::now();
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			rider_id: rider_id.into(),
			order_number: order_number.into(),
			barcode: barcode.into(),
			status: OrderStatus::Pending,
			payment_method: None,
			payment_id: None,
			cod_amount,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Lifecycle status of a delivery order.
///
/// Serialized in SCREAMING_SNAKE_CASE to match the wire contract shared
/// with the rider app.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
	/// Assigned but not yet picked up for delivery.
	Pending,
	/// Rider is on the way to the customer.
	EnRoute,
	/// Rider has arrived at the drop-off location.
	Arrived,
	/// A payment intent exists and the order waits on confirmation.
	PaymentPending,
	/// Delivered and settled. Terminal.
	Completed,
	/// Cancelled upstream. Terminal.
	Cancelled,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OrderStatus::Pending => "PENDING",
			OrderStatus::EnRoute => "EN_ROUTE",
			OrderStatus::Arrived => "ARRIVED",
			OrderStatus::PaymentPending => "PAYMENT_PENDING",
			OrderStatus::Completed => "COMPLETED",
			OrderStatus::Cancelled => "CANCELLED",
		};
		write!(f, "{}", s)
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"PENDING" => Ok(Self::Pending),
			"EN_ROUTE" => Ok(Self::EnRoute),
			"ARRIVED" => Ok(Self::Arrived),
			"PAYMENT_PENDING" => Ok(Self::PaymentPending),
			"COMPLETED" => Ok(Self::Completed),
			"CANCELLED" => Ok(Self::Cancelled),
			_ => Err(()),
		}
	}
}

/// How the customer pays on delivery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
	/// Cash collected at the door; no payment record is created.
	Cash,
	/// QR-code payment through the external provider.
	Qrph,
}

impl fmt::Display for PaymentMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PaymentMethod::Cash => write!(f, "CASH"),
			PaymentMethod::Qrph => write!(f, "QRPH"),
		}
	}
}

impl FromStr for PaymentMethod {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"CASH" => Ok(Self::Cash),
			"QRPH" => Ok(Self::Qrph),
			_ => Err(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_order_status_wire_format() {
		let json = serde_json::to_string(&OrderStatus::PaymentPending).unwrap();
		assert_eq!(json, "\"PAYMENT_PENDING\"");

		let back: OrderStatus = serde_json::from_str("\"EN_ROUTE\"").unwrap();
		assert_eq!(back, OrderStatus::EnRoute);
	}

	#[test]
	fn test_order_status_from_str_rejects_unknown() {
		assert!("FLYING".parse::<OrderStatus>().is_err());
		assert_eq!("ARRIVED".parse::<OrderStatus>(), Ok(OrderStatus::Arrived));
	}

	#[test]
	fn test_payment_method_parse() {
		assert_eq!("CASH".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
		assert_eq!("QRPH".parse::<PaymentMethod>(), Ok(PaymentMethod::Qrph));
		assert!("GCASH".parse::<PaymentMethod>().is_err());
	}

	#[test]
	fn test_new_order_defaults() {
		let order = Order::new("rider-1", "1001", "BC-1001", Decimal::new(25000, 2));
		assert_eq!(order.status, OrderStatus::Pending);
		assert!(order.payment_method.is_none());
		assert!(order.payment_id.is_none());
		assert_eq!(order.created_at, order.updated_at);
	}
}

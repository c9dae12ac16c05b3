//! Proof-of-delivery types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Photographic or signature evidence attached to a delivered order.
///
/// Attachment is deliberately permissive: nothing prevents a second proof
/// for the same order, which supports amended proofs. The by-order index
/// always points at the most recent one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProofOfDelivery {
	/// Unique identifier for this proof.
	pub id: String,
	/// The order this proof belongs to.
	pub order_id: String,
	/// URL of the delivery photo. Required.
	pub photo_url: String,
	/// Name of the person who received the parcel, if captured.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub customer_name: Option<String>,
	/// URL of a captured signature image, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub signature_url: Option<String>,
	/// Timestamp when this proof was recorded.
	pub created_at: DateTime<Utc>,
}

impl ProofOfDelivery {
	/// Creates a new proof record for an order.
	pub fn new(
		order_id: impl Into<String>,
		photo_url: impl Into<String>,
		customer_name: Option<String>,
		signature_url: Option<String>,
	) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			order_id: order_id.into(),
			photo_url: photo_url.into(),
			customer_name,
			signature_url,
			created_at: Utc::now(),
		}
	}
}

//! Storage-related types for the courier backend.

use std::str::FromStr;

/// Storage namespaces for the different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants. The `*By*` variants are
/// secondary indexes maintained alongside the primary records, since the
/// store itself is an opaque key-value collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Rider records keyed by rider id.
	Riders,
	/// Index mapping a phone number to a rider id. Enforces phone
	/// uniqueness via put-if-absent.
	RidersByPhone,
	/// Order records keyed by order id.
	Orders,
	/// Index mapping a rider id to the ids of their orders.
	OrdersByRider,
	/// Payment records keyed by payment id.
	Payments,
	/// Index mapping a QRPH reference to a payment id.
	PaymentsByReference,
	/// Index mapping an order id to its payment id.
	PaymentsByOrder,
	/// Proof-of-delivery records keyed by proof id.
	Proofs,
	/// Index mapping an order id to its most recent proof id.
	ProofsByOrder,
	/// Rider device registrations keyed by rider id + device token.
	RiderDevices,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Riders => "riders",
			StorageKey::RidersByPhone => "riders_by_phone",
			StorageKey::Orders => "orders",
			StorageKey::OrdersByRider => "orders_by_rider",
			StorageKey::Payments => "payments",
			StorageKey::PaymentsByReference => "payments_by_reference",
			StorageKey::PaymentsByOrder => "payments_by_order",
			StorageKey::Proofs => "proofs",
			StorageKey::ProofsByOrder => "proofs_by_order",
			StorageKey::RiderDevices => "rider_devices",
		}
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"riders" => Ok(Self::Riders),
			"riders_by_phone" => Ok(Self::RidersByPhone),
			"orders" => Ok(Self::Orders),
			"orders_by_rider" => Ok(Self::OrdersByRider),
			"payments" => Ok(Self::Payments),
			"payments_by_reference" => Ok(Self::PaymentsByReference),
			"payments_by_order" => Ok(Self::PaymentsByOrder),
			"proofs" => Ok(Self::Proofs),
			"proofs_by_order" => Ok(Self::ProofsByOrder),
			"rider_devices" => Ok(Self::RiderDevices),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}

//! Rider account and device types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A courier user of the rider app.
///
/// Created at registration and read at login; never mutated afterwards.
/// This is the stored shape and carries the password hash, so it must
/// never be serialized into an API response directly. Use
/// [`RiderProfile`] for anything that leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rider {
	/// Unique identifier for this rider.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Phone number. Unique across riders and used as the login handle.
	pub phone: String,
	/// Salted bcrypt hash of the rider's password.
	pub password_hash: String,
	/// Timestamp when the rider registered.
	pub created_at: DateTime<Utc>,
}

impl Rider {
	/// Creates a new rider with an already-hashed password.
	pub fn new(
		name: impl Into<String>,
		phone: impl Into<String>,
		password_hash: impl Into<String>,
	) -> Self {
		Self {
			id: uuid::Uuid::new_v4().to_string(),
			name: name.into(),
			phone: phone.into(),
			password_hash: password_hash.into(),
			created_at: Utc::now(),
		}
	}

	/// The public profile of this rider.
	pub fn profile(&self) -> RiderProfile {
		RiderProfile {
			id: self.id.clone(),
			name: self.name.clone(),
			phone: self.phone.clone(),
		}
	}
}

/// Public rider identity returned by the API and embedded in tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiderProfile {
	pub id: String,
	pub name: String,
	pub phone: String,
}

/// A push-notification device registered by a rider.
///
/// Registration is an upsert keyed on (rider, device token), so repeated
/// registrations of the same device are harmless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiderDevice {
	/// The rider that owns the device.
	pub rider_id: String,
	/// Opaque push token from the platform.
	pub device_token: String,
	/// Platform hint ("ios", "android"), if the client sent one.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub platform: Option<String>,
	/// Timestamp of the most recent registration.
	pub registered_at: DateTime<Utc>,
}

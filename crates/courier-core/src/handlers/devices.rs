//! Push-notification device registration.

use crate::error::CoreError;
use crate::handlers::require_field;
use chrono::Utc;
use courier_storage::StorageService;
use courier_types::{RegisterDeviceRequest, RegisterDeviceResponse, RiderDevice, StorageKey};
use std::sync::Arc;

/// Handles rider device registration.
pub struct DeviceHandler {
	storage: Arc<StorageService>,
}

impl DeviceHandler {
	/// Creates a new device handler.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a device token for push notifications.
	///
	/// Keyed on (rider, token), so re-registering the same device just
	/// refreshes the record.
	pub async fn register_device(
		&self,
		rider_id: &str,
		request: RegisterDeviceRequest,
	) -> Result<RegisterDeviceResponse, CoreError> {
		let device_token = require_field(request.device_token, "deviceToken")?;

		let device = RiderDevice {
			rider_id: rider_id.to_string(),
			device_token: device_token.clone(),
			platform: request.platform,
			registered_at: Utc::now(),
		};
		let key = format!("{}_{}", rider_id, device_token);
		self.storage
			.store(StorageKey::RiderDevices, &key, &device)
			.await?;

		tracing::debug!(rider_id = %rider_id, "Registered device token");
		Ok(RegisterDeviceResponse { success: true })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use courier_storage::implementations::memory::MemoryStorage;

	fn handler() -> (Arc<StorageService>, DeviceHandler) {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		(storage.clone(), DeviceHandler::new(storage))
	}

	#[tokio::test]
	async fn test_register_is_an_upsert() {
		let (storage, handler) = handler();

		let response = handler
			.register_device(
				"rider-1",
				RegisterDeviceRequest {
					device_token: Some("tok-1".to_string()),
					platform: Some("android".to_string()),
				},
			)
			.await
			.unwrap();
		assert!(response.success);

		// Same device again, different platform hint.
		handler
			.register_device(
				"rider-1",
				RegisterDeviceRequest {
					device_token: Some("tok-1".to_string()),
					platform: Some("ios".to_string()),
				},
			)
			.await
			.unwrap();

		let device: RiderDevice = storage
			.retrieve(StorageKey::RiderDevices, "rider-1_tok-1")
			.await
			.unwrap();
		assert_eq!(device.platform.as_deref(), Some("ios"));
	}

	#[tokio::test]
	async fn test_register_requires_token() {
		let (_, handler) = handler();
		let err = handler
			.register_device(
				"rider-1",
				RegisterDeviceRequest {
					device_token: None,
					platform: None,
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));
	}
}

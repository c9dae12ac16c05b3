//! Rider registration and login.

use crate::error::CoreError;
use crate::handlers::require_field;
use courier_auth::{hash_password, verify_password, TokenService};
use courier_storage::{StorageError, StorageService};
use courier_types::{LoginRequest, LoginResponse, RegisterRequest, Rider, RiderProfile, StorageKey};
use std::sync::Arc;

/// Handles rider account creation and credential checks.
pub struct AuthHandler {
	storage: Arc<StorageService>,
	tokens: Arc<TokenService>,
}

impl AuthHandler {
	/// Creates a new auth handler.
	pub fn new(storage: Arc<StorageService>, tokens: Arc<TokenService>) -> Self {
		Self { storage, tokens }
	}

	/// Registers a new rider.
	///
	/// The phone index is claimed with put-if-absent before the rider
	/// record is written, so two concurrent registrations of the same
	/// phone cannot both succeed. Registration does not sign the rider
	/// in; the app follows up with a login call.
	pub async fn register(&self, request: RegisterRequest) -> Result<RiderProfile, CoreError> {
		let name = require_field(request.name, "name")?;
		let phone = require_field(request.phone, "phone")?;
		let password = match request.password {
			Some(p) if !p.is_empty() => p,
			_ => return Err(CoreError::BadRequest("password is required".to_string())),
		};

		let password_hash = hash_password(&password)?;
		let rider = Rider::new(name, phone.clone(), password_hash);

		match self
			.storage
			.create(StorageKey::RidersByPhone, &phone, &rider.id)
			.await
		{
			Ok(()) => {},
			Err(StorageError::AlreadyExists) => {
				return Err(CoreError::Conflict(
					"Phone number is already registered".to_string(),
				))
			},
			Err(e) => return Err(e.into()),
		}
		if let Err(e) = self
			.storage
			.store(StorageKey::Riders, &rider.id, &rider)
			.await
		{
			// Release the phone claim so the registration can be retried.
			if let Err(cleanup) = self.storage.remove(StorageKey::RidersByPhone, &phone).await {
				tracing::warn!(phone = %phone, error = %cleanup, "Failed to release phone claim");
			}
			return Err(e.into());
		}

		let profile = rider.profile();
		tracing::info!(rider_id = %profile.id, "Registered new rider");
		Ok(profile)
	}

	/// Authenticates a rider by phone and password.
	///
	/// Unknown phone and wrong password produce the same error, so the
	/// login endpoint cannot be used to enumerate accounts.
	pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, CoreError> {
		let phone = require_field(request.phone, "phone")?;
		let password = match request.password {
			Some(p) if !p.is_empty() => p,
			_ => return Err(CoreError::BadRequest("password is required".to_string())),
		};

		let rider_id: String = match self
			.storage
			.retrieve(StorageKey::RidersByPhone, &phone)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => {
				return Err(CoreError::Unauthorized(
					"Invalid phone or password".to_string(),
				))
			},
			Err(e) => return Err(e.into()),
		};
		// A phone claim without a rider behind it (an interrupted
		// registration) reads the same as an unknown phone.
		let rider: Rider = match self.storage.retrieve(StorageKey::Riders, &rider_id).await {
			Ok(rider) => rider,
			Err(StorageError::NotFound) => {
				return Err(CoreError::Unauthorized(
					"Invalid phone or password".to_string(),
				))
			},
			Err(e) => return Err(e.into()),
		};

		if !verify_password(&password, &rider.password_hash)? {
			return Err(CoreError::Unauthorized(
				"Invalid phone or password".to_string(),
			));
		}

		let profile = rider.profile();
		let token = self.tokens.issue(&profile)?;

		Ok(LoginResponse {
			token,
			rider: profile,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use courier_storage::implementations::memory::MemoryStorage;
	use courier_types::SecretString;

	fn handler() -> AuthHandler {
		AuthHandler::new(
			Arc::new(StorageService::new(Box::new(MemoryStorage::new()))),
			Arc::new(TokenService::new(SecretString::from("test-secret"), 12)),
		)
	}

	fn register_request() -> RegisterRequest {
		RegisterRequest {
			name: Some("Juan".to_string()),
			phone: Some("09171234567".to_string()),
			password: Some("hunter22".to_string()),
		}
	}

	#[tokio::test]
	async fn test_register_then_login() {
		let handler = handler();

		let registered = handler.register(register_request()).await.unwrap();
		assert_eq!(registered.phone, "09171234567");

		let logged_in = handler
			.login(LoginRequest {
				phone: Some("09171234567".to_string()),
				password: Some("hunter22".to_string()),
			})
			.await
			.unwrap();
		assert_eq!(logged_in.rider.id, registered.id);
		assert!(!logged_in.token.is_empty());
	}

	#[tokio::test]
	async fn test_duplicate_phone_rejected() {
		let handler = handler();
		handler.register(register_request()).await.unwrap();

		let mut second = register_request();
		second.name = Some("Pedro".to_string());
		let err = handler.register(second).await.unwrap_err();
		assert!(matches!(err, CoreError::Conflict(_)));
	}

	#[tokio::test]
	async fn test_register_requires_all_fields() {
		let handler = handler();

		let mut request = register_request();
		request.phone = None;
		assert!(matches!(
			handler.register(request).await.unwrap_err(),
			CoreError::BadRequest(_)
		));

		let mut request = register_request();
		request.password = Some(String::new());
		assert!(matches!(
			handler.register(request).await.unwrap_err(),
			CoreError::BadRequest(_)
		));
	}

	#[tokio::test]
	async fn test_dangling_phone_claim_reads_as_bad_credentials() {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let handler = AuthHandler::new(
			storage.clone(),
			Arc::new(TokenService::new(SecretString::from("test-secret"), 12)),
		);

		// A phone claim left behind by an interrupted registration.
		storage
			.store(StorageKey::RidersByPhone, "09171234567", &"gone".to_string())
			.await
			.unwrap();

		let err = handler
			.login(LoginRequest {
				phone: Some("09171234567".to_string()),
				password: Some("hunter22".to_string()),
			})
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::Unauthorized(_)));
	}

	#[tokio::test]
	async fn test_login_wrong_password_and_unknown_phone_look_alike() {
		let handler = handler();
		handler.register(register_request()).await.unwrap();

		let wrong_password = handler
			.login(LoginRequest {
				phone: Some("09171234567".to_string()),
				password: Some("wrong".to_string()),
			})
			.await
			.unwrap_err();
		let unknown_phone = handler
			.login(LoginRequest {
				phone: Some("09990000000".to_string()),
				password: Some("hunter22".to_string()),
			})
			.await
			.unwrap_err();

		assert_eq!(wrong_password.to_string(), unknown_phone.to_string());
		assert!(matches!(wrong_password, CoreError::Unauthorized(_)));
		assert!(matches!(unknown_phone, CoreError::Unauthorized(_)));
	}
}

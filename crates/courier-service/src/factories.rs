//! Wiring of configured implementations into running services.
//!
//! Storage backends and payment providers register themselves through
//! their crate's `get_all_implementations()`; this module looks up the
//! implementation named in configuration and hands its factory the
//! matching config block.

use crate::server::AppState;
use courier_auth::TokenService;
use courier_config::Config;
use courier_core::{AuthHandler, DeviceHandler, OrderHandler, OrderLifecycle, WebhookHandler};
use courier_payments::PaymentService;
use courier_storage::StorageService;
use std::collections::HashMap;
use std::sync::Arc;

/// Selects a factory by name, with an error that lists the alternatives.
macro_rules! select_factory {
	($implementations:expr, $primary:expr, $kind:literal) => {{
		let factories: HashMap<&'static str, _> = $implementations.into_iter().collect();
		match factories.get($primary.as_str()) {
			Some(factory) => *factory,
			None => {
				let mut available: Vec<_> = factories.keys().copied().collect();
				available.sort_unstable();
				return Err(format!(
					"Unknown {} implementation '{}'. Available: [{}]",
					$kind,
					$primary,
					available.join(", ")
				)
				.into());
			},
		}
	}};
}

/// Creates the storage service named by `storage.primary`.
pub fn create_storage(config: &Config) -> Result<StorageService, Box<dyn std::error::Error>> {
	let factory = select_factory!(
		courier_storage::get_all_implementations(),
		config.storage.primary,
		"storage"
	);
	// Validation guarantees the primary has a config block.
	let impl_config = config
		.storage
		.implementations
		.get(&config.storage.primary)
		.cloned()
		.unwrap_or(toml::Value::Table(toml::map::Map::new()));

	let backend = factory(&impl_config)?;
	backend.config_schema().validate(&impl_config)?;
	tracing::info!(implementation = %config.storage.primary, "Initialized storage backend");
	Ok(StorageService::new(backend))
}

/// Creates the payment provider named by `payments.primary`.
pub fn create_payment_provider(
	config: &Config,
) -> Result<PaymentService, Box<dyn std::error::Error>> {
	let factory = select_factory!(
		courier_payments::get_all_implementations(),
		config.payments.primary,
		"payment provider"
	);
	let impl_config = config
		.payments
		.implementations
		.get(&config.payments.primary)
		.cloned()
		.unwrap_or(toml::Value::Table(toml::map::Map::new()));

	let provider = factory(&impl_config)?;
	provider.config_schema().validate(&impl_config)?;
	tracing::info!(implementation = %config.payments.primary, "Initialized payment provider");
	Ok(PaymentService::new(provider))
}

/// Builds the shared application state from configuration.
pub fn build_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
	let storage = Arc::new(create_storage(config)?);
	let payments = Arc::new(create_payment_provider(config)?);
	let tokens = Arc::new(TokenService::new(
		config.auth.jwt_secret.clone(),
		config.auth.token_ttl_hours,
	));
	let lifecycle = Arc::new(OrderLifecycle::new(storage.clone()));

	Ok(AppState {
		auth: Arc::new(AuthHandler::new(storage.clone(), tokens.clone())),
		devices: Arc::new(DeviceHandler::new(storage.clone())),
		orders: Arc::new(OrderHandler::new(
			storage.clone(),
			lifecycle.clone(),
			payments,
			config.payments.currency.clone(),
		)),
		webhooks: Arc::new(WebhookHandler::new(storage, lifecycle)),
		tokens,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const CONFIG: &str = r#"
[storage]
primary = "memory"
[storage.implementations.memory]

[auth]
jwt_secret = "test-secret"

[payments]
primary = "mock"
[payments.implementations.mock]
"#;

	#[test]
	fn test_build_state_from_minimal_config() {
		let config: Config = CONFIG.parse().unwrap();
		assert!(build_state(&config).is_ok());
	}

	#[test]
	fn test_storage_config_is_schema_validated() {
		let config: Config = CONFIG
			.replace("primary = \"memory\"", "primary = \"file\"")
			.replace(
				"[storage.implementations.memory]",
				"[storage.implementations.file]\nstorage_path = 123",
			)
			.parse()
			.unwrap();
		let err = build_state(&config).unwrap_err().to_string();
		assert!(err.contains("storage_path"));
	}

	#[test]
	fn test_unknown_provider_lists_alternatives() {
		let config: Config = CONFIG
			.replace("primary = \"mock\"", "primary = \"stripe\"")
			.replace("[payments.implementations.mock]", "[payments.implementations.stripe]")
			.parse()
			.unwrap();
		let err = build_state(&config).unwrap_err().to_string();
		assert!(err.contains("stripe"));
		assert!(err.contains("mock"));
		assert!(err.contains("payrex"));
	}
}

//! Payment provider module for the courier backend.
//!
//! This module provides abstractions for the external payment provider
//! collaborator that turns an order's cash-on-delivery amount into a
//! scannable QRPH payload. Confirmation arrives asynchronously through
//! the webhook; this module only covers the outbound call.

use async_trait::async_trait;
use courier_types::{ConfigSchema, ImplementationRegistry, QrphIntent};
use rust_decimal::Decimal;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod mock;
	pub mod payrex;
}

/// Errors that can occur during payment provider operations.
#[derive(Debug, Error)]
pub enum PaymentProviderError {
	/// Error that occurs when the request to the provider is invalid.
	#[error("Invalid request: {0}")]
	InvalidRequest(String),
	/// Error that occurs when the provider call fails.
	#[error("Provider error: {0}")]
	Provider(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for payment provider implementations.
#[async_trait]
pub trait PaymentProviderInterface: Send + Sync {
	/// Returns the configuration schema for this provider implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Creates a QRPH payment intent at the provider.
	///
	/// The reference is attached as metadata so the provider echoes it
	/// back in webhook notifications.
	async fn create_qrph_intent(
		&self,
		amount: Decimal,
		currency: &str,
		reference: &str,
	) -> Result<QrphIntent, PaymentProviderError>;
}

/// Type alias for payment provider factory functions.
pub type PaymentProviderFactory =
	fn(&toml::Value) -> Result<Box<dyn PaymentProviderInterface>, PaymentProviderError>;

/// Registry trait for payment provider implementations.
pub trait PaymentProviderRegistry: ImplementationRegistry<Factory = PaymentProviderFactory> {}

/// Get all registered payment provider implementations.
pub fn get_all_implementations() -> Vec<(&'static str, PaymentProviderFactory)> {
	use implementations::{mock, payrex};

	vec![
		(payrex::Registry::NAME, payrex::Registry::factory()),
		(mock::Registry::NAME, mock::Registry::factory()),
	]
}

/// Service that manages payment provider operations.
///
/// Wraps the configured provider implementation behind a stable interface
/// for the core handlers.
pub struct PaymentService {
	/// The underlying provider implementation.
	implementation: Box<dyn PaymentProviderInterface>,
}

impl PaymentService {
	/// Creates a new PaymentService with the specified implementation.
	pub fn new(implementation: Box<dyn PaymentProviderInterface>) -> Self {
		Self { implementation }
	}

	/// Creates a QRPH payment intent for an order.
	pub async fn create_qrph_intent(
		&self,
		amount: Decimal,
		currency: &str,
		reference: &str,
	) -> Result<QrphIntent, PaymentProviderError> {
		self.implementation
			.create_qrph_intent(amount, currency, reference)
			.await
	}
}

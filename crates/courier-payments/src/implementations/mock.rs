//! Mock payment provider for local development and tests.
//!
//! Produces deterministic QR payloads without any network calls. The QR
//! string carries the reference and the amount in centavos so tests can
//! assert on the exact payload.

use crate::{PaymentProviderError, PaymentProviderInterface};
use async_trait::async_trait;
use courier_types::{ConfigSchema, ImplementationRegistry, QrphIntent, Schema, ValidationError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Mock provider implementation.
pub struct MockProvider;

#[async_trait]
impl PaymentProviderInterface for MockProvider {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MockProviderSchema)
	}

	async fn create_qrph_intent(
		&self,
		amount: Decimal,
		currency: &str,
		reference: &str,
	) -> Result<QrphIntent, PaymentProviderError> {
		if amount <= Decimal::ZERO {
			return Err(PaymentProviderError::InvalidRequest(
				"Amount must be positive".into(),
			));
		}

		let minor_units = (amount * Decimal::from(100))
			.round()
			.to_i64()
			.ok_or_else(|| {
				PaymentProviderError::InvalidRequest(format!("Amount out of range: {}", amount))
			})?;

		// EMV-style static payload prefix followed by the merchant fields.
		let qr_string = format!("000201010212-{}-{}-{}", reference, minor_units, currency);

		Ok(QrphIntent {
			provider_intent_id: format!("mock_pi_{}", uuid::Uuid::new_v4()),
			qr_string,
		})
	}
}

/// Configuration schema for the mock provider. No parameters.
pub struct MockProviderSchema;

impl ConfigSchema for MockProviderSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

/// Registry entry for the mock provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "mock";
	type Factory = crate::PaymentProviderFactory;

	fn factory() -> Self::Factory {
		create_provider
	}
}

impl crate::PaymentProviderRegistry for Registry {}

/// Factory function to create a mock provider. Takes no configuration.
pub fn create_provider(
	config: &toml::Value,
) -> Result<Box<dyn PaymentProviderInterface>, PaymentProviderError> {
	MockProviderSchema
		.validate(config)
		.map_err(|e| PaymentProviderError::Configuration(e.to_string()))?;

	Ok(Box::new(MockProvider))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_intent_payload_is_deterministic_for_inputs() {
		let provider = MockProvider;
		let intent = provider
			.create_qrph_intent(Decimal::new(25050, 2), "PHP", "ORDER-1001")
			.await
			.unwrap();

		assert!(intent.qr_string.starts_with("000201010212"));
		assert!(intent.qr_string.contains("ORDER-1001"));
		assert!(intent.qr_string.contains("25050"));
		assert!(intent.provider_intent_id.starts_with("mock_pi_"));
	}

	#[tokio::test]
	async fn test_rejects_non_positive_amount() {
		let provider = MockProvider;
		assert!(matches!(
			provider
				.create_qrph_intent(Decimal::ZERO, "PHP", "ORDER-1")
				.await,
			Err(PaymentProviderError::InvalidRequest(_))
		));
	}

	#[test]
	fn test_factory_accepts_empty_config() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(create_provider(&config).is_ok());
	}
}

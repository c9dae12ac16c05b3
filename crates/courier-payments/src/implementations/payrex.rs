//! PayRex payment provider implementation.
//!
//! Talks to the PayRex payment intents API over HTTPS. Amounts are sent
//! in centavos; the secret API key authenticates as HTTP basic auth
//! username, Stripe-style.

use crate::{PaymentProviderError, PaymentProviderInterface};
use async_trait::async_trait;
use courier_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, QrphIntent, Schema, SecretString,
	ValidationError,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.payrex.com";

/// PayRex provider implementation.
pub struct PayrexProvider {
	client: reqwest::Client,
	api_base: String,
	secret_key: SecretString,
}

impl PayrexProvider {
	/// Creates a new PayRex provider with the given credentials.
	pub fn new(secret_key: SecretString, api_base: String) -> Result<Self, PaymentProviderError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(30))
			.build()
			.map_err(|e| PaymentProviderError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			api_base,
			secret_key,
		})
	}

	/// Converts a decimal amount to centavos.
	fn to_minor_units(amount: Decimal) -> Result<i64, PaymentProviderError> {
		(amount * Decimal::from(100))
			.round()
			.to_i64()
			.ok_or_else(|| {
				PaymentProviderError::InvalidRequest(format!("Amount out of range: {}", amount))
			})
	}

	/// Pulls the QR payload out of a payment intent response.
	///
	/// The field name has moved between provider API revisions, so probe
	/// the known locations in order.
	fn extract_qr_string(intent: &serde_json::Value) -> Option<String> {
		intent
			.pointer("/qrph/qr_string")
			.or_else(|| intent.get("qrph_qr_string"))
			.or_else(|| intent.get("qr_string"))
			.and_then(|v| v.as_str())
			.map(|s| s.to_string())
	}
}

#[async_trait]
impl PaymentProviderInterface for PayrexProvider {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(PayrexProviderSchema)
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

		let minor_units = Self::to_minor_units(amount)?;
		let params = [
			("amount", minor_units.to_string()),
			("currency", currency.to_string()),
			("payment_methods[]", "qrph".to_string()),
			("metadata[reference]", reference.to_string()),
		];

		let response = self
			.client
			.post(format!("{}/payment_intents", self.api_base))
			.basic_auth(self.secret_key.expose_secret(), Option::<&str>::None)
			.form(&params)
			.send()
			.await
			.map_err(|e| PaymentProviderError::Provider(e.to_string()))?;

		let status = response.status();
		let body: serde_json::Value = response
			.json()
			.await
			.map_err(|e| PaymentProviderError::Provider(e.to_string()))?;

		if !status.is_success() {
			return Err(PaymentProviderError::Provider(format!(
				"Payment intent creation failed with status {}: {}",
				status, body
			)));
		}

		let intent_id = body
			.get("id")
			.and_then(|v| v.as_str())
			.ok_or_else(|| {
				PaymentProviderError::Provider("Payment intent response missing id".into())
			})?
			.to_string();

		let qr_string = Self::extract_qr_string(&body).ok_or_else(|| {
			PaymentProviderError::Provider("Payment intent response missing QR payload".into())
		})?;

		tracing::debug!(intent_id = %intent_id, reference = %reference, "Created QRPH intent");

		Ok(QrphIntent {
			provider_intent_id: intent_id,
			qr_string,
		})
	}
}

/// Configuration schema for the PayRex provider.
pub struct PayrexProviderSchema;

impl ConfigSchema for PayrexProviderSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("api_key", FieldType::String).with_validator(|v| {
					match v.as_str() {
						Some(s) if !s.is_empty() => Ok(()),
						_ => Err("api_key must not be empty".to_string()),
					}
				}),
			],
			vec![Field::new("api_base", FieldType::String)],
		);
		schema.validate(config)
	}
}

/// Registry entry for the PayRex provider.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "payrex";
	type Factory = crate::PaymentProviderFactory;

	fn factory() -> Self::Factory {
		create_provider
	}
}

impl crate::PaymentProviderRegistry for Registry {}

/// Factory function to create a PayRex provider from configuration.
///
/// Configuration parameters:
/// - `api_key`: PayRex secret API key (usually `"${PAYREX_SECRET_API_KEY}"`)
/// - `api_base`: API base URL (default: "https://api.payrex.com")
pub fn create_provider(
	config: &toml::Value,
) -> Result<Box<dyn PaymentProviderInterface>, PaymentProviderError> {
	PayrexProviderSchema
		.validate(config)
		.map_err(|e| PaymentProviderError::Configuration(e.to_string()))?;

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.unwrap_or_default();
	let api_base = config
		.get("api_base")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_API_BASE)
		.to_string();

	Ok(Box::new(PayrexProvider::new(
		SecretString::from(api_key),
		api_base,
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_minor_units_rounding() {
		assert_eq!(
			PayrexProvider::to_minor_units(Decimal::new(25050, 2)).unwrap(),
			25050
		);
		assert_eq!(
			PayrexProvider::to_minor_units(Decimal::new(1995, 1)).unwrap(),
			19950
		);
	}

	#[test]
	fn test_extract_qr_string_variants() {
		let nested: serde_json::Value =
			serde_json::json!({"id": "pi_1", "qrph": {"qr_string": "0002..."}});
		assert_eq!(
			PayrexProvider::extract_qr_string(&nested).as_deref(),
			Some("0002...")
		);

		let flat: serde_json::Value =
			serde_json::json!({"id": "pi_1", "qrph_qr_string": "0003..."});
		assert_eq!(
			PayrexProvider::extract_qr_string(&flat).as_deref(),
			Some("0003...")
		);

		let missing: serde_json::Value = serde_json::json!({"id": "pi_1"});
		assert!(PayrexProvider::extract_qr_string(&missing).is_none());
	}

	#[test]
	fn test_factory_requires_api_key() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(matches!(
			create_provider(&config),
			Err(PaymentProviderError::Configuration(_))
		));

		let config: toml::Value = toml::from_str("api_key = \"sk_test_123\"").unwrap();
		assert!(create_provider(&config).is_ok());
	}
}

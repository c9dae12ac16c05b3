//! Configuration module for the courier backend.
//!
//! Provides structures and utilities for loading configuration from TOML
//! files, with `${ENV_VAR}` / `${ENV_VAR:-default}` interpolation so
//! secrets stay out of the files themselves. Configuration is built once
//! at process start and handed by reference to every component; business
//! logic never reads the environment directly.

use courier_types::SecretString;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the courier backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	/// HTTP server binding.
	#[serde(default)]
	pub server: ServerConfig,
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Authentication settings: token signing secret and expiry.
	pub auth: AuthConfig,
	/// Payment provider settings.
	pub payments: PaymentsConfig,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

fn default_host() -> String {
	"127.0.0.1".to_string()
}

/// The rider app's historical default port.
fn default_port() -> u16 {
	4000
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
	/// HS256 signing secret for bearer tokens. Usually provided as
	/// `"${JWT_SECRET}"` in the file. Must be non-empty; a missing
	/// secret is a fatal misconfiguration at startup, never silently
	/// bypassed.
	pub jwt_secret: SecretString,
	/// Token lifetime in hours.
	#[serde(default = "default_token_ttl_hours")]
	pub token_ttl_hours: u64,
}

fn default_token_ttl_hours() -> u64 {
	12
}

/// Payment provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
	/// Which provider implementation to use as primary.
	pub primary: String,
	/// Currency QR intents are created in.
	#[serde(default = "default_currency")]
	pub currency: String,
	/// Map of provider implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

fn default_currency() -> String {
	"PHP".to_string()
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable
/// VAR_NAME. Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment variables
	/// and validating before returning.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are
	/// properly set.
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate server config
		if self.server.host.is_empty() {
			return Err(ConfigError::Validation(
				"Server host cannot be empty".into(),
			));
		}

		// Validate storage config
		if self.storage.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one storage implementation must be configured".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary storage '{}' not found in implementations",
				self.storage.primary
			)));
		}

		// Validate auth config. The signing secret is load-bearing for
		// every protected route; refuse to start without it.
		if self.auth.jwt_secret.is_empty() {
			return Err(ConfigError::Validation(
				"auth.jwt_secret must be set (configure JWT_SECRET)".into(),
			));
		}
		if self.auth.token_ttl_hours == 0 {
			return Err(ConfigError::Validation(
				"auth.token_ttl_hours must be greater than 0".into(),
			));
		}

		// Validate payments config
		if self.payments.currency.is_empty() {
			return Err(ConfigError::Validation(
				"payments.currency cannot be empty".into(),
			));
		}
		if !self
			.payments
			.implementations
			.contains_key(&self.payments.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary payment provider '{}' not found in implementations",
				self.payments.primary
			)));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string, resolving environment
/// variables and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

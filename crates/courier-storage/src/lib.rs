//! Storage module for the courier backend.
//!
//! This module provides abstractions for the persistence collaborator.
//! The store is a namespaced key-value interface with two conditional
//! primitives on top of the basic operations: put-if-absent (unique-key
//! enforcement, e.g. one rider per phone number) and compare-and-swap
//! (the optimistic guard for order status transitions).

use async_trait::async_trait;
use courier_types::{ConfigSchema, ImplementationRegistry, StorageKey};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a put-if-absent hits an existing key.
	#[error("Key already exists")]
	AlreadyExists,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// Backends provide byte-level key-value operations. The conditional
/// operations must be atomic with respect to other calls on the same
/// backend instance; this is what makes the optimistic concurrency in the
/// core sound.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, creating or overwriting.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Stores raw bytes only if the key does not exist yet.
	///
	/// Returns `Ok(true)` if the value was written, `Ok(false)` if the
	/// key already existed.
	async fn put_bytes_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StorageError>;

	/// Replaces the value only if the current bytes equal `expected`.
	///
	/// Returns `Ok(true)` on success, `Ok(false)` if the stored value no
	/// longer matches, and `Err(NotFound)` if the key is absent.
	async fn swap_bytes(
		&self,
		key: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<bool, StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations must
/// provide to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Registry trait for storage implementations.
pub trait StorageRegistry: ImplementationRegistry<Factory = StorageFactory> {}

/// Get all registered storage implementations.
///
/// Returns a vector of (name, factory) tuples for all available storage
/// implementations.
pub fn get_all_implementations() -> Vec<(&'static str, StorageFactory)> {
	use implementations::{file, memory};

	vec![
		(file::Registry::NAME, file::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level storage service that provides typed operations.
///
/// Wraps a low-level backend with JSON serialization and the namespaced
/// key scheme (`<namespace>:<id>`).
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn key(namespace: StorageKey, id: &str) -> String {
		format!("{}:{}", namespace.as_str(), id)
	}

	/// Stores a serializable value, creating or overwriting.
	pub async fn store<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&Self::key(namespace, id), bytes).await
	}

	/// Stores a serializable value only if the key is absent.
	///
	/// Returns `AlreadyExists` if a value is already stored under the
	/// key. This backs unique-key constraints like rider phone numbers.
	pub async fn create<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		let written = self
			.backend
			.put_bytes_if_absent(&Self::key(namespace, id), bytes)
			.await?;
		if written {
			Ok(())
		} else {
			Err(StorageError::AlreadyExists)
		}
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: StorageKey,
		id: &str,
	) -> Result<T, StorageError> {
		let bytes = self.backend.get_bytes(&Self::key(namespace, id)).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Updates an existing value in storage.
	///
	/// Returns `NotFound` if the key doesn't exist, making it semantically
	/// different from `store()` which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = Self::key(namespace, id);
		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}
		let bytes =
			serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend.set_bytes(&key, bytes).await
	}

	/// Conditionally replaces a stored value.
	///
	/// The write succeeds only if the stored value still serializes
	/// identically to `expected` (the snapshot read by the caller).
	/// Returns `Ok(false)` when another writer got there first.
	pub async fn swap<T: Serialize>(
		&self,
		namespace: StorageKey,
		id: &str,
		expected: &T,
		next: &T,
	) -> Result<bool, StorageError> {
		let expected_bytes =
			serde_json::to_vec(expected).map_err(|e| StorageError::Serialization(e.to_string()))?;
		let next_bytes =
			serde_json::to_vec(next).map_err(|e| StorageError::Serialization(e.to_string()))?;
		self.backend
			.swap_bytes(&Self::key(namespace, id), &expected_bytes, next_bytes)
			.await
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: StorageKey, id: &str) -> Result<(), StorageError> {
		self.backend.delete(&Self::key(namespace, id)).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: StorageKey, id: &str) -> Result<bool, StorageError> {
		self.backend.exists(&Self::key(namespace, id)).await
	}
}

//! Registry trait for self-registering implementations.
//!
//! Pluggable collaborators (storage backends, payment providers) register
//! themselves with their configuration name and a factory function so the
//! service can wire up whichever implementation the config selects.

/// Base trait for implementation registries.
///
/// Each implementation module must provide a Registry struct implementing
/// this trait, declaring its configuration name and factory.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this
	/// implementation, for example:
	/// - "memory" for storage.implementations.memory
	/// - "payrex" for payments.implementations.payrex
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}

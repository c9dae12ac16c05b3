//! Authentication module for the courier backend.
//!
//! Provides credential hashing (salted bcrypt) and bearer-token issuing
//! and verification (HS256 JWTs). The signing secret is injected from
//! configuration at construction time; nothing here reads the process
//! environment.

use chrono::Utc;
use courier_types::{RiderProfile, SecretString};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
	/// Error that occurs when hashing or verifying a password fails.
	#[error("Credential hashing failed: {0}")]
	Hashing(String),
	/// Error that occurs when a token has expired.
	#[error("Token expired")]
	TokenExpired,
	/// Error that occurs when a token is malformed or its signature is
	/// invalid.
	#[error("Invalid token")]
	InvalidToken,
	/// Error that occurs when signing a token fails.
	#[error("Token signing failed: {0}")]
	Signing(String),
}

/// Claims carried inside a rider bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
	/// Subject, the rider id.
	pub sub: String,
	/// Rider id, duplicated for clients that read it by name.
	pub rider_id: String,
	/// Rider display name.
	pub name: String,
	/// Rider phone number.
	pub phone: String,
	/// Issued-at, Unix seconds.
	pub iat: u64,
	/// Expiry, Unix seconds.
	pub exp: u64,
}

/// Hashes a password with a per-call random salt.
///
/// Two riders with the same password get different hashes.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verifies a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
	bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Issues and verifies rider bearer tokens.
pub struct TokenService {
	secret: SecretString,
	ttl_seconds: u64,
}

impl TokenService {
	/// Creates a new TokenService with the given signing secret and
	/// token lifetime in hours.
	pub fn new(secret: SecretString, ttl_hours: u64) -> Self {
		Self {
			secret,
			ttl_seconds: ttl_hours * 3600,
		}
	}

	/// Issues a signed token for a rider.
	pub fn issue(&self, rider: &RiderProfile) -> Result<String, AuthError> {
		let now = Utc::now().timestamp() as u64;
		let claims = Claims {
			sub: rider.id.clone(),
			rider_id: rider.id.clone(),
			name: rider.name.clone(),
			phone: rider.phone.clone(),
			iat: now,
			exp: now + self.ttl_seconds,
		};

		encode(
			&Header::default(),
			&claims,
			&EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
		)
		.map_err(|e| AuthError::Signing(e.to_string()))
	}

	/// Verifies a token and returns its claims.
	///
	/// Expired tokens and tokens signed with a different secret are both
	/// rejected; every bearer-protected route goes through this.
	pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
		decode::<Claims>(
			token,
			&DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
			&Validation::default(),
		)
		.map(|data| data.claims)
		.map_err(|e| match e.kind() {
			jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
			_ => {
				tracing::debug!("Token verification failed: {}", e);
				AuthError::InvalidToken
			},
		})
	}
}

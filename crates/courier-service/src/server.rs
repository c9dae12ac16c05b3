//! HTTP server for the courier API.
//!
//! Builds the axum router over the shared application state and hosts
//! the bearer-token extractor every rider route depends on.

use axum::{
	extract::FromRequestParts,
	http::{header, request::Parts},
	response::Json,
	routing::{get, patch, post},
	Router,
};
use courier_auth::{Claims, TokenService};
use courier_config::ServerConfig;
use courier_core::{AuthHandler, DeviceHandler, OrderHandler, WebhookHandler};
use courier_types::ApiError;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Registration and login.
	pub auth: Arc<AuthHandler>,
	/// Device token registration.
	pub devices: Arc<DeviceHandler>,
	/// Order queries, transitions, payments, proofs.
	pub orders: Arc<OrderHandler>,
	/// Payment provider notifications.
	pub webhooks: Arc<WebhookHandler>,
	/// Bearer token verification.
	pub tokens: Arc<TokenService>,
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState").finish_non_exhaustive()
	}
}

/// The authenticated rider behind a bearer token.
///
/// Extracting this from a request verifies the token; routes that take
/// it cannot be reached unauthenticated.
pub struct AuthenticatedRider(pub Claims);

impl FromRequestParts<AppState> for AuthenticatedRider {
	type Rejection = ApiError;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let header_value = parts
			.headers
			.get(header::AUTHORIZATION)
			.and_then(|v| v.to_str().ok())
			.ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;
		let token = header_value
			.strip_prefix("Bearer ")
			.ok_or_else(|| ApiError::unauthorized("Malformed Authorization header"))?;

		let claims = state
			.tokens
			.verify(token)
			.map_err(|e| ApiError::unauthorized(e.to_string()))?;
		Ok(AuthenticatedRider(claims))
	}
}

/// Builds the API router.
pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.nest(
			"/api",
			Router::new()
				.route("/auth/register", post(crate::apis::auth::register))
				.route("/auth/login", post(crate::apis::auth::login))
				.route(
					"/rider/devices/register",
					post(crate::apis::devices::register_device),
				)
				.route("/rider/orders", get(crate::apis::orders::list_orders))
				.route("/rider/orders/{id}", get(crate::apis::orders::order_detail))
				.route(
					"/rider/orders/{id}/verify",
					post(crate::apis::orders::verify_barcode),
				)
				.route(
					"/rider/orders/{id}/status",
					patch(crate::apis::orders::change_status),
				)
				.route(
					"/rider/orders/{id}/payment-method",
					post(crate::apis::orders::set_payment_method),
				)
				.route(
					"/rider/orders/{id}/payment/qrph",
					post(crate::apis::orders::initiate_qrph_payment),
				)
				.route(
					"/rider/orders/{id}/proof",
					post(crate::apis::orders::attach_proof),
				)
				.route(
					"/webhooks/payrex/payment",
					post(crate::apis::webhooks::payment_notification),
				),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive()),
		)
		.with_state(state)
}

/// Starts the HTTP server and serves until interrupted.
pub async fn start_server(
	server_config: &ServerConfig,
	state: AppState,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = build_router(state);

	let bind_address = format!("{}:{}", server_config.host, server_config.port);
	let listener = TcpListener::bind(&bind_address).await?;
	tracing::info!("Courier API server listening on {}", bind_address);

	axum::serve(listener, app).await?;
	Ok(())
}

/// Handles GET /health.
async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

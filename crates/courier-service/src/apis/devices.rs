//! Device registration endpoint.

use crate::server::{AppState, AuthenticatedRider};
use axum::{extract::State, response::Json};
use courier_types::{ApiError, RegisterDeviceRequest, RegisterDeviceResponse};

/// Handles POST /api/rider/devices/register.
pub async fn register_device(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Json(request): Json<RegisterDeviceRequest>,
) -> Result<Json<RegisterDeviceResponse>, ApiError> {
	let response = state.devices.register_device(&claims.rider_id, request).await?;
	Ok(Json(response))
}

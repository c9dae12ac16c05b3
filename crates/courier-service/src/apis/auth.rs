//! Authentication endpoints.

use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use courier_types::{ApiError, LoginRequest, LoginResponse, RegisterRequest, RiderProfile};

/// Handles POST /api/auth/register.
pub async fn register(
	State(state): State<AppState>,
	Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RiderProfile>), ApiError> {
	let rider = state.auth.register(request).await?;
	Ok((StatusCode::CREATED, Json(rider)))
}

/// Handles POST /api/auth/login.
pub async fn login(
	State(state): State<AppState>,
	Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
	let response = state.auth.login(request).await?;
	Ok(Json(response))
}

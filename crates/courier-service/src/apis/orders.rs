//! Order endpoints.

use crate::server::{AppState, AuthenticatedRider};
use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
};
use courier_types::{
	ApiError, AttachProofRequest, ListOrdersQuery, Order, OrderDetailResponse,
	PaymentMethodRequest, ProofOfDelivery, QrphPaymentResponse, StatusChangeRequest,
	VerifyBarcodeRequest, VerifyBarcodeResponse,
};

/// Handles GET /api/rider/orders.
pub async fn list_orders(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
	let orders = state.orders.list_orders(&claims.rider_id, query).await?;
	Ok(Json(orders))
}

/// Handles GET /api/rider/orders/{id}.
pub async fn order_detail(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
	let detail = state.orders.order_detail(&claims.rider_id, &id).await?;
	Ok(Json(detail))
}

/// Handles POST /api/rider/orders/{id}/verify.
pub async fn verify_barcode(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
	Json(request): Json<VerifyBarcodeRequest>,
) -> Result<Json<VerifyBarcodeResponse>, ApiError> {
	let response = state
		.orders
		.verify_barcode(&claims.rider_id, &id, request)
		.await?;
	Ok(Json(response))
}

/// Handles PATCH /api/rider/orders/{id}/status.
pub async fn change_status(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
	Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Order>, ApiError> {
	let order = state
		.orders
		.change_status(&claims.rider_id, &id, request)
		.await?;
	Ok(Json(order))
}

/// Handles POST /api/rider/orders/{id}/payment-method.
pub async fn set_payment_method(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
	Json(request): Json<PaymentMethodRequest>,
) -> Result<Json<Order>, ApiError> {
	let order = state
		.orders
		.set_payment_method(&claims.rider_id, &id, request)
		.await?;
	Ok(Json(order))
}

/// Handles POST /api/rider/orders/{id}/payment/qrph.
pub async fn initiate_qrph_payment(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
) -> Result<Json<QrphPaymentResponse>, ApiError> {
	let response = state
		.orders
		.initiate_qrph_payment(&claims.rider_id, &id)
		.await?;
	Ok(Json(response))
}

/// Handles POST /api/rider/orders/{id}/proof.
pub async fn attach_proof(
	State(state): State<AppState>,
	AuthenticatedRider(claims): AuthenticatedRider,
	Path(id): Path<String>,
	Json(request): Json<AttachProofRequest>,
) -> Result<(StatusCode, Json<ProofOfDelivery>), ApiError> {
	let proof = state
		.orders
		.attach_proof(&claims.rider_id, &id, request)
		.await?;
	Ok((StatusCode::CREATED, Json(proof)))
}

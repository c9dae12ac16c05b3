//! Payment provider webhook endpoint.
//!
//! Unauthenticated by the provider's observed contract; a signature
//! check would slot in here before the handler call.

use crate::server::AppState;
use axum::{extract::State, response::Json};
use courier_types::{ApiError, PaymentWebhookAck, PaymentWebhookRequest};

/// Handles POST /api/webhooks/payrex/payment.
pub async fn payment_notification(
	State(state): State<AppState>,
	Json(request): Json<PaymentWebhookRequest>,
) -> Result<Json<PaymentWebhookAck>, ApiError> {
	let ack = state.webhooks.handle_payment_notification(request).await?;
	Ok(Json(ack))
}

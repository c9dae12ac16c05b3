//! Payment provider webhook reconciliation.

use crate::error::CoreError;
use crate::state::order::MAX_SWAP_ATTEMPTS;
use crate::state::OrderLifecycle;
use chrono::Utc;
use courier_storage::{StorageError, StorageService};
use courier_types::{
	Payment, PaymentStatus, PaymentWebhookAck, PaymentWebhookRequest, StorageKey,
};
use std::sync::Arc;

/// Handles asynchronous payment notifications from the provider.
pub struct WebhookHandler {
	storage: Arc<StorageService>,
	lifecycle: Arc<OrderLifecycle>,
}

impl WebhookHandler {
	/// Creates a new webhook handler.
	pub fn new(storage: Arc<StorageService>, lifecycle: Arc<OrderLifecycle>) -> Self {
		Self { storage, lifecycle }
	}

	/// Processes a payment notification.
	///
	/// The provider retries on anything but a 2xx, so once the body
	/// parses and carries a reference, the notification is acknowledged
	/// no matter what happens downstream; failures are logged and left
	/// for the next redelivery. Only a missing reference is the
	/// provider's mistake and gets a 400.
	pub async fn handle_payment_notification(
		&self,
		request: PaymentWebhookRequest,
	) -> Result<PaymentWebhookAck, CoreError> {
		let reference = match &request.reference {
			Some(r) if !r.trim().is_empty() => r.trim().to_string(),
			_ => return Err(CoreError::BadRequest("reference is required".to_string())),
		};

		if let Err(e) = self.apply_notification(&reference, &request).await {
			tracing::warn!(reference = %reference, error = %e, "Failed to apply payment notification");
		}
		Ok(PaymentWebhookAck { received: true })
	}

	/// Resolves the reference and settles the payment.
	///
	/// Exactly "PAID" confirms; any other status fails the payment. A
	/// payment that already left `QR_GENERATED` is never touched again,
	/// which makes redeliveries idempotent and keeps the status moving
	/// forward only. The order completion step is still re-run on a
	/// redelivered confirmation, so an order left behind by an earlier
	/// partial failure converges on the next delivery.
	async fn apply_notification(
		&self,
		reference: &str,
		request: &PaymentWebhookRequest,
	) -> Result<(), CoreError> {
		let payment_id: String = match self
			.storage
			.retrieve(StorageKey::PaymentsByReference, reference)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => {
				tracing::warn!(reference = %reference, "Payment notification for unknown reference");
				return Ok(());
			},
			Err(e) => return Err(e.into()),
		};

		let settled = request.status.as_deref() == Some("PAID");

		for _ in 0..MAX_SWAP_ATTEMPTS {
			let current: Payment = self
				.storage
				.retrieve(StorageKey::Payments, &payment_id)
				.await?;
			if current.status != PaymentStatus::QrGenerated {
				// The payment may have settled while the order completion
				// failed; completing is idempotent, so redo it here.
				if settled && current.status == PaymentStatus::Paid {
					self.lifecycle.complete_for_payment(&current.order_id).await?;
				}
				tracing::debug!(payment_id = %payment_id, "Payment already settled, ignoring notification");
				return Ok(());
			}

			let mut next = current.clone();
			next.status = if settled {
				PaymentStatus::Paid
			} else {
				PaymentStatus::Failed
			};
			next.paid_at = Some(request.paid_at.unwrap_or_else(Utc::now));
			if let Some(amount) = request.amount {
				next.amount = amount;
			}

			if self
				.storage
				.swap(StorageKey::Payments, &payment_id, &current, &next)
				.await?
			{
				tracing::info!(
					payment_id = %payment_id,
					status = %next.status,
					"Payment settled from provider notification"
				);
				if settled {
					self.lifecycle.complete_for_payment(&next.order_id).await?;
				}
				return Ok(());
			}
		}
		Err(CoreError::Conflict(
			"Payment was modified concurrently".to_string(),
		))
	}
}

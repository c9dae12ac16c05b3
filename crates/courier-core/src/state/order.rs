//! Order lifecycle state machine.
//!
//! Rider-driven status changes are validated against a fixed transition
//! table and written with compare-and-swap so that two concurrent writes
//! to the same order cannot silently overwrite each other. Payment-driven
//! changes (marking an order payment-pending when a QR intent is created,
//! completing it when the provider confirms) are separate named operations
//! and do not consult the table.

use crate::error::CoreError;
use chrono::Utc;
use courier_storage::{StorageError, StorageService};
use courier_types::{Order, OrderStatus, PaymentMethod, StorageKey};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// How many times a conditional write is retried against a fresh
/// snapshot before giving up with a conflict.
pub(crate) const MAX_SWAP_ATTEMPTS: usize = 3;

/// Status transitions a rider may request.
///
/// Every delivery passes through `PAYMENT_PENDING` before completion,
/// cash handover included. Terminal statuses allow nothing.
static ALLOWED_TRANSITIONS: Lazy<HashMap<OrderStatus, Vec<OrderStatus>>> = Lazy::new(|| {
	HashMap::from([
		(OrderStatus::Pending, vec![OrderStatus::EnRoute]),
		(OrderStatus::EnRoute, vec![OrderStatus::Arrived]),
		(OrderStatus::Arrived, vec![OrderStatus::PaymentPending]),
		(OrderStatus::PaymentPending, vec![OrderStatus::Completed]),
		(OrderStatus::Completed, vec![]),
		(OrderStatus::Cancelled, vec![]),
	])
});

/// Returns whether a rider-requested transition is permitted.
pub fn is_transition_allowed(from: OrderStatus, to: OrderStatus) -> bool {
	ALLOWED_TRANSITIONS
		.get(&from)
		.map(|targets| targets.contains(&to))
		.unwrap_or(false)
}

/// Manages order state and transitions on top of the storage service.
pub struct OrderLifecycle {
	storage: Arc<StorageService>,
}

impl OrderLifecycle {
	/// Creates a new lifecycle manager.
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Stores an order and maintains the per-rider index.
	///
	/// Orders are created upstream by dispatch; this is the ingestion
	/// point (and the seeding point for tests and demos).
	pub async fn store_order(&self, order: &Order) -> Result<(), CoreError> {
		self.storage
			.store(StorageKey::Orders, &order.id, order)
			.await?;

		let mut ids: Vec<String> = match self
			.storage
			.retrieve(StorageKey::OrdersByRider, &order.rider_id)
			.await
		{
			Ok(ids) => ids,
			Err(StorageError::NotFound) => Vec::new(),
			Err(e) => return Err(e.into()),
		};
		if !ids.contains(&order.id) {
			ids.push(order.id.clone());
			self.storage
				.store(StorageKey::OrdersByRider, &order.rider_id, &ids)
				.await?;
		}
		Ok(())
	}

	/// Retrieves an order if it exists and belongs to the given rider.
	///
	/// A rider asking for another rider's order gets the same answer as
	/// for a nonexistent one, so order ids cannot be probed.
	pub async fn get_order_owned(
		&self,
		rider_id: &str,
		order_id: &str,
	) -> Result<Order, CoreError> {
		let order: Order = match self.storage.retrieve(StorageKey::Orders, order_id).await {
			Ok(order) => order,
			Err(StorageError::NotFound) => {
				return Err(CoreError::NotFound("Order not found".to_string()))
			},
			Err(e) => return Err(e.into()),
		};
		if order.rider_id != rider_id {
			return Err(CoreError::NotFound("Order not found".to_string()));
		}
		Ok(order)
	}

	/// Lists a rider's orders, optionally filtered by status, most
	/// recent first.
	pub async fn orders_for_rider(
		&self,
		rider_id: &str,
		status: Option<OrderStatus>,
	) -> Result<Vec<Order>, CoreError> {
		let ids: Vec<String> = match self
			.storage
			.retrieve(StorageKey::OrdersByRider, rider_id)
			.await
		{
			Ok(ids) => ids,
			Err(StorageError::NotFound) => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut orders = Vec::with_capacity(ids.len());
		for id in &ids {
			match self.storage.retrieve::<Order>(StorageKey::Orders, id).await {
				Ok(order) => orders.push(order),
				// The index may briefly reference a removed order.
				Err(StorageError::NotFound) => continue,
				Err(e) => return Err(e.into()),
			}
		}

		if let Some(status) = status {
			orders.retain(|o| o.status == status);
		}
		orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(orders)
	}

	/// Applies a rider-requested status change.
	///
	/// The transition is validated against the table on every attempt, so
	/// a concurrent writer that moves the order first causes a re-check
	/// against the fresh status rather than a blind overwrite.
	pub async fn request_status_change(
		&self,
		rider_id: &str,
		order_id: &str,
		target: OrderStatus,
	) -> Result<Order, CoreError> {
		let rider_id = rider_id.to_string();
		self.mutate_order(order_id, |order| {
			if order.rider_id != rider_id {
				return Err(CoreError::NotFound("Order not found".to_string()));
			}
			if !is_transition_allowed(order.status, target) {
				return Err(CoreError::InvalidTransition {
					from: order.status,
					to: target,
				});
			}
			order.status = target;
			Ok(())
		})
		.await
	}

	/// Sets the payment method the customer chose at the door.
	pub async fn set_payment_method(
		&self,
		rider_id: &str,
		order_id: &str,
		method: PaymentMethod,
	) -> Result<Order, CoreError> {
		let rider_id = rider_id.to_string();
		self.mutate_order(order_id, |order| {
			if order.rider_id != rider_id {
				return Err(CoreError::NotFound("Order not found".to_string()));
			}
			order.payment_method = Some(method);
			Ok(())
		})
		.await
	}

	/// Moves an order to `PAYMENT_PENDING` and links the payment record
	/// created for it. Called when a QR intent has been generated.
	pub async fn mark_payment_pending(
		&self,
		order_id: &str,
		payment_id: &str,
	) -> Result<Order, CoreError> {
		let payment_id = payment_id.to_string();
		self.mutate_order(order_id, |order| {
			order.status = OrderStatus::PaymentPending;
			order.payment_method = Some(PaymentMethod::Qrph);
			order.payment_id = Some(payment_id.clone());
			Ok(())
		})
		.await
	}

	/// Completes an order after the provider confirmed its payment.
	///
	/// Idempotent: completing an already-completed order is a no-op, so
	/// a redelivered webhook cannot disturb anything.
	pub async fn complete_for_payment(&self, order_id: &str) -> Result<Order, CoreError> {
		self.mutate_order(order_id, |order| {
			order.status = OrderStatus::Completed;
			Ok(())
		})
		.await
	}

	/// Read-modify-write with a bounded compare-and-swap retry loop.
	///
	/// The closure sees a fresh snapshot on every attempt and may reject
	/// the mutation based on it.
	async fn mutate_order<F>(&self, order_id: &str, mut apply: F) -> Result<Order, CoreError>
	where
		F: FnMut(&mut Order) -> Result<(), CoreError>,
	{
		for attempt in 0..MAX_SWAP_ATTEMPTS {
			let current: Order = match self.storage.retrieve(StorageKey::Orders, order_id).await {
				Ok(order) => order,
				Err(StorageError::NotFound) => {
					return Err(CoreError::NotFound("Order not found".to_string()))
				},
				Err(e) => return Err(e.into()),
			};

			let mut next = current.clone();
			apply(&mut next)?;
			if next == current {
				return Ok(current);
			}
			next.updated_at = Utc::now();

			if self
				.storage
				.swap(StorageKey::Orders, order_id, &current, &next)
				.await?
			{
				return Ok(next);
			}
			tracing::debug!(order_id = %order_id, attempt, "Lost order write race, retrying");
		}
		Err(CoreError::Conflict(
			"Order was modified concurrently".to_string(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use courier_storage::implementations::memory::MemoryStorage;
	use rust_decimal::Decimal;

	fn lifecycle() -> OrderLifecycle {
		OrderLifecycle::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	fn order_for(rider_id: &str, number: &str) -> Order {
		Order::new(rider_id, number, format!("BC-{}", number), Decimal::new(25000, 2))
	}

	#[test]
	fn test_transition_table() {
		assert!(is_transition_allowed(
			OrderStatus::Pending,
			OrderStatus::EnRoute
		));
		assert!(is_transition_allowed(
			OrderStatus::Arrived,
			OrderStatus::PaymentPending
		));
		assert!(is_transition_allowed(
			OrderStatus::PaymentPending,
			OrderStatus::Completed
		));

		// No skipping ahead, no going back, nothing out of terminal states.
		assert!(!is_transition_allowed(
			OrderStatus::Pending,
			OrderStatus::Arrived
		));
		// Completion always goes through PAYMENT_PENDING, cash included.
		assert!(!is_transition_allowed(
			OrderStatus::Arrived,
			OrderStatus::Completed
		));
		assert!(!is_transition_allowed(
			OrderStatus::Arrived,
			OrderStatus::EnRoute
		));
		assert!(!is_transition_allowed(
			OrderStatus::Completed,
			OrderStatus::Pending
		));
		assert!(!is_transition_allowed(
			OrderStatus::Cancelled,
			OrderStatus::EnRoute
		));
	}

	#[tokio::test]
	async fn test_status_change_walks_the_lifecycle() {
		let lifecycle = lifecycle();
		let order = order_for("rider-1", "1001");
		lifecycle.store_order(&order).await.unwrap();

		let order = lifecycle
			.request_status_change("rider-1", &order.id, OrderStatus::EnRoute)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::EnRoute);

		let order = lifecycle
			.request_status_change("rider-1", &order.id, OrderStatus::Arrived)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Arrived);

		let err = lifecycle
			.request_status_change("rider-1", &order.id, OrderStatus::EnRoute)
			.await
			.unwrap_err();
		assert!(matches!(
			err,
			CoreError::InvalidTransition {
				from: OrderStatus::Arrived,
				to: OrderStatus::EnRoute,
			}
		));
	}

	#[tokio::test]
	async fn test_foreign_order_reads_as_missing() {
		let lifecycle = lifecycle();
		let order = order_for("rider-1", "1001");
		lifecycle.store_order(&order).await.unwrap();

		let err = lifecycle
			.get_order_owned("rider-2", &order.id)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::NotFound(_)));

		let err = lifecycle
			.request_status_change("rider-2", &order.id, OrderStatus::EnRoute)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::NotFound(_)));
	}

	#[tokio::test]
	async fn test_listing_filters_and_sorts() {
		let lifecycle = lifecycle();

		let mut first = order_for("rider-1", "1001");
		first.created_at = chrono::Utc::now() - chrono::Duration::hours(2);
		let second = order_for("rider-1", "1002");
		let other = order_for("rider-2", "2001");

		lifecycle.store_order(&first).await.unwrap();
		lifecycle.store_order(&second).await.unwrap();
		lifecycle.store_order(&other).await.unwrap();

		lifecycle
			.request_status_change("rider-1", &second.id, OrderStatus::EnRoute)
			.await
			.unwrap();

		let all = lifecycle.orders_for_rider("rider-1", None).await.unwrap();
		assert_eq!(all.len(), 2);
		// Most recent first.
		assert_eq!(all[0].id, second.id);
		assert_eq!(all[1].id, first.id);

		let en_route = lifecycle
			.orders_for_rider("rider-1", Some(OrderStatus::EnRoute))
			.await
			.unwrap();
		assert_eq!(en_route.len(), 1);
		assert_eq!(en_route[0].id, second.id);

		let empty = lifecycle.orders_for_rider("rider-3", None).await.unwrap();
		assert!(empty.is_empty());
	}

	#[tokio::test]
	async fn test_payment_side_channel_ops() {
		let lifecycle = lifecycle();
		let order = order_for("rider-1", "1001");
		lifecycle.store_order(&order).await.unwrap();

		let order = lifecycle
			.mark_payment_pending(&order.id, "pay-1")
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::PaymentPending);
		assert_eq!(order.payment_method, Some(PaymentMethod::Qrph));
		assert_eq!(order.payment_id.as_deref(), Some("pay-1"));

		let order = lifecycle.complete_for_payment(&order.id).await.unwrap();
		assert_eq!(order.status, OrderStatus::Completed);

		// Redelivery of the completion is harmless.
		let order = lifecycle.complete_for_payment(&order.id).await.unwrap();
		assert_eq!(order.status, OrderStatus::Completed);
	}

	#[tokio::test]
	async fn test_store_order_is_idempotent_in_the_index() {
		let lifecycle = lifecycle();
		let order = order_for("rider-1", "1001");
		lifecycle.store_order(&order).await.unwrap();
		lifecycle.store_order(&order).await.unwrap();

		let all = lifecycle.orders_for_rider("rider-1", None).await.unwrap();
		assert_eq!(all.len(), 1);
	}
}

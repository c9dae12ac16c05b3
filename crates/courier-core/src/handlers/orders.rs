//! Order queries, status changes, payments, and proof capture.

use crate::error::CoreError;
use crate::handlers::require_field;
use crate::state::OrderLifecycle;
use courier_payments::PaymentService;
use courier_storage::{StorageError, StorageService};
use courier_types::{
	AttachProofRequest, ListOrdersQuery, Order, OrderDetailResponse, OrderStatus, Payment,
	PaymentMethod, PaymentMethodRequest, ProofOfDelivery, QrphPaymentResponse, QrphPayload,
	StatusChangeRequest, StorageKey, VerifyBarcodeRequest, VerifyBarcodeResponse,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Handles everything a rider does with an order.
pub struct OrderHandler {
	storage: Arc<StorageService>,
	lifecycle: Arc<OrderLifecycle>,
	payments: Arc<PaymentService>,
	currency: String,
}

impl OrderHandler {
	/// Creates a new order handler.
	pub fn new(
		storage: Arc<StorageService>,
		lifecycle: Arc<OrderLifecycle>,
		payments: Arc<PaymentService>,
		currency: String,
	) -> Self {
		Self {
			storage,
			lifecycle,
			payments,
			currency,
		}
	}

	/// Lists the rider's orders, newest first.
	pub async fn list_orders(
		&self,
		rider_id: &str,
		query: ListOrdersQuery,
	) -> Result<Vec<Order>, CoreError> {
		let filter = match query.status {
			Some(raw) => Some(parse_status(&raw)?),
			None => None,
		};
		self.lifecycle.orders_for_rider(rider_id, filter).await
	}

	/// Returns an order with its linked payment and proof, if any.
	pub async fn order_detail(
		&self,
		rider_id: &str,
		order_id: &str,
	) -> Result<OrderDetailResponse, CoreError> {
		let order = self.lifecycle.get_order_owned(rider_id, order_id).await?;
		let payment = self.linked_payment(&order.id).await?;
		let proof_of_delivery = self.linked_proof(&order.id).await?;
		Ok(OrderDetailResponse {
			order,
			payment,
			proof_of_delivery,
		})
	}

	/// Compares a scanned code against the parcel barcode.
	///
	/// A mismatch is a normal outcome reported in the body, not an
	/// error status.
	pub async fn verify_barcode(
		&self,
		rider_id: &str,
		order_id: &str,
		request: VerifyBarcodeRequest,
	) -> Result<VerifyBarcodeResponse, CoreError> {
		let scanned = require_field(request.scanned_code, "scannedCode")?;
		let order = self.lifecycle.get_order_owned(rider_id, order_id).await?;
		Ok(VerifyBarcodeResponse {
			verified: scanned == order.barcode,
		})
	}

	/// Applies a rider-requested status change.
	pub async fn change_status(
		&self,
		rider_id: &str,
		order_id: &str,
		request: StatusChangeRequest,
	) -> Result<Order, CoreError> {
		let raw = require_field(request.status, "status")?;
		let target = parse_status(&raw)?;
		self.lifecycle
			.request_status_change(rider_id, order_id, target)
			.await
	}

	/// Records the payment method the customer chose.
	pub async fn set_payment_method(
		&self,
		rider_id: &str,
		order_id: &str,
		request: PaymentMethodRequest,
	) -> Result<Order, CoreError> {
		let raw = require_field(request.method, "method")?;
		let method: PaymentMethod = raw
			.parse()
			.map_err(|_| CoreError::BadRequest(format!("Unknown payment method: {}", raw)))?;
		self.lifecycle
			.set_payment_method(rider_id, order_id, method)
			.await
	}

	/// Creates a QRPH payment intent for the order.
	///
	/// Persists the payment record and its indexes before touching the
	/// order, so a webhook arriving immediately after the provider call
	/// already finds the reference. Re-initiating replaces the reference
	/// mapping; the superseded intent can no longer settle.
	pub async fn initiate_qrph_payment(
		&self,
		rider_id: &str,
		order_id: &str,
	) -> Result<QrphPaymentResponse, CoreError> {
		let order = self.lifecycle.get_order_owned(rider_id, order_id).await?;

		if order.payment_method != Some(PaymentMethod::Qrph) {
			return Err(CoreError::BadRequest(
				"Order payment method is not QRPH".to_string(),
			));
		}
		if order.cod_amount <= Decimal::ZERO {
			return Err(CoreError::BadRequest(
				"Order has no collectible amount".to_string(),
			));
		}

		let reference = format!("ORDER-{}", order.order_number);
		let intent = self
			.payments
			.create_qrph_intent(order.cod_amount, &self.currency, &reference)
			.await?;

		let payment = Payment::new_qrph(&order.id, &reference, &intent.qr_string, order.cod_amount);
		self.storage
			.store(StorageKey::Payments, &payment.id, &payment)
			.await?;
		self.storage
			.store(StorageKey::PaymentsByReference, &reference, &payment.id)
			.await?;
		self.storage
			.store(StorageKey::PaymentsByOrder, &order.id, &payment.id)
			.await?;

		self.lifecycle
			.mark_payment_pending(&order.id, &payment.id)
			.await?;
		tracing::info!(order_id = %order.id, payment_id = %payment.id, "Created QRPH payment intent");

		Ok(QrphPaymentResponse {
			payment_id: payment.id,
			qrph_payload: QrphPayload {
				qr_string: intent.qr_string,
				amount: order.cod_amount,
				currency: self.currency.clone(),
				reference,
			},
		})
	}

	/// Attaches proof of delivery to an order.
	///
	/// A later proof supersedes an earlier one in the by-order index;
	/// old records stay retrievable by id.
	pub async fn attach_proof(
		&self,
		rider_id: &str,
		order_id: &str,
		request: AttachProofRequest,
	) -> Result<ProofOfDelivery, CoreError> {
		let photo_url = require_field(request.photo_url, "photoUrl")?;
		let order = self.lifecycle.get_order_owned(rider_id, order_id).await?;

		let proof = ProofOfDelivery::new(
			&order.id,
			photo_url,
			request.customer_name,
			request.signature_url,
		);
		self.storage
			.store(StorageKey::Proofs, &proof.id, &proof)
			.await?;
		self.storage
			.store(StorageKey::ProofsByOrder, &order.id, &proof.id)
			.await?;

		tracing::info!(order_id = %order.id, proof_id = %proof.id, "Attached proof of delivery");
		Ok(proof)
	}

	async fn linked_payment(&self, order_id: &str) -> Result<Option<Payment>, CoreError> {
		let payment_id: String = match self
			.storage
			.retrieve(StorageKey::PaymentsByOrder, order_id)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		match self.storage.retrieve(StorageKey::Payments, &payment_id).await {
			Ok(payment) => Ok(Some(payment)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn linked_proof(&self, order_id: &str) -> Result<Option<ProofOfDelivery>, CoreError> {
		let proof_id: String = match self
			.storage
			.retrieve(StorageKey::ProofsByOrder, order_id)
			.await
		{
			Ok(id) => id,
			Err(StorageError::NotFound) => return Ok(None),
			Err(e) => return Err(e.into()),
		};
		match self.storage.retrieve(StorageKey::Proofs, &proof_id).await {
			Ok(proof) => Ok(Some(proof)),
			Err(StorageError::NotFound) => Ok(None),
			Err(e) => Err(e.into()),
		}
	}
}

fn parse_status(raw: &str) -> Result<OrderStatus, CoreError> {
	raw.parse()
		.map_err(|_| CoreError::BadRequest(format!("Unknown status: {}", raw)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use courier_payments::implementations::mock::MockProvider;
	use courier_storage::implementations::memory::MemoryStorage;
	use courier_types::PaymentStatus;

	struct Fixture {
		storage: Arc<StorageService>,
		lifecycle: Arc<OrderLifecycle>,
		handler: OrderHandler,
	}

	fn fixture() -> Fixture {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let lifecycle = Arc::new(OrderLifecycle::new(storage.clone()));
		let handler = OrderHandler::new(
			storage.clone(),
			lifecycle.clone(),
			Arc::new(PaymentService::new(Box::new(MockProvider))),
			"PHP".to_string(),
		);
		Fixture {
			storage,
			lifecycle,
			handler,
		}
	}

	async fn seed_order(fixture: &Fixture, rider_id: &str, number: &str) -> Order {
		let order = Order::new(
			rider_id,
			number,
			format!("BC-{}", number),
			Decimal::new(25050, 2),
		);
		fixture.lifecycle.store_order(&order).await.unwrap();
		order
	}

	/// Seeds an order that has arrived and has QRPH selected, ready for
	/// payment initiation.
	async fn seed_qrph_order(fixture: &Fixture, rider_id: &str, number: &str) -> Order {
		let order = seed_order(fixture, rider_id, number).await;
		fixture
			.lifecycle
			.request_status_change(rider_id, &order.id, OrderStatus::EnRoute)
			.await
			.unwrap();
		fixture
			.lifecycle
			.request_status_change(rider_id, &order.id, OrderStatus::Arrived)
			.await
			.unwrap();
		fixture
			.lifecycle
			.set_payment_method(rider_id, &order.id, PaymentMethod::Qrph)
			.await
			.unwrap()
	}

	#[tokio::test]
	async fn test_list_rejects_unknown_status_filter() {
		let fixture = fixture();
		let err = fixture
			.handler
			.list_orders(
				"rider-1",
				ListOrdersQuery {
					status: Some("TELEPORTING".to_string()),
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));
	}

	#[tokio::test]
	async fn test_barcode_verification_outcomes() {
		let fixture = fixture();
		let order = seed_order(&fixture, "rider-1", "1001").await;

		let response = fixture
			.handler
			.verify_barcode(
				"rider-1",
				&order.id,
				VerifyBarcodeRequest {
					scanned_code: Some("BC-1001".to_string()),
				},
			)
			.await
			.unwrap();
		assert!(response.verified);

		let response = fixture
			.handler
			.verify_barcode(
				"rider-1",
				&order.id,
				VerifyBarcodeRequest {
					scanned_code: Some("BC-9999".to_string()),
				},
			)
			.await
			.unwrap();
		assert!(!response.verified);
	}

	#[tokio::test]
	async fn test_change_status_validates_input_and_ownership() {
		let fixture = fixture();
		let order = seed_order(&fixture, "rider-1", "1001").await;

		let err = fixture
			.handler
			.change_status(
				"rider-1",
				&order.id,
				StatusChangeRequest {
					status: Some("SIDEWAYS".to_string()),
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));

		let err = fixture
			.handler
			.change_status(
				"rider-2",
				&order.id,
				StatusChangeRequest {
					status: Some("EN_ROUTE".to_string()),
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::NotFound(_)));

		let updated = fixture
			.handler
			.change_status(
				"rider-1",
				&order.id,
				StatusChangeRequest {
					status: Some("EN_ROUTE".to_string()),
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::EnRoute);
	}

	#[tokio::test]
	async fn test_qrph_initiation_creates_payment_and_moves_order() {
		let fixture = fixture();
		let order = seed_qrph_order(&fixture, "rider-1", "1001").await;

		let response = fixture
			.handler
			.initiate_qrph_payment("rider-1", &order.id)
			.await
			.unwrap();
		assert_eq!(response.qrph_payload.reference, "ORDER-1001");
		assert_eq!(response.qrph_payload.currency, "PHP");
		assert_eq!(response.qrph_payload.amount, Decimal::new(25050, 2));

		let payment: Payment = fixture
			.storage
			.retrieve(StorageKey::Payments, &response.payment_id)
			.await
			.unwrap();
		assert_eq!(payment.status, PaymentStatus::QrGenerated);
		assert_eq!(payment.order_id, order.id);

		let indexed_id: String = fixture
			.storage
			.retrieve(StorageKey::PaymentsByReference, "ORDER-1001")
			.await
			.unwrap();
		assert_eq!(indexed_id, response.payment_id);

		let order = fixture
			.lifecycle
			.get_order_owned("rider-1", &order.id)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::PaymentPending);
		assert_eq!(order.payment_id.as_deref(), Some(response.payment_id.as_str()));
	}

	#[tokio::test]
	async fn test_qrph_initiation_rejects_cash_orders() {
		let fixture = fixture();
		let order = seed_order(&fixture, "rider-1", "1001").await;
		fixture
			.lifecycle
			.set_payment_method("rider-1", &order.id, PaymentMethod::Cash)
			.await
			.unwrap();

		let err = fixture
			.handler
			.initiate_qrph_payment("rider-1", &order.id)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));

		// Rejection leaves the order untouched.
		let order = fixture
			.lifecycle
			.get_order_owned("rider-1", &order.id)
			.await
			.unwrap();
		assert_eq!(order.status, OrderStatus::Pending);
		assert!(order.payment_id.is_none());
	}

	#[tokio::test]
	async fn test_reinitiation_repoints_the_reference() {
		let fixture = fixture();
		let order = seed_qrph_order(&fixture, "rider-1", "1001").await;

		let first = fixture
			.handler
			.initiate_qrph_payment("rider-1", &order.id)
			.await
			.unwrap();
		let second = fixture
			.handler
			.initiate_qrph_payment("rider-1", &order.id)
			.await
			.unwrap();
		assert_ne!(first.payment_id, second.payment_id);

		let indexed_id: String = fixture
			.storage
			.retrieve(StorageKey::PaymentsByReference, "ORDER-1001")
			.await
			.unwrap();
		assert_eq!(indexed_id, second.payment_id);
	}

	#[tokio::test]
	async fn test_detail_includes_payment_and_latest_proof() {
		let fixture = fixture();
		let order = seed_qrph_order(&fixture, "rider-1", "1001").await;

		let detail = fixture
			.handler
			.order_detail("rider-1", &order.id)
			.await
			.unwrap();
		assert!(detail.payment.is_none());
		assert!(detail.proof_of_delivery.is_none());

		fixture
			.handler
			.initiate_qrph_payment("rider-1", &order.id)
			.await
			.unwrap();
		fixture
			.handler
			.attach_proof(
				"rider-1",
				&order.id,
				AttachProofRequest {
					photo_url: Some("https://cdn/p1.jpg".to_string()),
					customer_name: Some("Maria".to_string()),
					signature_url: None,
				},
			)
			.await
			.unwrap();
		fixture
			.handler
			.attach_proof(
				"rider-1",
				&order.id,
				AttachProofRequest {
					photo_url: Some("https://cdn/p2.jpg".to_string()),
					customer_name: None,
					signature_url: None,
				},
			)
			.await
			.unwrap();

		let detail = fixture
			.handler
			.order_detail("rider-1", &order.id)
			.await
			.unwrap();
		assert!(detail.payment.is_some());
		let proof = detail.proof_of_delivery.unwrap();
		assert_eq!(proof.photo_url, "https://cdn/p2.jpg");
	}

	#[tokio::test]
	async fn test_attach_proof_requires_photo() {
		let fixture = fixture();
		let order = seed_order(&fixture, "rider-1", "1001").await;

		let err = fixture
			.handler
			.attach_proof(
				"rider-1",
				&order.id,
				AttachProofRequest {
					photo_url: None,
					customer_name: Some("Maria".to_string()),
					signature_url: None,
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));
	}

	#[tokio::test]
	async fn test_set_payment_method() {
		let fixture = fixture();
		let order = seed_order(&fixture, "rider-1", "1001").await;

		let updated = fixture
			.handler
			.set_payment_method(
				"rider-1",
				&order.id,
				PaymentMethodRequest {
					method: Some("CASH".to_string()),
				},
			)
			.await
			.unwrap();
		assert_eq!(updated.payment_method, Some(PaymentMethod::Cash));

		let err = fixture
			.handler
			.set_payment_method(
				"rider-1",
				&order.id,
				PaymentMethodRequest {
					method: Some("GCASH".to_string()),
				},
			)
			.await
			.unwrap_err();
		assert!(matches!(err, CoreError::BadRequest(_)));
	}
}

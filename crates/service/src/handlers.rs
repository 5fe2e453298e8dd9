//! Synthetic handlers: locally computed stand-ins for the booking and
//! payment endpoints.
//!
//! The create handlers are pure functions of a collection snapshot and a typed
//! payload; [`SyntheticHandlers`] runs them against the [`RecordStore`] under
//! the collection lock and persists the snapshot they return.

use std::sync::Arc;

use models::ids;
use models::{
    ApiResponse, Booking, BookingEnvelope, CreateBookingRequest, CreatePaymentRequest, Endpoint,
    MessageEnvelope, Payment, PaymentEnvelope, PaymentStatusPatch, VerificationEnvelope, VerifyPaymentRequest,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::storage::record_store::RecordStore;

pub const PLACEHOLDER_MESSAGE: &str = "Mock response - Backend endpoint not available";

fn decode<T: DeserializeOwned>(endpoint: &Endpoint, payload: Value) -> Result<T, ServiceError> {
    serde_json::from_value(payload)
        .map_err(|e| ServiceError::Validation(format!("{endpoint} payload rejected: {e}")))
}

/// Append a new booking; answers 201 with the stored record.
pub fn create_service_booking(
    mut snapshot: Vec<Booking>,
    req: CreateBookingRequest,
) -> Result<(Vec<Booking>, ApiResponse), ServiceError> {
    let booking = Booking::create(req);
    let body = BookingEnvelope {
        message: "Booking created successfully".to_string(),
        booking: booking.clone(),
        status: true,
    };
    snapshot.push(booking);
    Ok((snapshot, ApiResponse::synthesized(201, &body)?))
}

/// Append a new payment; answers 201 with the stored record.
///
/// Ids stay unique within the collection: when the caller's id is already
/// taken the record gets a generated one and keeps the caller's fields as sent.
pub fn create_payment(
    mut snapshot: Vec<Payment>,
    req: CreatePaymentRequest,
) -> Result<(Vec<Payment>, ApiResponse), ServiceError> {
    let mut payment = Payment::create(req);
    while snapshot.iter().any(|p| p.id == payment.id) {
        debug!(id = %payment.id, "payment id already stored; generating a new one");
        payment.id = ids::new_payment_id();
    }
    let body = PaymentEnvelope {
        message: "Payment created successfully".to_string(),
        payment: payment.clone(),
        status: true,
    };
    snapshot.push(payment);
    Ok((snapshot, ApiResponse::synthesized(201, &body)?))
}

/// Stateless: every verification succeeds.
pub fn verify_payment(_req: VerifyPaymentRequest) -> Result<ApiResponse, ServiceError> {
    let body = VerificationEnvelope {
        status: "success".to_string(),
        message: "Payment verified successfully".to_string(),
    };
    Ok(ApiResponse::synthesized(200, &body)?)
}

/// Response for a payment-status patch: 200 with the booking, or 404.
pub fn booking_payment_response(updated: Option<Booking>) -> Result<ApiResponse, ServiceError> {
    match updated {
        Some(booking) => {
            let body = BookingEnvelope {
                message: "Booking payment status updated successfully".to_string(),
                booking,
                status: true,
            };
            Ok(ApiResponse::synthesized(200, &body)?)
        }
        None => Ok(ApiResponse::synthesized(404, &MessageEnvelope::new("Booking not found", false))?),
    }
}

/// Generic success used when no handler matches.
pub fn placeholder_response() -> Result<ApiResponse, ServiceError> {
    Ok(ApiResponse::synthesized(200, &MessageEnvelope::new(PLACEHOLDER_MESSAGE, true))?)
}

/// Runs handlers against a record store.
#[derive(Clone)]
pub struct SyntheticHandlers {
    store: Arc<RecordStore>,
}

impl SyntheticHandlers {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Synthesize the response for `endpoint`. Returns `Ok(None)` for
    /// [`Endpoint::Unclassified`]; the caller decides what that means.
    ///
    /// `Validation` errors mean the payload does not fit the operation's
    /// schema and nothing was written.
    pub async fn handle(&self, endpoint: &Endpoint, payload: Value) -> Result<Option<ApiResponse>, ServiceError> {
        let response = match endpoint {
            Endpoint::CreateServiceBooking => {
                let req: CreateBookingRequest = decode(endpoint, payload)?;
                let resp = self
                    .store
                    .transact::<Booking, _, _>(move |snapshot| {
                        let (next, resp) = create_service_booking(snapshot, req)?;
                        Ok((Some(next), resp))
                    })
                    .await?;
                info!(handler = %endpoint, "booking stored locally");
                resp
            }
            Endpoint::CreatePayment => {
                let req: CreatePaymentRequest = decode(endpoint, payload)?;
                let resp = self
                    .store
                    .transact::<Payment, _, _>(move |snapshot| {
                        let (next, resp) = create_payment(snapshot, req)?;
                        Ok((Some(next), resp))
                    })
                    .await?;
                info!(handler = %endpoint, "payment stored locally");
                resp
            }
            Endpoint::VerifyPayment => verify_payment(decode(endpoint, payload)?)?,
            Endpoint::PatchBookingPayment { booking_id } => {
                let patch: PaymentStatusPatch = decode(endpoint, payload)?;
                let updated = self
                    .store
                    .update_by_id::<Booking, _>(booking_id, |b| b.payment_status = patch.payment_status)
                    .await?;
                if updated.is_none() {
                    debug!(%booking_id, "payment status patch for unknown booking");
                }
                booking_payment_response(updated)?
            }
            Endpoint::Unclassified => return Ok(None),
        };
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Collection, PaymentStatus};
    use serde_json::json;

    fn handlers() -> SyntheticHandlers {
        SyntheticHandlers::new(Arc::new(RecordStore::in_memory()))
    }

    async fn create_booking(h: &SyntheticHandlers, payload: Value) -> Booking {
        let resp = h.handle(&Endpoint::CreateServiceBooking, payload).await.unwrap().unwrap();
        serde_json::from_value(resp.data["booking"].clone()).unwrap()
    }

    #[tokio::test]
    async fn create_then_find_returns_payload_superset() -> Result<(), anyhow::Error> {
        let h = handlers();
        let payload = json!({
            "name": "A",
            "service": "Oil Changing",
            "date": "2025-01-01",
            "price": 1200,
            "payment_method": "COD"
        });
        let resp = h.handle(&Endpoint::CreateServiceBooking, payload.clone()).await?.unwrap();
        assert_eq!(resp.status, 201);
        assert_eq!(resp.status_text, "Created");
        assert_eq!(resp.data["status"], true);
        assert_eq!(resp.data["message"], "Booking created successfully");

        let id = resp.data["booking"]["_id"].as_str().unwrap().to_string();
        let found = h.store().find_by_id::<Booking>(&id).await.expect("stored");
        let stored = serde_json::to_value(&found)?;
        for (k, v) in payload.as_object().unwrap() {
            assert_eq!(&stored[k], v, "field {k}");
        }
        for k in ["_id", "created_at", "updated_at"] {
            assert!(stored.get(k).is_some(), "missing {k}");
        }
        assert_eq!(stored["created_at"], stored["updated_at"]);
        Ok(())
    }

    #[tokio::test]
    async fn create_payment_uses_payload_id_and_appends() -> Result<(), anyhow::Error> {
        let h = handlers();
        let first = h
            .handle(&Endpoint::CreatePayment, json!({"payment_id": "pay_abc", "amount": 250}))
            .await?
            .unwrap();
        assert_eq!(first.status, 201);
        assert_eq!(first.data["payment"]["id"], "pay_abc");
        assert_eq!(first.data["message"], "Payment created successfully");

        let second = h.handle(&Endpoint::CreatePayment, json!({"amount": 99})).await?.unwrap();
        let generated = second.data["payment"]["id"].as_str().unwrap();
        assert!(generated.starts_with("pay_mock_"));

        let payments = h.store().read_all::<Payment>().await;
        assert_eq!(payments.len(), 2);
        assert!(h.store().read_all::<Booking>().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn repeated_payment_id_gets_a_fresh_record_id() -> Result<(), anyhow::Error> {
        let h = handlers();
        let payload = json!({"payment_id": "pay_dup", "amount": 100});
        h.handle(&Endpoint::CreatePayment, payload.clone()).await?.unwrap();
        let second = h.handle(&Endpoint::CreatePayment, payload).await?.unwrap();

        let second_id = second.data["payment"]["id"].as_str().unwrap();
        assert_ne!(second_id, "pay_dup");
        assert!(second_id.starts_with("pay_mock_"));
        assert_eq!(second.data["payment"]["payment_id"], "pay_dup");

        let payments = h.store().read_all::<Payment>().await;
        assert_eq!(payments.len(), 2);
        assert!(h.store().find_by_id::<Payment>("pay_dup").await.is_some());
        assert_eq!(payments.iter().filter(|p| p.id == "pay_dup").count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn loosely_typed_fields_are_stored_as_sent() -> Result<(), anyhow::Error> {
        let h = handlers();
        let payload = json!({"service": "Oil", "notes": null, "vehicle_model": null, "price": "1200"});
        let resp = h.handle(&Endpoint::CreateServiceBooking, payload.clone()).await?.unwrap();
        assert_eq!(resp.status, 201);

        let id = resp.data["booking"]["_id"].as_str().unwrap().to_string();
        let stored = serde_json::to_value(h.store().find_by_id::<Booking>(&id).await.expect("stored"))?;
        for (k, v) in payload.as_object().unwrap() {
            assert_eq!(stored.get(k), Some(v), "field {k}");
        }

        let resp = h
            .handle(&Endpoint::CreatePayment, json!({"user_id": 42, "amount": "499.00"}))
            .await?
            .unwrap();
        assert_eq!(resp.data["payment"]["user_id"], 42);
        assert_eq!(resp.data["payment"]["amount"], "499.00");
        Ok(())
    }

    #[tokio::test]
    async fn create_over_unparseable_bookings_keeps_them() -> Result<(), anyhow::Error> {
        use crate::storage::{KeyValueBackend, MemoryBackend};

        let backend = Arc::new(MemoryBackend::new());
        let seeded = json!([
            {"_id": "mock-good", "payment_status": "paid",
             "created_at": "2025-01-01T00:00:00.000Z", "updated_at": "2025-01-01T00:00:00.000Z"},
            {"_id": "mock-odd", "payment_status": "pending",
             "created_at": "2025-01-01T00:00:00.000Z", "updated_at": "2025-01-01T00:00:00.000Z"}
        ])
        .to_string();
        backend.set("mockBookings", seeded.clone()).await?;
        let h = SyntheticHandlers::new(Arc::new(RecordStore::new(backend)));

        let err = h
            .handle(&Endpoint::CreateServiceBooking, json!({"service": "New"}))
            .await
            .unwrap_err();
        assert!(err.is_storage_fatal());
        assert_eq!(h.store().read_raw(Collection::Bookings).await, Some(seeded));
        Ok(())
    }

    #[tokio::test]
    async fn verify_payment_has_no_store_effect() -> Result<(), anyhow::Error> {
        let h = handlers();
        let resp = h
            .handle(&Endpoint::VerifyPayment, json!({"payment_id": "pay_1", "signature": "sig"}))
            .await?
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data, json!({"status": "success", "message": "Payment verified successfully"}));
        assert_eq!(h.store().read_raw(Collection::Payments).await, None);
        assert_eq!(h.store().read_raw(Collection::Bookings).await, None);
        Ok(())
    }

    #[tokio::test]
    async fn patch_found_marks_paid_and_bumps_updated_at() -> Result<(), anyhow::Error> {
        let h = handlers();
        let b1 = create_booking(&h, json!({"service": "Tires", "payment_status": "unpaid"})).await;
        assert_eq!(b1.payment_status, PaymentStatus::Unpaid);

        let endpoint = Endpoint::PatchBookingPayment { booking_id: b1.id.clone() };
        let resp = h.handle(&endpoint, json!({"payment_status": "paid"})).await?.unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.data["status"], true);
        assert_eq!(resp.data["booking"]["payment_status"], "paid");

        let after: Booking = serde_json::from_value(resp.data["booking"].clone())?;
        assert!(after.updated_at > b1.updated_at);
        assert_eq!(after.fields, b1.fields);
        Ok(())
    }

    #[tokio::test]
    async fn patch_not_found_is_404_and_leaves_store_untouched() -> Result<(), anyhow::Error> {
        let h = handlers();
        create_booking(&h, json!({"service": "Engine Servicing"})).await;
        let before = h.store().read_raw(Collection::Bookings).await;

        let endpoint = Endpoint::PatchBookingPayment { booking_id: "mock-doesnotexist".into() };
        let resp = h.handle(&endpoint, json!({"payment_status": "paid"})).await?.unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(resp.status_text, "Not Found");
        assert_eq!(resp.data, json!({"message": "Booking not found", "status": false}));
        assert_eq!(h.store().read_raw(Collection::Bookings).await, before);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_payload_is_a_validation_error() {
        let h = handlers();
        let endpoint = Endpoint::PatchBookingPayment { booking_id: "mock-1".into() };
        let err = h.handle(&endpoint, json!({"payment_status": "refunded"})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(!err.is_storage_fatal());

        let err = h.handle(&Endpoint::CreatePayment, json!(["not", "an", "object"])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(h.store().read_raw(Collection::Payments).await, None);
    }

    #[tokio::test]
    async fn unclassified_has_no_handler() -> Result<(), anyhow::Error> {
        let h = handlers();
        assert!(h.handle(&Endpoint::Unclassified, json!({})).await?.is_none());
        let placeholder = placeholder_response()?;
        assert_eq!(placeholder.status, 200);
        assert_eq!(placeholder.data["status"], true);
        assert_eq!(placeholder.data["message"], PLACEHOLDER_MESSAGE);
        Ok(())
    }
}

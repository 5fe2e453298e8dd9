use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids;
use crate::record::{Collection, Record};

/// Payment state of a booking as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Failed,
}

/// Body of `POST .../bookings/service`.
///
/// Only `payment_status` is interpreted. Every other field (service, customer,
/// date, price, notes, ...) is kept as sent, nulls and odd types included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CreateBookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of `PATCH .../bookings/{id}/payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusPatch {
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Caller-supplied fields, written back flat alongside the record's own.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(with = "ids::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ids::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Keys owned by the record itself; never taken from the caller's payload.
const RESERVED: [&str; 4] = ["_id", "payment_status", "created_at", "updated_at"];

impl Booking {
    /// Build a fresh booking with a generated id and `created_at == updated_at`.
    pub fn create(req: CreateBookingRequest) -> Self {
        let CreateBookingRequest { payment_status, mut fields } = req;
        fields.retain(|k, _| !RESERVED.contains(&k.as_str()));
        let now = ids::now();
        Self {
            id: ids::new_booking_id(),
            payment_status: payment_status.unwrap_or_default(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// A caller field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Record for Booking {
    const COLLECTION: Collection = Collection::Bookings;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = ids::after(self.updated_at);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids;
use crate::record::{Collection, Record};

/// Body of `POST .../payments`. Stored as sent; only `id` and `payment_id`
/// are read, to pick the record id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CreatePaymentRequest {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of `POST .../payments/verify`. Verification is unconditional, so
/// nothing in it is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VerifyPaymentRequest {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(with = "ids::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ids::timestamp")]
    pub updated_at: DateTime<Utc>,
}

const RESERVED: [&str; 3] = ["id", "created_at", "updated_at"];

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}

impl Payment {
    /// Build a payment record. The id is the caller's `id`, else its
    /// `payment_id`, else a generated `pay_mock_` id. Timestamps are always local.
    pub fn create(req: CreatePaymentRequest) -> Self {
        let CreatePaymentRequest { mut fields } = req;
        let id = non_empty_str(fields.get("id"))
            .or_else(|| non_empty_str(fields.get("payment_id")))
            .unwrap_or_else(ids::new_payment_id);
        fields.retain(|k, _| !RESERVED.contains(&k.as_str()));
        let now = ids::now();
        Self { id, fields, created_at: now, updated_at: now }
    }

    /// The caller's `payment_id`, if it sent a string one.
    pub fn payment_id(&self) -> Option<&str> {
        self.fields.get("payment_id").and_then(Value::as_str)
    }
}

impl Record for Payment {
    const COLLECTION: Collection = Collection::Payments;

    fn id(&self) -> &str {
        &self.id
    }

    fn touch(&mut self) {
        self.updated_at = ids::after(self.updated_at);
    }
}

//! Response bodies the UI expects from the booking and payment endpoints.

use serde::{Deserialize, Serialize};

use crate::booking::Booking;
use crate::payment::Payment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingEnvelope {
    pub message: String,
    pub booking: Booking,
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEnvelope {
    pub message: String,
    pub payment: Payment,
    pub status: bool,
}

/// `{status: "success", message}` as returned by payment verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEnvelope {
    pub status: String,
    pub message: String,
}

/// Bare `{message, status}` envelope for not-found and placeholder replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message: String,
    pub status: bool,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>, status: bool) -> Self {
        Self { message: message.into(), status }
    }
}

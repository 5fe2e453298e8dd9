//! Records, typed request payloads and response envelopes shared by the
//! fallback store, its handlers and the dispatcher.

pub mod booking;
pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod http;
pub mod ids;
pub mod payment;
pub mod record;

pub use booking::{Booking, CreateBookingRequest, PaymentStatus, PaymentStatusPatch};
pub use endpoint::Endpoint;
pub use envelope::{BookingEnvelope, MessageEnvelope, PaymentEnvelope, VerificationEnvelope};
pub use errors::ModelError;
pub use http::{ApiRequest, ApiResponse, HttpMethod, RequestBody, ResponseSource};
pub use payment::{CreatePaymentRequest, Payment, VerifyPaymentRequest};
pub use record::{Collection, Record};

//! Service layer for the response-simulation fallback.
//! - Persists bookings and payments created while the backend is unavailable.
//! - Implements the synthetic handlers that stand in for backend endpoints.

pub mod errors;
pub mod handlers;
pub mod runtime;
pub mod storage;

pub use errors::ServiceError;
pub use handlers::SyntheticHandlers;
pub use storage::RecordStore;

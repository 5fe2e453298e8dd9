//! Response-simulation layer for the booking client.
//!
//! - [`classifier`] maps a failed request to the operation that can answer it.
//! - [`transport`] is the request contract and its reqwest implementation.
//! - [`fallback`] is the decorator that answers eligible failures locally.

pub mod bootstrap;
pub mod classifier;
pub mod fallback;
pub mod observability;
pub mod transport;

pub use classifier::{classify, classify_str};
pub use fallback::{FailureKind, FallbackClient, FallbackPolicy};
pub use transport::{HttpTransport, ReqwestTransport, TransportError};

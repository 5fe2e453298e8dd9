//! Storage for locally synthesized records
//!
//! Key-value backends plus the record store that keeps the bookings and
//! payments collections as JSON arrays under fixed keys.

pub mod backend;
pub mod record_store;

pub use backend::{FileBackend, KeyValueBackend, MemoryBackend};
pub use record_store::RecordStore;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The two independently persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookings,
    Payments,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Bookings, Collection::Payments];

    /// Fixed key under which the collection is persisted.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Collection::Bookings => "mockBookings",
            Collection::Payments => "mockPayments",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Bookings => "bookings",
            Collection::Payments => "payments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Collection {
    type Err = crate::errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bookings" => Ok(Collection::Bookings),
            "payments" => Ok(Collection::Payments),
            other => Err(crate::errors::ModelError::Validation(format!("unknown collection: {other}"))),
        }
    }
}

/// A flat persisted mapping keyed by a unique id.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    fn id(&self) -> &str;

    /// Refresh `updated_at` to a time strictly after its current value.
    fn touch(&mut self);
}

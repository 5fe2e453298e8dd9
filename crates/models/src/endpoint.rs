use std::fmt;

/// Logical operation a failed request maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateServiceBooking,
    CreatePayment,
    VerifyPayment,
    PatchBookingPayment { booking_id: String },
    Unclassified,
}

impl Endpoint {
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::CreateServiceBooking => "create-service-booking",
            Endpoint::CreatePayment => "create-payment",
            Endpoint::VerifyPayment => "verify-payment",
            Endpoint::PatchBookingPayment { .. } => "patch-booking-payment",
            Endpoint::Unclassified => "unclassified",
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, Endpoint::Unclassified)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

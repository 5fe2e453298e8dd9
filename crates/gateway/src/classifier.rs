//! Endpoint classification for failed requests.
//!
//! Rules compare whole path segments from the end of the path. Substring
//! containment is never used, so `/api/payments/verify` cannot satisfy the
//! `payments` rule.

use models::{Endpoint, HttpMethod};
use reqwest::Url;

/// Path segments of a relative path or absolute URL. The query string and
/// fragment are dropped, as are the empty segments produced by a leading or
/// trailing slash.
pub fn path_segments(path: &str) -> Vec<String> {
    let raw_path = if path.starts_with("http://") || path.starts_with("https://") {
        match Url::parse(path) {
            Ok(url) => url.path().to_string(),
            Err(_) => strip_query(path).to_string(),
        }
    } else {
        strip_query(path).to_string()
    };

    let mut segments: Vec<String> = raw_path.split('/').map(str::to_string).collect();
    if segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }
    if segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

fn strip_query(path: &str) -> &str {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    &path[..end]
}

fn ends_with(segments: &[String], suffix: &[&str]) -> bool {
    segments.len() >= suffix.len()
        && segments[segments.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(seg, want)| seg == want)
}

/// `.../bookings/{id}/payment` → `Some(id)`
fn booking_payment_id(segments: &[String]) -> Option<&str> {
    let n = segments.len();
    if n < 3 || segments[n - 3] != "bookings" || segments[n - 1] != "payment" {
        return None;
    }
    let id = segments[n - 2].as_str();
    (!id.is_empty()).then_some(id)
}

/// Map a request to the handler that can answer it locally.
pub fn classify(method: HttpMethod, path: &str) -> Endpoint {
    let segments = path_segments(path);

    if method == HttpMethod::Post && ends_with(&segments, &["bookings", "service"]) {
        return Endpoint::CreateServiceBooking;
    }
    if method == HttpMethod::Post && ends_with(&segments, &["payments"]) {
        return Endpoint::CreatePayment;
    }
    if method == HttpMethod::Post && ends_with(&segments, &["payments", "verify"]) {
        return Endpoint::VerifyPayment;
    }
    if method == HttpMethod::Patch {
        if let Some(id) = booking_payment_id(&segments) {
            return Endpoint::PatchBookingPayment { booking_id: id.to_string() };
        }
    }
    Endpoint::Unclassified
}

/// Same as [`classify`] for a method given as text (case-insensitive).
/// Unknown methods are unclassified.
pub fn classify_str(method: &str, path: &str) -> Endpoint {
    match method.parse::<HttpMethod>() {
        Ok(m) => classify(m, path),
        Err(_) => Endpoint::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_each_rule_to_its_handler() {
        assert_eq!(classify(HttpMethod::Post, "/api/bookings/service"), Endpoint::CreateServiceBooking);
        assert_eq!(classify(HttpMethod::Post, "/api/payments"), Endpoint::CreatePayment);
        assert_eq!(classify(HttpMethod::Post, "/api/payments/verify"), Endpoint::VerifyPayment);
        assert_eq!(
            classify(HttpMethod::Patch, "/api/bookings/mock-abc123/payment"),
            Endpoint::PatchBookingPayment { booking_id: "mock-abc123".into() }
        );
    }

    #[test]
    fn payments_and_verify_do_not_collide() {
        let create = classify(HttpMethod::Post, "/api/payments");
        let verify = classify(HttpMethod::Post, "/api/payments/verify");
        assert_ne!(create, verify);
        assert_eq!(verify.name(), "verify-payment");
        // a path that merely contains "payments" is not a payment creation
        assert_eq!(classify(HttpMethod::Post, "/api/payments/history"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Post, "/api/mypayments"), Endpoint::Unclassified);
    }

    #[test]
    fn method_must_match() {
        assert_eq!(classify(HttpMethod::Get, "/api/bookings/service"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Put, "/api/payments"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Post, "/api/bookings/b1/payment"), Endpoint::Unclassified);
        assert_eq!(classify_str("post", "/api/payments"), Endpoint::CreatePayment);
        assert_eq!(classify_str("PaTcH", "/api/bookings/b1/payment").name(), "patch-booking-payment");
        assert_eq!(classify_str("TRACE", "/api/payments"), Endpoint::Unclassified);
    }

    #[test]
    fn absolute_urls_queries_and_trailing_slashes() {
        assert_eq!(
            classify(HttpMethod::Post, "http://localhost:8000/api/bookings/service?src=ui"),
            Endpoint::CreateServiceBooking
        );
        assert_eq!(classify(HttpMethod::Post, "/api/payments/"), Endpoint::CreatePayment);
        assert_eq!(classify(HttpMethod::Post, "api/payments/verify#x"), Endpoint::VerifyPayment);
        assert_eq!(
            classify(HttpMethod::Patch, "https://example.com/api/bookings/42/payment"),
            Endpoint::PatchBookingPayment { booking_id: "42".into() }
        );
    }

    #[test]
    fn booking_payment_requires_an_id() {
        assert_eq!(classify(HttpMethod::Patch, "/api/bookings//payment"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Patch, "/api/bookings/payment"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Patch, "/api/bookings/b1/payment/extra"), Endpoint::Unclassified);
    }

    #[test]
    fn unknown_paths_are_unclassified() {
        assert_eq!(classify(HttpMethod::Get, "/api/unknown/endpoint"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Post, "/"), Endpoint::Unclassified);
        assert_eq!(classify(HttpMethod::Post, ""), Endpoint::Unclassified);
    }

    #[test]
    fn segments_drop_leading_and_trailing_empties() {
        assert_eq!(path_segments("/api/bookings/"), vec!["api", "bookings"]);
        assert_eq!(path_segments("api/bookings"), vec!["api", "bookings"]);
        assert_eq!(path_segments("http://h:1/a/b?c=d"), vec!["a", "b"]);
        assert!(path_segments("/").is_empty());
    }
}

//! Id and timestamp generation for locally created records.
//!
//! Timestamps are kept at millisecond precision and serialized as
//! `YYYY-MM-DDTHH:MM:SS.mmmZ`, which is what the backend and the UI exchange.

use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use rand::Rng;

pub const BOOKING_ID_PREFIX: &str = "mock-";
pub const PAYMENT_ID_PREFIX: &str = "pay_mock_";

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Lowercase base-36 rendering of `n`.
pub fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| BASE36[rng.gen_range(0..36)] as char).collect()
}

fn millis_now() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

/// `mock-<base36 millis><5 random base36 chars>`
pub fn new_booking_id() -> String {
    format!("{BOOKING_ID_PREFIX}{}{}", base36(millis_now()), random_suffix(5))
}

/// `pay_mock_<base36 millis><4 random base36 chars>`
pub fn new_payment_id() -> String {
    format!("{PAYMENT_ID_PREFIX}{}{}", base36(millis_now()), random_suffix(4))
}

/// Current time truncated to milliseconds.
pub fn now() -> DateTime<Utc> {
    let ms = Utc::now().timestamp_millis();
    Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now)
}

/// A timestamp strictly after `prev`, normally the current time.
pub fn after(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now();
    if now > prev {
        now
    } else {
        prev + Duration::milliseconds(1)
    }
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serde adapter for record timestamps.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

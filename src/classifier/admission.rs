//! Family-specific admission rules.
//!
//! Upstreams report rate limiting and server faults inside HTTP 200 JSON
//! bodies. Replaying such a body from cache would pin the failure to the key
//! forever, so the end-of-day family inspects the payload before admitting it.

use serde_json::Value;

use crate::config::CacheFamily;

/// The only upstream status that may be stored.
pub const CACHEABLE_STATUS: u16 = 200;

/// Upstream error code signalling rate limiting.
const RATE_LIMITED_CODE: i64 = 429;

impl CacheFamily {
    /// Decide whether a 200 response body under this family may be stored.
    pub fn admits(&self, body: &str) -> bool {
        match self {
            CacheFamily::HistoricalRates => true,
            CacheFamily::EndOfDay => !embeds_transient_error(body),
        }
    }
}

/// True if `body` is a JSON object carrying a rate-limit or 5xx `code`.
///
/// Bodies that are not JSON, not objects, or whose `code` is absent or not an
/// integer are treated as regular payloads.
pub fn embeds_transient_error(body: &str) -> bool {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return false;
    };
    match parsed.get("code").and_then(Value::as_i64) {
        Some(code) => code == RATE_LIMITED_CODE || (500..600).contains(&code),
        None => false,
    }
}

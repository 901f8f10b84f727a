//! Shared clock for expiry checks.
//!
//! Signed-claim expiry and session-row expiry are independent checks,
//! but both compare against this same source of "now".

use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix timestamp in seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

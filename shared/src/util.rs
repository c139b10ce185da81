//! Shared utility functions

use chrono::Utc;

/// Current UNIX timestamp in milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        let ts = now_millis();
        // 2024-01-01 as a sanity floor
        assert!(ts > 1_704_067_200_000);
    }

    #[test]
    fn test_now_millis_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }
}

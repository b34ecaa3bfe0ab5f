use chrono::Utc;

/// Current timestamp in seconds (Unix epoch).
pub fn current_timestamp() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_is_recent() {
        let ts = current_timestamp();
        // After 2020-01-01, before 2100-01-01.
        assert!(ts > 1_577_836_800);
        assert!(ts < 4_102_444_800);
    }
}

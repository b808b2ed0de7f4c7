use std::time::{SystemTime, UNIX_EPOCH};

/// Return the current unix timestamp in milliseconds.
pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::now_unix_millis;

    #[test]
    fn millis_are_past_2020_and_non_decreasing() {
        let first = now_unix_millis();
        let second = now_unix_millis();
        assert!(first > 1_577_836_800_000);
        assert!(second >= first);
    }
}

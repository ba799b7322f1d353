// Online/offline classification from data freshness
use chrono::{DateTime, Duration, Utc};

/// A device is online while its newest reading is younger than this.
pub const FRESHNESS_THRESHOLD_SECS: i64 = 300;

pub fn freshness_threshold() -> Duration {
    Duration::seconds(FRESHNESS_THRESHOLD_SECS)
}

/// `true` iff a latest reading exists and `now - latest < 5 minutes`.
pub fn is_online(latest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    latest.is_some_and(|timestamp| now - timestamp < freshness_threshold())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_reading_is_online() {
        let ts = now() - Duration::minutes(4) - Duration::seconds(59);
        assert!(is_online(Some(ts), now()));
    }

    #[test]
    fn test_stale_reading_is_offline() {
        let ts = now() - Duration::minutes(5) - Duration::seconds(1);
        assert!(!is_online(Some(ts), now()));
    }

    #[test]
    fn test_exact_threshold_is_offline() {
        assert!(!is_online(Some(now() - Duration::minutes(5)), now()));
    }

    #[test]
    fn test_no_reading_is_offline() {
        assert!(!is_online(None, now()));
    }
}

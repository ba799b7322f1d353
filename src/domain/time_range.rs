// Time-range resolution for dashboard queries
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// A closed `[start, end]` interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Hour1,
    Hours6,
    Day1,
    Week1,
    Month1,
    Custom {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl RangeToken {
    /// Parse a query token (`1h`, `6h`, `1d`, `1w`, `1m`, `custom`).
    /// Unrecognised tokens yield `None`, which callers treat as "no filter".
    pub fn parse(
        token: &str,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match token {
            "1h" => Some(RangeToken::Hour1),
            "6h" => Some(RangeToken::Hours6),
            "1d" => Some(RangeToken::Day1),
            "1w" => Some(RangeToken::Week1),
            "1m" => Some(RangeToken::Month1),
            "custom" => Some(RangeToken::Custom { start, end }),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeToken::Hour1 => "1h",
            RangeToken::Hours6 => "6h",
            RangeToken::Day1 => "1d",
            RangeToken::Week1 => "1w",
            RangeToken::Month1 => "1m",
            RangeToken::Custom { .. } => "custom",
        }
    }

    fn lookback(&self) -> Option<Duration> {
        match self {
            RangeToken::Hour1 => Some(Duration::hours(1)),
            RangeToken::Hours6 => Some(Duration::hours(6)),
            RangeToken::Day1 => Some(Duration::days(1)),
            RangeToken::Week1 => Some(Duration::days(7)),
            RangeToken::Month1 => Some(Duration::days(30)),
            RangeToken::Custom { .. } => None,
        }
    }

    /// Resolve the token against an explicit reference instant.
    ///
    /// Returns `None` ("no filter") for a custom range missing either bound,
    /// or whose bounds are inverted.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<Interval> {
        if let Some(lookback) = self.lookback() {
            return Some(Interval {
                start: now - lookback,
                end: now,
            });
        }
        match *self {
            RangeToken::Custom {
                start: Some(start),
                end: Some(end),
            } if start <= end => Some(Interval { start, end }),
            _ => None,
        }
    }
}

/// Resolve an optional token; an absent token means "no filter".
pub fn resolve_range(token: Option<&RangeToken>, now: DateTime<Utc>) -> Option<Interval> {
    token.and_then(|t| t.resolve(now))
}

//! Parsing of human-written durations such as `"24h"` or `"1h30m"`.
//!
//! Accepted units: `s`, `m`, `h`, `d`. Segments may be chained (`"1d12h"`).
//! A bare number is rejected so that `SESSION_EXPIRY=24` cannot silently mean
//! 24 seconds.

use chrono::Duration;

/// Error returned when a duration string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("missing unit after {0} in duration {1:?}")]
    MissingUnit(u64, String),

    #[error("unknown unit {0:?} in duration {1:?}")]
    UnknownUnit(char, String),

    #[error("expected a number in duration {0:?}")]
    MissingNumber(String),

    #[error("duration {0:?} is too large")]
    Overflow(String),

    #[error("duration {0:?} must be greater than zero")]
    Zero(String),
}

/// Parse a positive duration like `"90s"`, `"30m"`, `"24h"`, `"7d"` or `"1h30m"`.
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total_secs: i64 = 0;
    let mut chars = s.chars().peekable();

    while chars.peek().is_some() {
        let mut value: u64 = 0;
        let mut saw_digit = false;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(d)))
                .ok_or_else(|| DurationParseError::Overflow(s.to_string()))?;
            saw_digit = true;
            chars.next();
        }
        if !saw_digit {
            return Err(DurationParseError::MissingNumber(s.to_string()));
        }

        let unit = chars
            .next()
            .ok_or_else(|| DurationParseError::MissingUnit(value, s.to_string()))?;
        let multiplier: i64 = match unit {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86_400,
            other => return Err(DurationParseError::UnknownUnit(other, s.to_string())),
        };

        let segment = i64::try_from(value)
            .ok()
            .and_then(|v| v.checked_mul(multiplier))
            .ok_or_else(|| DurationParseError::Overflow(s.to_string()))?;
        total_secs = total_secs
            .checked_add(segment)
            .ok_or_else(|| DurationParseError::Overflow(s.to_string()))?;
    }

    if total_secs == 0 {
        return Err(DurationParseError::Zero(s.to_string()));
    }

    Duration::try_seconds(total_secs).ok_or_else(|| DurationParseError::Overflow(s.to_string()))
}

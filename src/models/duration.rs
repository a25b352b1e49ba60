//! Kubernetes duration values
//!
//! Flux specs carry intervals and timeouts as Go duration strings
//! (`"1m"`, `"30s"`, `"1h30m"`). `KubeDuration` parses that format and
//! serializes back to Go's canonical spelling (`"1m0s"`), so manifests
//! round-trip through the API server unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

/// Errors produced while parsing a duration string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DurationParseError {
    #[error("empty duration")]
    Empty,

    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// A non-negative duration written in Go's `time.Duration` notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KubeDuration(Duration);

impl KubeDuration {
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl From<Duration> for KubeDuration {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl From<KubeDuration> for Duration {
    fn from(duration: KubeDuration) -> Self {
        duration.0
    }
}

impl FromStr for KubeDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for KubeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

impl Serialize for KubeDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KubeDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a Go duration string such as `"1h30m"` or `"1.5s"`
pub fn parse_duration(input: &str) -> Result<Duration, DurationParseError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationParseError::Empty);
    }
    // Go accepts a bare zero without a unit
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_end == 0 {
            return Err(DurationParseError::Invalid(input.to_string()));
        }
        let (number, tail) = rest.split_at(number_end);

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);

        let unit_nanos = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SECOND,
            "m" => NANOS_PER_MINUTE,
            "h" => NANOS_PER_HOUR,
            "" => return Err(DurationParseError::MissingUnit(input.to_string())),
            other => {
                return Err(DurationParseError::UnknownUnit {
                    unit: other.to_string(),
                    input: input.to_string(),
                });
            }
        };

        let value = scale_number(number, unit_nanos)
            .ok_or_else(|| DurationParseError::Invalid(input.to_string()))?;
        total = total
            .checked_add(value)
            .ok_or_else(|| DurationParseError::Overflow(input.to_string()))?;
        rest = tail;
    }

    let secs = u64::try_from(total / NANOS_PER_SECOND)
        .map_err(|_| DurationParseError::Overflow(input.to_string()))?;
    // Remainder is always below one second
    let nanos = (total % NANOS_PER_SECOND) as u32;
    Ok(Duration::new(secs, nanos))
}

/// Multiply a decimal literal by the unit size, truncating sub-nanosecond digits
fn scale_number(number: &str, unit_nanos: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (number, ""),
    };
    if (whole.is_empty() && fraction.is_empty()) || fraction.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(unit_nanos)?;

    let mut scale = unit_nanos;
    for digit in fraction.chars() {
        let digit = u128::from(digit.to_digit(10)?);
        scale /= 10;
        value = value.checked_add(digit * scale)?;
    }
    Some(value)
}

/// Format a duration the way Go's `time.Duration.String` does
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_nanos();
    if total == 0 {
        return "0s".to_string();
    }
    if total < NANOS_PER_MICRO {
        return format!("{}ns", total);
    }
    if total < NANOS_PER_MILLI {
        return format!("{}µs", with_fraction(total, NANOS_PER_MICRO, 3));
    }
    if total < NANOS_PER_SECOND {
        return format!("{}ms", with_fraction(total, NANOS_PER_MILLI, 6));
    }

    let hours = total / NANOS_PER_HOUR;
    let minutes = (total % NANOS_PER_HOUR) / NANOS_PER_MINUTE;
    let seconds = with_fraction(total % NANOS_PER_MINUTE, NANOS_PER_SECOND, 9);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

fn with_fraction(value: u128, unit: u128, digits: usize) -> String {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", remainder, width = digits);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

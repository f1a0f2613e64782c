//! Duration parsing for config values like refresh rates.

use std::time::Duration;

use thiserror::Error;

/// Error surfaced when a duration string cannot be parsed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DurationParseError {
    #[error("invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("empty duration string")]
    EmptyString,
}

/// Parses strings like `"30s"`, `"2m"`, `"1h 30m"` into a [`Duration`].
///
/// Units: `s`, `m`, `h`, `d`. Segments accumulate, and fractional values are
/// accepted (`"1.5m"`).
pub fn parse_duration(s: &str) -> Result<Duration, DurationParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(DurationParseError::EmptyString);
    }

    let mut total = Duration::ZERO;
    let mut number = String::new();

    for ch in s.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            number.push(ch);
        } else if ch.is_whitespace() {
            continue;
        } else {
            if number.is_empty() {
                return Err(DurationParseError::InvalidFormat(
                    "expected number before unit".to_string(),
                ));
            }

            let value: f64 = number
                .parse()
                .map_err(|_| DurationParseError::InvalidNumber(number.clone()))?;

            let unit = match ch {
                's' => Duration::from_secs_f64(value),
                'm' => Duration::from_secs_f64(value * 60.0),
                'h' => Duration::from_secs_f64(value * 3600.0),
                'd' => Duration::from_secs_f64(value * 86400.0),
                _ => return Err(DurationParseError::UnknownUnit(ch.to_string())),
            };

            total += unit;
            number.clear();
        }
    }

    if !number.is_empty() {
        return Err(DurationParseError::InvalidFormat(
            "missing unit after number".to_string(),
        ));
    }

    Ok(total)
}

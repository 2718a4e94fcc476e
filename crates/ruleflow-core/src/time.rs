// crates/ruleflow-core/src/time.rs
// ============================================================================
// Module: Time Notation
// Description: Compact duration notation used by node policy configs.
// Purpose: Parse, format and (de)serialize delays and cooldowns.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Durations are written as an ordered run of `<digits><unit>` parts:
//! `y` (365 days), `w`, `d`, `h`, `m` (minutes), `s`, optionally followed by
//! bare digits read as milliseconds. Each unit appears at most once and in
//! that order, so `1d12h`, `90s`, `2m30s500` and `1500` are valid while `30s1m`
//! is not. Invalid notation is rejected rather than read as zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Milliseconds per second.
const SECOND_MILLIS: u64 = 1_000;
/// Milliseconds per minute.
const MINUTE_MILLIS: u64 = 60 * SECOND_MILLIS;
/// Milliseconds per hour.
const HOUR_MILLIS: u64 = 60 * MINUTE_MILLIS;
/// Milliseconds per day.
const DAY_MILLIS: u64 = 24 * HOUR_MILLIS;
/// Milliseconds per week.
const WEEK_MILLIS: u64 = 7 * DAY_MILLIS;
/// Milliseconds per year.
const YEAR_MILLIS: u64 = 365 * DAY_MILLIS;

/// Accepted units in their required order.
const UNITS: [(char, u64); 6] = [
    ('y', YEAR_MILLIS),
    ('w', WEEK_MILLIS),
    ('d', DAY_MILLIS),
    ('h', HOUR_MILLIS),
    ('m', MINUTE_MILLIS),
    ('s', SECOND_MILLIS),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Time notation parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeNotationError {
    /// Input was empty.
    #[error("time notation is empty")]
    Empty,
    /// Input contained an unexpected character.
    #[error("invalid time notation `{input}`: unexpected `{found}`")]
    UnexpectedChar {
        /// Full input.
        input: String,
        /// Offending character.
        found: char,
    },
    /// A unit was repeated or out of order.
    #[error("invalid time notation `{input}`: unit `{unit}` out of order")]
    OutOfOrder {
        /// Full input.
        input: String,
        /// Offending unit.
        unit: char,
    },
    /// The duration does not fit in 64-bit milliseconds.
    #[error("time notation `{0}` overflows")]
    Overflow(String),
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses time notation into a duration.
///
/// # Errors
///
/// Returns [`TimeNotationError`] when the notation is empty, malformed or
/// too large.
pub fn parse_duration(input: &str) -> Result<Duration, TimeNotationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeNotationError::Empty);
    }
    let overflow = || TimeNotationError::Overflow(trimmed.to_string());
    let mut total: u64 = 0;
    let mut next_unit = 0usize;
    let mut chars = trimmed.chars().peekable();
    while chars.peek().is_some() {
        let mut amount: u64 = 0;
        let mut digits = 0usize;
        while let Some(digit) = chars.peek().and_then(|ch| ch.to_digit(10)) {
            amount = amount.checked_mul(10).and_then(|value| value.checked_add(u64::from(digit))).ok_or_else(overflow)?;
            digits += 1;
            chars.next();
        }
        let Some(unit) = chars.next() else {
            // Bare trailing digits are milliseconds.
            total = total.checked_add(amount).ok_or_else(overflow)?;
            break;
        };
        if digits == 0 {
            return Err(TimeNotationError::UnexpectedChar {
                input: trimmed.to_string(),
                found: unit,
            });
        }
        let Some(position) = UNITS.iter().position(|(symbol, _)| *symbol == unit) else {
            return Err(TimeNotationError::UnexpectedChar {
                input: trimmed.to_string(),
                found: unit,
            });
        };
        if position < next_unit {
            return Err(TimeNotationError::OutOfOrder {
                input: trimmed.to_string(),
                unit,
            });
        }
        next_unit = position + 1;
        let millis = amount.checked_mul(UNITS[position].1).ok_or_else(overflow)?;
        total = total.checked_add(millis).ok_or_else(overflow)?;
    }
    Ok(Duration::from_millis(total))
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Formats a duration as canonical notation (`1d2h3m4s5`, `0s` for zero).
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut remaining = millis_of(duration);
    if remaining == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    for (symbol, unit_millis) in UNITS {
        let amount = remaining / unit_millis;
        if amount > 0 {
            out.push_str(&format!("{amount}{symbol}"));
            remaining %= unit_millis;
        }
    }
    if remaining > 0 {
        out.push_str(&remaining.to_string());
    }
    out
}

/// Formats a remaining time for messages, e.g. `1d2h3min4s`.
///
/// Only days down to seconds are shown; durations under a second render as
/// milliseconds (`250ms`).
#[must_use]
pub fn format_short(duration: Duration) -> String {
    let mut remaining = millis_of(duration);
    if remaining < SECOND_MILLIS {
        return format!("{remaining}ms");
    }
    let mut out = String::new();
    for (unit_millis, label) in [(DAY_MILLIS, "d"), (HOUR_MILLIS, "h"), (MINUTE_MILLIS, "min"), (SECOND_MILLIS, "s")] {
        let amount = remaining / unit_millis;
        if amount > 0 {
            out.push_str(&format!("{amount}{label}"));
            remaining %= unit_millis;
        }
    }
    out
}

/// Returns the duration in whole milliseconds, saturating.
fn millis_of(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Serde
// ============================================================================

/// Serde adapter reading notation strings or integer milliseconds.
pub mod notation {
    use super::Deserialize;
    use super::Deserializer;
    use super::Duration;
    use super::Serializer;
    use super::format_duration;
    use super::parse_duration;

    /// Raw duration forms accepted in config files.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDuration {
        /// Integer milliseconds.
        Millis(u64),
        /// Time notation.
        Text(String),
    }

    /// Serializes a duration as canonical notation.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error when writing fails.
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*duration))
    }

    /// Deserializes a duration from notation or integer milliseconds.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error when the input is not a valid duration.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match RawDuration::deserialize(deserializer)? {
            RawDuration::Millis(millis) => Ok(Duration::from_millis(millis)),
            RawDuration::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

//! Epoch helpers. Epochs are TDB seconds past J2000 (`et`).
//!
//! Calendar strings are treated as TDB calendar dates; no leap-second table
//! is involved, so UTC inputs are not supported.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::constants::{DAYS_PER_CENTURY, SECONDS_PER_DAY};

const CALENDAR_FORMATS: &[&str] = &[
    "%Y %b %d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y %b %d %H:%M",
];

/// Errors raised while interpreting epoch strings.
#[derive(Debug, Error, PartialEq)]
pub enum TimeError {
    #[error("unrecognized epoch `{0}`; expected ET seconds or a TDB calendar string")]
    Unrecognized(String),
    #[error("epoch `{0}` is outside the representable calendar range")]
    OutOfRange(String),
}

/// Convert seconds to days.
#[inline]
pub fn seconds_to_days(seconds: f64) -> f64 {
    seconds / SECONDS_PER_DAY
}

/// Julian centuries past J2000 for an ephemeris time.
#[inline]
pub fn centuries_past_j2000(et: f64) -> f64 {
    seconds_to_days(et) / DAYS_PER_CENTURY
}

fn j2000() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap_or_default()
}

/// Parse an epoch given either as ET seconds (`"271684865.15"`) or as a TDB
/// calendar string such as `"2008 AUG 11 00:00:00 TDB"` or
/// `"2008-08-11T00:00:00"`.
pub fn parse_epoch(text: &str) -> Result<f64, TimeError> {
    let trimmed = text.trim();
    if let Ok(et) = trimmed.parse::<f64>() {
        return Ok(et);
    }
    let body = trimmed
        .strip_suffix("TDB")
        .or_else(|| trimmed.strip_suffix("tdb"))
        .unwrap_or(trimmed)
        .trim();
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");

    for format in CALENDAR_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(&compact, format) {
            let delta = datetime - j2000();
            let micros = delta
                .num_microseconds()
                .ok_or_else(|| TimeError::OutOfRange(text.to_string()))?;
            return Ok(micros as f64 / 1.0e6);
        }
    }
    Err(TimeError::Unrecognized(text.to_string()))
}

/// Format an ephemeris time as a TDB calendar string, e.g.
/// `2008 AUG 11 00:00:00.000 TDB`.
pub fn format_epoch(et: f64) -> String {
    if !et.is_finite() {
        return format!("{et}");
    }
    let micros = (et * 1.0e6).round();
    if micros.abs() > i64::MAX as f64 {
        return format!("{et:.3}");
    }
    match j2000().checked_add_signed(Duration::microseconds(micros as i64)) {
        Some(datetime) => format!(
            "{} TDB",
            datetime.format("%Y %b %d %H:%M:%S%.3f").to_string().to_uppercase()
        ),
        None => format!("{et:.3}"),
    }
}

//! Conversion between hemisphere-tagged and decimal coordinates
//!
//! Sidecars store coordinates as `Degrees,Minutes.Fraction` followed by a
//! hemisphere letter, for example `35,40.0153533333N`. N and E are
//! non-negative, S and W negative.

use geotag_core::models::Axis;
use geotag_core::{GeotagError, Result};
use regex::Regex;
use std::sync::LazyLock;

static HEMISPHERE_TAGGED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+),(\d+\.\d+)([NESW])$").expect("hemisphere pattern is valid")
});

/// Decimal places kept for the minutes part when serializing
const MINUTE_DECIMALS: i32 = 10;

fn malformed(value: &str, axis: Axis, reason: impl Into<String>) -> GeotagError {
    GeotagError::MalformedCoordinate {
        value: value.to_string(),
        axis,
        reason: reason.into(),
    }
}

fn check_range(value: f64, raw: &str, axis: Axis) -> Result<f64> {
    if !value.is_finite() {
        return Err(malformed(raw, axis, "value is not a finite number"));
    }
    if value.abs() > axis.limit() {
        return Err(malformed(raw, axis, format!("outside [-{0}, {0}]", axis.limit())));
    }
    Ok(value)
}

/// Parse a hemisphere-tagged coordinate into signed decimal degrees
pub fn parse_hemisphere_tagged(s: &str, axis: Axis) -> Result<f64> {
    let caps = HEMISPHERE_TAGGED
        .captures(s)
        .ok_or_else(|| malformed(s, axis, "expected Degrees,Minutes.Fraction[NESW]"))?;

    let degrees: u32 = caps[1].parse().map_err(|_| malformed(s, axis, "degrees out of range"))?;
    let minutes: f64 = caps[2].parse().map_err(|_| malformed(s, axis, "invalid minutes"))?;
    let letter = caps[3].chars().next().unwrap_or_default();

    let (positive, negative) = axis.hemispheres();
    if letter != positive && letter != negative {
        return Err(malformed(
            s,
            axis,
            format!("hemisphere '{}' does not belong to {} (expected {} or {})", letter, axis, positive, negative),
        ));
    }
    if minutes >= 60.0 {
        return Err(malformed(s, axis, "minutes must be below 60"));
    }

    let magnitude = check_range(f64::from(degrees) + minutes / 60.0, s, axis)?;
    Ok(if letter == negative { -magnitude } else { magnitude })
}

/// Serialize signed decimal degrees as a hemisphere-tagged string
///
/// Zero, including negative zero, gets the N or E letter. The minutes part
/// always carries a fraction so the output parses back.
pub fn to_hemisphere_tagged(value: f64, axis: Axis) -> Result<String> {
    check_range(value, &value.to_string(), axis)?;

    let magnitude = value.abs();
    let mut degrees = magnitude.floor();
    let scale = 10f64.powi(MINUTE_DECIMALS);
    let mut minutes = ((magnitude - degrees) * 60.0 * scale).round() / scale;
    if minutes >= 60.0 {
        degrees += 1.0;
        minutes -= 60.0;
    }

    let (positive, negative) = axis.hemispheres();
    let letter = if value < 0.0 { negative } else { positive };

    let mut minutes_text = minutes.to_string();
    if !minutes_text.contains('.') {
        minutes_text.push_str(".0");
    }

    Ok(format!("{},{}{}", degrees as u32, minutes_text, letter))
}

/// Parse a sidecar coordinate in either hemisphere-tagged or signed decimal form
pub fn parse_coordinate(s: &str, axis: Axis) -> Result<f64> {
    let trimmed = s.trim();
    if trimmed.ends_with(|c: char| c.is_ascii_alphabetic()) {
        return parse_hemisphere_tagged(trimmed, axis);
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| malformed(s, axis, "neither hemisphere-tagged nor decimal degrees"))?;
    check_range(value, s, axis)
}

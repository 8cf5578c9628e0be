//! Utilities for parsing numeric literals with range checks.
//!
//! The datashape grammar only admits base-10 integer and float literals;
//! these helpers turn lexemes into values and report `ValueError` for
//! malformed input or range overflow.

use crate::error::{Error, Result};

/// Parse a base-10 signed integer literal.
pub fn parse_i64(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| Error::value(format!("invalid integer literal '{text}'")))
}

/// Parse a base-10 signed integer literal and check it against `[min, max]`.
pub fn parse_i64_range(text: &str, min: i64, max: i64) -> Result<i64> {
    let v = parse_i64(text)?;
    if v < min || max < v {
        return Err(Error::value(format!(
            "integer '{text}' out of range [{min}, {max}]"
        )));
    }
    Ok(v)
}

/// Parse a base-10 unsigned integer literal.
pub fn parse_u64(text: &str) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|_| Error::value(format!("invalid unsigned integer literal '{text}'")))
}

/// Parse a decimal float literal.
pub fn parse_f64(text: &str) -> Result<f64> {
    text.parse::<f64>()
        .map_err(|_| Error::value(format!("invalid float literal '{text}'")))
}

/// Parse a `true`/`false` literal.
pub fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::value(format!("invalid bool literal '{text}'"))),
    }
}

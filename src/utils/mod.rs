//! Utility functions for Foundry

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::{FoundryError, FoundryResult};

const KILOBYTE: i64 = 1024;
const MEGABYTE: i64 = KILOBYTE * 1024;
const GIGABYTE: i64 = MEGABYTE * 1024;
const TERABYTE: i64 = GIGABYTE * 1024;

static BYTES_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)([KMGT])B?$").expect("byte quantity pattern is valid"));

/// Parse a human-entered size such as `512M`, `1G` or `2GB` into megabytes
pub fn to_megabytes(quantity: &str) -> FoundryResult<i64> {
    let captures = BYTES_PATTERN
        .captures(quantity.trim())
        .ok_or_else(invalid_byte_quantity)?;

    let value: i64 = captures[1].parse().map_err(|_| invalid_byte_quantity())?;

    let unit = match captures[2].to_ascii_uppercase().as_str() {
        "T" => TERABYTE,
        "G" => GIGABYTE,
        "M" => MEGABYTE,
        _ => KILOBYTE,
    };

    let bytes = value.checked_mul(unit).ok_or_else(invalid_byte_quantity)?;
    Ok(bytes / MEGABYTE)
}

fn invalid_byte_quantity() -> FoundryError {
    FoundryError::validation(
        "Byte quantity must be a positive integer with a unit of measurement like M, MB, G, or GB",
    )
}

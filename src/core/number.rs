//! Purpose: Measure the chargeable byte size of decimal number strings.
//! Exports: `number_size`, `MAX_NUMBER_SIZE`.
//! Role: Emulates the storage engine's packed-decimal encoding, which pairs
//! digits two to a byte around the decimal point.
//! Invariants: Equal values in different spellings measure identically after
//! canonicalization, except for the dangling-point form kept by the formatter.
//! Invariants: Results are clamped to `MAX_NUMBER_SIZE`.

use crate::core::decimal::format_decimal;
use crate::core::error::Error;

/// Largest size the engine charges for a single number.
pub const MAX_NUMBER_SIZE: u64 = 21;

// Pads odd-length digit groups for pairing. Must not be a character the
// zero-trimming in `measure` would remove.
const FILLER: char = 'Z';

/// Returns the count of bytes the storage engine charges for the decimal
/// number string `input`. The value is canonicalized first, so
/// `number_size("005.10") == number_size("5.1")`.
pub fn number_size(input: &str) -> Result<u64, Error> {
    let canonical = format_decimal(input)?;
    let magnitude = canonical.strip_prefix('-').unwrap_or(&canonical);
    let mut size = measure(magnitude) + 1;
    if canonical.starts_with('-') {
        size += 1;
    }
    Ok(size.min(MAX_NUMBER_SIZE))
}

/// Measures a digit string, recursing once to re-measure the point-free
/// concatenation of the padded integer and fraction halves.
fn measure(digits: &str) -> u64 {
    if let Some((int_part, frac_part)) = digits.split_once('.') {
        let mut int_part = int_part.to_string();
        let mut frac_part = frac_part.to_string();
        if int_part == "0" {
            // Pure fraction: the integer half contributes nothing.
            int_part.clear();
            frac_part = frac_part.trim_start_matches('0').to_string();
        }
        if int_part.len() % 2 != 0 {
            int_part.insert(0, FILLER);
        }
        if frac_part.len() % 2 != 0 {
            frac_part.push(FILLER);
        }
        int_part.push_str(&frac_part);
        return measure(&int_part);
    }
    let trimmed = digits.trim_matches('0');
    (trimmed.len() as u64).div_ceil(2)
}

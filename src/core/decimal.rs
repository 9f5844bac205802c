//! Purpose: Canonicalize decimal number strings ahead of size measurement.
//! Exports: `format_decimal`.
//! Role: Digit-string front end for the packed-decimal size rules.
//! Invariants: Pure digit-string arithmetic; no floating point anywhere.
//! Invariants: Canonical output has no exponent and no leading zeros, and keeps
//! a dangling decimal point when the fraction strips to nothing (the point is
//! size-significant downstream).

use crate::core::error::{Error, ErrorKind};

// Values far outside the storable range are rejected before canonicalization
// can materialize their zero padding.
const MAX_EXPONENT_MAGNITUDE: i64 = 10_000;

/// Decomposed decimal literal: sign, significand digits, and the power of ten
/// the digit sequence is scaled by.
struct DecimalParts {
    negative: bool,
    digits: Vec<char>,
    exponent: i64,
}

/// Formats a decimal number string as a full-precision decimal string with no
/// exponent notation. Leading zeros are always trimmed; trailing zeros are
/// trimmed only after a decimal point. A zero value collapses to `"0"` with
/// no sign.
pub fn format_decimal(input: &str) -> Result<String, Error> {
    let parts = parse_decimal(input)?;
    let mut chars = parts.digits;

    if parts.exponent < 0 {
        // Prepend zeros until the full fractional part exists, then insert
        // the decimal point, counting its position from the right end.
        let frac_len = parts.exponent.unsigned_abs() as usize;
        while frac_len > chars.len() {
            chars.insert(0, '0');
        }
        chars.insert(chars.len() - frac_len, '.');
    } else {
        // One appended zero per order of magnitude.
        for _ in 0..parts.exponent {
            chars.push('0');
        }
    }

    while chars.first() == Some(&'0') {
        chars.remove(0);
    }
    if chars.contains(&'.') {
        // Stops at the point itself: "150.0" becomes "150.".
        while chars.last() == Some(&'0') {
            chars.pop();
        }
    }

    let mut value: String = chars.into_iter().collect();
    if value.is_empty() || value == "." {
        value = "0".to_string();
    }
    if parts.negative && value != "0" {
        value.insert(0, '-');
    }
    Ok(value)
}

fn parse_decimal(input: &str) -> Result<DecimalParts, Error> {
    let mut rest = input;
    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let (mantissa, exponent_text) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };

    let mut digits = Vec::new();
    let mut frac_digits = 0i64;
    let mut seen_point = false;
    for ch in mantissa.chars() {
        match ch {
            '0'..='9' => {
                digits.push(ch);
                if seen_point {
                    frac_digits += 1;
                }
            }
            '.' if !seen_point => seen_point = true,
            _ => return Err(numeric_error(input)),
        }
    }
    if digits.is_empty() {
        return Err(numeric_error(input));
    }

    let exponent = match exponent_text {
        Some(text) => text.parse::<i64>().map_err(|_| numeric_error(input))?,
        None => 0,
    };
    let exponent = exponent
        .checked_sub(frac_digits)
        .ok_or_else(|| numeric_error(input))?;
    if exponent.unsigned_abs() > MAX_EXPONENT_MAGNITUDE as u64 {
        return Err(Error::new(ErrorKind::Numeric)
            .with_message(format!("number exponent out of range: {input:?}")));
    }

    Ok(DecimalParts {
        negative,
        digits,
        exponent,
    })
}

fn numeric_error(input: &str) -> Error {
    Error::new(ErrorKind::Numeric)
        .with_message(format!("invalid decimal number string: {input:?}"))
        .with_hint("Number payloads must be plain decimal strings like \"-12.34\" or \"1.5e3\".")
}

#[cfg(test)]
mod tests {
    use super::format_decimal;

    fn fmt(input: &str) -> String {
        format_decimal(input).expect("valid decimal")
    }

    #[test]
    fn strips_leading_and_trailing_zeros() {
        assert_eq!(fmt("005.10"), "5.1");
        assert_eq!(fmt("0.5"), ".5");
        assert_eq!(fmt("00123"), "123");
    }

    #[test]
    fn expands_exponents() {
        assert_eq!(fmt("1.5e3"), "1500");
        assert_eq!(fmt("15e2"), "1500");
        assert_eq!(fmt("1e-3"), ".001");
        assert_eq!(fmt("2.5e-4"), ".00025");
    }

    #[test]
    fn keeps_dangling_point_when_fraction_strips_away() {
        assert_eq!(fmt("150.0"), "150.");
        assert_eq!(fmt("10.00"), "10.");
        assert_eq!(fmt("5.0"), "5.");
    }

    #[test]
    fn zero_forms_collapse_without_sign() {
        assert_eq!(fmt("0"), "0");
        assert_eq!(fmt("0.000"), "0");
        assert_eq!(fmt("-0"), "0");
        assert_eq!(fmt("-0.0e5"), "0");
    }

    #[test]
    fn sign_is_kept_for_negative_values() {
        assert_eq!(fmt("-12.50"), "-12.5");
        assert_eq!(fmt("-0.5"), "-.5");
    }

    #[test]
    fn thirty_eight_digit_values_stay_exact() {
        let digits = "12345678901234567890123456789012345678";
        assert_eq!(fmt(digits), digits);
    }

    #[test]
    fn rejects_invalid_syntax() {
        for input in ["", ".", "-", "+", "abc", "1.2.3", "1e", "1e+", "--1", "1 "] {
            assert!(format_decimal(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn rejects_runaway_exponents() {
        assert!(format_decimal("1e999999").is_err());
        assert!(format_decimal("1e-999999").is_err());
    }
}

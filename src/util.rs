// Utility helpers for permissive number parsing and formatting.
//
// This module centralizes the "dirty" CSV/number handling so the rest of
// the code can assume clean, typed values. Date handling lives in
// `dates.rs`.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports (commas, spaces, text).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// Like `parse_f64_safe` but collapses missing/garbage values to `0.0`,
/// which is the default the report engine uses for every numeric field.
pub fn parse_f64_or_zero(s: Option<&str>) -> f64 {
    parse_f64_safe(s).unwrap_or(0.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // First, format to a plain fixed-decimal string like `1234567.89`.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values. This is used
    // for counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_comma_separated() {
        assert_eq!(parse_f64_safe(Some("1234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("1,234,567.89")), Some(1234567.89));
        assert_eq!(parse_f64_safe(Some("  42 ")), Some(42.0));
    }

    #[test]
    fn rejects_text_and_empties() {
        assert_eq!(parse_f64_safe(None), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("   ")), None);
        assert_eq!(parse_f64_safe(Some("N/A")), None);
        assert_eq!(parse_f64_safe(Some("12 pcs")), None);
    }

    #[test]
    fn or_zero_collapses_garbage() {
        assert_eq!(parse_f64_or_zero(Some("abc")), 0.0);
        assert_eq!(parse_f64_or_zero(None), 0.0);
        assert_eq!(parse_f64_or_zero(Some("7")), 7.0);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 2), "-42.00");
        assert_eq!(format_number(0.0, 0), "0");
    }
}

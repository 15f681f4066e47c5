// Tolerant date resolution.
//
// Date cells arrive either as calendar strings in half a dozen formats or
// as raw spreadsheet serial numbers, and a fair share are blank or "N/A".
// Everything funnels through `resolve_date`, which never panics and maps
// every unusable input to `None`.
use chrono::{Datelike, Duration, NaiveDate};

/// Sanity window: anything resolving outside these years is treated as
/// unparseable rather than surfaced as a bogus date.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Calendar formats tried in order for string inputs. ISO first because
/// that is what the store emits when it behaves.
const FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Resolve a freeform date cell into a `NaiveDate`.
///
/// - Empty and "N/A" cells resolve to `None`.
/// - A bare number in `(0, 1_000_000)` with no `/`, `-` or `T` characters
///   is decoded as a spreadsheet serial date.
/// - Anything else goes through the calendar formats above; a trailing
///   `T...` time component is cut off first.
/// - Results outside the 1900..=2100 year window resolve to `None`.
pub fn resolve_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("n/a") {
        return None;
    }

    if !s.contains(['/', '-', 'T']) {
        if let Ok(v) = s.parse::<f64>() {
            if v > 0.0 && v < 1_000_000.0 {
                return from_serial(v);
            }
        }
    }

    let date_part = s.split('T').next().unwrap_or(s).trim();
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return in_window(d);
        }
    }
    None
}

/// Decode a spreadsheet serial day count. Serial 1 is 1900-01-01; serials
/// above 59 are shifted down one day to compensate for the phantom
/// 1900-02-29 that spreadsheets carry.
fn from_serial(value: f64) -> Option<NaiveDate> {
    let mut days = value.floor() as i64;
    if days > 59 {
        days -= 1;
    }
    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let date = epoch.checked_add_signed(Duration::days(days - 1))?;
    in_window(date)
}

fn in_window(d: NaiveDate) -> Option<NaiveDate> {
    if (MIN_YEAR..=MAX_YEAR).contains(&d.year()) {
        Some(d)
    } else {
        None
    }
}

/// Resolve to the ISO `YYYY-MM-DD` string the report layer renders, with
/// empty standing in for unresolvable.
pub fn resolve_date_string(raw: &str) -> String {
    resolve_date(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn serial_and_iso_agree() {
        assert_eq!(resolve_date("44927"), Some(ymd(2023, 1, 1)));
        assert_eq!(resolve_date("2023-01-01"), Some(ymd(2023, 1, 1)));
        assert_eq!(resolve_date_string("44927"), "2023-01-01");
    }

    #[test]
    fn serial_leap_bug_boundary() {
        // 59 is 1900-02-28; 60 is the phantom leap day and collapses onto
        // the 28th; 61 is 1900-03-01.
        assert_eq!(resolve_date("59"), Some(ymd(1900, 2, 28)));
        assert_eq!(resolve_date("60"), Some(ymd(1900, 2, 28)));
        assert_eq!(resolve_date("61"), Some(ymd(1900, 3, 1)));
        assert_eq!(resolve_date("1"), Some(ymd(1900, 1, 1)));
    }

    #[test]
    fn fractional_serials_floor() {
        assert_eq!(resolve_date("44927.75"), Some(ymd(2023, 1, 1)));
    }

    #[test]
    fn string_formats() {
        assert_eq!(resolve_date("2023/06/15"), Some(ymd(2023, 6, 15)));
        assert_eq!(resolve_date("15/06/2023"), Some(ymd(2023, 6, 15)));
        assert_eq!(resolve_date("15-06-2023"), Some(ymd(2023, 6, 15)));
        assert_eq!(resolve_date("2023-06-15T08:30:00"), Some(ymd(2023, 6, 15)));
    }

    #[test]
    fn unusable_inputs_resolve_to_none() {
        assert_eq!(resolve_date(""), None);
        assert_eq!(resolve_date("  "), None);
        assert_eq!(resolve_date("N/A"), None);
        assert_eq!(resolve_date("n/a"), None);
        assert_eq!(resolve_date("soon"), None);
        assert_eq!(resolve_date("0"), None);
        assert_eq!(resolve_date("-5"), None);
        assert_eq!(resolve_date("2500000"), None);
        assert_eq!(resolve_date_string("garbage"), "");
    }

    #[test]
    fn out_of_window_years_are_rejected() {
        assert_eq!(resolve_date("1850-01-01"), None);
        assert_eq!(resolve_date("2101-01-01"), None);
        assert_eq!(resolve_date("2100-12-31"), Some(ymd(2100, 12, 31)));
    }
}

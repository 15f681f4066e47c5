// Key normalization for activity/KPI matching.
//
// Names and zone tags come from free-text spreadsheet cells, so matching
// keys are built from aggressively normalized forms: lower-cased trimmed
// names, zone strings with the project-code prefix stripped, and a
// canonical zone number extracted from whatever is left.

/// Lower-cased, trimmed activity name.
pub fn normalize_name(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Normalize a zone string. Zone cells are frequently exported as
/// "<PROJECT CODE> - Zone 3"; when a project code is supplied, a leading
/// "CODE - ", "CODE " or "CODE-" prefix is stripped (case-insensitive)
/// before lower-casing.
pub fn normalize_zone(zone: &str, project_code: &str) -> String {
    let mut z = zone.trim();
    let code = project_code.trim();
    if !code.is_empty() {
        for sep in [" - ", " ", "-"] {
            let prefix_len = code.len() + sep.len();
            if z.len() >= prefix_len
                && z.is_char_boundary(code.len())
                && z.is_char_boundary(prefix_len)
                && z[..code.len()].eq_ignore_ascii_case(code)
                && z[code.len()..prefix_len] == *sep
            {
                z = z[prefix_len..].trim_start();
                break;
            }
        }
    }
    z.to_lowercase()
}

/// Extract the canonical zone number from a normalized zone string.
///
/// Priority order:
/// 1. digits following a `zone`, `zone-`, `zone_` or `zone ` marker,
/// 2. trailing digits at the end of the string,
/// 3. the first digit run anywhere,
/// 4. the string itself when it contains no digits at all.
///
/// Empty input yields empty output.
pub fn extract_zone_number(zone: &str) -> String {
    let z = zone.trim();
    if z.is_empty() {
        return String::new();
    }
    let lower = z.to_lowercase();
    let bytes = lower.as_bytes();

    // 1. "zone" marker followed by an optional separator and digits.
    let mut search_from = 0;
    while let Some(pos) = lower[search_from..].find("zone") {
        let mut i = search_from + pos + 4;
        if i < bytes.len() && matches!(bytes[i], b'-' | b'_' | b' ') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i > start {
            return lower[start..i].to_string();
        }
        search_from += pos + 4;
    }

    // 2. Trailing digits.
    let trailing_start = bytes
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map(|p| p + 1)
        .unwrap_or(0);
    if trailing_start < bytes.len() {
        return lower[trailing_start..].to_string();
    }

    // 3. First digit run anywhere.
    if let Some(start) = bytes.iter().position(|b| b.is_ascii_digit()) {
        let mut end = start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        return lower[start..end].to_string();
    }

    // 4. No digits: the normalized string stands in for the number.
    lower
}

/// Two zone strings refer to the same zone only when both sides produce a
/// non-empty extracted number and those numbers are equal. A declared zone
/// against an empty one is never a match; zone ambiguity is not resolved
/// by omission.
pub fn same_zone(a: &str, b: &str) -> bool {
    let na = extract_zone_number(a);
    let nb = extract_zone_number(b);
    !na.is_empty() && !nb.is_empty() && na == nb
}

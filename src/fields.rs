// Tolerant multi-alias field lookup over raw CSV rows.
//
// The upstream exports are hand-maintained spreadsheets, so the same
// logical column shows up as "Activity Name", "activity_name" or
// "ActivityName" depending on who exported last. Every field read goes
// through one "first non-empty of N aliases" lookup instead of ad-hoc
// per-field probing.
use std::collections::HashMap;

/// Canonical form of a header: lower-cased with everything that is not a
/// letter or digit removed. "Actual Value", "actual_value" and
/// "ActualValue" all collapse to `actualvalue`.
pub fn canon_key(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One CSV row, keyed by canonical header. When two physical headers
/// collapse to the same canonical key, the first column wins.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    values: HashMap<String, String>,
}

impl RawRow {
    pub fn from_headers(headers: &csv::StringRecord, record: &csv::StringRecord) -> Self {
        let mut values = HashMap::new();
        for (h, v) in headers.iter().zip(record.iter()) {
            let key = canon_key(h);
            if key.is_empty() {
                continue;
            }
            values.entry(key).or_insert_with(|| v.to_string());
        }
        RawRow { values }
    }

    /// First non-empty value among the given aliases, trimmed. Returns
    /// `None` when every alias is missing or blank.
    pub fn first(&self, aliases: &[&str]) -> Option<&str> {
        for alias in aliases {
            if let Some(v) = self.values.get(&canon_key(alias)) {
                let v = v.trim();
                if !v.is_empty() {
                    return Some(v);
                }
            }
        }
        None
    }

    /// Like `first` but yields an owned `String`, defaulting to empty.
    pub fn first_owned(&self, aliases: &[&str]) -> String {
        self.first(aliases).unwrap_or("").to_string()
    }

    /// Like `first` but keeps the `Option` as an owned value, for fields
    /// where "absent" and "empty" must stay distinguishable downstream.
    pub fn first_opt(&self, aliases: &[&str]) -> Option<String> {
        self.first(aliases).map(|s| s.to_string())
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut values = HashMap::new();
        for (k, v) in pairs {
            values
                .entry(canon_key(k))
                .or_insert_with(|| v.to_string());
        }
        RawRow { values }
    }
}

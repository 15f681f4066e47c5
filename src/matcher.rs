// Activity/KPI record matching.
//
// A KPI record reports progress against an activity when the normalized
// names agree (equality or containment either way), one of the four
// project-code pairings agrees, and the zone rule holds. All qualifying
// records count; there is no ranking and no tie-breaking, downstream
// aggregation sums over the whole match set.
use crate::keys::{extract_zone_number, normalize_name, normalize_zone};
use crate::types::{Activity, InputType, KpiRecord};

/// Matching keys for one activity, normalized once so a report pass does
/// not re-normalize per candidate record.
struct ActivityKey {
    name: String,
    code: String,
    full_code: String,
    zone_number: String,
}

impl ActivityKey {
    fn of(activity: &Activity) -> Self {
        let code = activity.project_code.trim().to_string();
        let full_code = activity.project_full_code.trim().to_string();
        let strip_code = if code.is_empty() { &full_code } else { &code };
        let zone = normalize_zone(&activity.zone, strip_code);
        let zone_number = if zone.is_empty() {
            String::new()
        } else {
            extract_zone_number(&zone)
        };
        ActivityKey {
            name: normalize_name(&activity.name),
            code,
            full_code,
            zone_number,
        }
    }

    fn accepts(&self, kpi: &KpiRecord) -> bool {
        // Names: both non-empty, equal or containing either way.
        if self.name.is_empty() {
            return false;
        }
        let kpi_name = normalize_name(&kpi.activity_name);
        if kpi_name.is_empty() {
            return false;
        }
        if kpi_name != self.name
            && !kpi_name.contains(&self.name)
            && !self.name.contains(&kpi_name)
        {
            return false;
        }

        // Project code: 4-way OR across short and full codes.
        let kpi_code = kpi.project_code.trim();
        let kpi_full = kpi.project_full_code.trim();
        let code_ok = kpi_code.eq_ignore_ascii_case(&self.code)
            || kpi_full.eq_ignore_ascii_case(&self.full_code)
            || kpi_code.eq_ignore_ascii_case(&self.full_code)
            || kpi_full.eq_ignore_ascii_case(&self.code);
        if !code_ok {
            return false;
        }

        // Zone: a declared activity zone requires an equal extracted zone
        // number on the record; an empty record zone never matches.
        if !self.zone_number.is_empty() {
            let strip_code = if kpi_code.is_empty() { kpi_full } else { kpi_code };
            let kpi_zone = normalize_zone(&kpi.zone, strip_code);
            if kpi_zone.is_empty() {
                return false;
            }
            if extract_zone_number(&kpi_zone) != self.zone_number {
                return false;
            }
        }

        true
    }
}

/// All KPI records reporting progress against `activity`, optionally
/// restricted to one record kind.
pub fn matched_records<'a>(
    activity: &Activity,
    kpis: &'a [KpiRecord],
    kind: Option<InputType>,
) -> Vec<&'a KpiRecord> {
    let key = ActivityKey::of(activity);
    kpis.iter()
        .filter(|k| match kind {
            Some(want) => k.input_type == Some(want),
            None => true,
        })
        .filter(|k| key.accepts(k))
        .collect()
}

/// Whether any activity in the collection claims this record. Used only
/// for report diagnostics; unmatched records are an expected steady-state
/// condition, not an error.
pub fn is_matched_by_any(kpi: &KpiRecord, activities: &[Activity]) -> bool {
    activities.iter().any(|a| ActivityKey::of(a).accepts(kpi))
}

/// Match results for one activity, partitioned by record kind in a single
/// scan of the KPI collection. Every derived-field computation in a report
/// pass consumes this partition rather than re-running the matcher.
pub struct MatchSet<'a> {
    pub planned: Vec<&'a KpiRecord>,
    pub actual: Vec<&'a KpiRecord>,
}

impl<'a> MatchSet<'a> {
    pub fn partition(activity: &Activity, kpis: &'a [KpiRecord]) -> Self {
        let key = ActivityKey::of(activity);
        let mut planned = Vec::new();
        let mut actual = Vec::new();
        for kpi in kpis {
            match kpi.input_type {
                Some(InputType::Planned) if key.accepts(kpi) => planned.push(kpi),
                Some(InputType::Actual) if key.accepts(kpi) => actual.push(kpi),
                _ => {}
            }
        }
        MatchSet { planned, actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act(name: &str, code: &str, zone: &str) -> Activity {
        Activity {
            name: name.into(),
            project_code: code.into(),
            project_full_code: format!("{code}-FULL"),
            zone: zone.into(),
            ..Default::default()
        }
    }

    fn kpi(name: &str, code: &str, zone: &str, kind: &str) -> KpiRecord {
        KpiRecord {
            activity_name: name.into(),
            project_code: code.into(),
            project_full_code: String::new(),
            zone: zone.into(),
            input_type: InputType::parse(kind),
            quantity: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn exact_and_substring_names_match() {
        let a = act("Excavation Works", "PRJ", "");
        let kpis = vec![
            kpi("excavation works", "PRJ", "", "Actual"),
            kpi("Excavation", "PRJ", "", "Actual"),
            kpi("Site Excavation Works Phase 1", "PRJ", "", "Actual"),
            kpi("Concrete Pour", "PRJ", "", "Actual"),
        ];
        let m = matched_records(&a, &kpis, None);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn empty_names_never_match() {
        let a = act("", "PRJ", "");
        let kpis = vec![kpi("", "PRJ", "", "Actual")];
        assert!(matched_records(&a, &kpis, None).is_empty());
    }

    #[test]
    fn project_code_four_way_or() {
        let a = act("Excavation", "PRJ", "");
        // short==short, full==full, short==full, full==short
        let mut cross = kpi("Excavation", "", "", "Actual");
        cross.project_full_code = "PRJ".into();
        let kpis = vec![
            kpi("Excavation", "PRJ", "", "Actual"),
            kpi("Excavation", "PRJ-FULL", "", "Actual"),
            cross,
            kpi("Excavation", "OTHER", "", "Actual"),
        ];
        let m = matched_records(&a, &kpis, None);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn zone_isolation() {
        let a = act("Excavation", "PRJ", "Zone 3");
        let kpis = vec![
            kpi("Excavation", "PRJ", "Zone 2", "Actual"),
            kpi("Excavation", "PRJ", "PRJ - Zone 3", "Actual"),
            kpi("Excavation", "PRJ", "zone-3", "Actual"),
        ];
        let m = matched_records(&a, &kpis, None);
        assert_eq!(m.len(), 2);
        assert!(m.iter().all(|k| !k.zone.contains("Zone 2")));
    }

    #[test]
    fn declared_zone_rejects_empty_record_zone() {
        let a = act("Excavation", "PRJ", "Zone 3");
        let kpis = vec![kpi("Excavation", "PRJ", "", "Actual")];
        assert!(matched_records(&a, &kpis, None).is_empty());
    }

    #[test]
    fn empty_activity_zone_accepts_any_record_zone() {
        let a = act("Excavation", "PRJ", "");
        let kpis = vec![
            kpi("Excavation", "PRJ", "Zone 9", "Actual"),
            kpi("Excavation", "PRJ", "", "Actual"),
        ];
        assert_eq!(matched_records(&a, &kpis, None).len(), 2);
    }

    #[test]
    fn kind_filter_is_case_insensitive_at_parse() {
        let a = act("Excavation", "PRJ", "");
        let kpis = vec![
            kpi("Excavation", "PRJ", "", "ACTUAL"),
            kpi("Excavation", "PRJ", "", "planned"),
            kpi("Excavation", "PRJ", "", "milestone"),
        ];
        assert_eq!(matched_records(&a, &kpis, Some(InputType::Actual)).len(), 1);
        assert_eq!(matched_records(&a, &kpis, Some(InputType::Planned)).len(), 1);
        // untyped records still appear in unfiltered matches
        assert_eq!(matched_records(&a, &kpis, None).len(), 3);
    }

    #[test]
    fn partition_agrees_with_filtered_matching() {
        let a = act("Excavation", "PRJ", "Zone 1");
        let kpis = vec![
            kpi("Excavation", "PRJ", "Zone 1", "Planned"),
            kpi("Excavation", "PRJ", "Zone 1", "Actual"),
            kpi("Excavation", "PRJ", "Zone 2", "Actual"),
        ];
        let set = MatchSet::partition(&a, &kpis);
        assert_eq!(
            set.planned.len(),
            matched_records(&a, &kpis, Some(InputType::Planned)).len()
        );
        assert_eq!(
            set.actual.len(),
            matched_records(&a, &kpis, Some(InputType::Actual)).len()
        );
    }
}

// Per-activity derivation: actual quantities, earned value, the four
// planned/actual range dates, percent-complete and status.
//
// Everything here is a total function of (activity, kpi snapshot). Nothing
// is persisted, nothing throws; bad cells degrade to 0 or an empty date
// and the pass keeps going.
use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{resolve_date, resolve_date_string};
use crate::matcher::MatchSet;
use crate::types::{Activity, ActivityStatus, DerivedActivity, KpiRecord};
use crate::util::parse_f64_or_zero;

/// Date columns a KPI record may carry, in the orders the extractors
/// prefer them.
#[derive(Debug, Clone, Copy)]
enum DateField {
    Activity,
    Target,
    Actual,
    Generic,
}

fn field_raw<'a>(kpi: &'a KpiRecord, field: DateField) -> Option<&'a str> {
    match field {
        DateField::Activity => kpi.activity_date.as_deref(),
        DateField::Target => kpi.target_date.as_deref(),
        DateField::Actual => kpi.actual_date.as_deref(),
        DateField::Generic => kpi.date.as_deref(),
    }
}

/// First preferred date column on this record that resolves to a real
/// calendar date.
fn record_date(kpi: &KpiRecord, prefs: &[DateField]) -> Option<NaiveDate> {
    prefs
        .iter()
        .find_map(|f| field_raw(kpi, *f).and_then(resolve_date))
}

fn earliest(records: &[&KpiRecord], prefs: &[DateField]) -> Option<NaiveDate> {
    records.iter().filter_map(|k| record_date(k, prefs)).min()
}

fn latest(records: &[&KpiRecord], prefs: &[DateField]) -> Option<NaiveDate> {
    records.iter().filter_map(|k| record_date(k, prefs)).max()
}

fn iso(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Resolve an activity-level fallback date cell, empty when unusable.
fn activity_date_fallback(raw: &Option<String>) -> String {
    resolve_date_string(raw.as_deref().unwrap_or(""))
}

/// Sum of matched Actual quantities. The cached figure on the activity is
/// consulted only when the KPI collection is empty *overall*; an activity
/// with zero matches against a non-empty collection genuinely has zero
/// actual units.
pub fn actual_units(activity: &Activity, set: &MatchSet, collection_empty: bool) -> f64 {
    if collection_empty {
        debug!(activity = %activity.name, "empty KPI collection, using cached actual units");
        return activity.cached_actual_units;
    }
    set.actual.iter().map(|k| k.quantity).sum()
}

/// Monetary contribution of one Actual record: the first pricing tier
/// yielding a positive number wins and lower tiers are not consulted.
fn record_contribution(activity: &Activity, kpi: &KpiRecord) -> f64 {
    // Tier 1: rate x quantity, with the rate derived from totals when
    // both are usable.
    let rate = if activity.total_value > 0.0 && activity.total_units > 0.0 {
        activity.total_value / activity.total_units
    } else {
        activity.rate
    };
    let by_rate = rate * kpi.quantity;
    if by_rate > 0.0 {
        return by_rate;
    }
    // Tier 2: the record's direct monetary value.
    let direct = parse_f64_or_zero(kpi.value.as_deref());
    if direct > 0.0 {
        return direct;
    }
    // Tier 3: the secondary actual-value column.
    let actual = parse_f64_or_zero(kpi.actual_value.as_deref());
    if actual > 0.0 {
        return actual;
    }
    0.0
}

/// Earned value across matched Actual records, with the same overall-empty
/// cached fallback as `actual_units`.
pub fn earned_value(activity: &Activity, set: &MatchSet, collection_empty: bool) -> f64 {
    if collection_empty {
        debug!(activity = %activity.name, "empty KPI collection, using cached earned value");
        return activity.cached_earned_value;
    }
    set.actual
        .iter()
        .map(|k| record_contribution(activity, k))
        .sum()
}

/// Earliest planned date: activity date preferred, generic date otherwise;
/// falls back to the activity's own planned-start cell.
pub fn planned_start(activity: &Activity, set: &MatchSet) -> String {
    match earliest(&set.planned, &[DateField::Activity, DateField::Generic]) {
        Some(d) => iso(Some(d)),
        None => activity_date_fallback(&activity.planned_start),
    }
}

/// Latest planned date: target date preferred, then activity date, then
/// generic; falls back to the deadline cell.
pub fn planned_end(activity: &Activity, set: &MatchSet) -> String {
    match latest(
        &set.planned,
        &[DateField::Target, DateField::Activity, DateField::Generic],
    ) {
        Some(d) => iso(Some(d)),
        None => activity_date_fallback(&activity.deadline),
    }
}

/// Earliest actual date, falling back to the activity's actual-start cell.
pub fn actual_start(activity: &Activity, set: &MatchSet) -> String {
    match earliest(&set.actual, &[DateField::Activity, DateField::Generic]) {
        Some(d) => iso(Some(d)),
        None => activity_date_fallback(&activity.actual_start),
    }
}

/// Latest actual date. An activity with no actual start cannot have
/// finished, so this is forced empty whenever `actual_start` is empty; the
/// deadline cell is never consulted here because it is a planned date.
pub fn actual_end(activity: &Activity, set: &MatchSet, actual_start: &str) -> String {
    if actual_start.is_empty() {
        return String::new();
    }
    match latest(
        &set.actual,
        &[
            DateField::Actual,
            DateField::Activity,
            DateField::Target,
            DateField::Generic,
        ],
    ) {
        Some(d) => iso(Some(d)),
        None => activity_date_fallback(&activity.actual_completion),
    }
}

/// Percent complete, uncapped: over-performance stays visible.
pub fn progress_pct(actual_units: f64, planned_units: f64) -> f64 {
    if planned_units > 0.0 {
        actual_units / planned_units * 100.0
    } else {
        0.0
    }
}

/// Fixed-priority status decision table. The ordering is the tie-break;
/// exactly one status comes out for any (progress, actual-start) pair.
pub fn classify(progress: f64, actual_start_empty: bool) -> ActivityStatus {
    if progress < 0.1 && actual_start_empty {
        ActivityStatus::NotStarted
    } else if progress >= 100.0 {
        ActivityStatus::Completed
    } else if progress < 50.0 && !actual_start_empty {
        ActivityStatus::Delayed
    } else if (50.0..100.0).contains(&progress) {
        ActivityStatus::OnTrack
    } else {
        ActivityStatus::InProgress
    }
}

/// Run the whole derivation for one activity against one KPI snapshot.
/// The match partition is computed once and shared by every field.
pub fn derive_activity(activity: &Activity, kpis: &[KpiRecord]) -> DerivedActivity {
    let set = MatchSet::partition(activity, kpis);
    let collection_empty = kpis.is_empty();

    let actual_units = actual_units(activity, &set, collection_empty);
    let earned_value = earned_value(activity, &set, collection_empty);
    let planned_start = planned_start(activity, &set);
    let planned_end = planned_end(activity, &set);
    let actual_start = actual_start(activity, &set);
    let actual_end = actual_end(activity, &set, &actual_start);
    let progress_pct = progress_pct(actual_units, activity.planned_units);
    let status = classify(progress_pct, actual_start.is_empty());

    DerivedActivity {
        actual_units,
        earned_value,
        progress_pct,
        status,
        planned_start,
        planned_end,
        actual_start,
        actual_end,
    }
}

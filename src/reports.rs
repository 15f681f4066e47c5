// Report assembly: one derived row per activity plus folded totals.
//
// Totals are produced by summing the per-row derived values, never by a
// second computation path, so any exported view and the aggregate line
// agree field by field.
use crate::engine::{self, derive_activity};
use crate::matcher::is_matched_by_any;
use crate::types::{
    Activity, ActivityReportRow, DerivedActivity, KpiRecord, ReportTotals, SummaryStats,
};
use crate::util::format_number;

/// A full report pass over one (activities, kpis) snapshot.
pub struct KpiReport {
    pub rows: Vec<ActivityReportRow>,
    pub derived: Vec<DerivedActivity>,
    pub totals: ReportTotals,
}

fn display_row(activity: &Activity, d: &DerivedActivity) -> ActivityReportRow {
    ActivityReportRow {
        activity: activity.name.clone(),
        project: if activity.project_code.is_empty() {
            activity.project_full_code.clone()
        } else {
            activity.project_code.clone()
        },
        zone: activity.zone.clone(),
        unit: activity.unit.clone(),
        planned_units: format_number(activity.planned_units, 2),
        actual_units: format_number(d.actual_units, 2),
        earned_value: format_number(d.earned_value, 2),
        progress: format!("{:.2}%", d.progress_pct),
        status: d.status.to_string(),
        planned_start: d.planned_start.clone(),
        planned_end: d.planned_end.clone(),
        actual_start: d.actual_start.clone(),
        actual_end: d.actual_end.clone(),
    }
}

pub fn build_report(activities: &[Activity], kpis: &[KpiRecord]) -> KpiReport {
    let mut rows = Vec::with_capacity(activities.len());
    let mut derived = Vec::with_capacity(activities.len());
    let mut totals = ReportTotals::default();

    for activity in activities {
        let d = derive_activity(activity, kpis);
        totals.total_units += activity.total_units;
        totals.planned_units += activity.planned_units;
        totals.total_value += activity.total_value;
        totals.planned_value += activity.planned_value;
        totals.actual_units += d.actual_units;
        totals.earned_value += d.earned_value;
        rows.push(display_row(activity, &d));
        derived.push(d);
    }

    KpiReport {
        rows,
        derived,
        totals,
    }
}

pub fn generate_summary(
    activities: &[Activity],
    kpis: &[KpiRecord],
    report: &KpiReport,
) -> SummaryStats {
    let matched_record_count = kpis
        .iter()
        .filter(|k| is_matched_by_any(k, activities))
        .count();
    SummaryStats {
        activity_count: activities.len(),
        kpi_record_count: kpis.len(),
        matched_record_count,
        totals: report.totals.clone(),
        overall_progress_pct: engine::progress_pct(
            report.totals.actual_units,
            report.totals.planned_units,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InputType;

    fn act(name: &str, zone: &str, planned_units: f64, rate: f64) -> Activity {
        Activity {
            name: name.into(),
            project_code: "PRJ".into(),
            zone: zone.into(),
            planned_units,
            rate,
            total_units: planned_units,
            total_value: planned_units * rate,
            planned_value: planned_units * rate,
            ..Default::default()
        }
    }

    fn actual_kpi(name: &str, zone: &str, quantity: f64) -> KpiRecord {
        KpiRecord {
            activity_name: name.into(),
            project_code: "PRJ".into(),
            zone: zone.into(),
            input_type: Some(InputType::Actual),
            quantity,
            activity_date: Some("2023-02-01".into()),
            ..Default::default()
        }
    }

    fn fixture() -> (Vec<Activity>, Vec<KpiRecord>) {
        let activities = vec![
            act("Excavation", "Zone 1", 100.0, 10.0),
            act("Excavation", "Zone 2", 200.0, 10.0),
            act("Roofing", "", 50.0, 40.0),
        ];
        let kpis = vec![
            actual_kpi("Excavation", "Zone 1", 40.0),
            actual_kpi("Excavation", "Zone 2", 150.0),
            actual_kpi("Roofing", "", 25.0),
            actual_kpi("Unknown Works", "", 99.0),
        ];
        (activities, kpis)
    }

    #[test]
    fn totals_equal_sum_of_rows() {
        let (activities, kpis) = fixture();
        let report = build_report(&activities, &kpis);
        let sum_actual: f64 = report.derived.iter().map(|d| d.actual_units).sum();
        let sum_earned: f64 = report.derived.iter().map(|d| d.earned_value).sum();
        assert_eq!(report.totals.actual_units, sum_actual);
        assert_eq!(report.totals.earned_value, sum_earned);
        let sum_planned: f64 = activities.iter().map(|a| a.planned_units).sum();
        assert_eq!(report.totals.planned_units, sum_planned);
    }

    #[test]
    fn zone_contamination_stays_out_of_totals() {
        let (activities, kpis) = fixture();
        let report = build_report(&activities, &kpis);
        // 40 + 150 + 25; the unmatched 99 never appears
        assert_eq!(report.totals.actual_units, 215.0);
        assert_eq!(report.derived[0].actual_units, 40.0);
        assert_eq!(report.derived[1].actual_units, 150.0);
    }

    #[test]
    fn repeated_passes_are_identical() {
        let (activities, kpis) = fixture();
        let r1 = build_report(&activities, &kpis);
        let r2 = build_report(&activities, &kpis);
        assert_eq!(r1.rows, r2.rows);
        assert_eq!(r1.totals, r2.totals);
    }

    #[test]
    fn summary_counts_matched_records_once() {
        let (activities, kpis) = fixture();
        let report = build_report(&activities, &kpis);
        let summary = generate_summary(&activities, &kpis, &report);
        assert_eq!(summary.activity_count, 3);
        assert_eq!(summary.kpi_record_count, 4);
        assert_eq!(summary.matched_record_count, 3);
        assert_eq!(summary.overall_progress_pct, 215.0 / 350.0 * 100.0);
    }

    #[test]
    fn rows_render_formatted_fields() {
        let (activities, kpis) = fixture();
        let report = build_report(&activities, &kpis);
        let row = &report.rows[0];
        assert_eq!(row.activity, "Excavation");
        assert_eq!(row.actual_units, "40.00");
        assert_eq!(row.earned_value, "400.00");
        assert_eq!(row.progress, "40.00%");
        assert_eq!(row.status, "Delayed");
        assert_eq!(row.actual_start, "2023-02-01");
    }
}

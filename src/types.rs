use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// A contracted BOQ line item. Loaded once from the store and treated as
/// an immutable snapshot; every derived figure is recomputed from it on
/// demand, never written back.
#[derive(Debug, Clone, Default)]
pub struct Activity {
    pub name: String,
    pub project_code: String,
    pub project_full_code: String,
    pub zone: String,
    pub unit: String,
    pub rate: f64,
    pub total_units: f64,
    pub planned_units: f64,
    pub total_value: f64,
    pub planned_value: f64,
    /// Stale cached figures carried by the store; used only as a
    /// last-resort fallback when the KPI collection is empty overall.
    pub cached_actual_units: f64,
    pub cached_earned_value: f64,
    /// Raw date cells used as fallbacks when no KPI record resolves a
    /// date for the corresponding range endpoint.
    pub planned_start: Option<String>,
    pub deadline: Option<String>,
    pub actual_start: Option<String>,
    pub actual_completion: Option<String>,
}

/// Planned/Actual discriminator on a KPI record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Planned,
    Actual,
}

impl InputType {
    /// Case-insensitive parse; anything other than planned/actual is
    /// treated as untyped and excluded from kind-filtered matching.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("planned") {
            Some(InputType::Planned)
        } else if s.eq_ignore_ascii_case("actual") {
            Some(InputType::Actual)
        } else {
            None
        }
    }
}

/// One progress log entry. Date and money cells stay raw strings here;
/// the engine resolves them lazily so a garbage cell in one column never
/// poisons the rest of the record.
#[derive(Debug, Clone, Default)]
pub struct KpiRecord {
    pub project_code: String,
    pub project_full_code: String,
    pub zone: String,
    pub activity_name: String,
    pub input_type: Option<InputType>,
    pub quantity: f64,
    pub value: Option<String>,
    pub actual_value: Option<String>,
    pub activity_date: Option<String>,
    pub target_date: Option<String>,
    pub actual_date: Option<String>,
    pub date: Option<String>,
}

/// Status classification produced by the fixed-priority decision table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Completed,
    Delayed,
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActivityStatus::NotStarted => "Not Started",
            ActivityStatus::Completed => "Completed",
            ActivityStatus::Delayed => "Delayed",
            ActivityStatus::OnTrack => "On Track",
            ActivityStatus::InProgress => "In Progress",
        };
        f.write_str(s)
    }
}

/// Derived figures for one activity within one report pass. Plain data;
/// formatting belongs to the report rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedActivity {
    pub actual_units: f64,
    pub earned_value: f64,
    pub progress_pct: f64,
    pub status: ActivityStatus,
    pub planned_start: String,
    pub planned_end: String,
    pub actual_start: String,
    pub actual_end: String,
}

/// One exported/previewed report row, everything pre-formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ActivityReportRow {
    #[serde(rename = "Activity")]
    #[tabled(rename = "Activity")]
    pub activity: String,
    #[serde(rename = "Project")]
    #[tabled(rename = "Project")]
    pub project: String,
    #[serde(rename = "Zone")]
    #[tabled(rename = "Zone")]
    pub zone: String,
    #[serde(rename = "Unit")]
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "PlannedUnits")]
    #[tabled(rename = "PlannedUnits")]
    pub planned_units: String,
    #[serde(rename = "ActualUnits")]
    #[tabled(rename = "ActualUnits")]
    pub actual_units: String,
    #[serde(rename = "EarnedValue")]
    #[tabled(rename = "EarnedValue")]
    pub earned_value: String,
    #[serde(rename = "Progress")]
    #[tabled(rename = "Progress")]
    pub progress: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "PlannedStart")]
    #[tabled(rename = "PlannedStart")]
    pub planned_start: String,
    #[serde(rename = "PlannedEnd")]
    #[tabled(rename = "PlannedEnd")]
    pub planned_end: String,
    #[serde(rename = "ActualStart")]
    #[tabled(rename = "ActualStart")]
    pub actual_start: String,
    #[serde(rename = "ActualEnd")]
    #[tabled(rename = "ActualEnd")]
    pub actual_end: String,
}

/// Report-level totals, folded from the per-row derived values. There is
/// deliberately no second computation path for these.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportTotals {
    pub total_units: f64,
    pub planned_units: f64,
    pub actual_units: f64,
    pub total_value: f64,
    pub planned_value: f64,
    pub earned_value: f64,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub activity_count: usize,
    pub kpi_record_count: usize,
    pub matched_record_count: usize,
    pub totals: ReportTotals,
    pub overall_progress_pct: f64,
}

// CSV ingestion for the two snapshots the engine consumes.
//
// Both files are hand-maintained exports, so every cell goes through the
// alias lookup in `fields.rs` and the permissive parsers in `util.rs`.
// A row missing its identity (the activity name) is skipped and counted;
// everything else degrades to 0/empty rather than failing the load.
use csv::ReaderBuilder;
use thiserror::Error;
use tracing::warn;

use crate::fields::RawRow;
use crate::types::{Activity, InputType, KpiRecord};
use crate::util::parse_f64_or_zero;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read headers from {path}: {source}")]
    Headers {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Diagnostics for one loaded file, printed by the CLI shell.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub skipped_rows: usize,
}

fn read_rows(path: &str) -> Result<(Vec<RawRow>, usize, usize), LoadError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|source| LoadError::Open {
            path: path.to_string(),
            source,
        })?;
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Headers {
            path: path.to_string(),
            source,
        })?
        .clone();

    let mut rows = Vec::new();
    let mut total = 0usize;
    let mut unreadable = 0usize;
    for result in rdr.records() {
        total += 1;
        match result {
            Ok(record) => rows.push(RawRow::from_headers(&headers, &record)),
            Err(e) => {
                unreadable += 1;
                warn!(path, row = total, error = %e, "skipping unreadable CSV row");
            }
        }
    }
    Ok((rows, total, unreadable))
}

pub fn load_activities(path: &str) -> Result<(Vec<Activity>, LoadReport), LoadError> {
    let (rows, total_rows, unreadable) = read_rows(path)?;
    let mut out = Vec::new();
    let mut skipped = unreadable;

    for row in rows {
        let name = row.first_owned(&["Activity Name", "Activity", "Name"]);
        if name.is_empty() {
            skipped += 1;
            continue;
        }
        out.push(Activity {
            name,
            project_code: row.first_owned(&["Project Code", "Project"]),
            project_full_code: row.first_owned(&["Project Full Code", "Full Code"]),
            zone: row.first_owned(&["Zone", "Zone Ref"]),
            unit: row.first_owned(&["Unit"]),
            rate: parse_f64_or_zero(row.first(&["Rate", "Unit Rate"])),
            total_units: parse_f64_or_zero(row.first(&["Total Units", "Total Qty", "BOQ Qty"])),
            planned_units: parse_f64_or_zero(row.first(&["Planned Units", "Planned Qty"])),
            total_value: parse_f64_or_zero(row.first(&["Total Value", "Total Amount"])),
            planned_value: parse_f64_or_zero(row.first(&["Planned Value"])),
            cached_actual_units: parse_f64_or_zero(row.first(&["Actual Units"])),
            cached_earned_value: parse_f64_or_zero(row.first(&["Earned Value"])),
            planned_start: row.first_opt(&["Planned Start", "Start Date"]),
            deadline: row.first_opt(&["Deadline", "Planned Completion"]),
            actual_start: row.first_opt(&["Actual Start"]),
            actual_completion: row.first_opt(&["Actual Completion", "Actual End"]),
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: out.len(),
        skipped_rows: skipped,
    };
    Ok((out, report))
}

pub fn load_kpi_records(path: &str) -> Result<(Vec<KpiRecord>, LoadReport), LoadError> {
    let (rows, total_rows, unreadable) = read_rows(path)?;
    let mut out = Vec::new();
    let mut skipped = unreadable;

    for row in rows {
        let activity_name = row.first_owned(&["Activity Name", "Activity", "KPI Activity"]);
        if activity_name.is_empty() {
            skipped += 1;
            continue;
        }
        let input_type = row
            .first(&["Input Type", "Type"])
            .and_then(InputType::parse);
        out.push(KpiRecord {
            project_code: row.first_owned(&["Project Code", "Project"]),
            project_full_code: row.first_owned(&["Project Full Code", "Full Code"]),
            zone: row.first_owned(&["Zone"]),
            activity_name,
            input_type,
            quantity: parse_f64_or_zero(row.first(&["Quantity", "Qty"])),
            value: row.first_opt(&["Value", "Amount"]),
            actual_value: row.first_opt(&["Actual Value"]),
            activity_date: row.first_opt(&["Activity Date"]),
            target_date: row.first_opt(&["Target Date"]),
            actual_date: row.first_opt(&["Actual Date"]),
            date: row.first_opt(&["Date"]),
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: out.len(),
        skipped_rows: skipped,
    };
    Ok((out, report))
}

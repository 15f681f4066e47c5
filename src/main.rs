// Entry point and high-level CLI flow.
//
// - Option [1] loads the activity and KPI snapshots, printing diagnostics.
// - Option [2] runs a full reconciliation pass, exports the per-activity
//   report as CSV plus a JSON summary, and previews the first rows.
// - After generating the report, the user can go back to the menu or exit.
mod dates;
mod engine;
mod fields;
mod keys;
mod loader;
mod matcher;
mod output;
mod reports;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::{Activity, KpiRecord};

const ACTIVITIES_FILE: &str = "activities.csv";
const KPI_RECORDS_FILE: &str = "kpi_records.csv";
const REPORT_FILE: &str = "kpi_report.csv";
const SUMMARY_FILE: &str = "kpi_summary.json";

// Simple in-memory app state so we load the snapshots once but can rerun
// the report pass multiple times in a single session. A fresh load
// replaces both collections wholesale; there is no incremental update.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        activities: None,
        kpis: None,
    })
});

struct AppState {
    activities: Option<Vec<Activity>>,
    kpis: Option<Vec<KpiRecord>>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the menu after generating a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load both CSV snapshots.
fn handle_load() {
    let activities = match loader::load_activities(ACTIVITIES_FILE) {
        Ok((data, report)) => {
            println!(
                "Activities: {} rows read, {} kept, {} skipped.",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64),
                util::format_int(report.skipped_rows as i64)
            );
            data
        }
        Err(e) => {
            eprintln!("Failed to load activities: {}\n", e);
            return;
        }
    };
    let kpis = match loader::load_kpi_records(KPI_RECORDS_FILE) {
        Ok((data, report)) => {
            println!(
                "KPI records: {} rows read, {} kept, {} skipped.\n",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64),
                util::format_int(report.skipped_rows as i64)
            );
            data
        }
        Err(e) => {
            eprintln!("Failed to load KPI records: {}\n", e);
            return;
        }
    };
    info!(
        activities = activities.len(),
        kpi_records = kpis.len(),
        "snapshots loaded"
    );
    let mut state = APP_STATE.lock().unwrap();
    state.activities = Some(activities);
    state.kpis = Some(kpis);
}

/// Handle option [2]: run the reconciliation pass and export the report.
fn handle_generate_report() {
    let (activities, kpis) = {
        let state = APP_STATE.lock().unwrap();
        (state.activities.clone(), state.kpis.clone())
    };
    let (Some(activities), Some(kpis)) = (activities, kpis) else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    println!("Generating KPI report...");
    let report = reports::build_report(&activities, &kpis);
    if let Err(e) = output::write_csv(REPORT_FILE, &report.rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Activity Earned-Value Report\n");
    output::preview_table_rows(&report.rows, 5);
    println!("(Full table exported to {})\n", REPORT_FILE);

    let summary = reports::generate_summary(&activities, &kpis, &report);
    if let Err(e) = output::write_json(SUMMARY_FILE, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Totals ({}):", SUMMARY_FILE);
    println!(
        "  planned units {} | actual units {} | earned value {} | overall progress {:.2}%",
        util::format_number(report.totals.planned_units, 2),
        util::format_number(report.totals.actual_units, 2),
        util::format_number(report.totals.earned_value, 2),
        summary.overall_progress_pct
    );
    println!(
        "  {} of {} KPI records matched an activity\n",
        util::format_int(summary.matched_record_count as i64),
        util::format_int(summary.kpi_record_count as i64)
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    loop {
        println!("Activity KPI Report:");
        println!("[1] Load the files");
        println!("[2] Generate Report\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}

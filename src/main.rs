// Entry point and high-level CLI flow.
//
// - Option [1] loads the CSV (or generates sample data), applies the
//   command-line filters and hands the rows to the analyzer.
// - Option [2] generates the report, prints previews and exports files.
// - After generating reports, the user can go back to the menu or exit.
use clap::Parser;
use complaints_report::analyzer::CATEGORY_COLUMN;
use complaints_report::config::CliOptions;
use complaints_report::filter::{CATEGORY_FILTER_COLUMN, STATUS_FILTER_COLUMN};
use complaints_report::types::{AnalysisReport, VolumeAnalysis};
use complaints_report::{loader, output, reports, sample, util};
use complaints_report::{ComplaintsAnalyzer, RecordFilter, RecordSet};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;

// One analyzer for the whole run, so data is loaded once but reports can be
// generated repeatedly.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        analyzer: ComplaintsAnalyzer::default(),
    })
});

struct AppState {
    analyzer: ComplaintsAnalyzer,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn record_filter(opts: &CliOptions) -> RecordFilter {
    RecordFilter {
        date_from: opts.from,
        date_to: opts.to,
        categories: opts.categories.clone(),
        statuses: opts.statuses.clone(),
    }
}

fn acquire_records(opts: &CliOptions) -> complaints_report::AnalysisResult<RecordSet> {
    if opts.sample {
        let data = sample::generate_sample(opts.records, opts.seed)?;
        println!(
            "Generated sample dataset ({} records, seed {})",
            util::format_int(data.len()),
            opts.seed
        );
        return Ok(data);
    }
    let (data, load_report) = loader::load_csv(&opts.input)?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows)
    );
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse errors.",
            util::format_int(load_report.parse_errors)
        );
    }
    if load_report.ragged_rows > 0 {
        println!(
            "Info: {} rows had a different field count than the header.",
            util::format_int(load_report.ragged_rows)
        );
    }
    Ok(data)
}

/// Handle option [1]: load (or generate), filter and hand to the analyzer.
fn handle_load(opts: &CliOptions) {
    let result = acquire_records(opts).and_then(|data| {
        let filter = record_filter(opts);
        let filtered = filter.apply(&data)?;
        if !filter.is_empty() {
            println!(
                "Filters applied: {} of {} rows kept.",
                util::format_int(filtered.len()),
                util::format_int(data.len())
            );
        }
        Ok(filtered)
    });
    match result {
        Ok(data) => {
            println!();
            let mut state = match APP_STATE.lock() {
                Ok(s) => s,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.analyzer.load(data);
        }
        Err(e) => eprintln!("Failed to load data: {}\n", e),
    }
}

fn print_summary(report: &AnalysisReport) {
    let ov = &report.data_overview;
    println!("Summary Stats:");
    println!(
        "  complaints: {}, columns: {}, est. memory: {} MB",
        util::format_int(ov.total_complaints),
        ov.total_columns,
        util::format_number(ov.memory_usage_mb, 3)
    );
    match &report.complaint_volume {
        VolumeAnalysis::Monthly(m) => println!(
            "  peak month: {}",
            m.peak_month.as_deref().unwrap_or("n/a")
        ),
        VolumeAnalysis::NoDateColumn => println!("  peak month: (no date column)"),
    }
    match &report.resolution_time {
        Some(r) => println!(
            "  resolution days ({} -> {}): mean {}, median {}, std {}",
            r.submitted_column,
            r.resolved_column,
            util::format_opt(r.mean_resolution_days, 2),
            util::format_opt(r.median_resolution_days, 2),
            util::format_opt(r.std_resolution_days, 2)
        ),
        None => println!("  resolution days: (no submitted/resolved date pair)"),
    }
    println!();
}

/// Handle option [2]: generate the report, preview it and export files.
fn handle_generate_reports(opts: &CliOptions) {
    let mut state = match APP_STATE.lock() {
        Ok(s) => s,
        Err(poisoned) => poisoned.into_inner(),
    };
    if state.analyzer.records().is_err() {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
        return;
    }

    println!("Generating reports...");
    let report = match state.analyzer.generate_report() {
        Ok(r) => r.clone(),
        Err(e) => {
            eprintln!("Report failed: {}\n", e);
            return;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&opts.out_dir) {
        eprintln!("Cannot create {}: {}", opts.out_dir.display(), e);
        return;
    }
    println!("Outputs saved to {}\n", opts.out_dir.display());

    let file1 = opts.out_dir.join("report_categories.csv");
    if let Err(e) = output::write_csv(&file1, &report.complaint_categories.counts) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Complaint Categories");
    match &report.complaint_categories.source_column {
        Some(col) => println!("(Keyword match on '{}')\n", col),
        None => println!("(No description column found)\n"),
    }
    output::preview_table_rows(&report.complaint_categories.counts, 10);
    println!("(Full table exported to {})\n", file1.display());

    let file2 = opts.out_dir.join("report_top_issues.csv");
    if let Err(e) = output::write_csv(&file2, &report.top_issues) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Top Issues\n");
    output::preview_table_rows(&report.top_issues, 5);
    println!("(Full table exported to {})\n", file2.display());

    let file3 = opts.out_dir.join("report_monthly_volume.csv");
    let months = report
        .complaint_volume
        .monthly()
        .map(|m| m.rows())
        .unwrap_or_default();
    if let Err(e) = output::write_csv(&file3, &months) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Monthly Complaint Volume\n");
    output::preview_table_rows(&months, 3);
    println!("(Full table exported to {})\n", file3.display());

    // generate_report has run categorize, so Complaint_Category exists here.
    if let Ok(data) = state.analyzer.records() {
        let kpis = reports::kpi_summary(data);
        println!(
            "KPIs: closed {}%, satisfied {}%, avg resolution {} days\n",
            util::format_number(kpis.closed_rate_pct, 1),
            util::format_number(kpis.high_satisfaction_pct, 1),
            util::format_opt(kpis.avg_resolution_days, 1)
        );
        match reports::daily_volume(data) {
            Ok(days) => {
                let file4 = opts.out_dir.join("report_daily_volume.csv");
                if let Err(e) = output::write_csv(&file4, &days) {
                    eprintln!("Write error: {}", e);
                }
                println!("Report 4: Daily Complaint Volume\n");
                output::preview_table_rows(&days, 3);
                println!("(Full table exported to {})\n", file4.display());
            }
            Err(e) => eprintln!("Daily volume failed: {}", e),
        }

        let ratings = reports::satisfaction_distribution(data);
        if !ratings.is_empty() {
            let file5 = opts.out_dir.join("report_satisfaction_distribution.csv");
            if let Err(e) = output::write_csv(&file5, &ratings) {
                eprintln!("Write error: {}", e);
            }
            println!("Report 5: Satisfaction Rating Distribution\n");
            output::preview_table_rows(&ratings, 5);
            println!("(Full table exported to {})\n", file5.display());
        }

        for (column, file) in [
            (CATEGORY_FILTER_COLUMN, "report_category_stats.csv"),
            (STATUS_FILTER_COLUMN, "report_status_stats.csv"),
            (CATEGORY_COLUMN, "report_keyword_category_stats.csv"),
        ] {
            let rows = reports::group_stats(data, column);
            if rows.is_empty() {
                continue;
            }
            let path = opts.out_dir.join(file);
            if let Err(e) = output::write_csv(&path, &rows) {
                eprintln!("Write error: {}", e);
            }
            println!("Breakdown by {}\n", column);
            output::preview_table_rows(&rows, 5);
        }
    }

    let summary = opts.out_dir.join("summary.json");
    if let Err(e) = output::write_json(&summary, &report) {
        eprintln!("Write error: {}", e);
    }
    print_summary(&report);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = CliOptions::parse();
    let config = opts.analyzer_config()?;
    log::info!("using {} category rules", config.category_rules.len());
    {
        let mut state = match APP_STATE.lock() {
            Ok(s) => s,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.analyzer = ComplaintsAnalyzer::new(config);
    }

    loop {
        println!("Select Action:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&opts),
            "2" => {
                println!();
                handle_generate_reports(&opts);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
    Ok(())
}

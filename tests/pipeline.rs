use complaints_report::analyzer::{CATEGORY_COLUMN, DEFAULT_TOP_ISSUES};
use complaints_report::types::VolumeAnalysis;
use complaints_report::{
    loader, output, reports, sample, AnalysisError, AnalyzerConfig, ComplaintsAnalyzer,
    RecordFilter, Value,
};
use chrono::NaiveDate;
use std::io::Write;

// ── Helpers ──────────────────────────────────────────────────────────────────

const COMPLAINTS_CSV: &str = "\
Complaint ID,Date received,Date closed,Date,Issue,Sub-issue,Status
1,2024-01-01,2024-01-05,2024-01-01,Late fee charged twice,Fee,Closed
2,2024-01-01,,2024-01-10,Cannot login to portal,Login,Pending
3,2024-01-03,2024-01-13,2024-01-20,Card stolen,Fraud,Closed
4,2024-02-01,2024-02-03,2024-02-01,Nobody answers,Fee,Closed
";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_fixture(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("complaints.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(body.as_bytes()).unwrap();
    path
}

fn loaded_analyzer() -> ComplaintsAnalyzer {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, COMPLAINTS_CSV);
    let (data, report) = loader::load_csv(&path).unwrap();
    assert_eq!(report.loaded_rows, 4);
    let mut analyzer = ComplaintsAnalyzer::new(AnalyzerConfig::default());
    analyzer.load(data);
    analyzer
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn report_over_csv_fixture() {
    init_logging();
    let mut analyzer = loaded_analyzer();
    assert!(analyzer.last_report().is_none());

    let report = analyzer.generate_report().unwrap().clone();

    assert_eq!(report.data_overview.total_complaints, 4);
    assert_eq!(report.data_overview.total_columns, 7);
    assert_eq!(report.data_overview.missing_values["Date closed"], 1);
    assert!(report.data_overview.memory_usage_mb > 0.0);

    match &report.complaint_volume {
        VolumeAnalysis::Monthly(m) => {
            assert_eq!(m.monthly_volume.get("2024-01"), Some(&3));
            assert_eq!(m.monthly_volume.get("2024-02"), Some(&1));
            assert_eq!(m.total_volume, 4);
            assert_eq!(m.peak_month.as_deref(), Some("2024-01"));
        }
        other => panic!("expected monthly volume, got {other:?}"),
    }

    // Issue is the description column; Sub-issue drives the ranking.
    let cats = &report.complaint_categories;
    assert_eq!(cats.source_column.as_deref(), Some("Issue"));
    assert_eq!(cats.count("billing"), 1);
    assert_eq!(cats.count("account"), 1);
    assert_eq!(cats.count("fraud"), 1);
    assert_eq!(cats.count("other"), 1);

    let res = report.resolution_time.as_ref().unwrap();
    assert_eq!(res.submitted_column, "Date received");
    assert_eq!(res.resolved_column, "Date closed");
    assert_eq!(res.rows_used, 3);
    assert_eq!(res.min_resolution_days, Some(2));
    assert_eq!(res.max_resolution_days, Some(10));
    assert_eq!(res.median_resolution_days, Some(4.0));

    assert_eq!(report.top_issues[0].issue, "Fee");
    assert_eq!(report.top_issues[0].count, 2);
    assert_eq!(report.top_issues[1].issue, "Login");
    assert!(report.top_issues.len() <= DEFAULT_TOP_ISSUES);

    assert_eq!(analyzer.last_report(), Some(&report));
    let records = analyzer.records().unwrap();
    assert!(records.column_index(CATEGORY_COLUMN).is_some());
    assert_eq!(records.value(2, CATEGORY_COLUMN), Some(&Value::text("fraud")));
}

#[test]
fn regenerating_does_not_duplicate_category_column() {
    let mut analyzer = loaded_analyzer();
    let first = analyzer.generate_report().unwrap().clone();
    let second = analyzer.generate_report().unwrap().clone();
    assert_eq!(first.complaint_categories, second.complaint_categories);
    let columns = analyzer.records().unwrap().columns();
    assert_eq!(columns.iter().filter(|c| *c == CATEGORY_COLUMN).count(), 1);
}

#[test]
fn malformed_date_in_csv_surfaces_as_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "Date,Issue\n2024-01-01,fee\nlast tuesday,login\n");
    let (data, _) = loader::load_csv(&path).unwrap();
    let mut analyzer = ComplaintsAnalyzer::default();
    analyzer.load(data);
    assert!(matches!(
        analyzer.generate_report(),
        Err(AnalysisError::DateParse { row: 1, .. })
    ));
    assert!(analyzer.last_report().is_none());
}

#[test]
fn timestamps_and_month_names_bucket_by_month() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &dir,
        "Date,Issue\n2024-01-05 10:30,fee\n\"Jan 20, 2024\",login\n\"February 2, 2024\",card\n",
    );
    let (data, _) = loader::load_csv(&path).unwrap();
    let mut analyzer = ComplaintsAnalyzer::default();
    analyzer.load(data);
    let volume = analyzer.analyze_volume().unwrap();
    let m = volume.monthly().unwrap();
    assert_eq!(m.monthly_volume.get("2024-01"), Some(&2));
    assert_eq!(m.monthly_volume.get("2024-02"), Some(&1));
}

#[test]
fn filtered_sample_feeds_the_analyzer() {
    init_logging();
    let data = sample::generate_sample(500, 42).unwrap();
    let filter = RecordFilter {
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1),
        date_to: NaiveDate::from_ymd_opt(2024, 6, 30),
        statuses: vec!["Closed".to_string()],
        ..Default::default()
    };
    let filtered = filter.apply(&data).unwrap();
    assert!(filtered.len() < data.len());

    let kpis = reports::kpi_summary(&filtered);
    assert_eq!(kpis.closed_rate_pct, if filtered.is_empty() { 0.0 } else { 100.0 });

    let mut analyzer = ComplaintsAnalyzer::default();
    analyzer.load(filtered.clone());
    let report = analyzer.generate_report().unwrap();
    let m = report.complaint_volume.monthly().unwrap();
    assert!(m.monthly_volume.keys().all(|k| k.as_str() >= "2024-01" && k.as_str() <= "2024-06"));
    assert_eq!(m.monthly_volume.values().sum::<usize>(), filtered.len());
    assert_eq!(report.complaint_categories.total(), filtered.len());
    // Sample data has no submitted/resolved pair.
    assert!(report.resolution_time.is_none());
}

#[test]
fn report_exports_to_json() {
    let mut analyzer = loaded_analyzer();
    let report = analyzer.generate_report().unwrap().clone();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.json");
    output::write_json(&path, &report).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["data_overview"]["total_complaints"], 4);
    assert_eq!(v["complaint_volume"]["status"], "monthly");
    assert_eq!(v["complaint_volume"]["peak_month"], "2024-01");
    assert_eq!(v["data_overview"]["data_types"]["Date received"], "date");
    assert_eq!(v["top_issues"][0]["Issue"], "Fee");
}

#[test]
fn custom_rules_change_labels() {
    let cfg = AnalyzerConfig::from_json_str(
        r#"{"category_rules": [{"label": "cards", "keywords": ["card"]}]}"#,
    )
    .unwrap();
    let mut analyzer = ComplaintsAnalyzer::new(cfg);
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, COMPLAINTS_CSV);
    analyzer.load(loader::load_csv(&path).unwrap().0);
    let cats = analyzer.categorize().unwrap();
    let labels: Vec<&str> = cats.counts.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["cards", "other"]);
    assert_eq!(cats.count("cards"), 1);
    assert_eq!(cats.count("other"), 3);
}

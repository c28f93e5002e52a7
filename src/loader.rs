use crate::error::AnalysisResult;
use crate::records::{RecordSet, Value};
use crate::util::{parse_date_safe, parse_f64_safe, parse_i64_safe};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    /// Rows whose field count differed from the header and were padded or cut.
    pub ragged_rows: usize,
}

pub fn load_csv(path: &Path) -> AnalysisResult<(RecordSet, LoadReport)> {
    let file = std::fs::File::open(path)?;
    log::info!("loader: reading {}", path.display());
    load_csv_reader(file)
}

pub fn load_csv_reader<R: Read>(reader: R) -> AnalysisResult<(RecordSet, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();
    let mut set = RecordSet::new(headers);

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut ragged_rows = 0usize;

    for result in rdr.records() {
        total_rows += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("loader: skipping row {}: {}", total_rows, e);
                parse_errors += 1;
                continue;
            }
        };
        if record.len() != width {
            ragged_rows += 1;
        }
        let mut row: Vec<Value> = record.iter().take(width).map(infer_value).collect();
        row.resize(width, Value::Missing);
        set.push_row(row)?;
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: set.len(),
        parse_errors,
        ragged_rows,
    };
    if parse_errors > 0 || ragged_rows > 0 {
        log::warn!(
            "loader: {} unreadable rows, {} ragged rows",
            parse_errors,
            ragged_rows
        );
    }
    Ok((set, report))
}

/// Empty cells are missing; otherwise try integer, float, then date, and
/// fall back to text.
pub fn infer_value(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() {
        return Value::Missing;
    }
    if let Some(i) = parse_i64_safe(Some(s)) {
        return Value::Integer(i);
    }
    if let Some(f) = parse_f64_safe(Some(s)) {
        return Value::Float(f);
    }
    if let Some(d) = parse_date_safe(Some(s)) {
        return Value::Date(d);
    }
    Value::Text(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn infers_cell_types() {
        assert_eq!(infer_value(""), Value::Missing);
        assert_eq!(infer_value(" 12 "), Value::Integer(12));
        assert_eq!(infer_value("1,250.75"), Value::Float(1250.75));
        assert_eq!(
            infer_value("2024-02-29"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(infer_value("Late fee"), Value::text("Late fee"));
    }

    #[test]
    fn pads_short_rows_and_counts_them() {
        let csv = "Date,Issue,Status\n2024-01-01,Late fee,Closed\n2024-01-02,Login\n";
        let (set, report) = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(set.columns(), &["Date", "Issue", "Status"]);
        assert_eq!(set.len(), 2);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.ragged_rows, 1);
        assert_eq!(set.value(1, "Status"), Some(&Value::Missing));
    }

    #[test]
    fn keeps_unparsable_dates_as_text() {
        let csv = "Date\nsoon\n";
        let (set, _) = load_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(set.value(0, "Date"), Some(&Value::text("soon")));
    }

    #[test]
    fn headers_only_gives_empty_set() {
        let (set, report) = load_csv_reader("Complaint,Date\n".as_bytes()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.columns().len(), 2);
        assert_eq!(report.total_rows, 0);
    }
}

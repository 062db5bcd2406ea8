use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::model::SleepRecord;
use crate::error::AppError;

/// Column names written by the upstream export. Matched case-sensitively.
pub const DATE_COLUMN: &str = "date";
pub const DEEP_SLEEP_COLUMN: &str = "deepSleepTime";
pub const SHALLOW_SLEEP_COLUMN: &str = "shallowSleepTime";

const REQUIRED_COLUMNS: [&str; 3] = [DATE_COLUMN, DEEP_SLEEP_COLUMN, SHALLOW_SLEEP_COLUMN];
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every row of a sleep export, in file order.
///
/// CSV layout: header row, then one row per night.
/// * `date`             – `YYYY-MM-DD`
/// * `deepSleepTime`    – minutes of deep sleep
/// * `shallowSleepTime` – minutes of shallow sleep
/// * `start` / `stop`   – optional UNIX seconds
///
/// All other columns are ignored.
pub fn load_csv(path: &Path) -> Result<Vec<SleepRecord>, AppError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AppError::NotFound(path.to_path_buf()),
        _ => AppError::Io(e),
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AppError::malformed(1, format!("CSV missing '{column}' column")));
        }
    }
    // Cleaned headers so a BOM never leaks into serde field matching.
    let headers = csv::StringRecord::from(headers);

    let mut records = Vec::new();
    for result in reader.records() {
        let raw = result.map_err(csv_error)?;
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let row: RawRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| AppError::malformed(line, e.to_string()))?;
        let record = row.into_record(line)?;
        log::trace!("line {line}: {record:?}");
        records.push(record);
    }

    log::info!("Loaded {} sleep records from {}", records.len(), path.display());
    Ok(records)
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawRow {
    date: String,
    #[serde(rename = "deepSleepTime")]
    deep_sleep: f64,
    #[serde(rename = "shallowSleepTime")]
    shallow_sleep: f64,
    #[serde(default)]
    start: Option<i64>,
    #[serde(default)]
    stop: Option<i64>,
}

impl RawRow {
    fn into_record(self, line: u64) -> Result<SleepRecord, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            AppError::malformed(line, format!("'{}' is not a YYYY-MM-DD date", self.date))
        })?;

        let deep_sleep_minutes = check_minutes(self.deep_sleep, DEEP_SLEEP_COLUMN, line)?;
        let shallow_sleep_minutes = check_minutes(self.shallow_sleep, SHALLOW_SLEEP_COLUMN, line)?;

        Ok(SleepRecord {
            start: timestamp(self.start, "start", line)?,
            stop: timestamp(self.stop, "stop", line)?,
            ..SleepRecord::new(date, deep_sleep_minutes, shallow_sleep_minutes)
        })
    }
}

fn check_minutes(value: f64, column: &str, line: u64) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::malformed(
            line,
            format!("'{column}' must be a non-negative number, got {value}"),
        ));
    }
    Ok(value)
}

fn timestamp(
    secs: Option<i64>,
    column: &str,
    line: u64,
) -> Result<Option<DateTime<Utc>>, AppError> {
    secs.map(|s| {
        DateTime::from_timestamp(s, 0)
            .ok_or_else(|| AppError::malformed(line, format!("'{column}' timestamp {s} is out of range")))
    })
    .transpose()
}

fn csv_error(error: csv::Error) -> AppError {
    let line = error.position().map(|p| p.line()).unwrap_or(0);
    match error.into_kind() {
        csv::ErrorKind::Io(e) => AppError::Io(e),
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => AppError::malformed(
            line,
            format!("expected {expected_len} fields, found {len}"),
        ),
        other => AppError::malformed(line, format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_loads_rows_in_file_order() {
        let file = write_csv(
            "date,deepSleepTime,shallowSleepTime,wakeTime,start,stop\n\
             2018-09-02,80,300,5,1535842800,1535868000\n\
             2018-09-01,95,310,0,1535756400,1535781600\n\
             2018-09-03,60,280,12,1535929200,1535954400\n",
        );
        let records = load_csv(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, date(2018, 9, 2));
        assert_eq!(records[1].date, date(2018, 9, 1));
        assert_eq!(records[2].date, date(2018, 9, 3));
        assert_eq!(records[1].deep_sleep_minutes, 95.0);
        assert_eq!(records[1].shallow_sleep_minutes, 310.0);
        assert_eq!(
            records[0].start,
            DateTime::from_timestamp(1_535_842_800, 0)
        );
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let file = write_csv("deepSleepTime,date,shallowSleepTime\n70.5,2018-09-04,290\n");
        let records = load_csv(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].deep_sleep_minutes, 70.5);
        assert!(records[0].start.is_none());
        assert!(records[0].stop.is_none());
    }

    #[test]
    fn test_byte_order_mark_is_tolerated() {
        let file = write_csv("\u{feff}date,deepSleepTime,shallowSleepTime\n2018-09-04,70,290\n");
        let records = load_csv(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date(2018, 9, 4));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let file = write_csv("date,deepSleepTime,shallowSleepTime\n");
        let records = load_csv(file.path()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("date,deepSleepTime\n2018-09-04,70\n");
        let result = load_csv(file.path());
        match result {
            Err(AppError::MalformedInput { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("shallowSleepTime"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_column_names_are_case_sensitive() {
        let file = write_csv("Date,deepSleepTime,shallowSleepTime\n2018-09-04,70,290\n");
        let result = load_csv(file.path());
        assert!(matches!(result, Err(AppError::MalformedInput { .. })));
    }

    #[test]
    fn test_bad_date_reports_line() {
        let file = write_csv(
            "date,deepSleepTime,shallowSleepTime\n\
             2018-09-04,70,290\n\
             04/09/2018,70,290\n",
        );
        let result = load_csv(file.path());
        match result {
            Err(AppError::MalformedInput { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("04/09/2018"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_number() {
        let file = write_csv("date,deepSleepTime,shallowSleepTime\n2018-09-04,lots,290\n");
        let result = load_csv(file.path());
        assert!(matches!(result, Err(AppError::MalformedInput { line: 2, .. })));
    }

    #[test]
    fn test_negative_minutes_rejected() {
        let file = write_csv("date,deepSleepTime,shallowSleepTime\n2018-09-04,70,-1\n");
        let result = load_csv(file.path());
        assert!(matches!(result, Err(AppError::MalformedInput { line: 2, .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_csv(Path::new("/nonexistent/path/sleep.csv"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}

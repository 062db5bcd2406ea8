use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::data::model::{SleepMetric, SleepRecord};

/// Rolling window over consecutive records: a week of nights, or a working
/// week when weekends were filtered out.
pub fn rolling_window(exclude_weekends: bool) -> usize {
    if exclude_weekends {
        5
    } else {
        7
    }
}

/// Horizontal line covering the week that ends on `end` (a Monday).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklySegment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hours: f64,
}

/// Everything drawn for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: SleepMetric,
    /// One `(date, hours)` dot per record.
    pub points: Vec<(NaiveDate, f64)>,
    pub weekly_segments: Vec<WeeklySegment>,
    pub overall_mean: f64,
}

/// Build the drawable series for every metric. `None` for no records.
pub fn build_series(records: &[SleepRecord], exclude_weekends: bool) -> Option<Vec<MetricSeries>> {
    if records.is_empty() {
        return None;
    }
    let window = rolling_window(exclude_weekends);
    let series = SleepMetric::ALL
        .iter()
        .map(|&metric| {
            let values: Vec<f64> = records.iter().map(|r| r.hours(metric)).collect();
            MetricSeries {
                metric,
                points: records.iter().map(|r| r.date).zip(values.iter().copied()).collect(),
                weekly_segments: weekly_segments(records, &values, window),
                overall_mean: values.iter().sum::<f64>() / values.len() as f64,
            }
        })
        .collect();
    Some(series)
}

/// Trailing mean of `values` ending at each position. Positions before the
/// window is full have no mean.
pub fn rolling_means(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut sum = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            sum += value;
            if i >= window {
                sum -= values[i - window];
            }
            (i + 1 >= window).then(|| sum / window as f64)
        })
        .collect()
}

/// One segment per Monday record with a full rolling window, spanning the
/// seven days that end on that Monday.
pub fn weekly_segments(records: &[SleepRecord], values: &[f64], window: usize) -> Vec<WeeklySegment> {
    records
        .iter()
        .zip(rolling_means(values, window))
        .filter(|(record, _)| record.date.weekday() == Weekday::Mon)
        .filter_map(|(record, mean)| {
            mean.map(|hours| WeeklySegment {
                start: record.date - Duration::days(7),
                end: record.date,
                hours,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

pub struct MetricSummary {
    pub metric: SleepMetric,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

pub fn compute_metric_summary(metric: SleepMetric, records: &[SleepRecord]) -> Option<MetricSummary> {
    let mut values = records.iter().map(|record| record.hours(metric));
    let first = values.next()?;

    let mut min_value = first;
    let mut max_value = first;
    let mut sum = first;
    let mut count: usize = 1;

    for value in values {
        min_value = min_value.min(value);
        max_value = max_value.max(value);
        sum += value;
        count += 1;
    }

    Some(MetricSummary {
        metric,
        min: min_value,
        max: max_value,
        avg: sum / count as f64,
    })
}

pub fn summarize(records: &[SleepRecord]) -> Vec<MetricSummary> {
    SleepMetric::ALL
        .iter()
        .filter_map(|&metric| compute_metric_summary(metric, records))
        .collect()
}

/// Mean of `stop - start` over the records that carry both, in hours.
pub fn mean_time_in_bed_hours(records: &[SleepRecord]) -> Option<f64> {
    let minutes: Vec<f64> = records
        .iter()
        .filter_map(SleepRecord::time_in_bed_minutes)
        .collect();
    if minutes.is_empty() {
        return None;
    }
    Some(minutes.iter().sum::<f64>() / minutes.len() as f64 / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Consecutive nights starting on `first`, deep = 60 min, shallow from `shallow`.
    fn nights(first: NaiveDate, shallow: &[f64]) -> Vec<SleepRecord> {
        shallow
            .iter()
            .enumerate()
            .map(|(i, &s)| SleepRecord::new(first + Duration::days(i as i64), 60.0, s))
            .collect()
    }

    #[test]
    fn test_rolling_means_wait_for_full_window() {
        let means = rolling_means(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(means, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_rolling_means_short_input() {
        assert_eq!(rolling_means(&[1.0, 2.0], 7), vec![None, None]);
        assert!(rolling_means(&[], 7).is_empty());
    }

    #[test]
    fn test_window_size() {
        assert_eq!(rolling_window(false), 7);
        assert_eq!(rolling_window(true), 5);
    }

    #[test]
    fn test_segments_anchor_on_mondays() {
        // 2018-09-03 and 2018-09-10 are Mondays.
        let records = nights(date(2018, 9, 1), &[240.0; 14]);
        let values: Vec<f64> = records.iter().map(|r| r.hours(SleepMetric::Total)).collect();
        let segments = weekly_segments(&records, &values, 7);

        // Monday 09-03 is the third night: window not yet full.
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end, date(2018, 9, 10));
        assert_eq!(segments[0].start, date(2018, 9, 3));
        assert!((segments[0].hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_uses_trailing_mean() {
        // Nights 09-04 (Tue) .. 09-10 (Mon): shallow 0, 60, ..., 360 min.
        let shallow: Vec<f64> = (0..7).map(|i| i as f64 * 60.0).collect();
        let records = nights(date(2018, 9, 4), &shallow);
        let values: Vec<f64> = records.iter().map(|r| r.hours(SleepMetric::Shallow)).collect();
        let segments = weekly_segments(&records, &values, 7);

        assert_eq!(segments.len(), 1);
        assert!((segments[0].hours - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekday_only_segments_use_five_night_window() {
        // 2018-09-03 .. 2018-09-17 with weekends dropped: Mon-Fri, Mon-Fri, Mon.
        let records: Vec<SleepRecord> = nights(date(2018, 9, 3), &[0.0; 15])
            .into_iter()
            .filter(|r| !matches!(r.date.weekday(), Weekday::Sat | Weekday::Sun))
            .enumerate()
            .map(|(i, r)| SleepRecord::new(r.date, 60.0 * i as f64, 0.0))
            .collect();
        assert_eq!(records.len(), 11);

        let series = build_series(&records, true).unwrap();
        let deep = series.iter().find(|s| s.metric == SleepMetric::Deep).unwrap();

        // Monday 09-03 is first: no full window. Monday 09-10 averages
        // 09-04..09-07 plus itself (1..=5 h); 09-17 averages 6..=10 h.
        assert_eq!(deep.weekly_segments.len(), 2);
        assert_eq!(deep.weekly_segments[0].end, date(2018, 9, 10));
        assert!((deep.weekly_segments[0].hours - 3.0).abs() < 1e-9);
        assert_eq!(deep.weekly_segments[1].start, date(2018, 9, 10));
        assert!((deep.weekly_segments[1].hours - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_series_empty_is_none() {
        assert!(build_series(&[], false).is_none());
    }

    #[test]
    fn test_build_series_covers_every_metric() {
        let records = nights(date(2018, 9, 1), &[300.0, 360.0]);
        let series = build_series(&records, false).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].metric, SleepMetric::Total);
        assert_eq!(series[0].points, vec![(date(2018, 9, 1), 6.0), (date(2018, 9, 2), 7.0)]);
        assert!((series[0].overall_mean - 6.5).abs() < 1e-9);
        assert!((series[2].overall_mean - 1.0).abs() < 1e-9);
        assert!(series.iter().all(|s| s.weekly_segments.is_empty()));
    }

    #[test]
    fn test_summary_min_max_avg() {
        let records = nights(date(2018, 9, 1), &[120.0, 240.0, 360.0]);
        let summary = compute_metric_summary(SleepMetric::Shallow, &records).unwrap();
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 6.0);
        assert!((summary.avg - 4.0).abs() < 1e-9);

        assert!(compute_metric_summary(SleepMetric::Deep, &[]).is_none());
        assert_eq!(summarize(&records).len(), 3);
    }

    #[test]
    fn test_time_in_bed_skips_records_without_timestamps() {
        let mut records = nights(date(2018, 9, 1), &[300.0, 300.0]);
        assert_eq!(mean_time_in_bed_hours(&records), None);

        let start = date(2018, 9, 1).and_hms_opt(23, 0, 0).unwrap().and_utc();
        records[0].start = Some(start);
        records[0].stop = Some(start + Duration::hours(8));
        assert_eq!(mean_time_in_bed_hours(&records), Some(8.0));
    }
}

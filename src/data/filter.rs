use chrono::{Datelike, NaiveDate, Weekday};

use super::model::SleepRecord;
use crate::error::AppError;

// ---------------------------------------------------------------------------
// Filter predicate: date range + weekend exclusion
// ---------------------------------------------------------------------------

/// Which nights to keep. The default keeps everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    /// Inclusive lower bound.
    pub after: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub before: Option<NaiveDate>,
    /// Drop Saturday and Sunday nights.
    pub exclude_weekends: bool,
}

impl DateFilter {
    /// Reject a range that can never match anything.
    pub fn validate(&self) -> Result<(), AppError> {
        match (self.after, self.before) {
            (Some(after), Some(before)) if after > before => Err(AppError::BadArgument(format!(
                "--after {after} is later than --before {before}"
            ))),
            _ => Ok(()),
        }
    }

    /// A record passes when:
    /// * `after` is unset or `date >= after`
    /// * `before` is unset or `date <= before`
    /// * weekends are kept, or `date` is a weekday
    pub fn matches(&self, record: &SleepRecord) -> bool {
        let date = record.date;
        if self.after.is_some_and(|after| date < after) {
            return false;
        }
        if self.before.is_some_and(|before| date > before) {
            return false;
        }
        !(self.exclude_weekends && is_weekend(date))
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Return the records passing `filter`, in their original order.
/// No match gives an empty vector, not an error.
pub fn filter_records(records: &[SleepRecord], filter: &DateFilter) -> Vec<SleepRecord> {
    let kept: Vec<SleepRecord> = records
        .iter()
        .filter(|record| filter.matches(record))
        .copied()
        .collect();
    log::debug!(
        "Filter {:?} kept {} of {} records",
        filter,
        kept.len(),
        records.len()
    );
    kept
}

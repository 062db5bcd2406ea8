use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

// ---------------------------------------------------------------------------
// SleepRecord – one row of the export
// ---------------------------------------------------------------------------

/// One night of tracked sleep. Records are plain values and never mutated
/// after loading; filtering only drops them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepRecord {
    /// Night the record belongs to.
    pub date: NaiveDate,
    /// Deep sleep, in minutes.
    pub deep_sleep_minutes: f64,
    /// Shallow (light) sleep, in minutes.
    pub shallow_sleep_minutes: f64,
    /// Start of the tracked night, when the export carries it.
    pub start: Option<DateTime<Utc>>,
    /// End of the tracked night, when the export carries it.
    pub stop: Option<DateTime<Utc>>,
}

impl SleepRecord {
    pub fn new(date: NaiveDate, deep_sleep_minutes: f64, shallow_sleep_minutes: f64) -> Self {
        Self {
            date,
            deep_sleep_minutes,
            shallow_sleep_minutes,
            start: None,
            stop: None,
        }
    }

    /// Deep + shallow sleep, in minutes.
    pub fn total_sleep_minutes(&self) -> f64 {
        self.deep_sleep_minutes + self.shallow_sleep_minutes
    }

    /// Minutes between `start` and `stop`, when both are known.
    pub fn time_in_bed_minutes(&self) -> Option<f64> {
        let (start, stop) = (self.start?, self.stop?);
        let minutes = (stop - start).num_seconds() as f64 / 60.0;
        (minutes >= 0.0).then_some(minutes)
    }

    /// Value of `metric` for this night, in hours.
    pub fn hours(&self, metric: SleepMetric) -> f64 {
        let minutes = match metric {
            SleepMetric::Total => self.total_sleep_minutes(),
            SleepMetric::Shallow => self.shallow_sleep_minutes,
            SleepMetric::Deep => self.deep_sleep_minutes,
        };
        minutes / 60.0
    }
}

// ---------------------------------------------------------------------------
// SleepMetric – which series gets plotted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SleepMetric {
    Total,
    Shallow,
    Deep,
}

impl SleepMetric {
    /// Draw order; also the legend order.
    pub const ALL: [SleepMetric; 3] = [SleepMetric::Total, SleepMetric::Shallow, SleepMetric::Deep];

    pub fn label(self) -> &'static str {
        match self {
            Self::Total => "Total",
            Self::Shallow => "Shallow",
            Self::Deep => "Deep",
        }
    }

    /// Series colour as a `#rrggbb` hex string.
    pub fn hex_color(self) -> &'static str {
        match self {
            Self::Total => "#1f77b4",
            Self::Shallow => "#d62728",
            Self::Deep => "#9467bd",
        }
    }
}

impl fmt::Display for SleepMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

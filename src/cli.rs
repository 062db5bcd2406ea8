//! Command line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::data::filter::DateFilter;
use crate::error::AppError;
use crate::render::{ImageSize, DEFAULT_HEIGHT_PX, DEFAULT_WIDTH_PX};

/// Plot sleep duration trends from a sleep-tracker CSV export.
///
/// Draws total, shallow and deep sleep per night, weekly rolling means and
/// the overall average into a PNG image.
#[derive(Parser, Debug)]
#[command(name = "sleep-plot")]
#[command(author, version, about)]
pub struct Cli {
    /// Sleep export CSV (columns: date, deepSleepTime, shallowSleepTime)
    #[arg(value_name = "SLEEP_DATA_FILE")]
    pub input: PathBuf,

    /// PNG file to write
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Keep nights on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub after: Option<NaiveDate>,

    /// Keep nights on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub before: Option<NaiveDate>,

    /// Drop Saturday and Sunday nights
    #[arg(long)]
    pub exclude_weekends: bool,

    /// Image width in pixels
    #[arg(long, env = "SLEEP_PLOT_WIDTH", default_value_t = DEFAULT_WIDTH_PX)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, env = "SLEEP_PLOT_HEIGHT", default_value_t = DEFAULT_HEIGHT_PX)]
    pub height: u32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn date_filter(&self) -> Result<DateFilter, AppError> {
        let filter = DateFilter {
            after: self.after,
            before: self.before,
            exclude_weekends: self.exclude_weekends,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn image_size(&self) -> Result<ImageSize, AppError> {
        ImageSize::new(self.width, self.height)
    }
}

/// Parse a `YYYY-MM-DD` command line date.
pub fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::BadArgument(format!("'{value}' is not a YYYY-MM-DD date")))
}

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use image::{DynamicImage, ImageFormat, RgbImage};
use plotters::prelude::*;

use crate::color::SeriesPalette;
use crate::data::model::SleepRecord;
use crate::error::AppError;
use crate::stats::{build_series, MetricSeries};

pub const DEFAULT_WIDTH_PX: u32 = 1080;
pub const DEFAULT_HEIGHT_PX: u32 = 720;
pub const MIN_WIDTH_PX: u32 = 200;
pub const MIN_HEIGHT_PX: u32 = 150;
pub const MAX_WIDTH_PX: u32 = 10_000;
pub const MAX_HEIGHT_PX: u32 = 10_000;

struct PlotStyle;

impl PlotStyle {
    const MARGIN: i32 = 16;
    const LABEL_FONT_FAMILY: &'static str = "sans-serif";
    const LEGEND_FONT_SIZE: i32 = 16;
    const X_LABEL_AREA_SIZE: u32 = 40;
    const Y_LABEL_AREA_SIZE: u32 = 56;
    const X_LABEL_COUNT: usize = 8;
    const Y_LABEL_COUNT: usize = 10;
    const Y_HEADROOM_HOURS: f64 = 1.0;
    const BACKGROUND: RGBColor = WHITE;
    const DOT_SIZE: i32 = 3;
    const DATA_ALPHA: f64 = 0.1;
    const MEAN_ALPHA: f64 = 0.3;
    const GRID_ALPHA: f64 = 0.15;
    const LEGEND_ALPHA: f64 = 0.8;
    const WEEKLY_LINE_WIDTH: u32 = 2;
    const LEGEND_LINE_PX: i32 = 20;
}

/// Output image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH_PX,
            height: DEFAULT_HEIGHT_PX,
        }
    }
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Result<Self, AppError> {
        if width < MIN_WIDTH_PX || height < MIN_HEIGHT_PX {
            return Err(AppError::BadArgument(format!(
                "image size {width}x{height} is below the {MIN_WIDTH_PX}x{MIN_HEIGHT_PX} minimum"
            )));
        }
        if width > MAX_WIDTH_PX || height > MAX_HEIGHT_PX {
            return Err(AppError::BadArgument(format!(
                "image size {width}x{height} is above the {MAX_WIDTH_PX}x{MAX_HEIGHT_PX} maximum"
            )));
        }
        Ok(Self { width, height })
    }

    /// Length of the RGB buffer backing the image.
    fn rgb_buffer_len(self) -> Result<usize, AppError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(3))
            .ok_or_else(|| {
                AppError::Render(format!("image {}x{} is too large", self.width, self.height))
            })
    }
}

/// Render `records` and write the PNG to `path`.
///
/// An empty record set fails with [`AppError::NoData`] before anything is
/// drawn or written.
pub fn render_to_file(
    records: &[SleepRecord],
    exclude_weekends: bool,
    size: ImageSize,
    path: &Path,
) -> Result<(), AppError> {
    let series = build_series(records, exclude_weekends).ok_or(AppError::NoData)?;
    let png_bytes = render_png(&series, size)?;
    write_png(path, &png_bytes)?;
    log::info!("Wrote {} ({} bytes)", path.display(), png_bytes.len());
    Ok(())
}

/// Write encoded bytes to `path`, creating or truncating it.
pub fn write_png(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let write_error = |source| AppError::IoWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.flush().map_err(write_error)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn backend_error<E: std::fmt::Debug>(stage: &'static str) -> impl Fn(E) -> AppError {
    move |error| AppError::Render(format!("{stage}: {error:?}"))
}

/// Draw every series and encode the result as PNG.
pub fn render_png(series: &[MetricSeries], size: ImageSize) -> Result<Vec<u8>, AppError> {
    let (first, last) = date_span(series).ok_or(AppError::NoData)?;
    let mut x_start = midnight(first);
    let mut x_end = midnight(last);
    // Weekly segments reach back a week before their Monday.
    x_start = x_start.min(
        series
            .iter()
            .flat_map(|s| s.weekly_segments.iter())
            .map(|segment| midnight(segment.start))
            .min()
            .unwrap_or(x_start),
    );
    if x_start == x_end {
        x_start -= Duration::days(1);
        x_end += Duration::days(1);
    }

    let y_max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, hours)| *hours))
        .fold(0.0_f64, f64::max)
        .ceil()
        + PlotStyle::Y_HEADROOM_HOURS;

    let palette = SeriesPalette::default();
    let (width, height) = (size.width, size.height);
    let mut rgb_buffer = vec![255u8; size.rgb_buffer_len()?];

    {
        let drawing_area =
            BitMapBackend::with_buffer(&mut rgb_buffer, (width, height)).into_drawing_area();
        drawing_area
            .fill(&PlotStyle::BACKGROUND)
            .map_err(backend_error("background fill"))?;

        let mut chart = ChartBuilder::on(&drawing_area)
            .margin(PlotStyle::MARGIN)
            .x_label_area_size(PlotStyle::X_LABEL_AREA_SIZE)
            .y_label_area_size(PlotStyle::Y_LABEL_AREA_SIZE)
            .build_cartesian_2d(x_start..x_end, 0.0..y_max)
            .map_err(backend_error("chart build"))?;

        chart
            .configure_mesh()
            .x_labels(PlotStyle::X_LABEL_COUNT)
            .y_labels(PlotStyle::Y_LABEL_COUNT)
            .x_label_formatter(&|dt: &DateTime<Utc>| dt.format("%Y-%m-%d").to_string())
            .y_label_formatter(&|hours: &f64| format!("{hours:.0}"))
            .light_line_style(BLACK.mix(PlotStyle::GRID_ALPHA))
            .x_desc("Date")
            .y_desc("Sleep time (h)")
            .draw()
            .map_err(backend_error("mesh draw"))?;

        for s in series {
            let color = palette.color_for(s.metric);

            chart
                .draw_series(s.points.iter().map(|(date, hours)| {
                    Circle::new(
                        (midnight(*date), *hours),
                        PlotStyle::DOT_SIZE,
                        color.mix(PlotStyle::DATA_ALPHA).filled(),
                    )
                }))
                .map_err(backend_error("dots draw"))?;

            chart
                .draw_series(s.weekly_segments.iter().map(|segment| {
                    PathElement::new(
                        vec![
                            (midnight(segment.start), segment.hours),
                            (midnight(segment.end), segment.hours),
                        ],
                        color.stroke_width(PlotStyle::WEEKLY_LINE_WIDTH),
                    )
                }))
                .map_err(backend_error("weekly draw"))?;

            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x_start, s.overall_mean), (x_end, s.overall_mean)],
                    color.mix(PlotStyle::MEAN_ALPHA),
                )))
                .map_err(backend_error("average draw"))?
                .label(s.metric.label())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + PlotStyle::LEGEND_LINE_PX, y)], color)
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((PlotStyle::LABEL_FONT_FAMILY, PlotStyle::LEGEND_FONT_SIZE))
            .background_style(WHITE.mix(PlotStyle::LEGEND_ALPHA))
            .border_style(BLACK)
            .draw()
            .map_err(backend_error("legend draw"))?;

        drawing_area.present().map_err(backend_error("present"))?;
    }

    let rgb_image = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| AppError::Render("image buffer conversion failed".to_string()))?;
    let mut output = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(rgb_image)
        .write_to(&mut output, ImageFormat::Png)
        .map_err(|error| AppError::Render(format!("png encoding: {error}")))?;

    Ok(output.into_inner())
}

/// Earliest and latest plotted date over all series.
fn date_span(series: &[MetricSeries]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = series.iter().flat_map(|s| s.points.iter().map(|(date, _)| *date));
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date))))
}

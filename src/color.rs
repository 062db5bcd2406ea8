use std::collections::BTreeMap;
use std::str::FromStr;

use palette::Srgb;
use plotters::style::RGBColor;

use crate::data::model::SleepMetric;

const FALLBACK_COLOR: RGBColor = RGBColor(128, 128, 128);

/// Parse a `#rrggbb` string into a plotters colour.
pub fn parse_hex(hex: &str) -> Option<RGBColor> {
    let rgb = Srgb::<u8>::from_str(hex).ok()?;
    Some(RGBColor(rgb.red, rgb.green, rgb.blue))
}

// ---------------------------------------------------------------------------
// Series palette: metric → colour
// ---------------------------------------------------------------------------

/// Fixed colour per plotted metric.
#[derive(Debug, Clone)]
pub struct SeriesPalette {
    mapping: BTreeMap<SleepMetric, RGBColor>,
    default_color: RGBColor,
}

impl Default for SeriesPalette {
    fn default() -> Self {
        let mapping = SleepMetric::ALL
            .iter()
            .map(|&metric| {
                let color = parse_hex(metric.hex_color()).unwrap_or_else(|| {
                    log::warn!("invalid colour {} for {metric}", metric.hex_color());
                    FALLBACK_COLOR
                });
                (metric, color)
            })
            .collect();

        SeriesPalette {
            mapping,
            default_color: FALLBACK_COLOR,
        }
    }
}

impl SeriesPalette {
    pub fn color_for(&self, metric: SleepMetric) -> RGBColor {
        self.mapping
            .get(&metric)
            .copied()
            .unwrap_or(self.default_color)
    }
}

//! Color scale for the rainfall choropleth.
//!
//! The default scale uses the CEMADEN alert thresholds so the colors
//! carry meaning across maps. When a storm pushes every gauge past
//! the upper thresholds, a relative scale over the data quartiles
//! spreads the colors back out.

use crate::error::{MapError, Result};

/// CEMADEN alert thresholds in mm, used as the fixed choropleth bins
pub const ALERT_BINS: [f64; 5] = [0.0, 2.2, 8.4, 18.6, 55.3];

/// 24 hour accumulation above which a gauge is flagged at risk
pub const RISK_THRESHOLD_MM: f64 = 18.6;

/// Fill for stations without windowed readings
pub const MISSING_COLOR: &str = "#bdbdbd";

/// YlGnBu palette (ColorBrewer), light to dark
const YLGNBU: [&str; 8] = [
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
];

/// Separation forced between bins when quantiles collide
const MIN_BIN_STEP: f64 = 0.1;

/// Ascending value bins mapped onto the YlGnBu ramp.
#[derive(Debug, PartialEq, Clone)]
pub struct ColorScale {
    bins: Vec<f64>,
}

impl ColorScale {
    /// Scale over the fixed CEMADEN alert thresholds.
    ///
    /// When the observed maximum exceeds the last threshold, an extra
    /// bin at the next whole millimeter is appended so the scale
    /// still bounds the data.
    pub fn fixed(max_value: f64) -> Self {
        let mut bins = ALERT_BINS.to_vec();
        if let Some(&last) = bins.last() {
            if max_value > last {
                bins.push(max_value.ceil());
            }
        }
        ColorScale { bins }
    }

    /// Scale derived from the data quartiles.
    ///
    /// Colliding quartiles are nudged apart so the bins stay strictly
    /// ascending even when many stations share one total.
    pub fn relative(totals: &[f64]) -> Result<Self> {
        if totals.is_empty() {
            return Err(MapError::InvalidScale("no station totals".to_string()));
        }
        let mut sorted = totals.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mut bins: Vec<f64> = [0.0, 0.25, 0.5, 0.75, 1.0]
            .iter()
            .map(|q| quantile(&sorted, *q))
            .collect();
        for i in 1..bins.len() {
            if bins[i] <= bins[i - 1] {
                bins[i] = bins[i - 1] + MIN_BIN_STEP;
            }
        }
        Ok(ColorScale { bins })
    }

    /// Scale over caller-provided bin edges, which must ascend
    /// strictly.
    pub fn from_bins(bins: Vec<f64>) -> Result<Self> {
        if bins.len() < 2 {
            return Err(MapError::InvalidScale(
                "need at least two bin edges".to_string(),
            ));
        }
        if bins.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MapError::InvalidScale(
                "bin edges must ascend strictly".to_string(),
            ));
        }
        Ok(ColorScale { bins })
    }

    /// The bin edges, always strictly ascending.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// True when the scale bounds the value.
    pub fn covers(&self, value: f64) -> bool {
        match (self.bins.first(), self.bins.last()) {
            (Some(&lo), Some(&hi)) => lo <= value && value <= hi,
            _ => false,
        }
    }

    /// Fill color for one value. Values outside the bins clamp to the
    /// nearest end of the ramp.
    pub fn color_for(&self, value: f64) -> &'static str {
        let intervals = self.bins.len() - 1;
        let mut interval = 0;
        for i in 0..intervals {
            if value >= self.bins[i] {
                interval = i;
            }
        }
        palette_color(interval, intervals)
    }

    /// Legend entries, one label and color per interval.
    pub fn legend(&self) -> Vec<(String, &'static str)> {
        let intervals = self.bins.len() - 1;
        (0..intervals)
            .map(|i| {
                (
                    format!("{:.1} to {:.1} mm", self.bins[i], self.bins[i + 1]),
                    palette_color(i, intervals),
                )
            })
            .collect()
    }
}

/// Spreads the ramp across the intervals, light to dark.
fn palette_color(interval: usize, intervals: usize) -> &'static str {
    if intervals <= 1 {
        return YLGNBU[0];
    }
    let index = interval * (YLGNBU.len() - 1) / (intervals - 1);
    YLGNBU[index.min(YLGNBU.len() - 1)]
}

/// Linear-interpolation quantile over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction
}

//! Logarithmic color scale for choropleth rendering.
//!
//! Each rendered map gets its own scale computed from the values visible on
//! that map, so color intensity is relative per map and never comparable
//! across maps.

use serde::{Deserialize, Serialize};

/// Number of color classes between the five breakpoints.
pub const CLASS_COUNT: usize = 4;

/// Five non-decreasing breakpoints over log1p-transformed averages:
/// min, p25, p50, p75, max.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub breakpoints: [f64; 5],
}

impl ColorScale {
    /// Scale over the log1p transform of the given averages. Returns None
    /// for an empty slice; a single value (or all-equal values) yields a
    /// degenerate scale where all breakpoints coincide.
    pub fn from_averages(averages: &[f64]) -> Option<ColorScale> {
        if averages.is_empty() {
            return None;
        }
        let mut transformed: Vec<f64> = averages.iter().map(|v| v.ln_1p()).collect();
        transformed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(ColorScale {
            breakpoints: [
                transformed[0],
                quantile(&transformed, 0.25),
                quantile(&transformed, 0.5),
                quantile(&transformed, 0.75),
                transformed[transformed.len() - 1],
            ],
        })
    }

    /// Class index (0..CLASS_COUNT) for a log1p-transformed value: the
    /// highest bucket whose lower breakpoint the value reaches. On a
    /// degenerate scale every value lands in the top class, which still
    /// renders as a valid single-color map.
    pub fn class_of(&self, log_value: f64) -> usize {
        for class in (0..CLASS_COUNT).rev() {
            if log_value >= self.breakpoints[class] {
                return class;
            }
        }
        0
    }

    pub fn is_degenerate(&self) -> bool {
        self.breakpoints[0] == self.breakpoints[4]
    }
}

/// Quantile with linear interpolation between closest ranks, over an
/// already-sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

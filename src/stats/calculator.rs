//! Statistics Calculator Module
//! Aggregates, confidence intervals, histogram binning and kernel density estimates.

use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Number of points a density curve is evaluated at.
pub const KDE_GRID_SIZE: usize = 200;

/// Descriptive statistics for one group of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Equal-width bins and the number of samples in each.
#[derive(Debug, Clone, PartialEq)]
pub struct Binned {
    /// `counts.len() + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Binned {
    pub fn width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics, sample variance (n - 1).
    pub fn compute_descriptive_stats(values: &[f64]) -> Summary {
        let n = values.len();
        if n == 0 {
            return Summary::default();
        }

        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Summary {
            count: n,
            mean,
            std: variance.sqrt(),
            variance,
            min,
            max,
        }
    }

    /// Two-sided t-based confidence interval of the mean at `level` percent.
    ///
    /// `None` when fewer than two samples leave the variance undefined.
    pub fn confidence_interval(values: &[f64], level: f64) -> Option<(f64, f64)> {
        let summary = Self::compute_descriptive_stats(values);
        if summary.count < 2 {
            return None;
        }
        if summary.std == 0.0 {
            return Some((summary.mean, summary.mean));
        }

        let df = (summary.count - 1) as f64;
        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        let alpha = 1.0 - level / 100.0;
        let t = dist.inverse_cdf(1.0 - alpha / 2.0);
        let half = t * summary.std / (summary.count as f64).sqrt();
        Some((summary.mean - half, summary.mean + half))
    }

    /// Bin edges over `[min, max]` with the last bin closed on the right.
    ///
    /// A single repeated value is binned over `[value - 0.5, value + 0.5]`.
    pub fn bin_edges(values: &[f64], bins: usize) -> Vec<f64> {
        let summary = Self::compute_descriptive_stats(values);
        let (lo, hi) = if summary.min == summary.max {
            (summary.min - 0.5, summary.max + 0.5)
        } else {
            (summary.min, summary.max)
        };
        let step = (hi - lo) / bins as f64;
        (0..=bins)
            .map(|i| if i == bins { hi } else { lo + step * i as f64 })
            .collect()
    }

    /// Count `values` into `bins` equal-width bins. `values` must be non-empty and
    /// free of NaN; `bins` must be positive.
    pub fn histogram(values: &[f64], bins: usize) -> Binned {
        let edges = Self::bin_edges(values, bins);
        let lo = edges[0];
        let hi = edges[bins];
        let mut counts = vec![0usize; bins];

        for &v in values {
            let mut idx = (((v - lo) / (hi - lo)) * bins as f64).floor() as usize;
            idx = idx.min(bins - 1);
            // Float error can land a value one bin off its edges.
            if idx > 0 && v < edges[idx] {
                idx -= 1;
            } else if idx + 1 < bins && v >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }

        Binned { edges, counts }
    }

    /// Scott's rule bandwidth: `n^(-1/5)` times the sample standard deviation.
    pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        let summary = Self::compute_descriptive_stats(values);
        if summary.count < 2 || summary.std == 0.0 || !summary.std.is_finite() {
            return None;
        }
        Some((summary.count as f64).powf(-0.2) * summary.std)
    }

    /// Gaussian kernel density over an evenly spaced grid spanning the data.
    ///
    /// Returns `(x, density)` pairs integrating to roughly one, or `None` when the
    /// bandwidth is undefined.
    pub fn gaussian_kde(values: &[f64], grid_size: usize) -> Option<Vec<(f64, f64)>> {
        let bandwidth = Self::scott_bandwidth(values)?;
        let summary = Self::compute_descriptive_stats(values);
        let steps = grid_size.max(2) - 1;
        let step = (summary.max - summary.min) / steps as f64;
        let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

        let curve = (0..=steps)
            .into_par_iter()
            .map(|i| {
                let x = summary.min + step * i as f64;
                let density = values
                    .iter()
                    .map(|v| {
                        let z = (x - v) / bandwidth;
                        (-0.5 * z * z).exp()
                    })
                    .sum::<f64>()
                    * norm;
                (x, density)
            })
            .collect();
        Some(curve)
    }
}

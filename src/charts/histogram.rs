//! Histogram bins scaled to a statistic, with an optional density overlay.

use crate::charts::figure::HistogramPlot;
use crate::data::DataProcessor;
use crate::error::{ChartError, ChartResult};
use crate::stats::{StatsCalculator, KDE_GRID_SIZE};
use crate::theme::Theme;
use polars::prelude::*;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// What a histogram bar measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stat {
    /// Samples per bin.
    #[default]
    Count,
    /// Samples per bin divided by bin width.
    Frequency,
    /// Normalized so the bar areas sum to one.
    Density,
    /// Normalized so the bar heights sum to one.
    Probability,
}

impl FromStr for Stat {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Stat::Count),
            "frequency" => Ok(Stat::Frequency),
            "density" => Ok(Stat::Density),
            "probability" => Ok(Stat::Probability),
            other => Err(ChartError::invalid(format!(
                "unknown stat '{}', expected count, frequency, density or probability",
                other
            ))),
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stat::Count => "count",
            Stat::Frequency => "frequency",
            Stat::Density => "density",
            Stat::Probability => "probability",
        };
        f.write_str(name)
    }
}

impl Stat {
    /// Factor turning a bin count into this statistic.
    fn bar_scale(&self, n: usize, width: f64) -> f64 {
        match self {
            Stat::Count => 1.0,
            Stat::Frequency => 1.0 / width,
            Stat::Density => 1.0 / (n as f64 * width),
            Stat::Probability => 1.0 / n as f64,
        }
    }

    /// Factor turning a probability density into this statistic.
    fn density_scale(&self, n: usize, width: f64) -> f64 {
        match self {
            Stat::Count => n as f64 * width,
            Stat::Frequency => n as f64,
            Stat::Density => 1.0,
            Stat::Probability => width,
        }
    }
}

/// One-dimensional numeric samples.
#[derive(Debug, Clone)]
pub enum HistogramInput {
    Values(Vec<f64>),
    Series(Series),
}

impl From<Vec<f64>> for HistogramInput {
    fn from(values: Vec<f64>) -> Self {
        HistogramInput::Values(values)
    }
}

impl From<&[f64]> for HistogramInput {
    fn from(values: &[f64]) -> Self {
        HistogramInput::Values(values.to_vec())
    }
}

impl From<Series> for HistogramInput {
    fn from(series: Series) -> Self {
        HistogramInput::Series(series)
    }
}

impl HistogramInput {
    /// The finite samples; NaN and nulls are dropped.
    pub fn into_values(self) -> ChartResult<Vec<f64>> {
        let values: Vec<f64> = match self {
            HistogramInput::Values(values) => values,
            HistogramInput::Series(series) => {
                if !DataProcessor::is_numeric(series.dtype()) {
                    return Err(ChartError::invalid(format!(
                        "histogram series '{}' must be numeric, found {}",
                        series.name(),
                        series.dtype()
                    )));
                }
                let as_f64 = series.cast(&DataType::Float64)?;
                let values = as_f64.f64()?.into_iter().flatten().collect();
                values
            }
        };
        if let Some(bad) = values.iter().find(|v| v.is_infinite()) {
            return Err(ChartError::invalid(format!(
                "histogram values must be finite, got {}",
                bad
            )));
        }
        Ok(values.into_iter().filter(|v| !v.is_nan()).collect())
    }
}

pub(crate) fn build_histogram(
    values: &[f64],
    bins: usize,
    kde: bool,
    stat: Stat,
    theme: &Theme,
) -> ChartResult<HistogramPlot> {
    if bins == 0 {
        return Err(ChartError::invalid("histogram needs at least one bin"));
    }
    if values.is_empty() {
        return Err(ChartError::invalid("histogram needs at least one value"));
    }

    let binned = StatsCalculator::histogram(values, bins);
    let width = binned.width();
    let scale = stat.bar_scale(values.len(), width);
    let heights = binned.counts.iter().map(|&c| c as f64 * scale).collect();

    let kde = if kde {
        let curve = StatsCalculator::gaussian_kde(values, KDE_GRID_SIZE);
        if curve.is_none() {
            warn!(
                samples = values.len(),
                "density overlay skipped: samples have no spread"
            );
        }
        let scale = stat.density_scale(values.len(), width);
        curve.map(|c| c.into_iter().map(|(x, d)| (x, d * scale)).collect())
    } else {
        None
    };

    Ok(HistogramPlot {
        binned,
        heights,
        stat,
        color: theme.palette.first(),
        kde,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn theme() -> Theme {
        Theme::resolve("darkgrid", "husl").unwrap()
    }

    #[test]
    fn stat_names_parse() {
        assert_eq!("density".parse::<Stat>().unwrap(), Stat::Density);
        assert_eq!(Stat::Probability.to_string(), "probability");
        assert!("percent".parse::<Stat>().is_err());
    }

    #[test]
    fn probability_heights_sum_to_one_and_density_areas_too() {
        let values: Vec<f64> = (0..50).map(|i| (i % 7) as f64).collect();
        let prob = build_histogram(&values, 6, false, Stat::Probability, &theme()).unwrap();
        assert_relative_eq!(prob.heights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        let dens = build_histogram(&values, 6, false, Stat::Density, &theme()).unwrap();
        let width = dens.binned.width();
        assert_relative_eq!(dens.heights.iter().sum::<f64>() * width, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn color_is_first_palette_entry() {
        let plot = build_histogram(&[1.0, 2.0, 3.0], 3, true, Stat::Count, &theme()).unwrap();
        assert_eq!(plot.color, theme().palette.first());
        assert_eq!(plot.kde.as_ref().map(Vec::len), Some(KDE_GRID_SIZE));
    }

    #[test]
    fn zero_bins_and_empty_input_are_invalid() {
        assert!(build_histogram(&[1.0], 0, false, Stat::Count, &theme()).is_err());
        assert!(build_histogram(&[], 10, false, Stat::Count, &theme()).is_err());
    }

    #[test]
    fn text_series_is_rejected_and_nan_dropped() {
        let text = Series::new("s".into(), &["a", "b"]);
        assert!(HistogramInput::from(text).into_values().is_err());

        let numbers = Series::new("n".into(), &[1.0, f64::NAN, 3.0]);
        assert_eq!(HistogramInput::from(numbers).into_values().unwrap(), vec![1.0, 3.0]);
    }
}

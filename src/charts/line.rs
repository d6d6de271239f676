//! Line series: mean of `y` at each `x`, with an optional confidence band.

use crate::charts::figure::{Legend, LegendPlacement, LinePlot, LinePoint, LineSeries};
use crate::data::DataProcessor;
use crate::error::{ChartError, ChartResult};
use crate::stats::StatsCalculator;
use crate::theme::Theme;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::warn;

pub(crate) fn build_lines(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    ci: Option<f64>,
    markers: bool,
    theme: &Theme,
) -> ChartResult<(LinePlot, Option<Legend>)> {
    if let Some(level) = ci {
        if !(level > 0.0 && level < 100.0) {
            return Err(ChartError::invalid(format!(
                "confidence level must be between 0 and 100, got {}",
                level
            )));
        }
    }

    let x_column = DataProcessor::require_column(df, x)?;
    let y_values = DataProcessor::numeric_values(df, y)?;

    // Numeric x keeps its values; anything else is placed by category.
    let (x_positions, x_categories): (Vec<Option<f64>>, Option<Vec<String>>) =
        if DataProcessor::is_numeric(x_column.dtype()) {
            (DataProcessor::numeric_column(x_column)?, None)
        } else {
            let categories = DataProcessor::category_order(df, x)?;
            let index: HashMap<&str, usize> = categories
                .iter()
                .enumerate()
                .map(|(i, c)| (c.as_str(), i))
                .collect();
            let positions = DataProcessor::label_column(x_column)?
                .iter()
                .map(|l| l.as_deref().and_then(|l| index.get(l)).map(|&i| i as f64))
                .collect();
            (positions, Some(categories))
        };

    let (levels, hue_labels) = match hue {
        Some(h) => (
            DataProcessor::category_order(df, h)?,
            Some(DataProcessor::label_values(df, h)?),
        ),
        None => (Vec::new(), None),
    };
    let level_index: HashMap<&str, usize> = levels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let slots = levels.len().max(1);
    let mut samples: Vec<Vec<(f64, f64)>> = vec![Vec::new(); slots];
    for row in 0..df.height() {
        let (Some(px), Some(py)) = (x_positions[row], y_values[row]) else {
            continue;
        };
        if px.is_nan() || py.is_nan() {
            continue;
        }
        let slot = match &hue_labels {
            Some(labels) => match labels[row].as_deref().and_then(|l| level_index.get(l)) {
                Some(&i) => i,
                None => continue,
            },
            None => 0,
        };
        samples[slot].push((px, py));
    }

    let colors = if hue.is_some() {
        theme.colors(levels.len())
    } else {
        vec![theme.palette.first()]
    };

    let mut series = Vec::with_capacity(slots);
    let mut missing_bands = 0usize;
    for (slot, mut pairs) in samples.into_iter().enumerate() {
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let mut points = Vec::new();
        for run in pairs.chunk_by(|a, b| a.0 == b.0) {
            let ys: Vec<f64> = run.iter().map(|p| p.1).collect();
            let summary = StatsCalculator::compute_descriptive_stats(&ys);
            let band = ci.and_then(|level| StatsCalculator::confidence_interval(&ys, level));
            if ci.is_some() && band.is_none() {
                missing_bands += 1;
            }
            points.push(LinePoint {
                x: run[0].0,
                y: summary.mean,
                samples: summary.count,
                band,
            });
        }
        series.push(LineSeries {
            name: hue.map(|_| levels[slot].clone()),
            color: colors[slot],
            points,
        });
    }
    if missing_bands > 0 {
        warn!(
            points = missing_bands,
            "points drawn without a confidence band"
        );
    }

    let legend = hue.map(|h| Legend {
        title: Some(h.to_string()),
        entries: levels.iter().cloned().zip(colors.iter().copied()).collect(),
        placement: LegendPlacement::Inside,
    });

    Ok((
        LinePlot {
            x_categories,
            series,
            markers,
        },
        legend,
    ))
}

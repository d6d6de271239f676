//! Categorical bars: mean of `y` per category of `x`, optionally split by hue.

use crate::charts::figure::{Bar, BarPlot, Legend, LegendPlacement};
use crate::data::DataProcessor;
use crate::error::{ChartError, ChartResult};
use crate::stats::StatsCalculator;
use crate::theme::Theme;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::trace;

/// Share of a category slot covered by its bars.
pub const BAR_SLOT_WIDTH: f64 = 0.8;
/// Confidence level of the error bars, percent.
pub const ERROR_BAR_LEVEL: f64 = 95.0;

pub(crate) fn build_bars(
    df: &DataFrame,
    x: &str,
    y: &str,
    hue: Option<&str>,
    theme: &Theme,
) -> ChartResult<(BarPlot, Option<Legend>)> {
    let categories = DataProcessor::category_order(df, x)?;
    let x_labels = DataProcessor::label_values(df, x)?;
    let y_values = DataProcessor::numeric_values(df, y)?;
    let (hue_levels, hue_labels) = match hue {
        Some(h) => (
            DataProcessor::category_order(df, h)?,
            Some(DataProcessor::label_values(df, h)?),
        ),
        None => (Vec::new(), None),
    };

    if categories.is_empty() {
        return Err(ChartError::invalid(format!("column '{}' has no values", x)));
    }

    let category_index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let hue_index: HashMap<&str, usize> = hue_levels
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let slots = hue_levels.len().max(1);
    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); categories.len() * slots];
    for row in 0..df.height() {
        let (Some(label), Some(value)) = (&x_labels[row], y_values[row]) else {
            continue;
        };
        if value.is_nan() {
            continue;
        }
        let slot = match &hue_labels {
            Some(labels) => match labels[row].as_deref().and_then(|h| hue_index.get(h)) {
                Some(&j) => j,
                None => continue,
            },
            None => 0,
        };
        if let Some(&i) = category_index.get(label.as_str()) {
            groups[i * slots + slot].push(value);
        }
    }

    let colors = if hue.is_some() {
        theme.colors(hue_levels.len())
    } else {
        theme.colors(categories.len())
    };
    let width = BAR_SLOT_WIDTH / slots as f64;

    let mut bars = Vec::new();
    for (i, category) in categories.iter().enumerate() {
        for slot in 0..slots {
            let samples = &groups[i * slots + slot];
            if samples.is_empty() {
                continue;
            }
            let summary = StatsCalculator::compute_descriptive_stats(samples);
            let position = i as f64 - BAR_SLOT_WIDTH / 2.0 + width * (slot as f64 + 0.5);
            bars.push(Bar {
                category: category.clone(),
                hue: hue.map(|_| hue_levels[slot].clone()),
                position,
                width,
                height: summary.mean,
                samples: summary.count,
                error: StatsCalculator::confidence_interval(samples, ERROR_BAR_LEVEL),
                color: if hue.is_some() { colors[slot] } else { colors[i] },
            });
        }
    }
    trace!(categories = categories.len(), bars = bars.len(), "built bars");

    let legend = hue.map(|h| Legend {
        title: Some(h.to_string()),
        entries: hue_levels.iter().cloned().zip(colors.iter().copied()).collect(),
        placement: LegendPlacement::Inside,
    });

    Ok((BarPlot { categories, bars }, legend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChartInput, ColumnValues};
    use approx::assert_relative_eq;

    fn theme() -> Theme {
        Theme::resolve("darkgrid", "deep").unwrap()
    }

    #[test]
    fn heights_are_means_per_category() {
        let df = ChartInput::mapping([
            ("day", ColumnValues::from(vec!["mon", "tue", "mon", "tue"])),
            ("sales", ColumnValues::from(vec![1.0, 10.0, 3.0, 20.0])),
        ])
        .into_table()
        .unwrap();

        let (plot, legend) = build_bars(&df, "day", "sales", None, &theme()).unwrap();
        assert!(legend.is_none());
        assert_eq!(plot.categories, vec!["mon", "tue"]);
        assert_eq!(plot.bars.len(), 2);
        assert_relative_eq!(plot.bars[0].height, 2.0);
        assert_relative_eq!(plot.bars[1].height, 15.0);
        assert_relative_eq!(plot.bars[0].position, 0.0);
        assert_relative_eq!(plot.bars[0].width, BAR_SLOT_WIDTH);
        assert_ne!(plot.bars[0].color, plot.bars[1].color);
        assert!(plot.bars[0].error.is_some());
    }

    #[test]
    fn hue_splits_slot_and_shares_colors_per_level() {
        let df = ChartInput::mapping([
            ("day", ColumnValues::from(vec!["mon", "mon", "tue", "tue"])),
            ("shop", ColumnValues::from(vec!["a", "b", "a", "b"])),
            ("sales", ColumnValues::from(vec![1.0, 2.0, 3.0, 4.0])),
        ])
        .into_table()
        .unwrap();

        let (plot, legend) = build_bars(&df, "day", "sales", Some("shop"), &theme()).unwrap();
        assert_eq!(plot.bars.len(), 4);
        assert_relative_eq!(plot.bars[0].width, 0.4);
        assert_relative_eq!(plot.bars[0].position, -0.2);
        assert_relative_eq!(plot.bars[1].position, 0.2);
        assert_eq!(plot.bars[0].color, plot.bars[2].color);
        assert!(plot.bars[0].error.is_none());

        let legend = legend.unwrap();
        assert_eq!(legend.title.as_deref(), Some("shop"));
        assert_eq!(legend.entries.len(), 2);
    }

    #[test]
    fn non_numeric_y_is_rejected() {
        let df = ChartInput::mapping([
            ("day", ColumnValues::from(vec!["mon"])),
            ("note", ColumnValues::from(vec!["x"])),
        ])
        .into_table()
        .unwrap();
        assert!(matches!(
            build_bars(&df, "day", "note", None, &theme()),
            Err(ChartError::InvalidInput(_))
        ));
    }
}

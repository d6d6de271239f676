//! Stacked bars: the first column labels the groups, every other column is a series.

use crate::charts::figure::{
    Legend, LegendPlacement, Orientation, StackGroup, StackSegment, StackedPlot,
};
use crate::data::DataProcessor;
use crate::error::{ChartError, ChartResult};
use crate::theme::Theme;
use polars::prelude::DataFrame;

pub const STACKED_LEGEND_TITLE: &str = "Category";

pub(crate) fn build_stacked(
    df: &DataFrame,
    orientation: Orientation,
    theme: &Theme,
) -> ChartResult<(StackedPlot, Legend)> {
    let columns = df.get_columns();
    let Some((label_column, series_columns)) = columns.split_first() else {
        return Err(ChartError::invalid("stacked bar chart needs a label column"));
    };
    if series_columns.is_empty() {
        return Err(ChartError::invalid(
            "stacked bar chart needs at least one series column after the label column",
        ));
    }

    let labels = DataProcessor::label_column(label_column)?;
    let series: Vec<(String, Vec<Option<f64>>)> = series_columns
        .iter()
        .map(|c| Ok((c.name().to_string(), DataProcessor::numeric_column(c)?)))
        .collect::<ChartResult<_>>()?;
    let colors = theme.colors(series.len());

    let groups = (0..df.height())
        .map(|row| {
            // Positive values stack up from zero, negative values stack down.
            let (mut up, mut down) = (0.0, 0.0);
            let segments = series
                .iter()
                .zip(colors.iter())
                .map(|((name, values), &color)| {
                    let v = values[row].filter(|v| !v.is_nan()).unwrap_or(0.0);
                    let cursor = if v >= 0.0 { &mut up } else { &mut down };
                    let base = *cursor;
                    *cursor += v;
                    StackSegment {
                        series: name.clone(),
                        color,
                        base,
                        top: *cursor,
                    }
                })
                .collect();
            StackGroup {
                label: labels[row].clone().unwrap_or_default(),
                segments,
            }
        })
        .collect();

    let legend = Legend {
        title: Some(STACKED_LEGEND_TITLE.to_string()),
        entries: series
            .iter()
            .map(|(name, _)| name.clone())
            .zip(colors.iter().copied())
            .collect(),
        placement: LegendPlacement::OutsideUpperRight,
    };

    Ok((
        StackedPlot {
            orientation,
            groups,
        },
        legend,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ChartInput, ColumnValues};
    use approx::assert_relative_eq;

    fn theme() -> Theme {
        Theme::resolve("whitegrid", "muted").unwrap()
    }

    #[test]
    fn mixed_signs_stack_away_from_zero() {
        let df = ChartInput::mapping([
            ("q", ColumnValues::from(vec!["q1"])),
            ("a", ColumnValues::from(vec![2.0])),
            ("b", ColumnValues::from(vec![-1.0])),
            ("c", ColumnValues::from(vec![3.0])),
        ])
        .into_table()
        .unwrap();

        let (plot, legend) = build_stacked(&df, Orientation::Vertical, &theme()).unwrap();
        let segments = &plot.groups[0].segments;
        assert_relative_eq!(segments[0].base, 0.0);
        assert_relative_eq!(segments[0].top, 2.0);
        assert_relative_eq!(segments[1].base, 0.0);
        assert_relative_eq!(segments[1].top, -1.0);
        assert_relative_eq!(segments[2].base, 2.0);
        assert_relative_eq!(segments[2].top, 5.0);
        assert_eq!(legend.placement, LegendPlacement::OutsideUpperRight);
        assert_eq!(legend.title.as_deref(), Some(STACKED_LEGEND_TITLE));
    }

    #[test]
    fn label_column_alone_is_invalid() {
        let df = ChartInput::mapping([("q", vec!["q1"])]).into_table().unwrap();
        assert!(build_stacked(&df, Orientation::Vertical, &theme()).is_err());
    }

    #[test]
    fn text_series_is_invalid() {
        let df = ChartInput::mapping([
            ("q", ColumnValues::from(vec!["q1"])),
            ("note", ColumnValues::from(vec!["x"])),
        ])
        .into_table()
        .unwrap();
        assert!(matches!(
            build_stacked(&df, Orientation::Horizontal, &theme()),
            Err(ChartError::InvalidInput(_))
        ));
    }
}

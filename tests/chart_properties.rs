use approx::assert_relative_eq;
use chart_drawer::charts::{LegendPlacement, Orientation, TickLabels};
use chart_drawer::{
    BarOptions, ChartDrawer, ChartError, ChartInput, ColumnValues, DrawerConfig, FigureSize,
    HistogramOptions, LineOptions, PieData, PieOptions, StackedOptions, Stat,
};
use polars::prelude::{DataFrame, NamedFrom, Series};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::HashSet;

fn drawer() -> ChartDrawer {
    ChartDrawer::new(DrawerConfig::new((8.0, 5.0), "whitegrid", "deep"))
}

fn sales_mapping() -> ChartInput {
    ChartInput::mapping([
        ("region", ColumnValues::from(vec!["north", "south", "north", "east"])),
        ("sales", ColumnValues::from(vec![10.0, 20.0, 30.0, 5.0])),
        ("units", ColumnValues::from(vec![1.0, 2.0, 3.0, 4.0])),
    ])
}

fn sales_table() -> DataFrame {
    polars::df!(
        "region" => ["north", "south", "north", "east"],
        "sales" => [10.0, 20.0, 30.0, 5.0],
        "units" => [1.0, 2.0, 3.0, 4.0],
    )
    .unwrap()
}

#[test]
fn mapping_and_table_normalize_to_the_same_table() {
    let d = drawer();
    let pairs = [
        (
            d.bar_chart(sales_mapping(), BarOptions::new("region", "sales")),
            d.bar_chart(sales_table(), BarOptions::new("region", "sales")),
        ),
        (
            d.column_chart(sales_mapping(), BarOptions::new("region", "sales")),
            d.column_chart(sales_table(), BarOptions::new("region", "sales")),
        ),
        (
            d.line_chart(sales_mapping(), LineOptions::new("units", "sales")),
            d.line_chart(sales_table(), LineOptions::new("units", "sales")),
        ),
        (
            d.stacked_bar_chart(sales_mapping(), StackedOptions::default()),
            d.stacked_bar_chart(sales_table(), StackedOptions::default()),
        ),
    ];

    for (from_mapping, from_table) in pairs {
        let (a, b) = (from_mapping.unwrap(), from_table.unwrap());
        let (ta, tb) = (a.table.as_ref().unwrap(), b.table.as_ref().unwrap());
        assert!(ta.equals(tb), "{:?} != {:?}", ta, tb);
        assert_eq!(a.plot, b.plot);
    }
}

#[test]
fn pie_slices_follow_mapping_insertion_order() {
    let data = PieData::mapping([("zeta", 1.0), ("alpha", 2.0), ("mid", 3.0), ("beta", 4.0)]);
    let fig = drawer().pie_chart(data, PieOptions::default()).unwrap();
    let labels: Vec<&str> = fig
        .pie()
        .unwrap()
        .slices
        .iter()
        .filter_map(|s| s.label.as_deref())
        .collect();
    assert_eq!(labels, vec!["zeta", "alpha", "mid", "beta"]);
    assert!(fig.decorations.equal_aspect);
}

#[test]
fn bare_pie_values_require_labels() {
    let err = drawer()
        .pie_chart(vec![1.0, 2.0, 3.0], PieOptions::default())
        .unwrap_err();
    assert!(matches!(err, ChartError::LabelsRequired));

    let opts = PieOptions {
        labels: Some(vec!["a".into(), "b".into(), "c".into()]),
        ..PieOptions::default()
    };
    let fig = drawer().pie_chart(vec![1.0, 2.0, 3.0], opts).unwrap();
    assert_eq!(fig.pie().unwrap().slices.len(), 3);
}

#[test]
fn hundred_values_in_ten_bins_are_equal_width() {
    let values: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin() * 12.0 + 3.0).collect();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let opts = HistogramOptions {
        bins: 10,
        kde: false,
        ..HistogramOptions::default()
    };
    let fig = drawer().histogram(values, opts).unwrap();
    let hist = fig.histogram().unwrap();

    assert_eq!(hist.binned.counts.len(), 10);
    assert_eq!(hist.binned.edges.len(), 11);
    assert_relative_eq!(hist.binned.edges[0], min);
    assert_relative_eq!(hist.binned.edges[10], max);
    let width = (max - min) / 10.0;
    for pair in hist.binned.edges.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], width, epsilon = 1e-9);
    }
    assert_eq!(hist.binned.counts.iter().sum::<usize>(), 100);
    assert!(hist.kde.is_none());
}

#[test]
fn histogram_uses_first_palette_color_and_y_grid_only() {
    let d = drawer();
    let fig = d
        .histogram(
            vec![1.0, 2.0, 2.0, 3.0, 3.0, 3.0],
            HistogramOptions {
                stat: Stat::Probability,
                ..HistogramOptions::default()
            },
        )
        .unwrap();
    let hist = fig.histogram().unwrap();
    assert_eq!(hist.color, fig.theme.palette.first());
    assert!(hist.kde.is_some());
    let grid = fig.decorations.grid.unwrap();
    assert!(grid.y && !grid.x);
    assert_relative_eq!(grid.alpha, 0.3);
}

#[test]
fn quarters() -> ChartInput {
    ChartInput::mapping([
        ("quarter", ColumnValues::from(vec!["q1", "q2", "q3", "q4"])),
        ("a", ColumnValues::from(vec![1.0, 2.0, 3.0, 4.0])),
        ("b", ColumnValues::from(vec![10.0, 0.0, 5.0, 2.5])),
        ("c", ColumnValues::from(vec![0.5, 7.0, 1.0, 8.0])),
    ])
}

#[test]
fn stacked_rows_become_groups_with_row_sums() {
    let fig = drawer()
        .stacked_bar_chart(quarters(), StackedOptions::default())
        .unwrap();
    let stacked = fig.stacked().unwrap();

    assert_eq!(stacked.orientation, Orientation::Vertical);
    assert_eq!(stacked.groups.len(), 4);
    let expected = [11.5, 9.0, 9.0, 14.5];
    for (group, sum) in stacked.groups.iter().zip(expected) {
        assert_eq!(group.segments.len(), 3);
        assert_relative_eq!(group.total(), sum);
        assert_relative_eq!(group.segments.last().unwrap().top, sum);
    }

    let legend = fig.decorations.legend.as_ref().unwrap();
    assert_eq!(legend.title.as_deref(), Some("Category"));
    assert_eq!(legend.placement, LegendPlacement::OutsideUpperRight);
    let names: Vec<&str> = legend.entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
    assert_ne!(fig.decorations.ticks, TickLabels::default());
}

#[test]
fn horizontal_stacks_keep_upright_ticks_and_one_color_per_series() {
    let opts = StackedOptions {
        horizontal: true,
        ..StackedOptions::default()
    };
    let fig = drawer().stacked_bar_chart(quarters(), opts).unwrap();
    let stacked = fig.stacked().unwrap();
    assert_eq!(stacked.orientation, Orientation::Horizontal);
    assert_eq!(stacked.groups.len(), 4);
    assert_eq!(fig.decorations.ticks, TickLabels::default());

    let legend = fig.decorations.legend.as_ref().unwrap();
    let colors: Vec<_> = legend.entries.iter().map(|(_, c)| *c).collect();
    assert_eq!(colors.len(), 3);
    assert_eq!(colors.iter().collect::<HashSet<_>>().len(), 3);
    for group in &stacked.groups {
        let segment_colors: Vec<_> = group.segments.iter().map(|s| s.color).collect();
        assert_eq!(segment_colors, colors);
    }
}

#[test]
fn figsize_override_applies_to_one_call_only() {
    let d = drawer();
    let default = FigureSize::new(8.0, 5.0);
    let custom = FigureSize::new(4.0, 4.0);

    let sizes_with = |figsize: Option<FigureSize>| {
        vec![
            d.bar_chart(
                sales_mapping(),
                BarOptions {
                    figsize,
                    ..BarOptions::new("region", "sales")
                },
            ),
            d.column_chart(
                sales_mapping(),
                BarOptions {
                    figsize,
                    ..BarOptions::new("region", "sales")
                },
            ),
            d.pie_chart(
                PieData::mapping([("a", 1.0), ("b", 2.0)]),
                PieOptions {
                    figsize,
                    ..PieOptions::default()
                },
            ),
            d.line_chart(
                sales_mapping(),
                LineOptions {
                    figsize,
                    ..LineOptions::new("units", "sales")
                },
            ),
            d.stacked_bar_chart(
                sales_mapping(),
                StackedOptions {
                    figsize,
                    ..StackedOptions::default()
                },
            ),
            d.histogram(
                vec![1.0, 2.0, 3.0],
                HistogramOptions {
                    figsize,
                    ..HistogramOptions::default()
                },
            ),
        ]
        .into_iter()
        .map(|fig| fig.unwrap().size)
        .collect::<Vec<_>>()
    };

    assert!(sizes_with(Some(custom)).iter().all(|s| *s == custom));
    assert!(sizes_with(None).iter().all(|s| *s == default));
}

#[test]
fn figure_info_is_unchanged_by_drawing() {
    let d = drawer();
    let before = d.figure_info();
    for _ in 0..3 {
        d.bar_chart(sales_mapping(), BarOptions::new("region", "sales"))
            .unwrap();
        d.histogram(vec![1.0, 5.0, 9.0], HistogramOptions::default())
            .unwrap();
    }
    let after = d.figure_info();
    assert_eq!(before, after);
    assert_eq!(after.figure, FigureSize::new(8.0, 5.0));
    assert_eq!(after.style, "whitegrid");
    assert_eq!(after.palette, "deep");
}

#[test]
fn unknown_theme_fails_at_draw_time() {
    let d = ChartDrawer::new(DrawerConfig::new((6.0, 4.0), "neon", "husl"));
    let err = d
        .pie_chart(PieData::mapping([("a", 1.0)]), PieOptions::default())
        .unwrap_err();
    match err {
        ChartError::UnknownTheme { kind, name } => {
            assert_eq!(kind, "style");
            assert_eq!(name, "neon");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_inputs_are_reported_not_guessed() {
    let d = drawer();
    let missing = d.bar_chart(sales_mapping(), BarOptions::new("region", "profit"));
    assert!(matches!(missing, Err(ChartError::InvalidInput(_))));

    let ragged = ChartInput::mapping([
        ("x", ColumnValues::from(vec![1.0, 2.0])),
        ("y", ColumnValues::from(vec![1.0])),
    ]);
    assert!(matches!(
        d.line_chart(ragged, LineOptions::new("x", "y")),
        Err(ChartError::InvalidInput(_))
    ));

    let huge = HistogramOptions {
        figsize: Some(FigureSize::new(1e9, 1e9)),
        ..HistogramOptions::default()
    };
    assert!(matches!(
        d.histogram(vec![1.0, 2.0], huge),
        Err(ChartError::InvalidInput(_))
    ));

    let text = Series::new("words".into(), &["a", "b"]);
    assert!(matches!(
        d.histogram(text, HistogramOptions::default()),
        Err(ChartError::InvalidInput(_))
    ));
}

#[test]
fn quoted_labels_are_distinct_bar_categories() {
    let input = ChartInput::mapping([
        ("name", ColumnValues::from(vec!["\"x\"", "x"])),
        ("score", ColumnValues::from(vec![1.0, 9.0])),
    ]);
    let fig = drawer()
        .bar_chart(input, BarOptions::new("name", "score"))
        .unwrap();
    let bars = fig.bars().unwrap();
    assert_eq!(bars.categories, vec!["\"x\"", "x"]);
    let heights: Vec<f64> = bars.bars.iter().map(|b| b.height).collect();
    assert_eq!(heights, vec![1.0, 9.0]);
}

#[test]
fn bar_hue_dodges_within_the_category_slot() {
    let input = ChartInput::mapping([
        ("day", ColumnValues::from(vec!["mon", "mon", "tue", "tue"])),
        ("shift", ColumnValues::from(vec!["am", "pm", "am", "pm"])),
        ("orders", ColumnValues::from(vec![3.0, 5.0, 4.0, 6.0])),
    ]);
    let fig = drawer()
        .bar_chart(input, BarOptions::new("day", "orders").hue("shift"))
        .unwrap();
    let bars = fig.bars().unwrap();
    assert_eq!(bars.categories, vec!["mon", "tue"]);
    assert_eq!(bars.bars.len(), 4);
    assert_relative_eq!(bars.bars[0].width, 0.4);
    assert!(bars.bars[0].position < bars.bars[1].position);
    assert_eq!(bars.bars[0].color, bars.bars[2].color);
    assert_ne!(bars.bars[0].color, bars.bars[1].color);
    assert_eq!(fig.decorations.legend.unwrap().entries.len(), 2);
}

proptest! {
    #[test]
    fn pie_gets_one_color_per_category(n in 2usize..40, palette in prop::sample::select(vec!["husl", "hls", "deep", "tab10"])) {
        let d = ChartDrawer::new(DrawerConfig::new((6.0, 6.0), "white", palette));
        let data = PieData::mapping((0..n).map(|i| (format!("c{i}"), 1.0 + i as f64)));
        let fig = d.pie_chart(data, PieOptions::default()).unwrap();
        let slices = &fig.pie().unwrap().slices;
        prop_assert_eq!(slices.len(), n);

        let colors = fig.theme.colors(n);
        for (slice, color) in slices.iter().zip(&colors) {
            prop_assert_eq!(slice.color, *color);
        }
        // Fixed-size palettes cycle once exhausted.
        if palette == "deep" || palette == "tab10" {
            for i in 10..n {
                prop_assert_eq!(slices[i].color, slices[i - 10].color);
            }
        }
    }

    #[test]
    fn pie_fractions_sum_to_one(values in prop::collection::vec(0.1f64..100.0, 1..20)) {
        let labeled: Vec<(String, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("s{i}"), *v))
            .collect();
        let fig = drawer().pie_chart(labeled, PieOptions::default()).unwrap();
        let total: f64 = fig.pie().unwrap().slices.iter().map(|s| s.fraction).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }
}

//! Rendering needs a system sans-serif font; run with `cargo test -- --ignored`.

use chart_drawer::{
    BarOptions, ChartDrawer, ChartInput, ColumnValues, DrawerConfig, HistogramOptions,
    PieData, PieOptions, StackedOptions,
};
use std::io::Write;

fn quarterly() -> ChartInput {
    ChartInput::mapping([
        ("quarter", ColumnValues::from(vec!["q1", "q2", "q3"])),
        ("east", ColumnValues::from(vec![3.0, 4.0, -1.0])),
        ("west", ColumnValues::from(vec![2.0, 6.0, 5.0])),
    ])
}

#[test]
#[ignore]
fn bitmap_matches_figure_pixel_size() {
    let drawer = ChartDrawer::new(DrawerConfig::new((4.0, 3.0), "darkgrid", "husl"));
    let fig = drawer
        .bar_chart(quarterly(), BarOptions::new("quarter", "east"))
        .unwrap();
    let image = fig.render_rgb().unwrap();
    assert_eq!(image.dimensions(), (400, 300));
    // Not a blank canvas.
    let first = *image.get_pixel(0, 0);
    assert!(image.pixels().any(|p| *p != first));
}

#[test]
#[ignore]
fn every_kind_renders_to_png_and_svg() {
    let drawer = ChartDrawer::default();
    let figures = vec![
        drawer
            .stacked_bar_chart(quarterly(), StackedOptions::default())
            .unwrap(),
        drawer
            .pie_chart(
                PieData::mapping([("a", 1.0), ("b", 3.0)]),
                PieOptions {
                    explode: Some(vec![0.1, 0.0]),
                    ..PieOptions::default()
                },
            )
            .unwrap(),
        drawer
            .histogram(
                (0..200).map(|i| (i as f64).sqrt()).collect::<Vec<_>>(),
                HistogramOptions::default(),
            )
            .unwrap(),
    ];

    for fig in figures {
        let png = fig.to_png_bytes().unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let svg = fig.render_svg().unwrap();
        assert!(svg.starts_with("<svg"));
    }
}

#[test]
#[ignore]
fn save_png_writes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hist.png");
    ChartDrawer::default()
        .histogram(vec![1.0, 2.0, 2.0, 4.0], HistogramOptions::default())
        .unwrap()
        .save_png(&path)
        .unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn drawer_config_loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{ "figsize": {{ "width": 12.0, "height": 4.0 }}, "style": "ticks" }}"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = DrawerConfig::from_json_file(file.path()).unwrap();
    let info = ChartDrawer::new(config).figure_info();
    assert_eq!(info.figure.pixels(), (1200, 400));
    assert_eq!(info.style, "ticks");
    assert_eq!(info.palette, "husl");
}

#[test]
fn oversized_figure_fails_instead_of_allocating() {
    let mut fig = ChartDrawer::default()
        .histogram(vec![1.0, 2.0, 3.0], HistogramOptions::default())
        .unwrap();
    fig.size = chart_drawer::FigureSize::new(1e9, 1e9);
    assert!(matches!(
        fig.render_rgb(),
        Err(chart_drawer::ChartError::InvalidInput(_))
    ));
}

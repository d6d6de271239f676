//! Figure Renderer
//! Draws a [`Figure`] onto any plotters backend.
//!
//! Layout:
//! 1. Bold title centered above the axes
//! 2. Axes filled with the style background, grid and spines per style
//! 3. Plot geometry in data coordinates
//! 4. Legend inside the upper right corner, or in a strip beside the axes

use crate::charts::figure::{
    BarPlot, Figure, HistogramPlot, Legend, LegendPlacement, LinePlot, Orientation, PiePlot,
    Plot, StackedPlot, TextSpec,
};
use crate::config::DPI;
use crate::error::{ChartError, ChartResult};
use crate::theme::Color as ThemeColor;
use image::{ImageFormat, RgbImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use tracing::debug;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const TICK_FONT_PT: f64 = 10.0;
const LEGEND_FONT_PT: f64 = 10.0;
const TEXT: RGBColor = RGBColor(0x26, 0x26, 0x26);
const ERROR_BAR: RGBColor = RGBColor(0x42, 0x42, 0x42);
/// Stacked bars cover half of their category slot.
const STACK_WIDTH: f64 = 0.5;
/// Pie radius in data units; the axes span a little more for labels.
const PIE_EXTENT: f64 = 1.35;

fn render_err(e: impl std::fmt::Display) -> ChartError {
    ChartError::Render(e.to_string())
}

fn rgb(c: ThemeColor) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Points to pixels at the figure DPI.
fn px(points: f64) -> f64 {
    points * DPI / 72.0
}

fn text_style(spec: &TextSpec) -> TextStyle<'static> {
    let style = if spec.bold {
        FontStyle::Bold
    } else {
        FontStyle::Normal
    };
    FontDesc::new(FontFamily::SansSerif, px(spec.size), style).color(&TEXT)
}

fn plain_style(points: f64) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, px(points), FontStyle::Normal).color(&TEXT)
}

/// Range covering `lo..hi` with `pad` of the span added on each side.
/// A side resting on zero stays there so bars start at the axis.
fn value_range(lo: f64, hi: f64, pad: f64) -> Range<f64> {
    let (lo, hi) = if !(lo.is_finite() && hi.is_finite()) {
        (0.0, 1.0)
    } else if hi - lo <= f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    };
    let span = hi - lo;
    let lo = if lo == 0.0 { 0.0 } else { lo - span * pad };
    let hi = if hi == 0.0 { 0.0 } else { hi + span * pad };
    lo..hi
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        })
}

fn category_range(n: usize) -> Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

/// Label of the category at integer position `v`; blank between categories.
fn category_at(categories: &[String], v: f64) -> String {
    let i = v.round();
    if (v - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    categories.get(i as usize).cloned().unwrap_or_default()
}

/// Axis setup for one cartesian chart.
struct AxisSpec<'c> {
    x: Range<f64>,
    y: Range<f64>,
    x_categories: Option<&'c [String]>,
    y_categories: Option<&'c [String]>,
}

pub struct FigureRenderer;

impl FigureRenderer {
    /// Draw `figure` onto `root`, which must already be sized to the figure.
    pub fn draw<DB: DrawingBackend>(
        figure: &Figure,
        root: &DrawingArea<DB, Shift>,
    ) -> ChartResult<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let outside = figure
            .decorations
            .legend
            .as_ref()
            .filter(|l| l.placement == LegendPlacement::OutsideUpperRight);
        let (w, _) = root.dim_in_pixel();
        let strip = match outside {
            Some(_) => (w as f64 * 0.18).clamp(110.0, 240.0) as u32,
            None => 0,
        };
        let (area, side) = root.split_horizontally(w.saturating_sub(strip));

        match &figure.plot {
            Plot::Bars(plot) => Self::draw_bars(figure, &area, plot)?,
            Plot::Pie(plot) => Self::draw_pie(figure, &area, plot)?,
            Plot::Lines(plot) => Self::draw_lines(figure, &area, plot)?,
            Plot::Stacked(plot) => Self::draw_stacked(figure, &area, plot)?,
            Plot::Histogram(plot) => Self::draw_histogram(figure, &area, plot)?,
        }

        if let Some(legend) = outside {
            Self::draw_outside_legend(&side, legend)?;
        }
        Ok(())
    }

    /// Build the axes, paint the background and draw grid, ticks and labels.
    fn axes<'a, DB: DrawingBackend>(
        figure: &Figure,
        area: &'a DrawingArea<DB, Shift>,
        spec: AxisSpec<'_>,
    ) -> ChartResult<Chart<'a, DB>> {
        let deco = &figure.decorations;
        let rotated = deco.ticks.rotation != 0.0;
        let x_area = (if rotated { 90 } else { 45 }) + deco.x_label.as_ref().map_or(0, |_| 30);
        let y_area = 60 + deco.y_label.as_ref().map_or(0, |_| 30);

        let mut builder = ChartBuilder::on(area);
        builder
            .margin(15)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area);
        if let Some(title) = &deco.title {
            builder.caption(&title.text, text_style(title));
        }
        let mut chart = builder
            .build_cartesian_2d(spec.x.clone(), spec.y.clone())
            .map_err(render_err)?;

        let style = figure.theme.style;
        chart
            .plotting_area()
            .fill(&rgb(style.axes_background()))
            .map_err(render_err)?;

        // The style grid wins; an overlay without one draws faint black lines.
        let overlay = deco.grid;
        let grid_color: RGBAColor = match (style.grid(), overlay) {
            (Some(c), _) => rgb(c).mix(1.0),
            (None, Some(o)) => BLACK.mix(o.alpha),
            (None, None) => TRANSPARENT,
        };
        let show_x = style.grid().is_some() || overlay.is_some_and(|o| o.x);
        let show_y = style.grid().is_some() || overlay.is_some_and(|o| o.y);
        let spine: RGBAColor = style.spine().map_or(TRANSPARENT, |c| rgb(c).mix(1.0));

        let fmt_x = |v: &f64| category_at(spec.x_categories.unwrap_or(&[]), *v);
        let fmt_y = |v: &f64| category_at(spec.y_categories.unwrap_or(&[]), *v);

        {
            let mut mesh = chart.configure_mesh();
            mesh.bold_line_style(grid_color)
                .light_line_style(TRANSPARENT)
                .axis_style(spine)
                .label_style(plain_style(TICK_FONT_PT));
            if !show_x {
                mesh.disable_x_mesh();
            }
            if !show_y {
                mesh.disable_y_mesh();
            }
            if let Some(categories) = spec.x_categories {
                mesh.x_labels(categories.len().max(1)).x_label_formatter(&fmt_x);
            }
            if let Some(categories) = spec.y_categories {
                mesh.y_labels(categories.len().max(1)).y_label_formatter(&fmt_y);
            }
            if rotated {
                // Quarter turns only; 45 degrees is approximated by reading upward.
                mesh.x_label_style(
                    plain_style(TICK_FONT_PT)
                        .transform(FontTransform::Rotate270)
                        .pos(Pos::new(HPos::Right, VPos::Center)),
                );
            }
            if let Some(label) = &deco.x_label {
                mesh.x_desc(label.text.as_str());
            }
            if let Some(label) = &deco.y_label {
                mesh.y_desc(label.text.as_str());
            }
            let desc_size = deco
                .x_label
                .as_ref()
                .or(deco.y_label.as_ref())
                .map_or(TICK_FONT_PT, |l| l.size);
            mesh.axis_desc_style(plain_style(desc_size));
            mesh.draw().map_err(render_err)?;
        }

        Ok(chart)
    }

    fn draw_bars<DB: DrawingBackend>(
        figure: &Figure,
        area: &DrawingArea<DB, Shift>,
        plot: &BarPlot,
    ) -> ChartResult<()> {
        let (lo, hi) = bounds(plot.bars.iter().flat_map(|b| {
            let (el, eh) = b.error.unwrap_or((b.height, b.height));
            [0.0, b.height, el, eh]
        }));
        let mut chart = Self::axes(
            figure,
            area,
            AxisSpec {
                x: category_range(plot.categories.len()),
                y: value_range(lo, hi, 0.05),
                x_categories: Some(&plot.categories),
                y_categories: None,
            },
        )?;

        let bars = plot.bars.iter().filter(|b| b.height.is_finite());
        chart
            .draw_series(bars.clone().map(|b| {
                let half = b.width / 2.0;
                Rectangle::new(
                    [(b.position - half, 0.0), (b.position + half, b.height)],
                    rgb(b.color).filled(),
                )
            }))
            .map_err(render_err)?;
        chart
            .draw_series(bars.filter_map(|b| {
                b.error.map(|(el, eh)| {
                    PathElement::new(
                        vec![(b.position, el), (b.position, eh)],
                        ERROR_BAR.stroke_width(2),
                    )
                })
            }))
            .map_err(render_err)?;

        Self::draw_inside_legend(&mut chart, figure.decorations.legend.as_ref())
    }

    fn draw_lines<DB: DrawingBackend>(
        figure: &Figure,
        area: &DrawingArea<DB, Shift>,
        plot: &LinePlot,
    ) -> ChartResult<()> {
        let points = || plot.series.iter().flat_map(|s| s.points.iter());
        let (lo, hi) = bounds(points().flat_map(|p| {
            let (bl, bh) = p.band.unwrap_or((p.y, p.y));
            [p.y, bl, bh]
        }));
        let x = match &plot.x_categories {
            Some(categories) => category_range(categories.len()),
            None => {
                let (xl, xh) = bounds(points().map(|p| p.x));
                value_range(xl, xh, 0.02)
            }
        };
        let mut chart = Self::axes(
            figure,
            area,
            AxisSpec {
                x,
                y: value_range(lo, hi, 0.05),
                x_categories: plot.x_categories.as_deref(),
                y_categories: None,
            },
        )?;

        for series in &plot.series {
            let color = rgb(series.color);
            // One translucent band per run of points that have an interval.
            for run in series
                .points
                .split(|p| p.band.is_none())
                .filter(|run| run.len() >= 2)
            {
                let upper = run.iter().filter_map(|p| p.band.map(|(_, h)| (p.x, h)));
                let lower = run.iter().rev().filter_map(|p| p.band.map(|(l, _)| (p.x, l)));
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        upper.chain(lower).collect::<Vec<_>>(),
                        color.mix(0.2).filled(),
                    )))
                    .map_err(render_err)?;
            }
            chart
                .draw_series(LineSeries::new(
                    series.points.iter().map(|p| (p.x, p.y)),
                    color.stroke_width(2),
                ))
                .map_err(render_err)?;
            if plot.markers {
                chart
                    .draw_series(
                        series
                            .points
                            .iter()
                            .map(|p| Circle::new((p.x, p.y), 4, color.filled())),
                    )
                    .map_err(render_err)?;
            }
        }

        Self::draw_inside_legend(&mut chart, figure.decorations.legend.as_ref())
    }

    fn draw_stacked<DB: DrawingBackend>(
        figure: &Figure,
        area: &DrawingArea<DB, Shift>,
        plot: &StackedPlot,
    ) -> ChartResult<()> {
        let labels: Vec<String> = plot.groups.iter().map(|g| g.label.clone()).collect();
        let (lo, hi) = bounds(
            plot.groups
                .iter()
                .flat_map(|g| g.segments.iter().flat_map(|s| [0.0, s.base, s.top])),
        );
        let categories = category_range(labels.len());
        let values = value_range(lo, hi, 0.05);
        let horizontal = plot.orientation == Orientation::Horizontal;
        let spec = if horizontal {
            AxisSpec {
                x: values,
                y: categories,
                x_categories: None,
                y_categories: Some(&labels),
            }
        } else {
            AxisSpec {
                x: categories,
                y: values,
                x_categories: Some(&labels),
                y_categories: None,
            }
        };
        let mut chart = Self::axes(figure, area, spec)?;

        let half = STACK_WIDTH / 2.0;
        let rects = plot.groups.iter().enumerate().flat_map(|(i, group)| {
            let at = i as f64;
            group.segments.iter().map(move |s| {
                let corners = if horizontal {
                    [(s.base, at - half), (s.top, at + half)]
                } else {
                    [(at - half, s.base), (at + half, s.top)]
                };
                Rectangle::new(corners, rgb(s.color).filled())
            })
        });
        chart.draw_series(rects).map_err(render_err)?;
        Ok(())
    }

    fn draw_histogram<DB: DrawingBackend>(
        figure: &Figure,
        area: &DrawingArea<DB, Shift>,
        plot: &HistogramPlot,
    ) -> ChartResult<()> {
        let edges = &plot.binned.edges;
        let (xl, xh) = bounds(
            edges
                .iter()
                .copied()
                .chain(plot.kde.iter().flatten().map(|p| p.0)),
        );
        let (_, top) = bounds(
            plot.heights
                .iter()
                .copied()
                .chain(plot.kde.iter().flatten().map(|p| p.1)),
        );
        let mut chart = Self::axes(
            figure,
            area,
            AxisSpec {
                x: value_range(xl, xh, 0.02),
                y: value_range(0.0, top, 0.05),
                x_categories: None,
                y_categories: None,
            },
        )?;

        let color = rgb(plot.color);
        let bins = edges.windows(2).zip(&plot.heights);
        chart
            .draw_series(bins.clone().map(|(edge, &h)| {
                Rectangle::new([(edge[0], 0.0), (edge[1], h)], color.mix(0.75).filled())
            }))
            .map_err(render_err)?;
        chart
            .draw_series(bins.map(|(edge, &h)| {
                Rectangle::new([(edge[0], 0.0), (edge[1], h)], WHITE.stroke_width(1))
            }))
            .map_err(render_err)?;
        if let Some(curve) = &plot.kde {
            chart
                .draw_series(LineSeries::new(curve.iter().copied(), color.stroke_width(2)))
                .map_err(render_err)?;
        }
        Ok(())
    }

    fn draw_pie<DB: DrawingBackend>(
        figure: &Figure,
        area: &DrawingArea<DB, Shift>,
        plot: &PiePlot,
    ) -> ChartResult<()> {
        match &figure.decorations.title {
            Some(title) => {
                let titled = area
                    .titled(&title.text, text_style(title))
                    .map_err(render_err)?;
                Self::draw_pie_body(&titled, plot)
            }
            None => Self::draw_pie_body(area, plot),
        }
    }

    fn draw_pie_body<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        plot: &PiePlot,
    ) -> ChartResult<()> {
        // Equal aspect: stretch the longer side's range to match the pixels.
        let (w, h) = area.dim_in_pixel();
        let aspect = w.max(1) as f64 / h.max(1) as f64;
        let (xr, yr) = if aspect >= 1.0 {
            (PIE_EXTENT * aspect, PIE_EXTENT)
        } else {
            (PIE_EXTENT, PIE_EXTENT / aspect)
        };
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .build_cartesian_2d(-xr..xr, -yr..yr)
            .map_err(render_err)?;

        let centered = |points: f64| plain_style(points).pos(Pos::new(HPos::Center, VPos::Center));
        for slice in &plot.slices {
            let mid = slice.mid_angle().to_radians();
            let (cx, cy) = (slice.explode * mid.cos(), slice.explode * mid.sin());
            let steps = ((slice.end_angle - slice.start_angle).abs() / 2.0).ceil().max(1.0) as usize;
            let mut outline = vec![(cx, cy)];
            outline.extend((0..=steps).map(|k| {
                let t = (slice.start_angle
                    + (slice.end_angle - slice.start_angle) * k as f64 / steps as f64)
                    .to_radians();
                (cx + t.cos(), cy + t.sin())
            }));
            chart
                .draw_series(std::iter::once(Polygon::new(
                    outline,
                    rgb(slice.color).filled(),
                )))
                .map_err(render_err)?;

            if let Some(label) = &slice.label {
                let at = (cx + 1.1 * mid.cos(), cy + 1.1 * mid.sin());
                chart
                    .draw_series(std::iter::once(Text::new(
                        label.clone(),
                        at,
                        centered(LEGEND_FONT_PT),
                    )))
                    .map_err(render_err)?;
            }
            if let Some(percent) = &slice.percent_label {
                let at = (cx + 0.6 * mid.cos(), cy + 0.6 * mid.sin());
                chart
                    .draw_series(std::iter::once(Text::new(
                        percent.clone(),
                        at,
                        centered(LEGEND_FONT_PT),
                    )))
                    .map_err(render_err)?;
            }
        }
        Ok(())
    }

    fn draw_inside_legend<'a, DB: DrawingBackend + 'a>(
        chart: &mut Chart<'a, DB>,
        legend: Option<&Legend>,
    ) -> ChartResult<()> {
        let Some(legend) = legend else {
            return Ok(());
        };
        for (name, color) in &legend.entries {
            let c = rgb(*color);
            chart
                .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
                .map_err(render_err)?
                .label(name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled()));
        }
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(TEXT)
            .label_font(plain_style(LEGEND_FONT_PT))
            .draw()
            .map_err(render_err)
    }

    /// Title and swatches top-aligned in the strip right of the axes.
    fn draw_outside_legend<DB: DrawingBackend>(
        side: &DrawingArea<DB, Shift>,
        legend: &Legend,
    ) -> ChartResult<()> {
        let line = (px(LEGEND_FONT_PT) * 1.6) as i32;
        let mut y = 40;
        if let Some(title) = &legend.title {
            side.draw(&Text::new(title.clone(), (8, y), plain_style(LEGEND_FONT_PT)))
                .map_err(render_err)?;
            y += line;
        }
        for (name, color) in &legend.entries {
            side.draw(&Rectangle::new(
                [(8, y), (22, y + 12)],
                rgb(*color).filled(),
            ))
            .map_err(render_err)?;
            side.draw(&Text::new(name.clone(), (30, y), plain_style(LEGEND_FONT_PT)))
                .map_err(render_err)?;
            y += line;
        }
        Ok(())
    }
}

impl Figure {
    /// Rasterize at the figure's pixel size.
    pub fn render_rgb(&self) -> ChartResult<RgbImage> {
        self.size.validate()?;
        let (w, h) = self.pixel_size();
        let len = (w as usize)
            .checked_mul(h as usize)
            .and_then(|n| n.checked_mul(3))
            .ok_or_else(|| ChartError::invalid(format!("canvas {}x{} is too large", w, h)))?;
        let mut buffer = vec![0u8; len];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            FigureRenderer::draw(self, &root)?;
            root.present().map_err(render_err)?;
        }
        debug!(width = w, height = h, "rendered figure");
        RgbImage::from_raw(w, h, buffer)
            .ok_or_else(|| ChartError::Render("pixel buffer has the wrong size".to_string()))
    }

    pub fn to_png_bytes(&self) -> ChartResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.render_rgb()?
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(render_err)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> ChartResult<()> {
        let path = path.as_ref();
        self.render_rgb()?.save(path).map_err(render_err)?;
        debug!(path = %path.display(), "saved figure");
        Ok(())
    }

    pub fn render_svg(&self) -> ChartResult<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.pixel_size()).into_drawing_area();
            FigureRenderer::draw(self, &root)?;
            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }
}

//! Figure Module
//! The resolved scene every chart operation produces: geometry, colors and
//! decorations, ready to be rendered or inspected.

use crate::charts::histogram::Stat;
use crate::config::FigureSize;
use crate::stats::Binned;
use crate::theme::{Color, Theme};
use polars::prelude::DataFrame;

/// Title font size in points.
pub const TITLE_FONT_SIZE: f64 = 16.0;
/// Axis label font size in points for most charts.
pub const LABEL_FONT_SIZE: f64 = 16.0;
/// Axis label font size in points for stacked bar charts.
pub const STACKED_LABEL_FONT_SIZE: f64 = 12.0;
/// Rotation applied to category tick labels, counterclockwise degrees.
pub const TICK_ROTATION: f64 = 45.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    pub size: f64,
    pub bold: bool,
}

impl TextSpec {
    pub fn new(text: impl Into<String>, size: f64) -> Self {
        Self {
            text: text.into(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Tick label orientation on the category axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickLabels {
    pub rotation: f64,
    pub align: HAlign,
}

impl Default for TickLabels {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            align: HAlign::Center,
        }
    }
}

impl TickLabels {
    pub fn rotated() -> Self {
        Self {
            rotation: TICK_ROTATION,
            align: HAlign::Right,
        }
    }
}

/// Extra grid lines drawn over the style's own grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOverlay {
    pub x: bool,
    pub y: bool,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    /// Upper right corner inside the axes.
    Inside,
    /// Beside the axes, top-aligned, so it never covers data.
    OutsideUpperRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: Option<String>,
    pub entries: Vec<(String, Color)>,
    pub placement: LegendPlacement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    pub title: Option<TextSpec>,
    pub x_label: Option<TextSpec>,
    pub y_label: Option<TextSpec>,
    pub ticks: TickLabels,
    pub grid: Option<GridOverlay>,
    pub legend: Option<Legend>,
    /// One data unit spans the same length on both axes.
    pub equal_aspect: bool,
}

impl Decorations {
    /// Title in bold plus optional axis labels; empty strings mean "no text".
    pub fn titled(title: &str, x_label: Option<&str>, y_label: Option<&str>, label_size: f64) -> Self {
        let text = |s: Option<&str>, size: f64| {
            s.filter(|s| !s.is_empty()).map(|s| TextSpec::new(s, size))
        };
        Self {
            title: text(Some(title), TITLE_FONT_SIZE).map(TextSpec::bold),
            x_label: text(x_label, label_size),
            y_label: text(y_label, label_size),
            ticks: TickLabels::default(),
            grid: None,
            legend: None,
            equal_aspect: false,
        }
    }
}

/// One bar of a bar or column chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub category: String,
    pub hue: Option<String>,
    /// Center on the category axis; category `i` is centered on `i`.
    pub position: f64,
    pub width: f64,
    /// Mean of the samples in this bar.
    pub height: f64,
    pub samples: usize,
    pub error: Option<(f64, f64)>,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarPlot {
    pub categories: Vec<String>,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: Option<String>,
    pub value: f64,
    pub fraction: f64,
    pub color: Color,
    /// Counterclockwise degrees from the positive x axis.
    pub start_angle: f64,
    pub end_angle: f64,
    /// Radial offset as a fraction of the radius.
    pub explode: f64,
    pub percent_label: Option<String>,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PiePlot {
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub x: f64,
    pub y: f64,
    pub samples: usize,
    pub band: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: Option<String>,
    pub color: Color,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    /// Set when x is categorical; point `x` values index into it.
    pub x_categories: Option<Vec<String>>,
    pub series: Vec<LineSeries>,
    pub markers: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackSegment {
    pub series: String,
    pub color: Color,
    pub base: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackGroup {
    pub label: String,
    pub segments: Vec<StackSegment>,
}

impl StackGroup {
    /// Sum of the segment extents, signed.
    pub fn total(&self) -> f64 {
        self.segments.iter().map(|s| s.top - s.base).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedPlot {
    pub orientation: Orientation,
    pub groups: Vec<StackGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPlot {
    pub binned: Binned,
    /// Bin heights in units of `stat`.
    pub heights: Vec<f64>,
    pub stat: Stat,
    pub color: Color,
    /// Density curve scaled to `stat`, when requested and estimable.
    pub kde: Option<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    Bars(BarPlot),
    Pie(PiePlot),
    Lines(LinePlot),
    Stacked(StackedPlot),
    Histogram(HistogramPlot),
}

/// A chart ready for display.
#[derive(Debug, Clone)]
pub struct Figure {
    pub size: FigureSize,
    pub theme: Theme,
    pub decorations: Decorations,
    /// The normalized table the chart was built from, for tabular charts.
    pub table: Option<DataFrame>,
    pub plot: Plot,
}

impl Figure {
    pub fn pixel_size(&self) -> (u32, u32) {
        self.size.pixels()
    }

    pub fn bars(&self) -> Option<&BarPlot> {
        match &self.plot {
            Plot::Bars(p) => Some(p),
            _ => None,
        }
    }

    pub fn pie(&self) -> Option<&PiePlot> {
        match &self.plot {
            Plot::Pie(p) => Some(p),
            _ => None,
        }
    }

    pub fn lines(&self) -> Option<&LinePlot> {
        match &self.plot {
            Plot::Lines(p) => Some(p),
            _ => None,
        }
    }

    pub fn stacked(&self) -> Option<&StackedPlot> {
        match &self.plot {
            Plot::Stacked(p) => Some(p),
            _ => None,
        }
    }

    pub fn histogram(&self) -> Option<&HistogramPlot> {
        match &self.plot {
            Plot::Histogram(p) => Some(p),
            _ => None,
        }
    }
}

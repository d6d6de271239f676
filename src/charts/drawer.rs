//! Chart Drawer
//! The public entry point: one method per chart type, all sharing the same
//! theme resolution and figure assembly.

use crate::charts::bar::build_bars;
use crate::charts::figure::{
    Decorations, Figure, GridOverlay, Orientation, Plot, TickLabels, LABEL_FONT_SIZE,
    STACKED_LABEL_FONT_SIZE,
};
use crate::charts::histogram::{build_histogram, HistogramInput, Stat};
use crate::charts::line::build_lines;
use crate::charts::pie::{build_pie, PieData};
use crate::charts::stacked::build_stacked;
use crate::config::{DrawerConfig, FigureInfo, FigureSize};
use crate::data::ChartInput;
use crate::error::{ChartError, ChartResult};
use crate::theme::Theme;
use polars::prelude::DataFrame;
use tracing::debug;

/// Opacity of the grid drawn over line charts and histograms.
pub const GRID_ALPHA: f64 = 0.3;

/// Options for [`ChartDrawer::bar_chart`] and [`ChartDrawer::column_chart`].
///
/// `None` text fields take the chart's default; an empty string draws nothing.
#[derive(Debug, Clone, Default)]
pub struct BarOptions {
    pub x: Option<String>,
    pub y: Option<String>,
    pub hue: Option<String>,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub figsize: Option<FigureSize>,
}

impl BarOptions {
    pub fn new(x: &str, y: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            ..Self::default()
        }
    }

    pub fn hue(mut self, hue: &str) -> Self {
        self.hue = Some(hue.to_string());
        self
    }
}

/// Options for [`ChartDrawer::pie_chart`].
#[derive(Debug, Clone)]
pub struct PieOptions {
    pub labels: Option<Vec<String>>,
    pub title: Option<String>,
    /// printf-style percent label; `None` hides the labels.
    pub autopct: Option<String>,
    pub start_angle: f64,
    pub explode: Option<Vec<f64>>,
    pub figsize: Option<FigureSize>,
}

impl Default for PieOptions {
    fn default() -> Self {
        Self {
            labels: None,
            title: None,
            autopct: Some("%1.1f%%".to_string()),
            start_angle: 90.0,
            explode: None,
            figsize: None,
        }
    }
}

/// Options for [`ChartDrawer::line_chart`].
#[derive(Debug, Clone)]
pub struct LineOptions {
    pub x: Option<String>,
    pub y: Option<String>,
    pub hue: Option<String>,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub figsize: Option<FigureSize>,
    pub markers: bool,
    /// Confidence level of the band in percent; `None` draws no band.
    pub ci: Option<f64>,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            x: None,
            y: None,
            hue: None,
            title: None,
            x_label: None,
            y_label: None,
            figsize: None,
            markers: false,
            ci: Some(95.0),
        }
    }
}

impl LineOptions {
    pub fn new(x: &str, y: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            ..Self::default()
        }
    }
}

/// Options for [`ChartDrawer::stacked_bar_chart`].
#[derive(Debug, Clone, Default)]
pub struct StackedOptions {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub figsize: Option<FigureSize>,
    pub horizontal: bool,
}

/// Options for [`ChartDrawer::histogram`].
#[derive(Debug, Clone)]
pub struct HistogramOptions {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub bins: usize,
    pub figsize: Option<FigureSize>,
    pub kde: bool,
    pub stat: Stat,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self {
            title: None,
            x_label: None,
            y_label: None,
            bins: 30,
            figsize: None,
            kde: true,
            stat: Stat::Count,
        }
    }
}

/// Draws themed charts from tables or mappings.
///
/// The configuration is fixed at construction. Style and palette are resolved
/// per call, so an unknown name fails the first chart rather than construction.
#[derive(Debug, Clone, Default)]
pub struct ChartDrawer {
    config: DrawerConfig,
}

/// What a chart-specific step hands back to [`ChartDrawer::compose`].
struct Built {
    plot: Plot,
    decorations: Decorations,
    table: Option<DataFrame>,
}

impl ChartDrawer {
    pub fn new(config: DrawerConfig) -> Self {
        Self { config }
    }

    /// Current figure size, style and palette.
    pub fn figure_info(&self) -> FigureInfo {
        FigureInfo::from(&self.config)
    }

    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    /// Resolve the theme and size, run the chart-specific step, assemble the figure.
    fn compose(
        &self,
        kind: &'static str,
        figsize: Option<FigureSize>,
        build: impl FnOnce(&Theme) -> ChartResult<Built>,
    ) -> ChartResult<Figure> {
        let size = figsize.unwrap_or(self.config.figsize);
        size.validate()?;
        let theme = Theme::resolve(&self.config.style, &self.config.palette)?;
        let Built {
            plot,
            decorations,
            table,
        } = build(&theme)?;
        debug!(
            kind,
            width = size.width,
            height = size.height,
            style = %theme.style_name,
            palette = %theme.palette_name,
            "composed figure"
        );
        Ok(Figure {
            size,
            theme,
            decorations,
            table,
            plot,
        })
    }

    pub fn bar_chart(&self, data: impl Into<ChartInput>, opts: BarOptions) -> ChartResult<Figure> {
        self.categorical("bar", data.into(), opts, ("Bar Chart", Some("X Axis"), Some("Y Axis")))
    }

    pub fn column_chart(
        &self,
        data: impl Into<ChartInput>,
        opts: BarOptions,
    ) -> ChartResult<Figure> {
        self.categorical("column", data.into(), opts, ("Column Chart", None, None))
    }

    fn categorical(
        &self,
        kind: &'static str,
        data: ChartInput,
        opts: BarOptions,
        defaults: (&str, Option<&str>, Option<&str>),
    ) -> ChartResult<Figure> {
        self.compose(kind, opts.figsize, |theme| {
            let df = data.into_table()?;
            let x = required(&opts.x, "x")?;
            let y = required(&opts.y, "y")?;
            let (plot, legend) = build_bars(&df, x, y, opts.hue.as_deref(), theme)?;

            let mut decorations = Decorations::titled(
                opts.title.as_deref().unwrap_or(defaults.0),
                opts.x_label.as_deref().or(defaults.1),
                opts.y_label.as_deref().or(defaults.2),
                LABEL_FONT_SIZE,
            );
            decorations.ticks = TickLabels::rotated();
            decorations.legend = legend;
            Ok(Built {
                plot: Plot::Bars(plot),
                decorations,
                table: Some(df),
            })
        })
    }

    pub fn pie_chart(&self, data: impl Into<PieData>, opts: PieOptions) -> ChartResult<Figure> {
        let data = data.into();
        self.compose("pie", opts.figsize, |theme| {
            let (labels, values) = data.resolve(opts.labels)?;
            let plot = build_pie(
                labels,
                values,
                opts.autopct.as_deref(),
                opts.start_angle,
                opts.explode.as_deref(),
                theme,
            )?;
            let mut decorations = Decorations::titled(
                opts.title.as_deref().unwrap_or("Pie Chart"),
                None,
                None,
                LABEL_FONT_SIZE,
            );
            decorations.equal_aspect = true;
            Ok(Built {
                plot: Plot::Pie(plot),
                decorations,
                table: None,
            })
        })
    }

    pub fn line_chart(&self, data: impl Into<ChartInput>, opts: LineOptions) -> ChartResult<Figure> {
        let data = data.into();
        self.compose("line", opts.figsize, |theme| {
            let df = data.into_table()?;
            let x = required(&opts.x, "x")?;
            let y = required(&opts.y, "y")?;
            let (plot, legend) =
                build_lines(&df, x, y, opts.hue.as_deref(), opts.ci, opts.markers, theme)?;

            let mut decorations = Decorations::titled(
                opts.title.as_deref().unwrap_or("Line Chart"),
                Some(opts.x_label.as_deref().unwrap_or("X Axis")),
                Some(opts.y_label.as_deref().unwrap_or("Y Axis")),
                LABEL_FONT_SIZE,
            );
            decorations.ticks = TickLabels::rotated();
            decorations.grid = Some(GridOverlay {
                x: true,
                y: true,
                alpha: GRID_ALPHA,
            });
            decorations.legend = legend;
            Ok(Built {
                plot: Plot::Lines(plot),
                decorations,
                table: Some(df),
            })
        })
    }

    pub fn stacked_bar_chart(
        &self,
        data: impl Into<ChartInput>,
        opts: StackedOptions,
    ) -> ChartResult<Figure> {
        let data = data.into();
        self.compose("stacked_bar", opts.figsize, |theme| {
            let df = data.into_table()?;
            let orientation = if opts.horizontal {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let (plot, legend) = build_stacked(&df, orientation, theme)?;

            let mut decorations = Decorations::titled(
                opts.title.as_deref().unwrap_or("Stacked Bar Chart"),
                opts.x_label.as_deref(),
                opts.y_label.as_deref(),
                STACKED_LABEL_FONT_SIZE,
            );
            if orientation == Orientation::Vertical {
                decorations.ticks = TickLabels::rotated();
            }
            decorations.legend = Some(legend);
            Ok(Built {
                plot: Plot::Stacked(plot),
                decorations,
                table: Some(df),
            })
        })
    }

    pub fn histogram(
        &self,
        data: impl Into<HistogramInput>,
        opts: HistogramOptions,
    ) -> ChartResult<Figure> {
        let data = data.into();
        self.compose("histogram", opts.figsize, |theme| {
            let values = data.into_values()?;
            let plot = build_histogram(&values, opts.bins, opts.kde, opts.stat, theme)?;

            let mut decorations = Decorations::titled(
                opts.title.as_deref().unwrap_or("Histogram Chart"),
                Some(opts.x_label.as_deref().unwrap_or("Value")),
                Some(opts.y_label.as_deref().unwrap_or("Frequency")),
                LABEL_FONT_SIZE,
            );
            decorations.grid = Some(GridOverlay {
                x: false,
                y: true,
                alpha: GRID_ALPHA,
            });
            Ok(Built {
                plot: Plot::Histogram(plot),
                decorations,
                table: None,
            })
        })
    }
}

fn required<'a>(column: &'a Option<String>, axis: &str) -> ChartResult<&'a str> {
    column
        .as_deref()
        .ok_or_else(|| ChartError::invalid(format!("no column given for {}", axis)))
}

//! Charts module - chart construction and rendering

mod bar;
mod drawer;
mod figure;
mod histogram;
mod line;
mod pie;
mod renderer;
mod stacked;

pub use bar::{BAR_SLOT_WIDTH, ERROR_BAR_LEVEL};
pub use drawer::{
    BarOptions, ChartDrawer, HistogramOptions, LineOptions, PieOptions, StackedOptions,
    GRID_ALPHA,
};
pub use figure::{
    Bar, BarPlot, Decorations, Figure, GridOverlay, HAlign, HistogramPlot, Legend,
    LegendPlacement, LinePlot, LinePoint, LineSeries, Orientation, PiePlot, PieSlice, Plot,
    StackGroup, StackSegment, StackedPlot, TextSpec, TickLabels, LABEL_FONT_SIZE,
    STACKED_LABEL_FONT_SIZE, TICK_ROTATION, TITLE_FONT_SIZE,
};
pub use histogram::{HistogramInput, Stat};
pub use pie::{format_percent, PieData};
pub use renderer::FigureRenderer;
pub use stacked::STACKED_LEGEND_TITLE;

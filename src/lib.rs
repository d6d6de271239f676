//! Chart Drawer - themed statistical charts from tables and mappings
//!
//! A [`ChartDrawer`] holds a figure size, style and palette. Each chart method
//! normalizes its input, builds a [`Figure`] and returns it for rendering,
//! saving or display.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod stats;
pub mod telemetry;
pub mod theme;

pub use charts::{
    BarOptions, ChartDrawer, Figure, HistogramInput, HistogramOptions, LineOptions, PieData,
    PieOptions, Stat, StackedOptions,
};
pub use config::{DrawerConfig, FigureInfo, FigureSize};
pub use data::{ChartInput, ColumnValues};
pub use error::{ChartError, ChartResult};
pub use gui::show_figure;
pub use theme::{Color, Palette, Style, Theme};

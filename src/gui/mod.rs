//! GUI module - workbench window and figure display

mod app;
mod chart_viewer;
mod control_panel;

pub use app::{draw_figure, ChartDrawerApp};
pub use chart_viewer::{show_figure, ChartViewer};
pub use control_panel::{ChartKind, ControlPanel, ControlPanelAction, UserSettings};

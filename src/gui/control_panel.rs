//! Control Panel Widget
//! Left side panel: data source, chart kind, column mapping and options.

use egui::{Color32, ComboBox, RichText};
use std::fmt;
use std::path::PathBuf;

/// Chart types offered by the workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Column,
    Pie,
    Line,
    StackedBar,
    Histogram,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Bar,
        ChartKind::Column,
        ChartKind::Pie,
        ChartKind::Line,
        ChartKind::StackedBar,
        ChartKind::Histogram,
    ];

    /// Whether the chart reads a category column.
    pub fn uses_x(&self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }

    /// Whether the chart reads a single value column.
    pub fn uses_y(&self) -> bool {
        !matches!(self, ChartKind::StackedBar)
    }

    pub fn uses_hue(&self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::Column | ChartKind::Line)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "Bar",
            ChartKind::Column => "Column",
            ChartKind::Pie => "Pie",
            ChartKind::Line => "Line",
            ChartKind::StackedBar => "Stacked Bar",
            ChartKind::Histogram => "Histogram",
        };
        f.write_str(name)
    }
}

/// What the user asked the workbench to draw.
#[derive(Debug, Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
    pub kind: ChartKind,
    pub x_col: String,
    pub y_col: String,
    /// Empty means no hue split.
    pub hue_col: String,
    /// Empty keeps the chart's default title.
    pub title: String,
    pub horizontal: bool,
    pub markers: bool,
    pub kde: bool,
    pub bins: usize,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            kind: ChartKind::default(),
            x_col: String::new(),
            y_col: String::new(),
            hue_col: String::new(),
            title: String::new(),
            horizontal: false,
            markers: false,
            kde: true,
            bins: 30,
        }
    }
}

/// Left side control panel with file selection and chart controls.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub status: String,
    pub busy: bool,
    pub draw_enabled: bool,
    pub save_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            columns: Vec::new(),
            numeric_columns: Vec::new(),
            status: "Ready".to_string(),
            busy: false,
            draw_enabled: false,
            save_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update available columns after a CSV load, preselecting sensible axes.
    pub fn update_columns(&mut self, columns: Vec<String>, numeric_columns: Vec<String>) {
        let s = &mut self.settings;
        s.x_col = columns
            .iter()
            .find(|c| !numeric_columns.contains(c))
            .or(columns.first())
            .cloned()
            .unwrap_or_default();
        s.y_col = numeric_columns.first().cloned().unwrap_or_default();
        s.hue_col.clear();
        self.draw_enabled = !columns.is_empty();
        self.columns = columns;
        self.numeric_columns = numeric_columns;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn column_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        selected: &mut String,
        choices: &[String],
        allow_none: bool,
    ) {
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new(label));
            let shown = if selected.is_empty() { "(none)" } else { selected.as_str() };
            ComboBox::from_id_salt(id)
                .width(160.0)
                .selected_text(shown.to_string())
                .show_ui(ui, |ui| {
                    if allow_none && ui.selectable_label(selected.is_empty(), "(none)").clicked() {
                        selected.clear();
                    }
                    for col in choices {
                        if ui.selectable_label(*selected == *col, col).clicked() {
                            *selected = col.clone();
                        }
                    }
                });
        });
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Chart Drawer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            let path_text = self
                .settings
                .csv_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "No file selected".to_string());
            ui.label(RichText::new(path_text).size(12.0));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!self.busy, egui::Button::new("📂 Browse")).clicked() {
                    action = ControlPanelAction::BrowseCsv;
                }
            });
        });

        ui.add_space(10.0);
        ui.separator();

        // ===== Chart =====
        ui.label(RichText::new("📈 Chart").size(14.0).strong());
        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Kind:"));
            ComboBox::from_id_salt("chart_kind")
                .width(160.0)
                .selected_text(self.settings.kind.to_string())
                .show_ui(ui, |ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut self.settings.kind, kind, kind.to_string());
                    }
                });
        });

        let kind = self.settings.kind;
        if kind.uses_x() {
            let label = if kind == ChartKind::StackedBar { "Labels:" } else { "X Column:" };
            Self::column_combo(ui, "x_col", label, &mut self.settings.x_col, &self.columns, false);
        }
        if kind.uses_y() {
            Self::column_combo(
                ui,
                "y_col",
                "Value:",
                &mut self.settings.y_col,
                &self.numeric_columns,
                false,
            );
        }
        if kind.uses_hue() {
            Self::column_combo(ui, "hue_col", "Hue:", &mut self.settings.hue_col, &self.columns, true);
        }

        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new("Title:"));
            ui.text_edit_singleline(&mut self.settings.title);
        });

        match kind {
            ChartKind::StackedBar => {
                ui.checkbox(&mut self.settings.horizontal, "Horizontal");
            }
            ChartKind::Line => {
                ui.checkbox(&mut self.settings.markers, "Markers");
            }
            ChartKind::Histogram => {
                ui.checkbox(&mut self.settings.kde, "Density curve");
                ui.add(egui::Slider::new(&mut self.settings.bins, 1..=100).text("Bins"));
            }
            _ => {}
        }

        ui.add_space(10.0);
        ui.separator();

        // ===== Actions =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.draw_enabled && !self.busy, |ui| {
                let button = egui::Button::new(RichText::new("▶ Draw").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Draw;
                }
            });
            ui.add_space(8.0);
            ui.add_enabled_ui(self.save_enabled && !self.busy, |ui| {
                let button = egui::Button::new(RichText::new("💾 Save PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::SavePng;
                }
            });
        });

        ui.add_space(10.0);
        ui.separator();

        if self.busy {
            ui.add(egui::Spinner::new());
        }
        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Draw,
    SavePng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_columns_preselects_text_x_and_numeric_y() {
        let mut panel = ControlPanel::new();
        panel.settings.hue_col = "stale".into();
        panel.update_columns(
            vec!["sales".into(), "region".into(), "units".into()],
            vec!["sales".into(), "units".into()],
        );
        assert_eq!(panel.settings.x_col, "region");
        assert_eq!(panel.settings.y_col, "sales");
        assert!(panel.settings.hue_col.is_empty());
        assert!(panel.draw_enabled);
    }

    #[test]
    fn kinds_declare_their_columns() {
        assert!(!ChartKind::Histogram.uses_x());
        assert!(!ChartKind::StackedBar.uses_y());
        assert!(ChartKind::Line.uses_hue());
        assert!(!ChartKind::Pie.uses_hue());
        assert_eq!(ChartKind::StackedBar.to_string(), "Stacked Bar");
    }
}

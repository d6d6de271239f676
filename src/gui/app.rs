//! Chart Drawer Workbench
//! Main window with control panel and chart viewer.

use crate::charts::{
    BarOptions, ChartDrawer, Figure, HistogramOptions, LineOptions, PieData, PieOptions,
    StackedOptions,
};
use crate::config::DrawerConfig;
use crate::data::{DataLoader, DataProcessor};
use crate::error::{ChartError, ChartResult};
use crate::gui::control_panel::{ChartKind, UserSettings};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use image::RgbImage;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use tracing::{info, warn};

/// Result of a background job.
enum JobResult {
    Loaded {
        df: DataFrame,
        path: PathBuf,
        columns: Vec<String>,
        numeric_columns: Vec<String>,
    },
    Drawn(RgbImage),
    Error(String),
}

/// Main application window.
pub struct ChartDrawerApp {
    drawer: ChartDrawer,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    job_rx: Option<Receiver<JobResult>>,
}

impl ChartDrawerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DrawerConfig) -> Self {
        Self {
            drawer: ChartDrawer::new(config),
            loader: DataLoader::new(),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            job_rx: None,
        }
    }

    /// Run `job` on a worker thread; its result is picked up in `update`.
    fn spawn_job(&mut self, status: &str, job: impl FnOnce() -> JobResult + Send + 'static) {
        let (tx, rx) = channel();
        self.job_rx = Some(rx);
        self.control_panel.busy = true;
        self.control_panel.set_status(status);
        thread::spawn(move || {
            let _ = tx.send(job());
        });
    }

    fn handle_browse_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        self.chart_viewer.clear();
        self.control_panel.save_enabled = false;
        self.control_panel.settings.csv_path = Some(path.clone());
        self.spawn_job("Loading CSV file...", move || {
            match DataLoader::read_csv(&path) {
                Ok(df) => {
                    let numeric_columns = df
                        .get_columns()
                        .iter()
                        .filter(|c| DataProcessor::is_numeric(c.dtype()))
                        .map(|c| c.name().to_string())
                        .collect();
                    JobResult::Loaded {
                        columns: DataProcessor::column_names(&df),
                        numeric_columns,
                        df,
                        path,
                    }
                }
                Err(e) => JobResult::Error(e.to_string()),
            }
        });
    }

    fn handle_draw(&mut self) {
        let Some(df) = self.loader.get_dataframe().cloned() else {
            self.control_panel.set_status("No data loaded");
            return;
        };
        let drawer = self.drawer.clone();
        let settings = self.control_panel.settings.clone();
        self.spawn_job("Drawing...", move || {
            match draw_figure(&drawer, &df, &settings).and_then(|f| f.render_rgb()) {
                Ok(image) => JobResult::Drawn(image),
                Err(e) => JobResult::Error(e.to_string()),
            }
        });
    }

    fn handle_save_png(&mut self) {
        let Some(image) = self.chart_viewer.image() else {
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("chart.png")
            .save_file()
        else {
            return;
        };

        match image.save(&path) {
            Ok(()) => {
                info!(path = %path.display(), "saved chart");
                if let Err(e) = open::that(&path) {
                    warn!(error = %e, "could not open saved chart");
                }
                self.control_panel
                    .set_status(format!("Saved {}", path.display()));
            }
            Err(e) => self.control_panel.set_status(format!("Error: {}", e)),
        }
    }

    /// Check for background job results
    fn check_job_results(&mut self) {
        let Some(rx) = self.job_rx.take() else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => {
                self.job_rx = Some(rx);
                return;
            }
            Err(TryRecvError::Disconnected) => JobResult::Error("worker stopped".to_string()),
        };

        self.control_panel.busy = false;
        match result {
            JobResult::Loaded {
                df,
                path,
                columns,
                numeric_columns,
            } => {
                let status = format!("Loaded {} rows, {} columns", df.height(), columns.len());
                self.loader.set_dataframe(df, Some(path));
                self.control_panel.update_columns(columns, numeric_columns);
                self.control_panel.set_status(status);
            }
            JobResult::Drawn(image) => {
                self.chart_viewer.set_image(image);
                self.control_panel.save_enabled = true;
                self.control_panel.set_status("Chart ready");
            }
            JobResult::Error(error) => {
                warn!(%error, "workbench job failed");
                self.control_panel.set_status(format!("Error: {}", error));
            }
        }
    }
}

fn optional(text: &str) -> Option<String> {
    Some(text.to_string()).filter(|t| !t.is_empty())
}

/// Build the figure the control panel settings describe from a loaded table.
pub fn draw_figure(
    drawer: &ChartDrawer,
    df: &DataFrame,
    settings: &UserSettings,
) -> ChartResult<Figure> {
    let title = optional(&settings.title);
    let hue = optional(&settings.hue_col);
    let x = &settings.x_col;
    let y = &settings.y_col;

    match settings.kind {
        ChartKind::Bar | ChartKind::Column => {
            let opts = BarOptions {
                hue,
                title,
                ..BarOptions::new(x, y)
            };
            if settings.kind == ChartKind::Bar {
                drawer.bar_chart(df.clone(), opts)
            } else {
                drawer.column_chart(df.clone(), opts)
            }
        }
        ChartKind::Line => drawer.line_chart(
            df.clone(),
            LineOptions {
                hue,
                title,
                markers: settings.markers,
                ..LineOptions::new(x, y)
            },
        ),
        ChartKind::Pie => {
            let labels = DataProcessor::label_values(df, x)?;
            let values = DataProcessor::numeric_values(df, y)?;
            let pairs: Vec<(String, f64)> = labels
                .into_iter()
                .zip(values)
                .filter_map(|(l, v)| Some((l?, v?)))
                .collect();
            drawer.pie_chart(
                PieData::Labeled(pairs),
                PieOptions {
                    title,
                    ..PieOptions::default()
                },
            )
        }
        ChartKind::StackedBar => {
            // The label column first, then every numeric column as a series.
            DataProcessor::require_column(df, x)?;
            let mut selection = vec![x.clone()];
            selection.extend(
                df.get_columns()
                    .iter()
                    .filter(|c| c.name().as_str() != x.as_str() && DataProcessor::is_numeric(c.dtype()))
                    .map(|c| c.name().to_string()),
            );
            let table = df.select(selection)?;
            drawer.stacked_bar_chart(
                table,
                StackedOptions {
                    title,
                    horizontal: settings.horizontal,
                    ..StackedOptions::default()
                },
            )
        }
        ChartKind::Histogram => {
            let values: Vec<f64> = DataProcessor::numeric_values(df, y)?
                .into_iter()
                .flatten()
                .collect();
            if values.is_empty() {
                return Err(ChartError::invalid(format!("column '{}' has no numbers", y)));
            }
            drawer.histogram(
                values,
                HistogramOptions {
                    title,
                    bins: settings.bins,
                    kde: settings.kde,
                    x_label: Some(y.clone()),
                    ..HistogramOptions::default()
                },
            )
        }
    }
}

impl eframe::App for ChartDrawerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_job_results();
        if self.control_panel.busy {
            ctx.request_repaint();
        }

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Draw => self.handle_draw(),
                        ControlPanelAction::SavePng => self.handle_save_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ctx, ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Plot;
    use pretty_assertions::assert_eq;

    fn table() -> DataFrame {
        polars::df!(
            "region" => ["north", "south", "east"],
            "q1" => [1.0, 2.0, 3.0],
            "q2" => [4.0, 5.0, 6.0],
            "note" => ["a", "b", "c"],
        )
        .unwrap()
    }

    fn settings(kind: ChartKind) -> UserSettings {
        UserSettings {
            kind,
            x_col: "region".into(),
            y_col: "q1".into(),
            ..UserSettings::default()
        }
    }

    #[test]
    fn stacked_selection_keeps_label_and_numeric_columns() {
        let fig = draw_figure(&ChartDrawer::default(), &table(), &settings(ChartKind::StackedBar))
            .unwrap();
        let names = DataProcessor::column_names(fig.table.as_ref().unwrap());
        assert_eq!(names, vec!["region", "q1", "q2"]);
    }

    #[test]
    fn pie_takes_labels_from_x_and_values_from_y() {
        let fig =
            draw_figure(&ChartDrawer::default(), &table(), &settings(ChartKind::Pie)).unwrap();
        let labels: Vec<_> = fig
            .pie()
            .unwrap()
            .slices
            .iter()
            .map(|s| s.label.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["north", "south", "east"]);
    }

    #[test]
    fn empty_title_field_keeps_default_and_histogram_labels_x_by_column() {
        let fig = draw_figure(&ChartDrawer::default(), &table(), &settings(ChartKind::Histogram))
            .unwrap();
        assert!(matches!(fig.plot, Plot::Histogram(_)));
        assert_eq!(fig.decorations.title.unwrap().text, "Histogram Chart");
        assert_eq!(fig.decorations.x_label.unwrap().text, "q1");
    }

    #[test]
    fn unknown_column_surfaces_as_error() {
        let mut s = settings(ChartKind::Line);
        s.y_col = "missing".into();
        assert!(draw_figure(&ChartDrawer::default(), &table(), &s).is_err());
    }
}

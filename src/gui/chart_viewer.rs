//! Chart Viewer Widget
//! Central panel showing the last rendered figure, scaled to fit.

use crate::charts::Figure;
use crate::error::{ChartError, ChartResult};
use egui::{ColorImage, RichText, TextureHandle, TextureOptions};
use image::RgbImage;

/// Holds a rendered figure and its GPU texture.
#[derive(Default)]
pub struct ChartViewer {
    image: Option<RgbImage>,
    texture: Option<TextureHandle>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.image = None;
        self.texture = None;
    }

    /// Replace the shown figure; the texture is uploaded on the next frame.
    pub fn set_image(&mut self, image: RgbImage) {
        self.image = Some(image);
        self.texture = None;
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(image) = &self.image else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Chart").size(20.0));
            });
            return;
        };

        let texture = self.texture.get_or_insert_with(|| {
            let size = [image.width() as usize, image.height() as usize];
            ctx.load_texture(
                "figure",
                ColorImage::from_rgb(size, image.as_raw()),
                TextureOptions::LINEAR,
            )
        });
        ui.centered_and_justified(|ui| {
            ui.add(egui::Image::new(&*texture).shrink_to_fit());
        });
    }
}

/// A window holding one figure.
struct FigureWindow {
    viewer: ChartViewer,
}

impl eframe::App for FigureWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.show(ctx, ui);
        });
    }
}

/// Render `figure` and show it in a native window, blocking until it is closed.
pub fn show_figure(figure: &Figure) -> ChartResult<()> {
    let image = figure.render_rgb()?;
    let (w, h) = figure.pixel_size();
    let title = figure
        .decorations
        .title
        .as_ref()
        .map_or_else(|| "Figure".to_string(), |t| t.text.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([w as f32, h as f32])
            .with_title(title.clone()),
        ..Default::default()
    };
    let mut viewer = ChartViewer::new();
    viewer.set_image(image);

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(FigureWindow { viewer }))),
    )
    .map_err(|e| ChartError::Display(e.to_string()))
}

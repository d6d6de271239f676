//! Drawer Configuration Module
//! Figure size, style name and palette name, fixed for the lifetime of a drawer.

use crate::error::{ChartError, ChartResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Pixels per inch used when turning a figure size into a canvas.
pub const DPI: f64 = 100.0;

/// Largest canvas side in pixels a figure may ask for.
pub const MAX_CANVAS_PIXELS: u32 = 16_384;

/// Figure size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Reject sizes that cannot produce a canvas.
    pub fn validate(&self) -> ChartResult<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !(ok(self.width) && ok(self.height)) {
            return Err(ChartError::invalid(format!(
                "figure size must be two positive numbers, got {}x{}",
                self.width, self.height
            )));
        }
        let limit = f64::from(MAX_CANVAS_PIXELS) / DPI;
        if self.width * DPI > f64::from(MAX_CANVAS_PIXELS)
            || self.height * DPI > f64::from(MAX_CANVAS_PIXELS)
        {
            return Err(ChartError::invalid(format!(
                "figure size {}x{} exceeds {}x{} inches",
                self.width, self.height, limit, limit
            )));
        }
        Ok(())
    }

    /// Canvas size in pixels, never smaller than one pixel per side.
    pub fn pixels(&self) -> (u32, u32) {
        let px = |v: f64| ((v * DPI).round() as u32).max(1);
        (px(self.width), px(self.height))
    }
}

impl Default for FigureSize {
    fn default() -> Self {
        Self::new(10.0, 6.0)
    }
}

impl From<(f64, f64)> for FigureSize {
    fn from((width, height): (f64, f64)) -> Self {
        Self::new(width, height)
    }
}

fn default_style() -> String {
    "darkgrid".to_string()
}

fn default_palette() -> String {
    "husl".to_string()
}

/// Settings a drawer is constructed with.
///
/// Style and palette names are not checked here; an unknown name surfaces as
/// [`ChartError::UnknownTheme`] on the first chart drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawerConfig {
    #[serde(default)]
    pub figsize: FigureSize,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_palette")]
    pub palette: String,
}

impl Default for DrawerConfig {
    fn default() -> Self {
        Self {
            figsize: FigureSize::default(),
            style: default_style(),
            palette: default_palette(),
        }
    }
}

impl DrawerConfig {
    pub fn new(figsize: impl Into<FigureSize>, style: &str, palette: &str) -> Self {
        Self {
            figsize: figsize.into(),
            style: style.to_string(),
            palette: palette.to_string(),
        }
    }

    pub fn from_json_str(json: &str) -> ChartResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file; absent keys fall back to the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ChartResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Read-only view of a drawer's configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureInfo {
    pub figure: FigureSize,
    pub style: String,
    pub palette: String,
}

impl FigureInfo {
    /// Key-value form: `figure`, `style`, `palette`.
    pub fn to_map(&self) -> BTreeMap<String, serde_json::Value> {
        let mut map = BTreeMap::new();
        map.insert(
            "figure".to_string(),
            serde_json::json!([self.figure.width, self.figure.height]),
        );
        map.insert("style".to_string(), serde_json::json!(self.style));
        map.insert("palette".to_string(), serde_json::json!(self.palette));
        map
    }
}

impl From<&DrawerConfig> for FigureInfo {
    fn from(config: &DrawerConfig) -> Self {
        Self {
            figure: config.figsize,
            style: config.style.clone(),
            palette: config.palette.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_darkgrid_husl_ten_by_six() {
        let config = DrawerConfig::default();
        assert_eq!(config.figsize, FigureSize::new(10.0, 6.0));
        assert_eq!(config.style, "darkgrid");
        assert_eq!(config.palette, "husl");
        assert_eq!(config.figsize.pixels(), (1000, 600));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = DrawerConfig::from_json_str(r#"{ "palette": "deep" }"#).unwrap();
        assert_eq!(config.palette, "deep");
        assert_eq!(config.style, "darkgrid");
        assert_eq!(config.figsize, FigureSize::default());
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        assert!(FigureSize::new(0.0, 6.0).validate().is_err());
        assert!(FigureSize::new(4.0, f64::NAN).validate().is_err());
        assert!(FigureSize::new(4.0, 3.0).validate().is_ok());
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let err = FigureSize::new(1e9, 1e9).validate().unwrap_err();
        assert!(matches!(err, ChartError::InvalidInput(_)));
        assert!(FigureSize::new(160.0, 1.0).validate().is_ok());
        assert!(FigureSize::new(1.0, 170.0).validate().is_err());
    }

    #[test]
    fn info_map_has_three_keys() {
        let info = FigureInfo::from(&DrawerConfig::new((8.0, 4.0), "white", "deep"));
        let map = info.to_map();
        assert_eq!(map.len(), 3);
        assert_eq!(map["figure"], serde_json::json!([8.0, 4.0]));
        assert_eq!(map["style"], serde_json::json!("white"));
        assert_eq!(map["palette"], serde_json::json!("deep"));
    }
}

//! Theme Module
//! Named styles and color palettes, resolved per chart call.
//!
//! Nothing here is process-wide: every chart resolves its own [`Theme`] from the
//! drawer configuration, so two drawers with different themes never interfere.

use crate::error::{ChartError, ChartResult};
use plotters::style::{Color as _, HSLColor};
use serde::Serialize;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const BLACK: Color = Color(0, 0, 0);

    pub const fn from_hex(hex: u32) -> Self {
        Color((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Build from unit-range channels, clipping out-of-gamut values.
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color(q(r), q(g), q(b))
    }
}

/// Background and grid conventions for a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    DarkGrid,
    WhiteGrid,
    Dark,
    White,
    Ticks,
}

impl Style {
    pub const NAMES: [&'static str; 5] = ["darkgrid", "whitegrid", "dark", "white", "ticks"];

    pub fn from_name(name: &str) -> ChartResult<Self> {
        match name {
            "darkgrid" => Ok(Style::DarkGrid),
            "whitegrid" => Ok(Style::WhiteGrid),
            "dark" => Ok(Style::Dark),
            "white" => Ok(Style::White),
            "ticks" => Ok(Style::Ticks),
            other => Err(ChartError::UnknownTheme {
                kind: "style",
                name: other.to_string(),
            }),
        }
    }

    pub fn axes_background(&self) -> Color {
        match self {
            Style::DarkGrid | Style::Dark => Color::from_hex(0xEAEAF2),
            Style::WhiteGrid | Style::White | Style::Ticks => Color::WHITE,
        }
    }

    /// Grid color when the style draws a grid of its own.
    pub fn grid(&self) -> Option<Color> {
        match self {
            Style::DarkGrid => Some(Color::WHITE),
            Style::WhiteGrid => Some(Color::from_hex(0xCCCCCC)),
            _ => None,
        }
    }

    pub fn spine(&self) -> Option<Color> {
        match self {
            Style::DarkGrid | Style::Dark => None,
            _ => Some(Color::from_hex(0x262626)),
        }
    }
}

const DEEP: [u32; 10] = [
    0x4C72B0, 0xDD8452, 0x55A868, 0xC44E52, 0x8172B3, 0x937860, 0xDA8BC3, 0x8C8C8C, 0xCCB974,
    0x64B5CD,
];
const MUTED: [u32; 10] = [
    0x4878D0, 0xEE854A, 0x6ACC64, 0xD65F5F, 0x956CB4, 0x8C613C, 0xDC7EC0, 0x797979, 0xD5BB67,
    0x82C6E2,
];
const PASTEL: [u32; 10] = [
    0xA1C9F4, 0xFFB482, 0x8DE5A1, 0xFF9F9B, 0xD0BBFF, 0xDEBB9B, 0xFAB0E4, 0xCFCFCF, 0xFFFEA3,
    0xB9F2F0,
];
const BRIGHT: [u32; 10] = [
    0x023EFF, 0xFF7C00, 0x1AC938, 0xE8000B, 0x8B2BE2, 0x9F4800, 0xF14CC1, 0xA3A3A3, 0xFFC400,
    0x00D7FF,
];
const DARK: [u32; 10] = [
    0x001C7F, 0xB1400D, 0x12711C, 0x8C0800, 0x591E71, 0x592F0D, 0xA23582, 0x3C3C3C, 0xB8850A,
    0x006374,
];
const COLORBLIND: [u32; 10] = [
    0x0173B2, 0xDE8F05, 0x029E73, 0xD55E00, 0xCC78BC, 0xCA9161, 0xFBAFE4, 0x949494, 0xECE133,
    0x56B4E9,
];
const TAB10: [u32; 10] = [
    0x1F77B4, 0xFF7F0E, 0x2CA02C, 0xD62728, 0x9467BD, 0x8C564B, 0xE377C2, 0x7F7F7F, 0xBCBD22,
    0x17BECF,
];

/// A named, ordered color source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Palette {
    /// Evenly spaced hues in HUSL space; generates exactly as many colors as asked.
    Husl,
    /// Evenly spaced hues in HLS space.
    Hls,
    /// A fixed list that cycles when more colors are requested than it holds.
    Categorical(&'static [u32]),
}

impl Palette {
    pub const NAMES: [&'static str; 9] = [
        "husl",
        "hls",
        "deep",
        "muted",
        "pastel",
        "bright",
        "dark",
        "colorblind",
        "tab10",
    ];

    pub fn from_name(name: &str) -> ChartResult<Self> {
        let palette = match name {
            "husl" => Palette::Husl,
            "hls" => Palette::Hls,
            "deep" => Palette::Categorical(&DEEP),
            "muted" => Palette::Categorical(&MUTED),
            "pastel" => Palette::Categorical(&PASTEL),
            "bright" => Palette::Categorical(&BRIGHT),
            "dark" => Palette::Categorical(&DARK),
            "colorblind" => Palette::Categorical(&COLORBLIND),
            "tab10" => Palette::Categorical(&TAB10),
            other => {
                return Err(ChartError::UnknownTheme {
                    kind: "palette",
                    name: other.to_string(),
                })
            }
        };
        Ok(palette)
    }

    /// Number of colors the palette yields when no count is given.
    pub fn default_len(&self) -> usize {
        match self {
            Palette::Husl | Palette::Hls => 6,
            Palette::Categorical(colors) => colors.len(),
        }
    }

    /// Sample exactly `n` colors.
    pub fn sample(&self, n: usize) -> Vec<Color> {
        match self {
            Palette::Husl => hue_steps(n)
                .map(|h| {
                    let (r, g, b) = husl_to_rgb(h * 359.0, 0.9 * 99.0, 0.65 * 99.0);
                    Color::from_unit(r, g, b)
                })
                .collect(),
            Palette::Hls => hue_steps(n).map(|h| hsl(h, 0.65, 0.6)).collect(),
            Palette::Categorical(colors) => colors
                .iter()
                .cycle()
                .take(n)
                .map(|&hex| Color::from_hex(hex))
                .collect(),
        }
    }

    /// First color of the default-length palette.
    pub fn first(&self) -> Color {
        self.sample(self.default_len())[0]
    }
}

/// Hues at `i / n` shifted by 0.01, wrapped into [0, 1).
fn hue_steps(n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(move |i| (i as f64 / n as f64 + 0.01).rem_euclid(1.0))
}

/// A style and palette resolved for one figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub style: Style,
    pub style_name: String,
    pub palette_name: String,
    #[serde(skip)]
    pub palette: Palette,
}

impl Theme {
    pub fn resolve(style: &str, palette: &str) -> ChartResult<Self> {
        Ok(Self {
            style: Style::from_name(style)?,
            style_name: style.to_string(),
            palette_name: palette.to_string(),
            palette: Palette::from_name(palette)?,
        })
    }

    pub fn colors(&self, n: usize) -> Vec<Color> {
        self.palette.sample(n)
    }
}

fn hsl(h: f64, s: f64, l: f64) -> Color {
    let (r, g, b) = HSLColor(h, s, l).to_backend_color().rgb;
    Color(r, g, b)
}

// HUSL (human-friendly HSL) to sRGB, via LCh(uv), Luv and XYZ.
const M: [[f64; 3]; 3] = [
    [3.240969941904521, -1.537383177570093, -0.498610760293],
    [-0.96924363628087, 1.87596750150772, 0.041555057407175],
    [0.055630079696993, -0.20397695888897, 1.056971514242878],
];
const REF_U: f64 = 0.19783000664283;
const REF_V: f64 = 0.46831999493879;
const KAPPA: f64 = 903.2962962;
const EPSILON: f64 = 0.0088564516;

fn husl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let (l, c, h) = husl_to_lch(h, s, l);
    let (l, u, v) = lch_to_luv(l, c, h);
    let (x, y, z) = luv_to_xyz(l, u, v);
    let xyz = [x, y, z];
    let dot = |row: &[f64; 3]| row.iter().zip(xyz.iter()).map(|(a, b)| a * b).sum::<f64>();
    (
        from_linear(dot(&M[0])),
        from_linear(dot(&M[1])),
        from_linear(dot(&M[2])),
    )
}

fn husl_to_lch(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if l > 99.9999999 {
        return (100.0, 0.0, h);
    }
    if l < 1e-8 {
        return (0.0, 0.0, h);
    }
    let max = max_chroma_for_lh(l, h);
    (l, max / 100.0 * s, h)
}

fn max_chroma_for_lh(l: f64, h: f64) -> f64 {
    let hrad = h.to_radians();
    bounds(l)
        .iter()
        .filter_map(|&(slope, intercept)| {
            let length = intercept / (hrad.sin() - slope * hrad.cos());
            (length >= 0.0).then_some(length)
        })
        .fold(f64::INFINITY, f64::min)
}

fn bounds(l: f64) -> Vec<(f64, f64)> {
    let sub1 = (l + 16.0).powi(3) / 1_560_896.0;
    let sub2 = if sub1 > EPSILON { sub1 } else { l / KAPPA };
    let mut out = Vec::with_capacity(6);
    for [m1, m2, m3] in M {
        for t in [0.0, 1.0] {
            let top1 = (284_517.0 * m1 - 94_839.0 * m3) * sub2;
            let top2 = (838_422.0 * m3 + 769_860.0 * m2 + 731_718.0 * m1) * l * sub2
                - 769_860.0 * t * l;
            let bottom = (632_260.0 * m3 - 126_452.0 * m2) * sub2 + 126_452.0 * t;
            out.push((top1 / bottom, top2 / bottom));
        }
    }
    out
}

fn lch_to_luv(l: f64, c: f64, h: f64) -> (f64, f64, f64) {
    let hrad = h.to_radians();
    (l, hrad.cos() * c, hrad.sin() * c)
}

fn luv_to_xyz(l: f64, u: f64, v: f64) -> (f64, f64, f64) {
    if l == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let y = if l > 8.0 {
        ((l + 16.0) / 116.0).powi(3)
    } else {
        l / KAPPA
    };
    let var_u = u / (13.0 * l) + REF_U;
    let var_v = v / (13.0 * l) + REF_V;
    let x = -(9.0 * y * var_u) / ((var_u - 4.0) * var_v - var_u * var_v);
    let z = (9.0 * y - 15.0 * var_v * y - var_v * x) / (3.0 * var_v);
    (x, y, z)
}

fn from_linear(c: f64) -> f64 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

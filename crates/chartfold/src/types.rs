use std::sync::Arc;

use chartfold_core::limits::clamp_zoom;

/// Controller-assigned chart identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChartId(pub u64);

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Linear RGB colour, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// From `0xRRGGBB`.
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

/// Light or dark colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark { Theme::Dark } else { Theme::Light }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Background used by charts without an explicit colour.
    pub fn default_background(self) -> Rgb {
        match self {
            Theme::Light => Rgb::WHITE,
            Theme::Dark => Rgb::from_hex(0x121218),
        }
    }
}

/// Pan/zoom pair defining the visible data window.
///
/// Zoom is clamped into `[MIN_ZOOM, MAX_ZOOM]` on construction and nowhere
/// else; every transform the engine holds went through [`ViewTransform::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pan: [f64; 2],
    zoom: [f64; 2],
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: [0.0, 0.0],
            zoom: [1.0, 1.0],
        }
    }
}

impl ViewTransform {
    pub fn new(pan_x: f64, pan_y: f64, zoom_x: f64, zoom_y: f64) -> Self {
        let pan = |p: f64| if p.is_finite() { p } else { 0.0 };
        Self {
            pan: [pan(pan_x), pan(pan_y)],
            zoom: [clamp_zoom(zoom_x), clamp_zoom(zoom_y)],
        }
    }

    pub fn pan(&self) -> [f64; 2] {
        self.pan
    }

    pub fn zoom(&self) -> [f64; 2] {
        self.zoom
    }
}

/// One dataset handed over by the controller.
///
/// The arrays move into the engine; X must be ascending for line and box
/// charts.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesData {
    pub label: String,
    pub color: Rgb,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl SeriesData {
    pub fn new(label: impl Into<String>, color: Rgb, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            color,
            x,
            y,
        }
    }
}

/// Where a chart's resolved frames go.
#[derive(Clone)]
pub enum SurfaceSource {
    /// An engine-owned output texture.
    Headless,
    /// A window the engine creates and configures a surface for.
    Window(Arc<dyn wgpu::WindowHandle>),
}

impl std::fmt::Debug for SurfaceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceSource::Headless => write!(f, "Headless"),
            SurfaceSource::Window(_) => write!(f, "Window(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartfold_core::limits::{MAX_ZOOM, MIN_ZOOM};

    #[test]
    fn test_view_transform_clamps_zoom() {
        let transform = ViewTransform::new(0.25, f64::NAN, 0.0, 1e9);

        assert_eq!(transform.pan(), [0.25, 0.0]);
        assert_eq!(transform.zoom(), [MIN_ZOOM, MAX_ZOOM]);
    }

    #[test]
    fn test_rgb_from_hex() {
        let c = Rgb::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_theme_background() {
        assert_eq!(Theme::from_dark(false).default_background(), Rgb::WHITE);
        assert!(Theme::Dark.default_background().r < 0.2);
    }
}

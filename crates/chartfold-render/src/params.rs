//! Fixed-layout GPU records shared by every chart pass.
//!
//! All positions handed to the device are `f32` relative to the chart's
//! data-bounds origin (`min_x`, `min_y`). The bounds themselves stay `f64` on
//! the host so timestamps and other large coordinates survive the rebase.
//!
//! The WGSL mirror of these structs lives in `shaders/common.wgsl`; the
//! offsets below are asserted at compile time and must match it.

use bytemuck::{Pod, Zeroable};
use chartfold_core::limits::{BAR_GAP_FRACTION, BOUNDS_PAD_X, BOUNDS_PAD_Y};
use glam::Vec2;
use static_assertions::const_assert_eq;
use std::mem::{offset_of, size_of};

/// Bumped whenever a field of [`ChartParams`], [`SeriesInfo`],
/// [`SeriesSlot`] or [`ColumnRecord`] moves.
pub const PARAMS_LAYOUT_VERSION: u32 = 1;

/// Rendering strategy of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartKind {
    /// Samples are stamped straight into the target by a compute kernel.
    #[default]
    Points,
    /// Min/max per column, joined by connectors.
    Line,
    /// Min/max per column drawn as bars from the baseline.
    Box,
}

impl ChartKind {
    pub fn as_u32(self) -> u32 {
        match self {
            ChartKind::Points => 0,
            ChartKind::Line => 1,
            ChartKind::Box => 2,
        }
    }

    /// Whether the chart reduces samples into per-column records.
    pub fn aggregates(self) -> bool {
        matches!(self, ChartKind::Line | ChartKind::Box)
    }
}

/// Data-space extents of a chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for DataBounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        }
    }
}

impl DataBounds {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Padded extents of every finite sample across all series.
    ///
    /// Returns `None` when no series holds a finite `(x, y)` pair.
    pub fn from_samples<'a, I>(series: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a [f64], &'a [f64])>,
    {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for (xs, ys) in series {
            for (&x, &y) in xs.iter().zip(ys) {
                if !x.is_finite() || !y.is_finite() {
                    continue;
                }
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }

        if min_x > max_x {
            return None;
        }

        let (min_x, max_x) = pad(min_x, max_x, BOUNDS_PAD_X);
        let (min_y, max_y) = pad(min_y, max_y, BOUNDS_PAD_Y);
        Some(Self::new(min_x, max_x, min_y, max_y))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Finite with a positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }

    /// Rebase an absolute sample onto this chart's origin.
    #[inline]
    pub fn rebase_x(&self, x: f64) -> f32 {
        (x - self.min_x) as f32
    }

    #[inline]
    pub fn rebase_y(&self, y: f64) -> f32 {
        (y - self.min_y) as f32
    }
}

// A flat series still gets a visible extent.
fn pad(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let span = max - min;
    let margin = if span > 0.0 {
        span * fraction
    } else {
        min.abs().max(1.0) * fraction
    };
    (min - margin, max + margin)
}

/// The data-space window currently on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ViewWindow {
    /// Window for `bounds` under a pan/zoom pair.
    ///
    /// Zoom divides the visible span; pan shifts the window centre by a
    /// fraction of the full range (pan 0 keeps it centred on the bounds).
    pub fn from_transform(bounds: &DataBounds, pan: [f64; 2], zoom: [f64; 2]) -> Self {
        let (min_x, max_x) = axis_window(bounds.min_x, bounds.max_x, pan[0], zoom[0]);
        let (min_y, max_y) = axis_window(bounds.min_y, bounds.max_y, pan[1], zoom[1]);
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// A window with no positive extent would divide by zero in every kernel.
    pub fn is_degenerate(&self) -> bool {
        !(self.min_x < self.max_x && self.min_y < self.max_y)
    }
}

fn axis_window(min: f64, max: f64, pan: f64, zoom: f64) -> (f64, f64) {
    let range = max - min;
    let width = range / zoom;
    let center = min + range * (0.5 + pan);
    (center - width * 0.5, center + width * 0.5)
}

/// Per-chart uniform block, rewritten in full every frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ChartParams {
    /// Target size in pixels.
    pub screen_size: [f32; 2],
    /// View window, relative to the bounds origin.
    pub view_min: [f32; 2],
    pub view_max: [f32; 2],
    /// Full data bounds, relative to the bounds origin.
    pub data_min: [f32; 2],
    pub data_max: [f32; 2],
    /// Configured point radius before throttling.
    pub point_radius: f32,
    pub is_dark: u32,
    /// Background colour (straight alpha).
    pub background: [f32; 4],
    /// Samples examined per column, 0 for no cap.
    pub max_samples: u32,
    pub series_count: u32,
    pub chart_type: u32,
    /// Bar baseline (data zero clamped into the view), relative to the origin.
    pub baseline_y: f32,
}

const_assert_eq!(size_of::<ChartParams>(), 80);
const_assert_eq!(offset_of!(ChartParams, view_min), 8);
const_assert_eq!(offset_of!(ChartParams, data_max), 32);
const_assert_eq!(offset_of!(ChartParams, point_radius), 40);
const_assert_eq!(offset_of!(ChartParams, background), 48);
const_assert_eq!(offset_of!(ChartParams, max_samples), 64);
const_assert_eq!(offset_of!(ChartParams, baseline_y), 76);

/// Everything a [`ChartParams`] block is derived from.
#[derive(Debug, Clone, Copy)]
pub struct ParamsSource {
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    pub bounds: DataBounds,
    pub view: ViewWindow,
    pub point_radius: f32,
    pub is_dark: bool,
    pub background: [f32; 4],
    pub max_samples: u32,
    pub series_count: u32,
}

impl ChartParams {
    pub fn pack(source: &ParamsSource) -> Self {
        let bounds = &source.bounds;
        let view = &source.view;
        let view_min = Vec2::new(bounds.rebase_x(view.min_x), bounds.rebase_y(view.min_y));
        let view_max = Vec2::new(bounds.rebase_x(view.max_x), bounds.rebase_y(view.max_y));
        let baseline_y = bounds.rebase_y(0.0).max(view_min.y).min(view_max.y);

        Self {
            screen_size: [source.width as f32, source.height as f32],
            view_min: view_min.to_array(),
            view_max: view_max.to_array(),
            data_min: [0.0, 0.0],
            data_max: [bounds.width() as f32, bounds.height() as f32],
            point_radius: source.point_radius,
            is_dark: source.is_dark as u32,
            background: source.background,
            max_samples: source.max_samples,
            series_count: source.series_count,
            chart_type: source.kind.as_u32(),
            baseline_y,
        }
    }

    pub fn width(&self) -> u32 {
        self.screen_size[0] as u32
    }

    pub fn height(&self) -> u32 {
        self.screen_size[1] as u32
    }

    pub fn view_span(&self) -> Vec2 {
        Vec2::from(self.view_max) - Vec2::from(self.view_min)
    }
}

/// One entry of the per-chart series array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SeriesInfo {
    pub color: [f32; 4],
    pub visible_start: u32,
    pub visible_count: u32,
    /// Rendered point radius after throttling.
    pub radius: f32,
    /// Workgroups along X of the stamp dispatch grid.
    pub dispatch_width: u32,
    /// Position of the series within its chart.
    pub slot: u32,
    _padding: [u32; 3],
}

const_assert_eq!(size_of::<SeriesInfo>(), 48);
const_assert_eq!(offset_of!(SeriesInfo, visible_start), 16);
const_assert_eq!(offset_of!(SeriesInfo, slot), 32);

impl SeriesInfo {
    pub fn new(
        color: [f32; 3],
        visible: std::ops::Range<u32>,
        radius: f32,
        dispatch_width: u32,
        slot: u32,
    ) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            visible_start: visible.start,
            visible_count: visible.end.saturating_sub(visible.start),
            radius,
            dispatch_width,
            slot,
            _padding: [0; 3],
        }
    }

    pub fn visible_end(&self) -> u32 {
        self.visible_start + self.visible_count
    }
}

/// Static per-series uniform naming the series' entry in the info array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SeriesSlot {
    pub index: u32,
    _padding: [u32; 3],
}

const_assert_eq!(size_of::<SeriesSlot>(), 16);

impl SeriesSlot {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            _padding: [0; 3],
        }
    }
}

/// Aggregated output for one pixel column of one series.
///
/// `x` and `half_width` are normalized to the view (0..1 across the chart);
/// `min_y` and `max_y` stay in rebased data space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ColumnRecord {
    pub x: f32,
    pub half_width: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub valid: u32,
    pub sample_count: u32,
    _padding: [u32; 2],
}

const_assert_eq!(size_of::<ColumnRecord>(), 32);
const_assert_eq!(offset_of!(ColumnRecord, valid), 16);

impl ColumnRecord {
    pub const INVALID: Self = Self {
        x: 0.0,
        half_width: 0.0,
        min_y: 0.0,
        max_y: 0.0,
        valid: 0,
        sample_count: 0,
        _padding: [0; 2],
    };

    pub fn new(x: f32, half_width: f32, min_y: f32, max_y: f32, sample_count: u32) -> Self {
        Self {
            x,
            half_width,
            min_y,
            max_y,
            valid: 1,
            sample_count,
            _padding: [0; 2],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid != 0
    }
}

/// Narrow each bar to its slot within a category and leave the gap.
///
/// Returns `(center, half_width)` in normalized view space.
pub fn bar_geometry(x: f32, spacing: f32, series_index: u32, series_count: u32) -> (f32, f32) {
    let slot_width = spacing / series_count.max(1) as f32;
    let bar_width = slot_width * (1.0 - BAR_GAP_FRACTION);
    let center = x - spacing * 0.5 + slot_width * (series_index as f32 + 0.5);
    (center, bar_width * 0.5)
}

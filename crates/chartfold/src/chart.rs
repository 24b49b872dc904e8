//! Host-side chart and series state.

use std::ops::Range;

use chartfold_render::{ChartKind, DataBounds, ViewWindow};

use crate::resources::ChartResources;
use crate::types::{ChartId, Rgb, ViewTransform};

bitflags::bitflags! {
    /// Why a chart owes a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChartDirty: u8 {
        /// Series were replaced.
        const DATA = 0b0000_0001;
        /// Pan/zoom changed.
        const VIEW = 0b0000_0010;
        /// Background, point size, sample cap or theme changed.
        const STYLE = 0b0000_0100;
        /// Pixel size changed.
        const SIZE = 0b0000_1000;
        /// The chart became visible.
        const SHOWN = 0b0001_0000;
    }
}

/// One dataset of a chart. The samples themselves live on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: Rgb,
    pub len: u32,
    /// Rendered sample range; the full array unless narrowed.
    pub visible: Range<u32>,
    /// Point radius after throttling, as last written to the device.
    pub radius: f32,
}

pub struct Chart {
    pub id: ChartId,
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    pub transform: ViewTransform,
    pub bounds: DataBounds,
    pub point_radius: f32,
    pub max_samples: u32,
    /// `None` follows the theme.
    pub background: Option<Rgb>,
    pub visible: bool,
    pub dirty: ChartDirty,
    pub series: Vec<Series>,
    pub(crate) gpu: ChartResources,
}

impl Chart {
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn mark_dirty(&mut self, reason: ChartDirty) {
        self.dirty |= reason;
    }

    pub fn is_zero_sized(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Visible with pixels to draw.
    pub fn is_active(&self) -> bool {
        self.visible && !self.is_zero_sized()
    }

    pub fn view_window(&self) -> ViewWindow {
        ViewWindow::from_transform(&self.bounds, self.transform.pan(), self.transform.zoom())
    }

    /// Total samples across series.
    pub fn sample_count(&self) -> u64 {
        self.series.iter().map(|s| s.len as u64).sum()
    }

    pub fn resources(&self) -> &ChartResources {
        &self.gpu
    }
}

impl std::fmt::Debug for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("size", &(self.width, self.height))
            .field("transform", &self.transform)
            .field("visible", &self.visible)
            .field("dirty", &self.dirty)
            .field("series", &self.series.len())
            .finish()
    }
}

//! Messages exchanged with the controller.

use chartfold_render::{ChartKind, DataBounds};

use crate::types::{ChartId, Rgb, SeriesData, SurfaceSource};

/// Commands the controller sends to the engine.
#[derive(Debug, Clone)]
pub enum Command {
    Init,
    RegisterChart {
        id: ChartId,
        surface: SurfaceSource,
        kind: ChartKind,
        width: u32,
        height: u32,
        point_radius: f32,
        /// `None` takes the engine default.
        max_samples: Option<u32>,
        background: Option<Rgb>,
    },
    UnregisterChart {
        id: ChartId,
    },
    /// Replaces every series of the chart. `bounds` overrides the padded
    /// extents derived from the data.
    UpdateSeries {
        id: ChartId,
        series: Vec<SeriesData>,
        bounds: Option<DataBounds>,
    },
    SetPointSize {
        id: ChartId,
        size: f32,
    },
    SetMaxSamples {
        id: ChartId,
        max_samples: u32,
    },
    /// `None` falls back to the theme background.
    SetStyle {
        id: ChartId,
        background: Option<Rgb>,
    },
    SetVisibility {
        id: ChartId,
        visible: bool,
    },
    ViewTransform {
        id: ChartId,
        pan_x: f64,
        pan_y: f64,
        zoom_x: f64,
        zoom_y: f64,
    },
    /// One transform applied to every listed chart in the same pass.
    BatchViewTransform {
        pan_x: f64,
        pan_y: f64,
        zoom_x: f64,
        zoom_y: f64,
        ids: Vec<ChartId>,
    },
    /// Non-positive sizes are dropped.
    Resize {
        id: ChartId,
        width: i64,
        height: i64,
    },
    Theme {
        is_dark: bool,
    },
}

impl Command {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::RegisterChart { .. } => "register-chart",
            Command::UnregisterChart { .. } => "unregister-chart",
            Command::UpdateSeries { .. } => "update-series",
            Command::SetPointSize { .. } => "set-point-size",
            Command::SetMaxSamples { .. } => "set-max-samples",
            Command::SetStyle { .. } => "set-style",
            Command::SetVisibility { .. } => "set-visibility",
            Command::ViewTransform { .. } => "view-transform",
            Command::BatchViewTransform { .. } => "batch-view-transform",
            Command::Resize { .. } => "resize",
            Command::Theme { .. } => "theme",
        }
    }
}

impl Command {
    /// The single chart the command targets.
    pub fn chart(&self) -> Option<ChartId> {
        match self {
            Command::RegisterChart { id, .. }
            | Command::UnregisterChart { id }
            | Command::UpdateSeries { id, .. }
            | Command::SetPointSize { id, .. }
            | Command::SetMaxSamples { id, .. }
            | Command::SetStyle { id, .. }
            | Command::SetVisibility { id, .. }
            | Command::ViewTransform { id, .. }
            | Command::Resize { id, .. } => Some(*id),
            Command::Init | Command::BatchViewTransform { .. } | Command::Theme { .. } => None,
        }
    }
}

/// Counters emitted once per stats interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Scheduled frames per second over the interval.
    pub fps: f32,
    /// Wall time of the last scheduled frame.
    pub render_ms: f32,
    pub total_charts: usize,
    /// Visible charts with a non-zero size.
    pub active_charts: usize,
}

/// Events the engine sends back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ready,
    Error {
        chart: Option<ChartId>,
        message: String,
    },
    ChartRegistered(ChartId),
    ChartUnregistered(ChartId),
    BoundsUpdate {
        id: ChartId,
        bounds: DataBounds,
    },
    Stats(FrameStats),
}

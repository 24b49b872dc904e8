//! Chartfold
//!
//! An off-thread GPU chart engine. The controller registers charts, hands
//! over series data and streams view transforms; the engine reduces each
//! series to at most one record per pixel column on the device and redraws
//! only the charts that changed and are on screen.
//!
//! ```no_run
//! use chartfold::{ChartId, ChartKind, Command, EngineConfig, EngineHandle, Rgb, SeriesData, SurfaceSource};
//!
//! let engine = EngineHandle::spawn(EngineConfig::default()).unwrap();
//! engine.send(Command::Init);
//! engine.send(Command::RegisterChart {
//!     id: ChartId(1),
//!     surface: SurfaceSource::Headless,
//!     kind: ChartKind::Line,
//!     width: 800,
//!     height: 400,
//!     point_radius: 2.0,
//!     max_samples: None,
//!     background: None,
//! });
//! let x: Vec<f64> = (0..1_000_000).map(|i| i as f64).collect();
//! let y = x.iter().map(|x| (x * 0.001).sin()).collect();
//! engine.send(Command::UpdateSeries {
//!     id: ChartId(1),
//!     series: vec![SeriesData::new("sine", Rgb::from_hex(0x3b82f6), x, y)],
//!     bounds: None,
//! });
//! ```

pub mod backend;
pub mod chart;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod scheduler;
pub mod surface;
pub mod types;
pub mod worker;

pub use backend::{Backend, BackendFactory};
pub use chart::{Chart, ChartDirty, Series};
pub use config::EngineConfig;
pub use engine::{Engine, EngineState};
pub use error::{EngineError, EngineResult};
pub use gpu::{GpuBackend, GpuBackendFactory};
pub use protocol::{Command, Event, FrameStats};
pub use registry::ChartRegistry;
pub use resources::{ChartDescriptor, ChartResources, DeviceLimits, Lifecycle, SeriesResources};
pub use scheduler::FrameScheduler;
pub use surface::{Presentation, WindowSurface};
pub use types::{ChartId, Rgb, SeriesData, SurfaceSource, Theme, ViewTransform};
pub use worker::EngineHandle;

pub use chartfold_core::{limits, logging, profiling};
pub use chartfold_render::{ChartKind, DataBounds, GraphicsContextDescriptor, GraphicsError, ViewWindow};

//! Chartfold Render
//!
//! Device-side half of the chart engine: the GPU record layouts every pass
//! reads, the WGSL aggregation/stamp/raster/anti-alias shaders, the pipelines
//! built from them, and per-chart frame encoding.
//!
//! The [`kernels`] module restates each compute kernel on the host. The
//! throttle and dispatch sizing feed GPU records directly; the aggregation
//! mirrors serve as the reference the device output is checked against.

pub mod context;
mod context_impl;
pub mod frame;
pub mod kernels;
pub mod layouts;
pub mod params;
pub mod pipelines;

pub use chartfold_test_utils::{
    BindGroupDescriptor, BindGroupEntry, BindingResource, GpuBindGroup, GpuBindGroupLayout,
    GpuBuffer, GpuSampler, GpuTexture, GpuTextureView, RenderContext,
};
pub use context::{GraphicsContext, GraphicsContextDescriptor, GraphicsError};
pub use frame::{ChartFrame, SeriesPass};
pub use kernels::DispatchGrid;
pub use layouts::{BindingLayouts, OFFSCREEN_FORMAT, SeriesBindings};
pub use params::{
    ChartKind, ChartParams, ColumnRecord, DataBounds, PARAMS_LAYOUT_VERSION, ParamsSource,
    SeriesInfo, SeriesSlot, ViewWindow,
};
pub use pipelines::ChartPipelines;

pub use wgpu;

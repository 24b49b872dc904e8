//! Host restatements of the compute kernels.
//!
//! Each function here performs the same arithmetic, in the same `f32`
//! precision and the same order, as its WGSL counterpart in `shaders/`.
//! [`throttled_radius`] and [`DispatchGrid`] feed the GPU records directly;
//! the aggregation and stamp mirrors are what the device output is checked
//! against.

mod columns;
mod dispatch;
mod search;
mod stamp;

pub use columns::{aggregate_column, aggregate_columns, sample_stride, AGGREGATE_WORKGROUP_SIZE};
pub use dispatch::DispatchGrid;
pub use search::lower_bound;
pub use stamp::{
    disk_pixels, stamp_points, stamp_target, throttled_radius, Stamp, STAMP_WORKGROUP_SIZE,
};

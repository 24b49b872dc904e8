//! GPU resource seam for chartfold.
//!
//! The chart lifecycle code never talks to `wgpu::Device` directly. It goes
//! through [`RenderContext`], which hands back owned wrapper types
//! ([`GpuBuffer`], [`GpuTexture`], ...) that are either real `wgpu` objects or,
//! with the `mock` feature, inert records.
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use chartfold_test_utils::{MockRenderContext, RenderContext};
//! use wgpu::*;
//!
//! let mock = MockRenderContext::new();
//! let buffer = mock.create_buffer(&BufferDescriptor {
//!     label: Some("samples"),
//!     size: 1024,
//!     usage: BufferUsages::STORAGE,
//!     mapped_at_creation: false,
//! });
//! mock.destroy_buffer(&buffer);
//!
//! assert_eq!(mock.count_buffer_creates(), 1);
//! assert_eq!(mock.live_buffers(), 0);
//! # }
//! ```
//!
//! Wrapper types are cheap to clone (the `wgpu` handles are reference
//! counted) and carry no lifetimes, so chart state can own them directly.

pub mod gpu_types;
#[cfg(feature = "mock")]
pub mod mock_render;
pub mod render_context;

pub use gpu_types::*;
#[cfg(feature = "mock")]
pub use mock_render::*;
pub use render_context::*;

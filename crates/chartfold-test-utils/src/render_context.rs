//! Trait abstracting GPU resource creation for testing.
//!
//! Everything the chart lifecycle allocates or frees goes through
//! [`RenderContext`]. Pipelines and command encoding stay on the concrete
//! device; they are created once and never churn with chart state.

use crate::gpu_types::*;
use wgpu::{BindGroupLayoutDescriptor, BufferDescriptor, SamplerDescriptor, TextureDescriptor};

/// A resource referenced by a [`BindGroupEntry`].
#[derive(Clone, Copy, Debug)]
pub enum BindingResource<'a> {
    Buffer(&'a GpuBuffer),
    TextureView(&'a GpuTextureView),
    Sampler(&'a GpuSampler),
}

/// One slot of a resource-binding set.
#[derive(Clone, Copy, Debug)]
pub struct BindGroupEntry<'a> {
    pub binding: u32,
    pub resource: BindingResource<'a>,
}

impl<'a> BindGroupEntry<'a> {
    pub fn buffer(binding: u32, buffer: &'a GpuBuffer) -> Self {
        Self {
            binding,
            resource: BindingResource::Buffer(buffer),
        }
    }

    pub fn texture_view(binding: u32, view: &'a GpuTextureView) -> Self {
        Self {
            binding,
            resource: BindingResource::TextureView(view),
        }
    }

    pub fn sampler(binding: u32, sampler: &'a GpuSampler) -> Self {
        Self {
            binding,
            resource: BindingResource::Sampler(sampler),
        }
    }
}

/// Bind group descriptor expressed over wrapper types.
///
/// `wgpu::BindGroupDescriptor` borrows concrete `wgpu` handles, which a mock
/// cannot produce, so bind groups are described with this type instead.
#[derive(Clone, Copy, Debug)]
pub struct BindGroupDescriptor<'a> {
    pub label: Option<&'a str>,
    pub layout: &'a GpuBindGroupLayout,
    pub entries: &'a [BindGroupEntry<'a>],
}

/// GPU resource creation and destruction.
///
/// Methods take `&self` and return owned wrappers, so a context can be
/// shared behind `Arc<dyn RenderContext>` and mocks record calls through
/// interior mutability.
pub trait RenderContext: Send + Sync {
    // Buffers

    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer;

    /// Create a buffer and fill it with `contents`.
    fn create_buffer_init(
        &self,
        label: Option<&str>,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> GpuBuffer;

    /// Queue a write. Ordered before any later submission that reads it.
    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]);

    /// Release a buffer immediately instead of waiting for the last handle.
    fn destroy_buffer(&self, buffer: &GpuBuffer);

    // Textures

    fn create_texture(&self, desc: &TextureDescriptor) -> GpuTexture;

    fn create_texture_view(&self, texture: &GpuTexture, label: Option<&str>) -> GpuTextureView;

    fn destroy_texture(&self, texture: &GpuTexture);

    // Bindings

    fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> GpuBindGroupLayout;

    fn create_bind_group(&self, desc: &BindGroupDescriptor) -> GpuBindGroup;

    fn create_sampler(&self, desc: &SamplerDescriptor) -> GpuSampler;
}

//! Mock implementation of [`RenderContext`] for testing.
//!
//! Records every call and tracks which buffers and textures are still alive,
//! so lifecycle tests can assert on churn and leaks without a GPU.

use crate::{
    gpu_types::*,
    render_context::{BindGroupDescriptor, BindingResource, RenderContext},
};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use wgpu::{
    BindGroupLayoutDescriptor, BufferDescriptor, BufferUsages, SamplerDescriptor,
    TextureDescriptor, TextureFormat,
};

/// A recorded GPU operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateBuffer {
        id: usize,
        label: Option<String>,
        size: u64,
        usage: BufferUsages,
    },
    WriteBuffer {
        buffer_id: usize,
        offset: u64,
        size: usize,
    },
    DestroyBuffer {
        buffer_id: usize,
    },
    CreateTexture {
        id: usize,
        width: u32,
        height: u32,
        format: TextureFormat,
    },
    CreateTextureView {
        texture_id: usize,
    },
    DestroyTexture {
        texture_id: usize,
    },
    CreateBindGroupLayout {
        label: Option<String>,
    },
    CreateBindGroup {
        label: Option<String>,
        entries: usize,
    },
    CreateSampler {
        label: Option<String>,
    },
}

#[derive(Default)]
struct MockState {
    calls: Vec<RenderCall>,
    next_buffer_id: usize,
    next_texture_id: usize,
    next_handle_id: usize,
    live_buffers: BTreeSet<usize>,
    live_textures: BTreeSet<usize>,
}

impl MockState {
    fn next_handle(&mut self) -> usize {
        let id = self.next_handle_id;
        self.next_handle_id += 1;
        id
    }
}

/// Mock render context.
///
/// ```rust
/// use chartfold_test_utils::{MockRenderContext, RenderContext};
/// use wgpu::*;
///
/// let mock = MockRenderContext::new();
/// let buffer = mock.create_buffer(&BufferDescriptor {
///     label: None,
///     size: 64,
///     usage: BufferUsages::UNIFORM,
///     mapped_at_creation: false,
/// });
/// assert!(buffer.is_mock());
/// assert_eq!(mock.live_buffers(), 1);
/// ```
pub struct MockRenderContext {
    state: Mutex<MockState>,
}

impl MockRenderContext {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Copy of all recorded calls.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.lock().calls.clone()
    }

    fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn count_buffer_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateBuffer { .. }))
    }

    pub fn count_buffer_writes(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::WriteBuffer { .. }))
    }

    pub fn count_buffer_destroys(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::DestroyBuffer { .. }))
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateTexture { .. }))
    }

    pub fn count_texture_destroys(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::DestroyTexture { .. }))
    }

    pub fn count_bind_group_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateBindGroup { .. }))
    }

    /// Number of calls that allocate, free or rebind a resource.
    ///
    /// Buffer writes are excluded: they mutate contents, not resources.
    pub fn count_resource_mutations(&self) -> usize {
        self.count(|c| !matches!(c, RenderCall::WriteBuffer { .. }))
    }

    /// Buffers created and not yet destroyed.
    pub fn live_buffers(&self) -> usize {
        self.state.lock().live_buffers.len()
    }

    /// Textures created and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.state.lock().live_textures.len()
    }

    /// Label and size of every live buffer, in creation order.
    pub fn live_buffer_sizes(&self) -> Vec<(Option<String>, u64)> {
        let state = self.state.lock();
        state
            .calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::CreateBuffer {
                    id, label, size, ..
                } if state.live_buffers.contains(id) => Some((label.clone(), *size)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for MockRenderContext {
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer {
        let mut state = self.state.lock();
        let id = state.next_buffer_id;
        state.next_buffer_id += 1;
        state.live_buffers.insert(id);
        state.calls.push(RenderCall::CreateBuffer {
            id,
            label: desc.label.map(str::to_string),
            size: desc.size,
            usage: desc.usage,
        });
        GpuBuffer::mock(id, desc.size)
    }

    fn create_buffer_init(
        &self,
        label: Option<&str>,
        contents: &[u8],
        usage: BufferUsages,
    ) -> GpuBuffer {
        let buffer = self.create_buffer(&BufferDescriptor {
            label,
            size: contents.len() as u64,
            usage,
            mapped_at_creation: true,
        });
        self.write_buffer(&buffer, 0, contents);
        buffer
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        if let Some(buffer_id) = buffer.mock_id() {
            self.state.lock().calls.push(RenderCall::WriteBuffer {
                buffer_id,
                offset,
                size: data.len(),
            });
        }
    }

    fn destroy_buffer(&self, buffer: &GpuBuffer) {
        if let Some(buffer_id) = buffer.mock_id() {
            let mut state = self.state.lock();
            state.live_buffers.remove(&buffer_id);
            state.calls.push(RenderCall::DestroyBuffer { buffer_id });
        }
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> GpuTexture {
        let mut state = self.state.lock();
        let id = state.next_texture_id;
        state.next_texture_id += 1;
        state.live_textures.insert(id);
        state.calls.push(RenderCall::CreateTexture {
            id,
            width: desc.size.width,
            height: desc.size.height,
            format: desc.format,
        });
        GpuTexture::mock(id, desc.size.width, desc.size.height, desc.format)
    }

    fn create_texture_view(&self, texture: &GpuTexture, _label: Option<&str>) -> GpuTextureView {
        let mut state = self.state.lock();
        let id = state.next_handle();
        state.calls.push(RenderCall::CreateTextureView {
            texture_id: texture.mock_id().unwrap_or(usize::MAX),
        });
        GpuTextureView::mock(id)
    }

    fn destroy_texture(&self, texture: &GpuTexture) {
        if let Some(texture_id) = texture.mock_id() {
            let mut state = self.state.lock();
            state.live_textures.remove(&texture_id);
            state.calls.push(RenderCall::DestroyTexture { texture_id });
        }
    }

    fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> GpuBindGroupLayout {
        let mut state = self.state.lock();
        let id = state.next_handle();
        state.calls.push(RenderCall::CreateBindGroupLayout {
            label: desc.label.map(str::to_string),
        });
        GpuBindGroupLayout::mock(id)
    }

    fn create_bind_group(&self, desc: &BindGroupDescriptor) -> GpuBindGroup {
        let mut state = self.state.lock();
        for entry in desc.entries {
            // Binding a freed resource is a use-after-destroy in real wgpu.
            let freed = match entry.resource {
                BindingResource::Buffer(buffer) => buffer
                    .mock_id()
                    .is_some_and(|id| !state.live_buffers.contains(&id)),
                BindingResource::TextureView(_) | BindingResource::Sampler(_) => false,
            };
            assert!(
                !freed,
                "bind group {:?} references a destroyed buffer at binding {}",
                desc.label, entry.binding
            );
        }
        let id = state.next_handle();
        state.calls.push(RenderCall::CreateBindGroup {
            label: desc.label.map(str::to_string),
            entries: desc.entries.len(),
        });
        GpuBindGroup::mock(id)
    }

    fn create_sampler(&self, desc: &SamplerDescriptor) -> GpuSampler {
        let mut state = self.state.lock();
        let id = state.next_handle();
        state.calls.push(RenderCall::CreateSampler {
            label: desc.label.map(str::to_string),
        });
        GpuSampler::mock(id)
    }
}

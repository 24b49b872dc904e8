//! Implementation of [`RenderContext`] for [`GraphicsContext`].

use crate::context::GraphicsContext;
use chartfold_test_utils::{
    BindGroupDescriptor, BindingResource, GpuBindGroup, GpuBindGroupLayout, GpuBuffer,
    GpuSampler, GpuTexture, GpuTextureView, RenderContext,
};
use wgpu::util::DeviceExt;
use wgpu::{BindGroupLayoutDescriptor, BufferDescriptor, SamplerDescriptor, TextureDescriptor};

impl RenderContext for GraphicsContext {
    fn create_buffer(&self, desc: &BufferDescriptor) -> GpuBuffer {
        GpuBuffer::from_wgpu(self.device.create_buffer(desc))
    }

    fn create_buffer_init(
        &self,
        label: Option<&str>,
        contents: &[u8],
        usage: wgpu::BufferUsages,
    ) -> GpuBuffer {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents,
                usage,
            });
        GpuBuffer::from_wgpu(buffer)
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: u64, data: &[u8]) {
        self.queue.write_buffer(buffer.as_wgpu(), offset, data);
    }

    fn destroy_buffer(&self, buffer: &GpuBuffer) {
        buffer.as_wgpu().destroy();
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> GpuTexture {
        GpuTexture::from_wgpu(self.device.create_texture(desc))
    }

    fn create_texture_view(&self, texture: &GpuTexture, label: Option<&str>) -> GpuTextureView {
        let view = texture.as_wgpu().create_view(&wgpu::TextureViewDescriptor {
            label,
            ..Default::default()
        });
        GpuTextureView::from_wgpu(view)
    }

    fn destroy_texture(&self, texture: &GpuTexture) {
        texture.as_wgpu().destroy();
    }

    fn create_bind_group_layout(&self, desc: &BindGroupLayoutDescriptor) -> GpuBindGroupLayout {
        GpuBindGroupLayout::from_wgpu(self.device.create_bind_group_layout(desc))
    }

    fn create_bind_group(&self, desc: &BindGroupDescriptor) -> GpuBindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = desc
            .entries
            .iter()
            .map(|entry| wgpu::BindGroupEntry {
                binding: entry.binding,
                resource: match entry.resource {
                    BindingResource::Buffer(buffer) => buffer.as_wgpu().as_entire_binding(),
                    BindingResource::TextureView(view) => {
                        wgpu::BindingResource::TextureView(view.as_wgpu())
                    }
                    BindingResource::Sampler(sampler) => {
                        wgpu::BindingResource::Sampler(sampler.as_wgpu())
                    }
                },
            })
            .collect();

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: desc.label,
            layout: desc.layout.as_wgpu(),
            entries: &entries,
        });
        GpuBindGroup::from_wgpu(bind_group)
    }

    fn create_sampler(&self, desc: &SamplerDescriptor) -> GpuSampler {
        GpuSampler::from_wgpu(self.device.create_sampler(desc))
    }
}

#[cfg(test)]
mod tests {
    use chartfold_test_utils::{MockRenderContext, RenderContext};

    #[test]
    fn test_render_context_trait_object() {
        fn uses_render_context(ctx: &dyn RenderContext) {
            let buffer = ctx.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Test Buffer"),
                size: 256,
                usage: wgpu::BufferUsages::UNIFORM,
                mapped_at_creation: false,
            });
            ctx.write_buffer(&buffer, 0, &[0u8; 256]);
            ctx.destroy_buffer(&buffer);
        }

        let mock_ctx = MockRenderContext::new();
        uses_render_context(&mock_ctx);

        assert_eq!(mock_ctx.calls().len(), 3);
        assert_eq!(mock_ctx.live_buffers(), 0);
    }
}

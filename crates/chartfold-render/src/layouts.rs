//! Bind group layouts for every chart pass, and the bind groups built on them.
//!
//! Layouts are created once per device through [`RenderContext`], so the
//! resource lifecycle can run against a mock.

use crate::params::{ChartParams, ColumnRecord, SeriesInfo, SeriesSlot};
use chartfold_test_utils::{
    BindGroupDescriptor, BindGroupEntry, GpuBindGroup, GpuBindGroupLayout, GpuBuffer, GpuSampler,
    GpuTextureView, RenderContext,
};
use std::mem::size_of;

/// Format of every chart's off-screen target. The stamp kernel writes it as
/// a storage texture, so it must stay storage-capable without extra features.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// The buffers every compute pass of a series reads.
#[derive(Clone, Copy)]
pub struct SeriesBindings<'a> {
    pub params: &'a GpuBuffer,
    pub series_info: &'a GpuBuffer,
    pub slot: &'a GpuBuffer,
    pub xs: &'a GpuBuffer,
    pub ys: &'a GpuBuffer,
}

pub struct BindingLayouts {
    /// Line/box column aggregation.
    pub aggregate: GpuBindGroupLayout,
    /// Point stamping into the off-screen target.
    pub stamp: GpuBindGroupLayout,
    /// Instanced column raster.
    pub raster: GpuBindGroupLayout,
    /// Anti-alias resolve.
    pub post: GpuBindGroupLayout,
    /// Linear clamp sampler used by the resolve.
    pub sampler: GpuSampler,
}

impl BindingLayouts {
    pub fn new(ctx: &dyn RenderContext) -> Self {
        let compute = wgpu::ShaderStages::COMPUTE;
        let vertex = wgpu::ShaderStages::VERTEX;

        let aggregate = ctx.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Chart Aggregate Bind Group Layout"),
            entries: &[
                uniform_entry(0, compute, size_of::<ChartParams>()),
                storage_entry(1, compute, true, size_of::<SeriesInfo>()),
                uniform_entry(2, compute, size_of::<SeriesSlot>()),
                storage_entry(3, compute, true, size_of::<f32>()),
                storage_entry(4, compute, true, size_of::<f32>()),
                storage_entry(5, compute, false, size_of::<ColumnRecord>()),
            ],
        });

        let stamp = ctx.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Chart Stamp Bind Group Layout"),
            entries: &[
                uniform_entry(0, compute, size_of::<ChartParams>()),
                storage_entry(1, compute, true, size_of::<SeriesInfo>()),
                uniform_entry(2, compute, size_of::<SeriesSlot>()),
                storage_entry(3, compute, true, size_of::<f32>()),
                storage_entry(4, compute, true, size_of::<f32>()),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: compute,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: OFFSCREEN_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let raster = ctx.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Chart Raster Bind Group Layout"),
            entries: &[
                uniform_entry(0, vertex, size_of::<ChartParams>()),
                storage_entry(1, vertex, true, size_of::<SeriesInfo>()),
                uniform_entry(2, vertex, size_of::<SeriesSlot>()),
                storage_entry(3, vertex, true, size_of::<ColumnRecord>()),
            ],
        });

        let post = ctx.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Chart Post Bind Group Layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::FRAGMENT, size_of::<ChartParams>()),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = ctx.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Chart Post Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            aggregate,
            stamp,
            raster,
            post,
            sampler,
        }
    }

    pub fn aggregate_bind_group(
        &self,
        ctx: &dyn RenderContext,
        series: SeriesBindings,
        columns: &GpuBuffer,
    ) -> GpuBindGroup {
        ctx.create_bind_group(&BindGroupDescriptor {
            label: Some("Chart Aggregate Bind Group"),
            layout: &self.aggregate,
            entries: &[
                BindGroupEntry::buffer(0, series.params),
                BindGroupEntry::buffer(1, series.series_info),
                BindGroupEntry::buffer(2, series.slot),
                BindGroupEntry::buffer(3, series.xs),
                BindGroupEntry::buffer(4, series.ys),
                BindGroupEntry::buffer(5, columns),
            ],
        })
    }

    pub fn stamp_bind_group(
        &self,
        ctx: &dyn RenderContext,
        series: SeriesBindings,
        target: &GpuTextureView,
    ) -> GpuBindGroup {
        ctx.create_bind_group(&BindGroupDescriptor {
            label: Some("Chart Stamp Bind Group"),
            layout: &self.stamp,
            entries: &[
                BindGroupEntry::buffer(0, series.params),
                BindGroupEntry::buffer(1, series.series_info),
                BindGroupEntry::buffer(2, series.slot),
                BindGroupEntry::buffer(3, series.xs),
                BindGroupEntry::buffer(4, series.ys),
                BindGroupEntry::texture_view(5, target),
            ],
        })
    }

    pub fn raster_bind_group(
        &self,
        ctx: &dyn RenderContext,
        series: SeriesBindings,
        columns: &GpuBuffer,
    ) -> GpuBindGroup {
        ctx.create_bind_group(&BindGroupDescriptor {
            label: Some("Chart Raster Bind Group"),
            layout: &self.raster,
            entries: &[
                BindGroupEntry::buffer(0, series.params),
                BindGroupEntry::buffer(1, series.series_info),
                BindGroupEntry::buffer(2, series.slot),
                BindGroupEntry::buffer(3, columns),
            ],
        })
    }

    pub fn post_bind_group(
        &self,
        ctx: &dyn RenderContext,
        params: &GpuBuffer,
        target: &GpuTextureView,
    ) -> GpuBindGroup {
        ctx.create_bind_group(&BindGroupDescriptor {
            label: Some("Chart Post Bind Group"),
            layout: &self.post,
            entries: &[
                BindGroupEntry::buffer(0, params),
                BindGroupEntry::texture_view(1, target),
                BindGroupEntry::sampler(2, &self.sampler),
            ],
        })
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    read_only: bool,
    element_size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(element_size as u64),
        },
        count: None,
    }
}

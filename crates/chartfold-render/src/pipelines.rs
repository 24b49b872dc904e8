//! Compute and render pipelines shared by every chart on a device.

use crate::context::GraphicsContext;
use crate::layouts::{BindingLayouts, OFFSCREEN_FORMAT};
use ahash::AHashMap;
use chartfold_core::profiling::profile_function;

const AGGREGATE_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/aggregate.wgsl"),
);

const STAMP_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/stamp.wgsl"),
);

const RASTER_LINE_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/raster_common.wgsl"),
    include_str!("shaders/raster_line.wgsl"),
);

const RASTER_BOX_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/raster_common.wgsl"),
    include_str!("shaders/raster_box.wgsl"),
);

const POST_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/fxaa.wgsl"),
);

/// Vertices emitted per column instance by the line raster.
pub const LINE_VERTICES_PER_COLUMN: u32 = 12;
/// Vertices emitted per column instance by the box raster.
pub const BOX_VERTICES_PER_COLUMN: u32 = 6;

/// Pipelines are built on the concrete device once per engine; only the
/// resolve pipeline varies with the output format and is cached per format.
pub struct ChartPipelines {
    pub aggregate: wgpu::ComputePipeline,
    pub stamp: wgpu::ComputePipeline,
    pub raster_line: wgpu::RenderPipeline,
    pub raster_box: wgpu::RenderPipeline,
    post_layout: wgpu::PipelineLayout,
    post_shader: wgpu::ShaderModule,
    post: AHashMap<wgpu::TextureFormat, wgpu::RenderPipeline>,
}

impl ChartPipelines {
    pub fn new(context: &GraphicsContext, layouts: &BindingLayouts) -> Self {
        profile_function!();
        let device = context.device();

        let aggregate = compute_pipeline(
            device,
            "Chart Aggregate",
            AGGREGATE_SHADER,
            layouts.aggregate.as_wgpu(),
        );
        let stamp = compute_pipeline(device, "Chart Stamp", STAMP_SHADER, layouts.stamp.as_wgpu());

        let raster_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chart Raster Pipeline Layout"),
            bind_group_layouts: &[layouts.raster.as_wgpu()],
            push_constant_ranges: &[],
        });
        let raster_line = render_pipeline(
            device,
            "Chart Raster Line",
            &shader_module(device, "Chart Raster Line Shader", RASTER_LINE_SHADER),
            &raster_layout,
            OFFSCREEN_FORMAT,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );
        let raster_box = render_pipeline(
            device,
            "Chart Raster Box",
            &shader_module(device, "Chart Raster Box Shader", RASTER_BOX_SHADER),
            &raster_layout,
            OFFSCREEN_FORMAT,
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        let post_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Chart Post Pipeline Layout"),
            bind_group_layouts: &[layouts.post.as_wgpu()],
            push_constant_ranges: &[],
        });
        let post_shader = shader_module(device, "Chart Post Shader", POST_SHADER);

        tracing::debug!("Created chart pipelines");

        Self {
            aggregate,
            stamp,
            raster_line,
            raster_box,
            post_layout,
            post_shader,
            post: AHashMap::new(),
        }
    }

    /// Resolve pipeline writing to `format`, created on first use.
    pub fn post_pipeline(
        &mut self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> &wgpu::RenderPipeline {
        let (layout, shader) = (&self.post_layout, &self.post_shader);
        self.post.entry(format).or_insert_with(|| {
            tracing::debug!("Creating chart post pipeline for {:?}", format);
            render_pipeline(device, "Chart Post", shader, layout, format, None)
        })
    }
}

fn shader_module(device: &wgpu::Device, label: &str, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}

fn compute_pipeline(
    device: &wgpu::Device,
    label: &str,
    source: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::ComputePipeline {
    let module = shader_module(device, label, source);
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });
    device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        module: &module,
        entry_point: Some("cs_main"),
        compilation_options: wgpu::PipelineCompilationOptions::default(),
        cache: None,
    })
}

fn render_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

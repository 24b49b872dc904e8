//! Per-chart frame encoding.
//!
//! A chart frame is always the same four passes, in order: clear the
//! off-screen target, run every series' compute kernel, raster every
//! series' columns (line/box only), then resolve onto the output.

use crate::kernels::{AGGREGATE_WORKGROUP_SIZE, DispatchGrid};
use crate::params::ChartKind;
use crate::pipelines::{BOX_VERTICES_PER_COLUMN, ChartPipelines, LINE_VERTICES_PER_COLUMN};
use chartfold_core::profiling::{profile_function, profile_scope};
use chartfold_test_utils::{GpuBindGroup, GpuTextureView};

/// The bindings and dispatch sizes of one series.
pub struct SeriesPass<'a> {
    /// Aggregate or stamp bind group, depending on the chart kind.
    pub compute: &'a GpuBindGroup,
    /// Raster bind group; `None` for point charts.
    pub raster: Option<&'a GpuBindGroup>,
    /// Stamp dispatch grid. Unused by the aggregation kernel.
    pub grid: DispatchGrid,
}

/// Everything needed to encode one chart's frame.
pub struct ChartFrame<'a> {
    pub label: &'a str,
    pub kind: ChartKind,
    /// Target width in pixels, which is also the column count.
    pub width: u32,
    pub target: &'a GpuTextureView,
    pub output: &'a wgpu::TextureView,
    pub output_format: wgpu::TextureFormat,
    pub post: &'a GpuBindGroup,
    /// Series in registration order.
    pub series: Vec<SeriesPass<'a>>,
}

impl ChartFrame<'_> {
    pub fn encode(
        &self,
        pipelines: &mut ChartPipelines,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
    ) {
        profile_function!();
        tracing::trace!(
            "Encoding chart frame {} ({:?}, {} series)",
            self.label,
            self.kind,
            self.series.len()
        );

        {
            profile_scope!("clear");
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chart Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.as_wgpu(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }

        if !self.series.is_empty() {
            profile_scope!("compute");
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Chart Compute Pass"),
                timestamp_writes: None,
            });
            if self.kind.aggregates() {
                pass.set_pipeline(&pipelines.aggregate);
                let groups = self.width.div_ceil(AGGREGATE_WORKGROUP_SIZE);
                for series in &self.series {
                    pass.set_bind_group(0, series.compute.as_wgpu(), &[]);
                    pass.dispatch_workgroups(groups, 1, 1);
                }
            } else {
                pass.set_pipeline(&pipelines.stamp);
                for series in self.series.iter().filter(|s| !s.grid.is_empty()) {
                    pass.set_bind_group(0, series.compute.as_wgpu(), &[]);
                    pass.dispatch_workgroups(series.grid.x, series.grid.y, 1);
                }
            }
        }

        if self.kind.aggregates() && !self.series.is_empty() {
            profile_scope!("raster");
            let (pipeline, vertices) = match self.kind {
                ChartKind::Box => (&pipelines.raster_box, BOX_VERTICES_PER_COLUMN),
                _ => (&pipelines.raster_line, LINE_VERTICES_PER_COLUMN),
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Chart Raster Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target.as_wgpu(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            for raster in self.series.iter().filter_map(|s| s.raster) {
                pass.set_bind_group(0, raster.as_wgpu(), &[]);
                pass.draw(0..vertices, 0..self.width);
            }
        }

        profile_scope!("resolve");
        let pipeline = pipelines.post_pipeline(device, self.output_format);
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Chart Resolve Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, self.post.as_wgpu(), &[]);
        pass.draw(0..3, 0..1);
    }
}

//! Resource lifecycle of a chart.
//!
//! Every allocation, reallocation and release of a chart's GPU objects goes
//! through [`Lifecycle`]. A chart is registered (params, series array,
//! off-screen target, output, post bindings), then any number of times
//! re-seriesed or resized, and finally destroyed, which releases each object
//! explicitly instead of leaving it to drop.
//!
//! Limits are checked before anything is freed, so a rejected update or
//! resize leaves the chart exactly as it was.

use std::mem::size_of;

use chartfold_core::limits::clamp_point_size;
use chartfold_core::profiling::profile_function;
use chartfold_render::kernels::{STAMP_WORKGROUP_SIZE, throttled_radius};
use chartfold_render::{
    BindingLayouts, ChartKind, ChartParams, ColumnRecord, DataBounds, DispatchGrid, GpuBindGroup,
    GpuBuffer, GpuTexture, GpuTextureView, OFFSCREEN_FORMAT, ParamsSource, RenderContext,
    SeriesBindings, SeriesInfo, SeriesSlot,
};

use crate::backend::Backend;
use crate::chart::{Chart, ChartDirty, Series};
use crate::error::{EngineError, EngineResult};
use crate::surface::Presentation;
use crate::types::{ChartId, Rgb, SeriesData, SurfaceSource, Theme};

/// Smallest storage buffer the lifecycle creates. Empty series still bind.
const MIN_STORAGE_BYTES: usize = 16;

/// The device limits chart resources are validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    pub max_texture_dimension_2d: u32,
    pub max_storage_buffer_binding_size: u64,
    pub max_compute_workgroups_per_dimension: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self::from_wgpu(&wgpu::Limits::default())
    }
}

impl DeviceLimits {
    pub fn from_wgpu(limits: &wgpu::Limits) -> Self {
        Self {
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
            max_storage_buffer_binding_size: limits.max_storage_buffer_binding_size as u64,
            max_compute_workgroups_per_dimension: limits.max_compute_workgroups_per_dimension,
        }
    }

    /// Lower the per-dimension workgroup bound to `max` if it is tighter.
    pub fn with_workgroup_cap(mut self, max: u32) -> Self {
        self.max_compute_workgroups_per_dimension =
            self.max_compute_workgroups_per_dimension.min(max).max(1);
        self
    }
}

/// Registration parameters of a chart.
#[derive(Debug, Clone)]
pub struct ChartDescriptor {
    pub id: ChartId,
    pub kind: ChartKind,
    pub width: u32,
    pub height: u32,
    pub point_radius: f32,
    pub max_samples: u32,
    pub background: Option<Rgb>,
}

/// GPU objects of one series.
pub struct SeriesResources {
    pub xs: GpuBuffer,
    pub ys: GpuBuffer,
    pub slot: GpuBuffer,
    /// Column records; line and box charts only.
    pub columns: Option<GpuBuffer>,
    /// Aggregate or stamp bind group.
    pub compute: GpuBindGroup,
    pub raster: Option<GpuBindGroup>,
    pub grid: DispatchGrid,
}

/// GPU objects of one chart.
pub struct ChartResources {
    pub params: GpuBuffer,
    pub series_info: GpuBuffer,
    pub target: GpuTexture,
    pub target_view: GpuTextureView,
    pub presentation: Presentation,
    pub post: GpuBindGroup,
    pub series: Vec<SeriesResources>,
    /// The series array must be rewritten before the next frame.
    info_stale: bool,
}

impl ChartResources {
    pub fn buffer_count(&self) -> usize {
        2 + self
            .series
            .iter()
            .map(|s| 3 + s.columns.is_some() as usize)
            .sum::<usize>()
    }
}

/// Allocation and teardown of chart resources on one backend.
pub struct Lifecycle<'a> {
    backend: &'a dyn Backend,
    limits: DeviceLimits,
    headless_format: wgpu::TextureFormat,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        limits: DeviceLimits,
        headless_format: wgpu::TextureFormat,
    ) -> Self {
        Self {
            backend,
            limits,
            headless_format,
        }
    }

    fn ctx(&self) -> &dyn RenderContext {
        self.backend.render_context()
    }

    fn layouts(&self) -> &BindingLayouts {
        self.backend.layouts()
    }

    pub fn limits(&self) -> DeviceLimits {
        self.limits
    }

    /// Allocate a chart with no series.
    pub fn register(
        &self,
        desc: ChartDescriptor,
        surface: SurfaceSource,
    ) -> EngineResult<Chart> {
        profile_function!();
        self.check_target(desc.id, desc.width, desc.height)?;

        let presentation = match surface {
            SurfaceSource::Headless => self.headless_output(desc.width, desc.height),
            SurfaceSource::Window(window) => Presentation::Window(
                self.backend
                    .create_window_surface(window, desc.width, desc.height)?,
            ),
        };

        let ctx = self.ctx();
        let params = ctx.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chart Params"),
            size: size_of::<ChartParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let series_info = self.series_info_buffer(0);
        let (target, target_view) = self.offscreen_target(desc.width, desc.height);
        let post = self
            .layouts()
            .post_bind_group(ctx, &params, &target_view);

        tracing::debug!(
            "Registered chart {} ({:?}, {}x{}, {:?})",
            desc.id,
            desc.kind,
            desc.width,
            desc.height,
            presentation.format()
        );

        Ok(Chart {
            id: desc.id,
            kind: desc.kind,
            width: desc.width,
            height: desc.height,
            transform: Default::default(),
            bounds: DataBounds::default(),
            point_radius: clamp_point_size(desc.point_radius),
            max_samples: desc.max_samples,
            background: desc.background,
            visible: true,
            dirty: ChartDirty::all(),
            series: Vec::new(),
            gpu: ChartResources {
                params,
                series_info,
                target,
                target_view,
                presentation,
                post,
                series: Vec::new(),
                info_stale: true,
            },
        })
    }

    /// Replace every series of `chart` and return the bounds it now uses.
    ///
    /// `bounds` overrides the padded data extents when it is valid.
    pub fn replace_series(
        &self,
        chart: &mut Chart,
        data: Vec<SeriesData>,
        bounds: Option<DataBounds>,
    ) -> EngineResult<DataBounds> {
        profile_function!();
        self.check_series(chart, &data)?;

        self.teardown_series(chart);

        let bounds = match bounds {
            Some(bounds) if bounds.is_valid() => bounds,
            Some(bounds) => {
                tracing::warn!(
                    "Ignoring invalid bounds override {:?} for chart {}",
                    bounds,
                    chart.id
                );
                derived_bounds(&data)
            }
            None => derived_bounds(&data),
        };
        chart.bounds = bounds;

        let ctx = self.ctx();
        chart.gpu.series_info = self.series_info_buffer(data.len());

        for (index, series) in data.into_iter().enumerate() {
            let len = series.x.len() as u32;
            let xs = ctx.create_buffer_init(
                Some("Chart Series X"),
                &storage_bytes(series.x.iter().map(|&x| bounds.rebase_x(x))),
                wgpu::BufferUsages::STORAGE,
            );
            let ys = ctx.create_buffer_init(
                Some("Chart Series Y"),
                &storage_bytes(series.y.iter().map(|&y| bounds.rebase_y(y))),
                wgpu::BufferUsages::STORAGE,
            );
            let slot = ctx.create_buffer_init(
                Some("Chart Series Slot"),
                bytemuck::bytes_of(&SeriesSlot::new(index as u32)),
                wgpu::BufferUsages::UNIFORM,
            );
            let columns = chart
                .kind
                .aggregates()
                .then(|| self.columns_buffer(chart.width));
            let grid = self.stamp_grid(len);

            let (compute, raster) = self.series_bind_groups(
                chart.kind,
                SeriesBindings {
                    params: &chart.gpu.params,
                    series_info: &chart.gpu.series_info,
                    slot: &slot,
                    xs: &xs,
                    ys: &ys,
                },
                columns.as_ref(),
                &chart.gpu.target_view,
            );

            chart.gpu.series.push(SeriesResources {
                xs,
                ys,
                slot,
                columns,
                compute,
                raster,
                grid,
            });
            chart.series.push(Series {
                label: series.label,
                color: series.color,
                len,
                visible: 0..len,
                radius: chart.point_radius,
            });
        }

        chart.gpu.info_stale = true;
        chart.mark_dirty(ChartDirty::DATA);

        tracing::debug!(
            "Chart {} now holds {} series ({} samples), bounds {:?}",
            chart.id,
            chart.series.len(),
            chart.sample_count(),
            bounds
        );
        Ok(bounds)
    }

    /// Reallocate everything sized by the chart's pixels.
    ///
    /// Returns `false` without touching any resource when the size is
    /// unchanged.
    pub fn resize(&self, chart: &mut Chart, width: u32, height: u32) -> EngineResult<bool> {
        profile_function!();
        if chart.width == width && chart.height == height {
            return Ok(false);
        }
        self.check_target(chart.id, width, height)?;
        if chart.kind.aggregates() {
            self.check_storage(chart.id, "column buffer", columns_bytes(width))?;
        }

        let ctx = self.ctx();
        ctx.destroy_texture(&chart.gpu.target);
        let (target, target_view) = self.offscreen_target(width, height);
        chart.gpu.target = target;
        chart.gpu.target_view = target_view;

        match &mut chart.gpu.presentation {
            Presentation::Window(window) => {
                self.backend.configure_window_surface(window, width, height)
            }
            Presentation::Headless { texture, .. } => ctx.destroy_texture(texture),
        }
        if chart.gpu.presentation.is_headless() {
            chart.gpu.presentation = self.headless_output(width, height);
        }

        for series in &mut chart.gpu.series {
            if let Some(columns) = series.columns.take() {
                ctx.destroy_buffer(&columns);
                series.columns = Some(self.columns_buffer(width));
            }
        }

        chart.width = width;
        chart.height = height;
        self.rebuild_bindings(chart);
        // The throttled radius depends on the area.
        chart.gpu.info_stale = true;
        chart.mark_dirty(ChartDirty::SIZE);

        tracing::debug!("Resized chart {} to {}x{}", chart.id, width, height);
        Ok(true)
    }

    /// Release every GPU object the chart owns.
    pub fn destroy(&self, mut chart: Chart) {
        profile_function!();
        self.teardown_series(&mut chart);

        let ctx = self.ctx();
        let gpu = chart.gpu;
        // The series array went with the series.
        ctx.destroy_buffer(&gpu.params);
        ctx.destroy_texture(&gpu.target);
        match gpu.presentation {
            Presentation::Headless { texture, .. } => ctx.destroy_texture(&texture),
            // Dropping the surface unbinds it from the window.
            Presentation::Window(window) => drop(window),
        }

        tracing::debug!("Destroyed chart {}", chart.id);
    }

    /// Write this frame's params, and the series array when it changed.
    ///
    /// Returns `false` when the view window is degenerate and the frame must
    /// be skipped.
    pub fn upload_frame(&self, chart: &mut Chart, theme: Theme) -> bool {
        profile_function!();
        let view = chart.view_window();
        if view.is_degenerate() {
            tracing::warn!(
                "Skipping chart {}: degenerate view window {:?}",
                chart.id,
                view
            );
            return false;
        }

        let ctx = self.ctx();
        let mut info_stale = chart.gpu.info_stale;
        for series in &mut chart.series {
            let radius = match chart.kind {
                ChartKind::Points => throttled_radius(
                    chart.point_radius,
                    (series.visible.end - series.visible.start) as u64,
                    chart.width,
                    chart.height,
                ),
                _ => chart.point_radius,
            };
            if radius != series.radius {
                tracing::trace!(
                    "Chart {} series '{}' radius {} -> {}",
                    chart.id,
                    series.label,
                    series.radius,
                    radius
                );
                series.radius = radius;
                info_stale = true;
            }
        }

        if info_stale {
            let infos: Vec<SeriesInfo> = chart
                .series
                .iter()
                .zip(&chart.gpu.series)
                .enumerate()
                .map(|(slot, (series, gpu))| {
                    SeriesInfo::new(
                        series.color.to_array(),
                        series.visible.clone(),
                        series.radius,
                        gpu.grid.x,
                        slot as u32,
                    )
                })
                .collect();
            if !infos.is_empty() {
                ctx.write_buffer(&chart.gpu.series_info, 0, bytemuck::cast_slice(&infos));
            }
            chart.gpu.info_stale = false;
        }

        let params = ChartParams::pack(&ParamsSource {
            kind: chart.kind,
            width: chart.width,
            height: chart.height,
            bounds: chart.bounds,
            view,
            point_radius: chart.point_radius,
            is_dark: theme.is_dark(),
            background: chart
                .background
                .unwrap_or_else(|| theme.default_background())
                .to_rgba(),
            max_samples: chart.max_samples,
            series_count: chart.series.len() as u32,
        });
        ctx.write_buffer(&chart.gpu.params, 0, bytemuck::bytes_of(&params));
        true
    }

    fn teardown_series(&self, chart: &mut Chart) {
        let ctx = self.ctx();
        for series in chart.gpu.series.drain(..) {
            ctx.destroy_buffer(&series.xs);
            ctx.destroy_buffer(&series.ys);
            ctx.destroy_buffer(&series.slot);
            if let Some(columns) = &series.columns {
                ctx.destroy_buffer(columns);
            }
        }
        ctx.destroy_buffer(&chart.gpu.series_info);
        chart.series.clear();
    }

    fn rebuild_bindings(&self, chart: &mut Chart) {
        let gpu = &mut chart.gpu;
        gpu.post = self
            .layouts()
            .post_bind_group(self.ctx(), &gpu.params, &gpu.target_view);

        for series in &mut gpu.series {
            let (compute, raster) = self.series_bind_groups(
                chart.kind,
                SeriesBindings {
                    params: &gpu.params,
                    series_info: &gpu.series_info,
                    slot: &series.slot,
                    xs: &series.xs,
                    ys: &series.ys,
                },
                series.columns.as_ref(),
                &gpu.target_view,
            );
            series.compute = compute;
            series.raster = raster;
        }
    }

    fn series_bind_groups(
        &self,
        kind: ChartKind,
        bindings: SeriesBindings,
        columns: Option<&GpuBuffer>,
        target: &GpuTextureView,
    ) -> (GpuBindGroup, Option<GpuBindGroup>) {
        let ctx = self.ctx();
        let layouts = self.layouts();
        match columns {
            Some(columns) if kind.aggregates() => (
                layouts.aggregate_bind_group(ctx, bindings, columns),
                Some(layouts.raster_bind_group(ctx, bindings, columns)),
            ),
            _ => (layouts.stamp_bind_group(ctx, bindings, target), None),
        }
    }

    fn series_info_buffer(&self, count: usize) -> GpuBuffer {
        self.ctx().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chart Series Info"),
            size: (count.max(1) * size_of::<SeriesInfo>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn columns_buffer(&self, width: u32) -> GpuBuffer {
        self.ctx().create_buffer(&wgpu::BufferDescriptor {
            label: Some("Chart Columns"),
            size: columns_bytes(width),
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        })
    }

    fn offscreen_target(&self, width: u32, height: u32) -> (GpuTexture, GpuTextureView) {
        let ctx = self.ctx();
        let texture = ctx.create_texture(&wgpu::TextureDescriptor {
            label: Some("Chart Offscreen Target"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING,
            view_formats: &[],
        });
        let view = ctx.create_texture_view(&texture, Some("Chart Offscreen Target View"));
        (texture, view)
    }

    fn headless_output(&self, width: u32, height: u32) -> Presentation {
        let ctx = self.ctx();
        let texture = ctx.create_texture(&wgpu::TextureDescriptor {
            label: Some("Chart Output"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.headless_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = ctx.create_texture_view(&texture, Some("Chart Output View"));
        Presentation::Headless {
            texture,
            view,
            format: self.headless_format,
        }
    }

    fn stamp_grid(&self, samples: u32) -> DispatchGrid {
        DispatchGrid::for_items(
            samples,
            STAMP_WORKGROUP_SIZE,
            self.limits.max_compute_workgroups_per_dimension,
        )
    }

    fn check_target(&self, id: ChartId, width: u32, height: u32) -> EngineResult<()> {
        let limit = self.limits.max_texture_dimension_2d;
        let requested = width.max(height);
        if requested > limit {
            return Err(EngineError::LimitExceeded {
                chart: id,
                resource: "texture dimension",
                requested: requested as u64,
                limit: limit as u64,
            });
        }
        Ok(())
    }

    fn check_storage(&self, id: ChartId, resource: &'static str, bytes: u64) -> EngineResult<()> {
        let limit = self.limits.max_storage_buffer_binding_size;
        if bytes > limit {
            return Err(EngineError::LimitExceeded {
                chart: id,
                resource,
                requested: bytes,
                limit,
            });
        }
        Ok(())
    }

    fn check_series(&self, chart: &Chart, data: &[SeriesData]) -> EngineResult<()> {
        let invalid = |series: usize, reason: String| EngineError::InvalidSeries {
            chart: chart.id,
            series,
            reason,
        };

        self.check_storage(
            chart.id,
            "series info buffer",
            (data.len() * size_of::<SeriesInfo>()) as u64,
        )?;
        if chart.kind.aggregates() {
            self.check_storage(chart.id, "column buffer", columns_bytes(chart.width))?;
        }

        for (index, series) in data.iter().enumerate() {
            if series.x.len() != series.y.len() {
                return Err(invalid(
                    index,
                    format!(
                        "x has {} samples but y has {}",
                        series.x.len(),
                        series.y.len()
                    ),
                ));
            }
            let len = u32::try_from(series.x.len())
                .map_err(|_| invalid(index, format!("{} samples", series.x.len())))?;
            self.check_storage(
                chart.id,
                "series buffer",
                len as u64 * size_of::<f32>() as u64,
            )?;

            if chart.kind == ChartKind::Points {
                let grid = self.stamp_grid(len);
                let max = self.limits.max_compute_workgroups_per_dimension;
                if grid.y > max {
                    return Err(EngineError::LimitExceeded {
                        chart: chart.id,
                        resource: "stamp workgroups",
                        requested: grid.y as u64,
                        limit: max as u64,
                    });
                }
            }
        }
        Ok(())
    }
}

fn derived_bounds(data: &[SeriesData]) -> DataBounds {
    DataBounds::from_samples(data.iter().map(|s| (s.x.as_slice(), s.y.as_slice())))
        .unwrap_or_default()
}

fn columns_bytes(width: u32) -> u64 {
    width.max(1) as u64 * size_of::<ColumnRecord>() as u64
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

/// Pack rebased samples, padded up to the minimum storage size.
fn storage_bytes(values: impl Iterator<Item = f32>) -> Vec<u8> {
    let mut values: Vec<f32> = values.collect();
    let min_len = MIN_STORAGE_BYTES / size_of::<f32>();
    if values.len() < min_len {
        values.resize(min_len, 0.0);
    }
    bytemuck::cast_slice(&values).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_bytes_padding() {
        assert_eq!(storage_bytes(std::iter::empty()).len(), MIN_STORAGE_BYTES);
        assert_eq!(storage_bytes([1.0f32; 10].into_iter()).len(), 40);
    }

    #[test]
    fn test_workgroup_cap_only_lowers() {
        let limits = DeviceLimits::default();
        assert_eq!(
            limits
                .with_workgroup_cap(1024)
                .max_compute_workgroups_per_dimension,
            1024
        );
        assert_eq!(
            limits
                .with_workgroup_cap(u32::MAX)
                .max_compute_workgroups_per_dimension,
            limits.max_compute_workgroups_per_dimension
        );
    }

    #[test]
    fn test_columns_bytes_never_zero() {
        assert_eq!(columns_bytes(0), 32);
        assert_eq!(columns_bytes(640), 640 * 32);
    }
}

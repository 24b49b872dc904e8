//! The wgpu backend.

use std::sync::Arc;

use chartfold_core::profiling::profile_function;
use chartfold_render::{
    BindingLayouts, ChartFrame, ChartPipelines, GraphicsContext, GraphicsContextDescriptor,
    GraphicsError, RenderContext, SeriesPass,
};

use crate::backend::{Backend, BackendFactory};
use crate::chart::Chart;
use crate::error::{EngineError, EngineResult};
use crate::resources::DeviceLimits;
use crate::surface::{Presentation, WindowSurface};

pub struct GpuBackend {
    context: Arc<GraphicsContext>,
    layouts: BindingLayouts,
    pipelines: ChartPipelines,
    commands: Vec<wgpu::CommandBuffer>,
    frames: Vec<wgpu::SurfaceTexture>,
}

impl GpuBackend {
    pub fn new(context: Arc<GraphicsContext>) -> Self {
        profile_function!();
        let layouts = BindingLayouts::new(&*context);
        let pipelines = ChartPipelines::new(&context, &layouts);
        Self {
            context,
            layouts,
            pipelines,
            commands: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn context(&self) -> &Arc<GraphicsContext> {
        &self.context
    }

    fn acquire(&self, window: &WindowSurface) -> EngineResult<wgpu::SurfaceTexture> {
        match window.surface.get_current_texture() {
            Ok(frame) => Ok(frame),
            Err(err @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
                // Reconfigure now so the next frame can acquire.
                window.surface.configure(self.context.device(), &window.config);
                Err(GraphicsError::SurfaceAcquire(err.to_string()).into())
            }
            Err(err) => Err(GraphicsError::SurfaceAcquire(err.to_string()).into()),
        }
    }
}

impl Backend for GpuBackend {
    fn render_context(&self) -> &dyn RenderContext {
        &*self.context
    }

    fn layouts(&self) -> &BindingLayouts {
        &self.layouts
    }

    fn limits(&self) -> DeviceLimits {
        DeviceLimits::from_wgpu(&self.context.limits())
    }

    fn create_window_surface(
        &self,
        window: Arc<dyn wgpu::WindowHandle>,
        width: u32,
        height: u32,
    ) -> Result<WindowSurface, GraphicsError> {
        let context = &self.context;
        let surface = context
            .instance
            .create_surface(window)
            .map_err(|e| GraphicsError::SurfaceCreation(e.to_string()))?;

        let mut config = surface
            .get_default_config(&context.adapter, width.max(1), height.max(1))
            .ok_or(GraphicsError::SurfaceUnsupported)?;
        // The resolve writes linear values; an sRGB surface would encode twice.
        let caps = surface.get_capabilities(&context.adapter);
        if let Some(format) = caps.formats.iter().copied().find(|f| !f.is_srgb()) {
            config.format = format;
        }

        surface.configure(context.device(), &config);
        tracing::debug!(
            "Configured window surface {}x{} ({:?})",
            config.width,
            config.height,
            config.format
        );
        Ok(WindowSurface { surface, config })
    }

    fn configure_window_surface(&self, surface: &mut WindowSurface, width: u32, height: u32) {
        surface.resize(width, height);
        surface
            .surface
            .configure(self.context.device(), &surface.config);
    }

    fn render_chart(&mut self, chart: &Chart) -> EngineResult<()> {
        profile_function!();
        let gpu = chart.resources();

        let frame = match &gpu.presentation {
            Presentation::Window(window) => Some(self.acquire(window)?),
            Presentation::Headless { .. } => None,
        };
        let frame_view = frame.as_ref().map(|frame| {
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let output = match (&frame_view, gpu.presentation.headless_view()) {
            (Some(view), _) => view,
            (None, Some(view)) => view.as_wgpu(),
            (None, None) => return Err(EngineError::Unsupported("chart without an output")),
        };

        let label = format!("Chart {}", chart.id);
        let frame_desc = ChartFrame {
            label: &label,
            kind: chart.kind,
            width: chart.width,
            target: &gpu.target_view,
            output,
            output_format: gpu.presentation.format(),
            post: &gpu.post,
            series: gpu
                .series
                .iter()
                .map(|series| SeriesPass {
                    compute: &series.compute,
                    raster: series.raster.as_ref(),
                    grid: series.grid,
                })
                .collect(),
        };

        let device = self.context.device();
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(&label),
        });
        frame_desc.encode(&mut self.pipelines, device, &mut encoder);
        self.commands.push(encoder.finish());

        if let Some(frame) = frame {
            self.frames.push(frame);
        }
        Ok(())
    }

    fn submit(&mut self) {
        profile_function!();
        if self.commands.is_empty() {
            return;
        }
        self.context.queue().submit(self.commands.drain(..));
        for frame in self.frames.drain(..) {
            frame.present();
        }
    }

    fn device_lost(&self) -> Option<String> {
        self.context.lost_reason().map(str::to_string)
    }
}

/// Creates a [`GpuBackend`] on a fresh device.
#[derive(Debug, Clone, Default)]
pub struct GpuBackendFactory {
    pub descriptor: GraphicsContextDescriptor,
}

impl GpuBackendFactory {
    pub fn new(descriptor: GraphicsContextDescriptor) -> Self {
        Self { descriptor }
    }
}

impl BackendFactory for GpuBackendFactory {
    type Backend = GpuBackend;

    fn create(&mut self) -> EngineResult<GpuBackend> {
        let context = GraphicsContext::new_owned_sync_with_descriptor(self.descriptor.clone())?;
        Ok(GpuBackend::new(context))
    }
}

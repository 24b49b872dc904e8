//! Where a chart's resolved frame ends up.

use chartfold_render::{GpuTexture, GpuTextureView};

/// A configured window surface owned by one chart.
pub struct WindowSurface {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl WindowSurface {
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
    }
}

pub enum Presentation {
    /// Engine-owned texture; `COPY_SRC` so the host can read it back.
    Headless {
        texture: GpuTexture,
        view: GpuTextureView,
        format: wgpu::TextureFormat,
    },
    Window(WindowSurface),
}

impl Presentation {
    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            Presentation::Headless { format, .. } => *format,
            Presentation::Window(window) => window.config.format,
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, Presentation::Headless { .. })
    }

    pub fn headless_texture(&self) -> Option<&GpuTexture> {
        match self {
            Presentation::Headless { texture, .. } => Some(texture),
            Presentation::Window(_) => None,
        }
    }

    pub fn headless_view(&self) -> Option<&GpuTextureView> {
        match self {
            Presentation::Headless { view, .. } => Some(view),
            Presentation::Window(_) => None,
        }
    }
}

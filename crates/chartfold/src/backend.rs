//! The seam between the engine and the device it renders with.

use std::sync::Arc;

use chartfold_render::{BindingLayouts, GraphicsError, RenderContext};

use crate::chart::Chart;
use crate::error::EngineResult;
use crate::resources::DeviceLimits;
use crate::surface::WindowSurface;

/// A device the engine can allocate on and render with.
///
/// Resource allocation goes through [`Backend::render_context`], so the
/// whole chart lifecycle runs against a mock context in tests; only frame
/// encoding and surfaces need a real device.
pub trait Backend {
    fn render_context(&self) -> &dyn RenderContext;

    /// Bind group layouts shared by every chart.
    fn layouts(&self) -> &BindingLayouts;

    fn limits(&self) -> DeviceLimits;

    fn create_window_surface(
        &self,
        window: Arc<dyn wgpu::WindowHandle>,
        width: u32,
        height: u32,
    ) -> Result<WindowSurface, GraphicsError>;

    fn configure_window_surface(&self, surface: &mut WindowSurface, width: u32, height: u32);

    /// Encode one chart's frame. Nothing reaches the device until
    /// [`Backend::submit`].
    fn render_chart(&mut self, chart: &Chart) -> EngineResult<()>;

    /// Submit everything encoded since the last call and present surfaces.
    fn submit(&mut self);

    /// Why the device was lost, once it has been.
    fn device_lost(&self) -> Option<String>;
}

/// Creates the backend on `init`, and again when reinitialising after a
/// fatal error.
pub trait BackendFactory {
    type Backend: Backend;

    fn create(&mut self) -> EngineResult<Self::Backend>;
}

impl<B, F> BackendFactory for F
where
    B: Backend,
    F: FnMut() -> EngineResult<B>,
{
    type Backend = B;

    fn create(&mut self) -> EngineResult<B> {
        self()
    }
}

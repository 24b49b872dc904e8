#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use chartfold::{
    Backend, BackendFactory, Chart, ChartId, ChartKind, Command, DeviceLimits, Engine,
    EngineConfig, EngineResult, Event, GraphicsError, Rgb, SeriesData,
    SurfaceSource, WindowSurface,
};
use chartfold_render::BindingLayouts;
use chartfold_test_utils::{MockRenderContext, RenderContext};

/// Records what the engine asks of the device instead of rendering.
pub struct MockBackend {
    pub ctx: MockRenderContext,
    layouts: BindingLayouts,
    pub limits: DeviceLimits,
    pub rendered: Vec<ChartId>,
    /// Number of upcoming `render_chart` calls that fail.
    pub fail_renders: usize,
    pub submits: usize,
    pub lost: OnceLock<String>,
}

impl MockBackend {
    pub fn new(limits: DeviceLimits) -> Self {
        let ctx = MockRenderContext::new();
        let layouts = BindingLayouts::new(&ctx);
        Self {
            ctx,
            layouts,
            limits,
            rendered: Vec::new(),
            fail_renders: 0,
            submits: 0,
            lost: OnceLock::new(),
        }
    }
}

impl Backend for MockBackend {
    fn render_context(&self) -> &dyn RenderContext {
        &self.ctx
    }

    fn layouts(&self) -> &BindingLayouts {
        &self.layouts
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn create_window_surface(
        &self,
        _window: Arc<dyn wgpu::WindowHandle>,
        _width: u32,
        _height: u32,
    ) -> Result<WindowSurface, GraphicsError> {
        Err(GraphicsError::SurfaceUnsupported)
    }

    fn configure_window_surface(&self, _surface: &mut WindowSurface, _width: u32, _height: u32) {}

    fn render_chart(&mut self, chart: &Chart) -> EngineResult<()> {
        if self.fail_renders > 0 {
            self.fail_renders -= 1;
            return Err(GraphicsError::SurfaceAcquire("timeout".to_string()).into());
        }
        self.rendered.push(chart.id);
        Ok(())
    }

    fn submit(&mut self) {
        self.submits += 1;
    }

    fn device_lost(&self) -> Option<String> {
        self.lost.get().cloned()
    }
}

#[derive(Default)]
pub struct MockFactory {
    /// Number of upcoming `create` calls that fail as if no GPU exists.
    pub failures: usize,
    pub limits: Option<DeviceLimits>,
    pub created: usize,
}

impl BackendFactory for MockFactory {
    type Backend = MockBackend;

    fn create(&mut self) -> EngineResult<MockBackend> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(GraphicsError::NoAdapter.into());
        }
        self.created += 1;
        Ok(MockBackend::new(self.limits.unwrap_or_default()))
    }
}

pub fn engine_with(factory: MockFactory) -> (Engine<MockFactory>, Receiver<Event>) {
    let (tx, rx) = mpsc::channel();
    let config = EngineConfig::new().refresh_interval(Duration::from_millis(16));
    (Engine::new(config, factory, tx), rx)
}

/// An initialized engine with its `Ready` event consumed.
pub fn ready_engine() -> (Engine<MockFactory>, Receiver<Event>) {
    let (mut engine, rx) = engine_with(MockFactory::default());
    engine.handle(Command::Init);
    assert_eq!(rx.try_recv(), Ok(Event::Ready));
    (engine, rx)
}

pub fn backend(engine: &Engine<MockFactory>) -> &MockBackend {
    engine.backend().expect("engine is ready")
}

pub fn register(engine: &mut Engine<MockFactory>, id: u64, kind: ChartKind, width: u32, height: u32) {
    engine.handle(Command::RegisterChart {
        id: ChartId(id),
        surface: SurfaceSource::Headless,
        kind,
        width,
        height,
        point_radius: 2.0,
        max_samples: None,
        background: None,
    });
}

pub fn sine(label: &str, samples: usize) -> SeriesData {
    let x: Vec<f64> = (0..samples).map(|i| i as f64).collect();
    let y = x.iter().map(|x| (x * 0.05).sin()).collect();
    SeriesData::new(label, Rgb::from_hex(0x3b82f6), x, y)
}

pub fn update(engine: &mut Engine<MockFactory>, id: u64, series: Vec<SeriesData>) {
    engine.handle(Command::UpdateSeries {
        id: ChartId(id),
        series,
        bounds: None,
    });
}

/// Events so far, without periodic stats.
pub fn drain(rx: &Receiver<Event>) -> Vec<Event> {
    rx.try_iter()
        .filter(|e| !matches!(e, Event::Stats(_)))
        .collect()
}

pub fn errors(rx: &Receiver<Event>) -> Vec<(Option<ChartId>, String)> {
    drain(rx)
        .into_iter()
        .filter_map(|e| match e {
            Event::Error { chart, message } => Some((chart, message)),
            _ => None,
        })
        .collect()
}

/// Hands out tick instants a refresh interval apart.
pub struct Clock(Instant);

impl Clock {
    pub fn new() -> Self {
        Self(Instant::now())
    }

    pub fn next_frame(&mut self) -> Instant {
        self.0 += Duration::from_millis(20);
        self.0
    }

    pub fn advance(&mut self, by: Duration) -> Instant {
        self.0 += by;
        self.0
    }
}

//! The command handler and frame driver.
//!
//! [`Engine`] is single-threaded: it applies controller commands one at a
//! time and renders every dirty, visible chart when its scheduler says a
//! frame is due. Whoever owns it (normally the thread in
//! [`worker`](crate::worker)) decides when to call [`Engine::handle`] and
//! [`Engine::tick`].

use std::sync::mpsc::Sender;
use std::time::Instant;

use chartfold_core::limits::clamp_point_size;
use chartfold_core::profiling::profile_function;

use crate::backend::{Backend, BackendFactory};
use crate::chart::{Chart, ChartDirty};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::protocol::{Command, Event};
use crate::registry::ChartRegistry;
use crate::resources::{ChartDescriptor, Lifecycle};
use crate::scheduler::FrameScheduler;
use crate::types::{ChartId, Theme, ViewTransform};

pub enum EngineState<B> {
    /// No `init` yet.
    Uninitialized,
    Ready(B),
    /// A fatal error occurred; only `init` is served.
    Failed(String),
}

impl<B> EngineState<B> {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Ready(_) => "ready",
            EngineState::Failed(_) => "failed",
        }
    }
}

pub struct Engine<F: BackendFactory> {
    config: EngineConfig,
    factory: F,
    state: EngineState<F::Backend>,
    registry: ChartRegistry,
    scheduler: FrameScheduler,
    theme: Theme,
    events: Sender<Event>,
}

impl<F: BackendFactory> Engine<F> {
    pub fn new(config: EngineConfig, factory: F, events: Sender<Event>) -> Self {
        let scheduler = FrameScheduler::new(&config, Instant::now());
        Self {
            config,
            factory,
            state: EngineState::Uninitialized,
            registry: ChartRegistry::new(),
            scheduler,
            theme: Theme::default(),
            events,
        }
    }

    pub fn handle(&mut self, command: Command) {
        tracing::trace!("Handling {} command", command.name());

        if let Command::Init = command {
            self.init();
            return;
        }

        match &self.state {
            EngineState::Failed(reason) => {
                tracing::warn!(
                    "Dropping {} command, engine failed: {}",
                    command.name(),
                    reason
                );
            }
            EngineState::Uninitialized => self.report(EngineError::NotInitialized, None),
            EngineState::Ready(_) => {
                let chart = command.chart();
                if let Err(err) = self.apply(command) {
                    self.report(err, chart);
                }
                if self.registry.has_pending() {
                    self.scheduler.request_frame();
                }
            }
        }
    }

    /// Render a frame if one is due, check the device, and emit stats.
    pub fn tick(&mut self, now: Instant) {
        let EngineState::Ready(backend) = &self.state else {
            return;
        };
        if let Some(reason) = backend.device_lost() {
            self.fail(EngineError::Fatal(format!("GPU device lost: {}", reason)));
            return;
        }

        if self.scheduler.frame_due(now) {
            self.render_frame(now);
        }

        if let Some(stats) =
            self.scheduler
                .poll_stats(now, self.registry.len(), self.registry.active_count())
        {
            tracing::debug!("{:?}", stats);
            self.emit(Event::Stats(stats));
        }
    }

    /// When the owner must call [`Engine::tick`] next.
    pub fn next_wakeup(&self) -> Instant {
        self.scheduler.next_wakeup()
    }

    /// Release every chart and the backend.
    pub fn shutdown(&mut self) {
        if let EngineState::Ready(backend) = &self.state {
            let lifecycle = lifecycle(backend, &self.config);
            for chart in self.registry.drain() {
                lifecycle.destroy(chart);
            }
        }
        self.registry = ChartRegistry::new();
        self.state = EngineState::Uninitialized;
        tracing::debug!("Engine shut down");
    }

    pub fn state(&self) -> &EngineState<F::Backend> {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    pub fn backend(&self) -> Option<&F::Backend> {
        match &self.state {
            EngineState::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn backend_mut(&mut self) -> Option<&mut F::Backend> {
        match &mut self.state {
            EngineState::Ready(backend) => Some(backend),
            _ => None,
        }
    }

    pub fn chart(&self, id: ChartId) -> Option<&Chart> {
        self.registry.get(id).ok()
    }

    pub fn charts(&self) -> impl Iterator<Item = &Chart> {
        self.registry.iter()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn init(&mut self) {
        match &self.state {
            EngineState::Ready(_) => {
                tracing::debug!("Engine already initialized");
                self.emit(Event::Ready);
                return;
            }
            EngineState::Failed(_) => {
                // Resources of the failed device cannot be released on it.
                let stale = self.registry.drain();
                if !stale.is_empty() {
                    tracing::warn!("Dropping {} charts of the failed device", stale.len());
                }
            }
            EngineState::Uninitialized => {}
        }

        match self.factory.create() {
            Ok(backend) => {
                tracing::info!("Chart engine initialized");
                self.state = EngineState::Ready(backend);
                self.scheduler = FrameScheduler::new(&self.config, Instant::now());
                self.emit(Event::Ready);
            }
            Err(err) => self.fail(err),
        }
    }

    fn apply(&mut self, command: Command) -> EngineResult<()> {
        let EngineState::Ready(backend) = &self.state else {
            return Err(EngineError::NotInitialized);
        };
        let lifecycle = lifecycle(backend, &self.config);
        let registry = &mut self.registry;

        match command {
            Command::Init => {}
            Command::RegisterChart {
                id,
                surface,
                kind,
                width,
                height,
                point_radius,
                max_samples,
                background,
            } => {
                if registry.contains(id) {
                    return Err(EngineError::DuplicateChart(id));
                }
                let desc = ChartDescriptor {
                    id,
                    kind,
                    width,
                    height,
                    point_radius,
                    max_samples: max_samples.unwrap_or(self.config.default_max_samples),
                    background,
                };
                let chart = lifecycle.register(desc, surface)?;
                registry.insert(chart)?;
                send(&self.events, Event::ChartRegistered(id));
            }
            Command::UnregisterChart { id } => {
                let chart = registry.remove(id)?;
                lifecycle.destroy(chart);
                send(&self.events, Event::ChartUnregistered(id));
            }
            Command::UpdateSeries { id, series, bounds } => {
                let chart = registry.get_mut(id)?;
                let bounds = lifecycle.replace_series(chart, series, bounds)?;
                send(&self.events, Event::BoundsUpdate { id, bounds });
            }
            Command::SetPointSize { id, size } => {
                let chart = registry.get_mut(id)?;
                chart.point_radius = clamp_point_size(size);
                chart.mark_dirty(ChartDirty::STYLE);
            }
            Command::SetMaxSamples { id, max_samples } => {
                let chart = registry.get_mut(id)?;
                chart.max_samples = max_samples;
                chart.mark_dirty(ChartDirty::STYLE);
            }
            Command::SetStyle { id, background } => {
                let chart = registry.get_mut(id)?;
                chart.background = background;
                chart.mark_dirty(ChartDirty::STYLE);
            }
            Command::SetVisibility { id, visible } => {
                let chart = registry.get_mut(id)?;
                if visible && !chart.visible {
                    chart.mark_dirty(ChartDirty::SHOWN);
                }
                chart.visible = visible;
            }
            Command::ViewTransform {
                id,
                pan_x,
                pan_y,
                zoom_x,
                zoom_y,
            } => {
                let chart = registry.get_mut(id)?;
                chart.transform = ViewTransform::new(pan_x, pan_y, zoom_x, zoom_y);
                chart.mark_dirty(ChartDirty::VIEW);
            }
            Command::BatchViewTransform {
                pan_x,
                pan_y,
                zoom_x,
                zoom_y,
                ids,
            } => {
                // One clamped transform, copied into every target.
                let transform = ViewTransform::new(pan_x, pan_y, zoom_x, zoom_y);
                for id in ids {
                    match registry.get_mut(id) {
                        Ok(chart) => {
                            chart.transform = transform;
                            chart.mark_dirty(ChartDirty::VIEW);
                        }
                        Err(_) => tracing::warn!("Batch view transform skips unknown chart {}", id),
                    }
                }
            }
            Command::Resize { id, width, height } => {
                let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
                    tracing::warn!("Dropping resize of chart {} to {}x{}", id, width, height);
                    return Ok(());
                };
                if width == 0 || height == 0 {
                    tracing::warn!("Dropping resize of chart {} to {}x{}", id, width, height);
                    return Ok(());
                }
                let chart = registry.get_mut(id)?;
                lifecycle.resize(chart, width, height)?;
            }
            Command::Theme { is_dark } => {
                self.theme = Theme::from_dark(is_dark);
                for chart in registry.iter_mut() {
                    chart.mark_dirty(ChartDirty::STYLE);
                }
            }
        }
        Ok(())
    }

    fn render_frame(&mut self, now: Instant) {
        profile_function!();
        let EngineState::Ready(backend) = &mut self.state else {
            return;
        };

        self.scheduler.begin_frame(now);
        let started = Instant::now();
        let mut rendered = 0usize;
        let mut failures = Vec::new();

        for chart in self.registry.iter_mut() {
            if !chart.is_dirty() || !chart.is_active() {
                continue;
            }

            if !lifecycle(&*backend, &self.config).upload_frame(chart, self.theme) {
                chart.dirty = ChartDirty::empty();
                continue;
            }

            match backend.render_chart(chart) {
                Ok(()) => {
                    chart.dirty = ChartDirty::empty();
                    rendered += 1;
                }
                // The chart stays dirty and is retried with the next frame.
                Err(err) => failures.push((chart.id, err)),
            }
        }

        if rendered > 0 {
            backend.submit();
        }
        if !failures.is_empty() {
            // Failed charts are still dirty.
            self.scheduler.request_frame();
        }
        let elapsed = started.elapsed();
        self.scheduler.end_frame(elapsed);
        tracing::trace!("Rendered {} charts in {:?}", rendered, elapsed);

        for (id, err) in failures {
            tracing::error!("Chart {} failed to render: {}", id, err);
            self.emit(Event::Error {
                chart: Some(id),
                message: err.to_string(),
            });
        }
    }

    fn report(&mut self, err: EngineError, chart: Option<ChartId>) {
        if err.is_fatal() {
            self.fail(err);
            return;
        }
        tracing::error!("{}", err);
        self.emit(Event::Error {
            chart: err.chart().or(chart),
            message: err.to_string(),
        });
    }

    fn fail(&mut self, err: EngineError) {
        let message = err.to_string();
        tracing::error!("{}", message);
        self.state = EngineState::Failed(message.clone());
        self.emit(Event::Error {
            chart: None,
            message,
        });
    }

    fn emit(&self, event: Event) {
        send(&self.events, event);
    }
}

fn lifecycle<'a, B: Backend>(backend: &'a B, config: &EngineConfig) -> Lifecycle<'a> {
    let limits = backend
        .limits()
        .with_workgroup_cap(config.max_workgroups_per_dimension);
    Lifecycle::new(backend, limits, config.headless_format)
}

fn send(events: &Sender<Event>, event: Event) {
    if events.send(event).is_err() {
        tracing::trace!("Event receiver dropped");
    }
}

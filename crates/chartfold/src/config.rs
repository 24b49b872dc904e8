use std::time::Duration;

use chartfold_render::{GraphicsContextDescriptor, OFFSCREEN_FORMAT};

/// Engine-wide settings, fixed for the lifetime of an engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum time between scheduled frames.
    pub refresh_interval: Duration,
    /// How often [`Event::Stats`](crate::Event::Stats) is emitted.
    pub stats_interval: Duration,
    /// Per-column sample cap for charts registered without one. 0 = uncapped.
    pub default_max_samples: u32,
    /// Format of headless chart outputs.
    pub headless_format: wgpu::TextureFormat,
    /// Upper bound on workgroups per dispatch dimension; the device limit
    /// applies when it is lower.
    pub max_workgroups_per_dimension: u32,
    /// Device selection for the GPU backend.
    pub graphics: GraphicsContextDescriptor,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs_f64(1.0 / 60.0),
            stats_interval: Duration::from_secs(1),
            default_max_samples: 0,
            headless_format: OFFSCREEN_FORMAT,
            max_workgroups_per_dimension: 65_535,
            graphics: GraphicsContextDescriptor::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    pub fn default_max_samples(mut self, max_samples: u32) -> Self {
        self.default_max_samples = max_samples;
        self
    }

    pub fn headless_format(mut self, format: wgpu::TextureFormat) -> Self {
        self.headless_format = format;
        self
    }

    pub fn max_workgroups_per_dimension(mut self, max: u32) -> Self {
        self.max_workgroups_per_dimension = max.max(1);
        self
    }

    pub fn graphics(mut self, descriptor: GraphicsContextDescriptor) -> Self {
        self.graphics = descriptor;
        self
    }
}

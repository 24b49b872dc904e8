//! Frame pacing and statistics.
//!
//! The scheduler never sleeps itself. Whoever drives the engine asks
//! [`FrameScheduler::next_wakeup`] how long it may block and calls back with
//! the current time; this keeps pacing deterministic under test.

use std::time::{Duration, Instant};

use chartfold_core::profiling;

use crate::config::EngineConfig;
use crate::protocol::FrameStats;

#[derive(Debug)]
pub struct FrameScheduler {
    refresh_interval: Duration,
    stats_interval: Duration,
    /// A chart owes a frame.
    requested: bool,
    last_frame: Option<Instant>,
    /// Start of the current stats window.
    window_start: Instant,
    frames_in_window: u32,
    last_render: Duration,
    frame_count: u64,
}

impl FrameScheduler {
    pub fn new(config: &EngineConfig, now: Instant) -> Self {
        Self {
            refresh_interval: config.refresh_interval,
            stats_interval: config.stats_interval,
            requested: false,
            last_frame: None,
            window_start: now,
            frames_in_window: 0,
            last_render: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Ask for one frame. Repeated requests before it runs coalesce.
    pub fn request_frame(&mut self) {
        self.requested = true;
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// At most one frame per refresh interval.
    pub fn frame_due(&self, now: Instant) -> bool {
        self.requested && now >= self.next_frame_at()
    }

    fn next_frame_at(&self) -> Instant {
        match self.last_frame {
            Some(last) => last + self.refresh_interval,
            None => self.window_start,
        }
    }

    /// The earliest instant something is owed: a requested frame or stats.
    pub fn next_wakeup(&self) -> Instant {
        let stats_at = self.window_start + self.stats_interval;
        if self.requested {
            stats_at.min(self.next_frame_at())
        } else {
            stats_at
        }
    }

    pub fn begin_frame(&mut self, now: Instant) {
        profiling::new_frame();
        self.requested = false;
        self.last_frame = Some(now);
    }

    pub fn end_frame(&mut self, elapsed: Duration) {
        self.frames_in_window += 1;
        self.frame_count += 1;
        self.last_render = elapsed;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Stats for the window ending at `now`, once per stats interval.
    pub fn poll_stats(&mut self, now: Instant, total: usize, active: usize) -> Option<FrameStats> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.stats_interval {
            return None;
        }

        let stats = FrameStats {
            fps: self.frames_in_window as f32 / elapsed.as_secs_f32().max(f32::EPSILON),
            render_ms: self.last_render.as_secs_f32() * 1000.0,
            total_charts: total,
            active_charts: active,
        };
        self.window_start = now;
        self.frames_in_window = 0;
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(now: Instant) -> FrameScheduler {
        let config = EngineConfig::new()
            .refresh_interval(Duration::from_millis(16))
            .stats_interval(Duration::from_secs(1));
        FrameScheduler::new(&config, now)
    }

    #[test]
    fn test_frames_are_paced() {
        let start = Instant::now();
        let mut s = scheduler(start);
        assert!(!s.frame_due(start));

        s.request_frame();
        s.request_frame();
        assert!(s.frame_due(start));
        s.begin_frame(start);
        s.end_frame(Duration::from_millis(2));

        s.request_frame();
        assert!(!s.frame_due(start + Duration::from_millis(10)));
        assert!(s.frame_due(start + Duration::from_millis(16)));
        assert_eq!(s.next_wakeup(), start + Duration::from_millis(16));
    }

    #[test]
    fn test_stats_once_per_interval() {
        let start = Instant::now();
        let mut s = scheduler(start);
        for i in 0..30 {
            s.begin_frame(start + Duration::from_millis(i * 16));
            s.end_frame(Duration::from_millis(4));
        }

        assert!(s.poll_stats(start + Duration::from_millis(500), 3, 2).is_none());
        let stats = s.poll_stats(start + Duration::from_secs(1), 3, 2).unwrap();
        assert!((stats.fps - 30.0).abs() < 1e-3);
        assert!((stats.render_ms - 4.0).abs() < 1e-3);
        assert_eq!((stats.total_charts, stats.active_charts), (3, 2));

        let next = s.poll_stats(start + Duration::from_secs(2), 3, 2).unwrap();
        assert_eq!(next.fps, 0.0);
    }
}

use crate::params::{ChartParams, SeriesInfo};
use chartfold_core::limits::POINT_COVERAGE_BUDGET;

/// Invocations per workgroup of the stamp kernel.
pub const STAMP_WORKGROUP_SIZE: u32 = 256;

/// One disk written by the stamp kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub pixel: [u32; 2],
    /// Disk radius in whole pixels; 0 writes the centre pixel only.
    pub radius: u32,
}

/// Destination pixel of a sample, or `None` when it lies outside the view
/// window (NaN never lands).
#[inline]
pub fn stamp_target(params: &ChartParams, x: f32, y: f32) -> Option<[u32; 2]> {
    let width = params.width();
    let height = params.height();
    let span = params.view_span();
    if width == 0 || height == 0 || !(span.x > 0.0 && span.y > 0.0) {
        return None;
    }

    let sx = (x - params.view_min[0]) / span.x;
    let sy = (y - params.view_min[1]) / span.y;
    if !((0.0..=1.0).contains(&sx) && (0.0..=1.0).contains(&sy)) {
        return None;
    }

    let px = ((sx * width as f32).floor() as u32).min(width - 1);
    let py = (((1.0 - sy) * height as f32).floor() as u32).min(height - 1);
    Some([px, py])
}

/// Stamps produced by one series, in sample order.
///
/// A sample landing on the same pixel as the sample before it is skipped;
/// it would only rewrite the same colour.
pub fn stamp_points(params: &ChartParams, info: &SeriesInfo, xs: &[f32], ys: &[f32]) -> Vec<Stamp> {
    let start = info.visible_start as usize;
    let end = (info.visible_end() as usize).min(xs.len()).min(ys.len());
    let radius = info.radius.max(0.0).floor() as u32;

    let mut stamps = Vec::new();
    for i in start..end {
        let Some(pixel) = stamp_target(params, xs[i], ys[i]) else {
            continue;
        };
        if i > start && stamp_target(params, xs[i - 1], ys[i - 1]) == Some(pixel) {
            continue;
        }
        stamps.push(Stamp { pixel, radius });
    }
    stamps
}

/// Pixels covered by a stamp, clipped to the target.
pub fn disk_pixels(stamp: &Stamp, width: u32, height: u32) -> Vec<[u32; 2]> {
    let r = stamp.radius as i64;
    let [cx, cy] = [stamp.pixel[0] as i64, stamp.pixel[1] as i64];

    let mut pixels = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                pixels.push([x as u32, y as u32]);
            }
        }
    }
    pixels
}

/// Rendered radius for a series so its stamped coverage stays in budget.
///
/// Coverage is estimated as `sample_count * radius^2 * pi`; once it exceeds
/// `POINT_COVERAGE_BUDGET` pixels per chart pixel the radius shrinks until
/// the estimate fits. The sample count is never reduced.
pub fn throttled_radius(radius: f32, sample_count: u64, width: u32, height: u32) -> f32 {
    if sample_count == 0 || radius <= 0.0 {
        return radius;
    }

    let budget = POINT_COVERAGE_BUDGET * width as f64 * height as f64;
    let coverage = |r: f32| (r as f64).powi(2) * std::f64::consts::PI * sample_count as f64;
    if coverage(radius) <= budget {
        return radius;
    }

    let shrunk = (budget / (std::f64::consts::PI * sample_count as f64)).sqrt() as f32;
    if coverage(shrunk) > budget {
        shrunk.next_down()
    } else {
        shrunk
    }
}

//! Numeric limits shared by the controller-facing protocol and the engine.
//!
//! These are the only definitions of these bounds; every clamp in the
//! workspace refers back to this module.

/// Smallest accepted zoom factor on either axis.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest accepted zoom factor on either axis.
pub const MAX_ZOOM: f64 = 1_000_000.0;

/// Smallest point radius accepted by `set-point-size`.
pub const MIN_POINT_SIZE: f32 = 1.0;

/// Largest point radius accepted by `set-point-size`.
pub const MAX_POINT_SIZE: f32 = 8.0;

/// Pixels of stamped coverage allowed per chart pixel before the point
/// radius is throttled.
pub const POINT_COVERAGE_BUDGET: f64 = 4.0;

/// Padding applied beyond the X data extent when bounds are derived.
pub const BOUNDS_PAD_X: f64 = 0.05;

/// Padding applied beyond the Y data extent when bounds are derived.
pub const BOUNDS_PAD_Y: f64 = 0.10;

/// Fraction of a bar's width left empty as the gap between bars.
pub const BAR_GAP_FRACTION: f32 = 0.05;

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
///
/// Non-finite input collapses to `1.0`.
#[inline]
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

/// Clamp a requested point radius into `[MIN_POINT_SIZE, MAX_POINT_SIZE]`.
#[inline]
pub fn clamp_point_size(size: f32) -> f32 {
    if size.is_finite() {
        size.clamp(MIN_POINT_SIZE, MAX_POINT_SIZE)
    } else {
        MIN_POINT_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_zoom() {
        assert_eq!(clamp_zoom(0.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(5.0), 5.0);
        assert_eq!(clamp_zoom(1e12), MAX_ZOOM);
        assert_eq!(clamp_zoom(f64::NAN), 1.0);
    }

    #[test]
    fn test_clamp_point_size() {
        assert_eq!(clamp_point_size(0.2), 1.0);
        assert_eq!(clamp_point_size(3.5), 3.5);
        assert_eq!(clamp_point_size(40.0), 8.0);
    }
}

//! Properties of the host kernel mirrors.

use chartfold_render::kernels::{
    aggregate_columns, lower_bound, stamp_points, throttled_radius, DispatchGrid,
    STAMP_WORKGROUP_SIZE,
};
use chartfold_render::{ChartKind, ChartParams, DataBounds, ParamsSource, SeriesInfo, ViewWindow};

struct Series {
    bounds: DataBounds,
    xs: Vec<f32>,
    ys: Vec<f32>,
}

impl Series {
    fn new(xs: &[f64], ys: &[f64]) -> Self {
        let bounds = DataBounds::from_samples([(xs, ys)]).expect("finite samples");
        Self {
            xs: xs.iter().map(|&x| bounds.rebase_x(x)).collect(),
            ys: ys.iter().map(|&y| bounds.rebase_y(y)).collect(),
            bounds,
        }
    }

    fn params(&self, kind: ChartKind, width: u32, height: u32, max_samples: u32) -> ChartParams {
        ChartParams::pack(&ParamsSource {
            kind,
            width,
            height,
            bounds: self.bounds,
            view: ViewWindow::from_transform(&self.bounds, [0.0, 0.0], [1.0, 1.0]),
            point_radius: 1.0,
            is_dark: false,
            background: [1.0; 4],
            max_samples,
            series_count: 1,
        })
    }

    fn info(&self, radius: f32) -> SeriesInfo {
        SeriesInfo::new([0.2, 0.4, 0.8], 0..self.xs.len() as u32, radius, 1, 0)
    }
}

/// Deterministic noise in [-1, 1).
fn noise(len: usize, mut seed: u64) -> Vec<f64> {
    (0..len)
        .map(|_| {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((seed >> 33) as f64 / (1u64 << 31) as f64) * 2.0 - 1.0
        })
        .collect()
}

#[test]
fn test_valid_columns_are_ordered() {
    let xs: Vec<f64> = (0..20_000).map(|i| i as f64 * 0.37).collect();
    let ys = noise(xs.len(), 7);
    let series = Series::new(&xs, &ys);

    for max_samples in [0, 1, 3, 16] {
        let params = series.params(ChartKind::Line, 333, 200, max_samples);
        let columns = aggregate_columns(&params, &series.info(1.0), &series.xs, &series.ys);
        assert_eq!(columns.len(), 333);
        for column in columns.iter().filter(|c| c.is_valid()) {
            assert!(column.min_y <= column.max_y, "{:?}", column);
            if max_samples > 0 {
                assert!(column.sample_count <= max_samples.max(2), "{:?}", column);
            }
        }
    }
}

#[test]
fn test_lower_bound_is_monotonic() {
    let xs: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.5).floor()).collect();

    let mut previous = 0;
    for step in -10..1200 {
        let index = lower_bound(&xs, 0, xs.len(), step as f32 * 0.45);
        assert!(index >= previous);
        previous = index;
    }
    assert_eq!(previous, xs.len());
}

#[test]
fn test_decimation_preserves_global_extrema() {
    let xs: Vec<f64> = (0..50_000).map(|i| i as f64).collect();
    let ys: Vec<f64> = noise(xs.len(), 42)
        .iter()
        .enumerate()
        .map(|(i, n)| (i as f64 * 0.001).sin() * 10.0 + n)
        .collect();
    let series = Series::new(&xs, &ys);

    let params = series.params(ChartKind::Line, 640, 480, 0);
    let columns = aggregate_columns(&params, &series.info(1.0), &series.xs, &series.ys);
    let valid = columns.iter().filter(|c| c.is_valid());

    let (min, max) = valid.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.min_y), hi.max(c.max_y))
    });
    let true_min = series.ys.iter().copied().fold(f32::INFINITY, f32::min);
    let true_max = series.ys.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    assert_eq!(min, true_min);
    assert_eq!(max, true_max);
}

#[test]
fn test_sine_scenario_matches_brute_force() {
    let xs: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| (x * 0.05).sin()).collect();
    let series = Series::new(&xs, &ys);
    let width = 500;

    let params = series.params(ChartKind::Line, width, 300, 0);
    let columns = aggregate_columns(&params, &series.info(1.0), &series.xs, &series.ys);

    let valid = columns.iter().filter(|c| c.is_valid()).count();
    assert!(valid <= width as usize);

    let view_min = params.view_min[0];
    let px = (params.view_max[0] - view_min) / width as f32;
    let mut covered = 0;
    for (c, column) in columns.iter().enumerate() {
        let pixel_min = view_min + c as f32 * px;
        let pixel_max = view_min + (c + 1) as f32 * px;
        let inside: Vec<f32> = series
            .xs
            .iter()
            .zip(&series.ys)
            .filter(|(x, _)| **x >= pixel_min && **x < pixel_max)
            .map(|(_, y)| *y)
            .collect();

        if inside.is_empty() {
            // Padding columns fall back to the nearest single sample.
            assert_eq!(column.sample_count, 1);
            assert_eq!(column.min_y, column.max_y);
            continue;
        }

        assert!(column.is_valid());
        assert!((1..=3).contains(&column.sample_count), "{:?}", column);
        let min = inside.iter().copied().fold(f32::INFINITY, f32::min);
        let max = inside.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!((column.min_y, column.max_y), (min, max));
        covered += inside.len();
    }
    assert_eq!(covered, 1000);
}

#[test]
fn test_same_pixel_samples_stamp_once() {
    let xs = [10.0, 10.001, 10.002, 10.003, 10.004, 90.0];
    let ys = [5.0, 5.001, 5.002, 5.001, 5.0, 50.0];
    let series = Series::new(&xs, &ys);
    let params = series.params(ChartKind::Points, 100, 100, 0);

    let stamps = stamp_points(&params, &series.info(1.0), &series.xs, &series.ys);

    assert_eq!(stamps.len(), 2);
    assert_ne!(stamps[0].pixel, stamps[1].pixel);
}

#[test]
fn test_radius_throttle_scenario() {
    let samples = 2_000_000u64;
    let (width, height) = (800u32, 400u32);

    let radius = throttled_radius(4.0, samples, width, height);
    let coverage = (radius as f64).powi(2) * std::f64::consts::PI * samples as f64;

    assert!(radius < 4.0);
    assert!(radius > 0.0);
    assert!(coverage <= 4.0 * width as f64 * height as f64);
}

#[test]
fn test_dispatch_covers_large_series() {
    let samples = 20_000_000u32;
    let grid = DispatchGrid::for_items(samples, STAMP_WORKGROUP_SIZE, 65_535);

    assert!(grid.x <= 65_535 && grid.y <= 65_535);
    assert!(grid.invocations(STAMP_WORKGROUP_SIZE) >= samples as u64);
}

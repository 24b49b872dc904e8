use super::search::lower_bound;
use crate::params::{bar_geometry, ChartKind, ChartParams, ColumnRecord, SeriesInfo};

/// Invocations per workgroup of the aggregation kernel.
pub const AGGREGATE_WORKGROUP_SIZE: u32 = 64;

/// Normalized spacing given to a lone sample with no neighbour in range.
const LONE_SAMPLE_SPACING: f32 = 0.1;

/// Aggregate one pixel column of one series.
///
/// `xs` must be ascending over the series' visible range. Columns holding
/// samples reduce to their min/max (NaN skipped, capped by
/// `params.max_samples` with the first and last sample always examined);
/// empty columns fall back to the nearest sample so sparse data stays
/// visible.
pub fn aggregate_column(
    params: &ChartParams,
    info: &SeriesInfo,
    xs: &[f32],
    ys: &[f32],
    column: u32,
) -> ColumnRecord {
    let width = params.width();
    let end = (info.visible_end() as usize).min(xs.len()).min(ys.len());
    let start = info.visible_start as usize;
    if width == 0 || column >= width || start >= end {
        return ColumnRecord::INVALID;
    }

    let view_min = params.view_min[0];
    let span = params.view_max[0] - view_min;
    let px = span / width as f32;
    let pixel_min = view_min + column as f32 * px;
    let pixel_max = view_min + (column + 1) as f32 * px;

    let lo = lower_bound(xs, start, end, pixel_min);
    let hi = lower_bound(xs, lo, end, pixel_max);

    if lo == hi {
        let center = pixel_min + px * 0.5;
        let pick = match (lo > start, lo < end) {
            (true, true) if center - xs[lo - 1] < xs[lo] - center => lo - 1,
            (_, true) => lo,
            (true, false) => lo - 1,
            (false, false) => return ColumnRecord::INVALID,
        };
        let y = ys[pick];
        if y.is_nan() {
            return ColumnRecord::INVALID;
        }
        let x = (xs[pick] - view_min) / span;
        let spacing = neighbour_spacing(xs, start, end, pick)
            .map(|gap| gap / span)
            .unwrap_or(LONE_SAMPLE_SPACING);
        return finish(params, info, x, spacing, y, y, 1);
    }

    let stride = sample_stride((hi - lo) as u32, params.max_samples) as usize;

    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut examined = 0u32;
    let mut accumulate = |y: f32| {
        if !y.is_nan() {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
            examined += 1;
        }
    };

    let mut i = lo;
    while i < hi {
        accumulate(ys[i]);
        i += stride;
    }
    // Strided walks can step over the final sample.
    if (hi - 1 - lo) % stride != 0 {
        accumulate(ys[hi - 1]);
    }

    if examined == 0 {
        return ColumnRecord::INVALID;
    }

    let x = (column as f32 + 0.5) / width as f32;
    let spacing = 1.0 / width as f32;
    finish(params, info, x, spacing, min_y, max_y, examined)
}

/// Step between examined samples of a column holding `count` samples.
///
/// With a cap the walk from the first sample plus the forced last sample
/// examines at most `max(max_samples, 2)` samples. `0` means uncapped.
pub fn sample_stride(count: u32, max_samples: u32) -> u32 {
    if max_samples == 0 || count <= max_samples {
        return 1;
    }
    let cap = max_samples.max(2);
    (count - 1).div_ceil(cap - 1).max(1)
}

/// Aggregate every column of the chart for one series.
pub fn aggregate_columns(
    params: &ChartParams,
    info: &SeriesInfo,
    xs: &[f32],
    ys: &[f32],
) -> Vec<ColumnRecord> {
    (0..params.width())
        .map(|column| aggregate_column(params, info, xs, ys, column))
        .collect()
}

fn neighbour_spacing(xs: &[f32], start: usize, end: usize, pick: usize) -> Option<f32> {
    let before = (pick > start).then(|| xs[pick] - xs[pick - 1]);
    let after = (pick + 1 < end).then(|| xs[pick + 1] - xs[pick]);
    [before, after]
        .into_iter()
        .flatten()
        .filter(|gap| *gap > 0.0)
        .reduce(f32::min)
}

fn finish(
    params: &ChartParams,
    info: &SeriesInfo,
    x: f32,
    spacing: f32,
    min_y: f32,
    max_y: f32,
    sample_count: u32,
) -> ColumnRecord {
    if params.chart_type == ChartKind::Box.as_u32() {
        let (center, half_width) = bar_geometry(x, spacing, info.slot, params.series_count);
        let baseline = params.baseline_y;
        ColumnRecord::new(
            center,
            half_width,
            min_y.min(baseline),
            max_y.max(baseline),
            sample_count,
        )
    } else {
        ColumnRecord::new(x, spacing * 0.5, min_y, max_y, sample_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{DataBounds, ParamsSource, ViewWindow};

    fn params(kind: ChartKind, width: u32, view: (f64, f64), max_samples: u32) -> ChartParams {
        let bounds = DataBounds::new(view.0, view.1, -10.0, 10.0);
        ChartParams::pack(&ParamsSource {
            kind,
            width,
            height: 100,
            bounds,
            view: ViewWindow::from_transform(&bounds, [0.0, 0.0], [1.0, 1.0]),
            point_radius: 1.0,
            is_dark: false,
            background: [1.0; 4],
            max_samples,
            series_count: 1,
        })
    }

    fn info(len: usize) -> SeriesInfo {
        SeriesInfo::new([1.0, 1.0, 1.0], 0..len as u32, 1.0, 0, 0)
    }

    #[test]
    fn test_column_reduces_to_min_max() {
        let params = params(ChartKind::Line, 2, (0.0, 4.0), 0);
        let xs = [0.0, 0.5, 1.0, 1.5];
        let ys = [3.0, -2.0, 7.0, 1.0];

        let left = aggregate_column(&params, &info(4), &xs, &ys, 0);
        let right = aggregate_column(&params, &info(4), &xs, &ys, 1);

        assert_eq!((left.min_y, left.max_y, left.sample_count), (-2.0, 7.0, 4));
        assert_eq!(left.x, 0.25);
        assert!(right.is_valid());
        assert_eq!(right.sample_count, 1);
    }

    #[test]
    fn test_nan_samples_are_skipped() {
        let params = params(ChartKind::Line, 1, (0.0, 4.0), 0);
        let xs = [0.0, 1.0, 2.0];
        let ys = [f32::NAN, 4.0, f32::NAN];

        let record = aggregate_column(&params, &info(3), &xs, &ys, 0);
        assert_eq!((record.min_y, record.max_y, record.sample_count), (4.0, 4.0, 1));

        let all_nan = [f32::NAN; 3];
        assert!(!aggregate_column(&params, &info(3), &xs, &all_nan, 0).is_valid());
    }

    #[test]
    fn test_empty_column_picks_nearest_sample() {
        // Ten columns of width 1 over samples at 0.2 and 8.9.
        let params = params(ChartKind::Line, 10, (0.0, 10.0), 0);
        let xs = [0.2, 8.9];
        let ys = [1.0, 2.0];

        let near_left = aggregate_column(&params, &info(2), &xs, &ys, 3);
        let near_right = aggregate_column(&params, &info(2), &xs, &ys, 6);

        assert_eq!(near_left.min_y, 1.0);
        assert!((near_left.x - 0.02).abs() < 1e-6);
        assert_eq!(near_right.min_y, 2.0);
        assert_eq!(near_right.sample_count, 1);
    }

    #[test]
    fn test_cap_keeps_first_and_last_sample() {
        let params = params(ChartKind::Line, 1, (0.0, 100.0), 4);
        let xs: Vec<f32> = (0..99).map(|i| i as f32).collect();
        let mut ys = vec![0.0; 99];
        ys[0] = -5.0;
        ys[98] = 9.0;

        let record = aggregate_column(&params, &info(99), &xs, &ys, 0);
        assert_eq!((record.min_y, record.max_y), (-5.0, 9.0));
        assert!(record.sample_count <= 4);
    }

    #[test]
    fn test_cap_holds_below_twice_the_cap() {
        let params = params(ChartKind::Line, 1, (0.0, 100.0), 4);
        let xs: Vec<f32> = (0..7).map(|i| i as f32).collect();
        let ys = [-3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 8.0];

        let record = aggregate_column(&params, &info(7), &xs, &ys, 0);
        assert_eq!((record.min_y, record.max_y), (-3.0, 8.0));
        assert!(record.sample_count <= 4);
    }

    #[test]
    fn test_sample_stride_bounds_examined_samples() {
        assert_eq!(sample_stride(1000, 0), 1);
        assert_eq!(sample_stride(4, 4), 1);
        assert_eq!(sample_stride(9, 1), 8);

        for cap in 1..12u32 {
            for count in cap + 1..200 {
                let stride = sample_stride(count, cap);
                let walked = (count - 1) / stride + 1;
                let forced = u32::from((count - 1) % stride != 0);
                assert!(
                    walked + forced <= cap.max(2),
                    "cap {} count {} examined {}",
                    cap,
                    count,
                    walked + forced
                );
            }
        }
    }

    #[test]
    fn test_box_extends_to_baseline() {
        let mut params = params(ChartKind::Box, 4, (0.0, 4.0), 0);
        params.baseline_y = 10.0;
        let xs = [0.5];
        let ys = [14.0];

        let record = aggregate_column(&params, &info(1), &xs, &ys, 0);
        assert_eq!((record.min_y, record.max_y), (10.0, 14.0));
        assert!(record.half_width > 0.0 && record.half_width < 0.125);
    }

    #[test]
    fn test_out_of_range_column_is_invalid() {
        let params = params(ChartKind::Line, 4, (0.0, 4.0), 0);
        assert!(!aggregate_column(&params, &info(1), &[1.0], &[1.0], 4).is_valid());
        assert!(!aggregate_column(&params, &info(0), &[], &[], 0).is_valid());
    }
}

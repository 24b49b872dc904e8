//! Benchmarks for the host aggregation and stamp mirrors

use chartfold_render::kernels::{aggregate_columns, stamp_points};
use chartfold_render::{ChartKind, ChartParams, DataBounds, ParamsSource, SeriesInfo, ViewWindow};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn series(count: usize) -> (DataBounds, Vec<f32>, Vec<f32>) {
    let xs: Vec<f64> = (0..count).map(|i| i as f64).collect();
    let ys: Vec<f64> = xs.iter().map(|x| (x * 0.001).sin()).collect();
    let bounds = DataBounds::from_samples([(&xs[..], &ys[..])]).unwrap();
    (
        bounds,
        xs.iter().map(|&x| bounds.rebase_x(x)).collect(),
        ys.iter().map(|&y| bounds.rebase_y(y)).collect(),
    )
}

fn params(kind: ChartKind, bounds: DataBounds, max_samples: u32) -> ChartParams {
    ChartParams::pack(&ParamsSource {
        kind,
        width: 1920,
        height: 400,
        bounds,
        view: ViewWindow::from_transform(&bounds, [0.0, 0.0], [1.0, 1.0]),
        point_radius: 1.0,
        is_dark: false,
        background: [1.0; 4],
        max_samples,
        series_count: 1,
    })
}

fn bench_line_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_aggregation");

    for count in [10_000usize, 100_000, 1_000_000] {
        let (bounds, xs, ys) = series(count);
        let info = SeriesInfo::new([1.0; 3], 0..count as u32, 1.0, 0, 0);
        group.throughput(Throughput::Elements(count as u64));

        for max_samples in [0u32, 64] {
            let params = params(ChartKind::Line, bounds, max_samples);
            group.bench_with_input(
                BenchmarkId::new(format!("cap_{}", max_samples), count),
                &count,
                |b, _| b.iter(|| black_box(aggregate_columns(&params, &info, &xs, &ys))),
            );
        }
    }

    group.finish();
}

fn bench_point_stamp(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_stamp");

    for count in [100_000usize, 1_000_000] {
        let (bounds, xs, ys) = series(count);
        let info = SeriesInfo::new([1.0; 3], 0..count as u32, 1.0, 0, 0);
        let params = params(ChartKind::Points, bounds, 0);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(stamp_points(&params, &info, &xs, &ys)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_line_aggregation, bench_point_stamp);
criterion_main!(benches);

//! End-to-end frames on a real device. Run with `cargo test -- --ignored`.

mod common;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use chartfold::{
    ChartId, ChartKind, Command, Engine, EngineConfig, Event, GpuBackendFactory, SurfaceSource,
};
use common::sine;

fn headless_engine() -> (Engine<GpuBackendFactory>, mpsc::Receiver<Event>) {
    chartfold::logging::init_with_filter("warn");
    let (tx, rx) = mpsc::channel();
    let config = EngineConfig::default();
    let factory = GpuBackendFactory::new(config.graphics.clone());
    let mut engine = Engine::new(config, factory, tx);
    engine.handle(Command::Init);
    (engine, rx)
}

#[test]
#[ignore = "requires a GPU"]
fn test_every_chart_kind_renders_headless() {
    let (mut engine, rx) = headless_engine();
    assert_eq!(rx.recv().unwrap(), Event::Ready);

    for (id, kind) in [ChartKind::Points, ChartKind::Line, ChartKind::Box]
        .into_iter()
        .enumerate()
    {
        let id = ChartId(id as u64);
        engine.handle(Command::RegisterChart {
            id,
            surface: SurfaceSource::Headless,
            kind,
            width: 320,
            height: 200,
            point_radius: 3.0,
            max_samples: Some(64),
            background: None,
        });
        engine.handle(Command::UpdateSeries {
            id,
            series: vec![sine("a", 100_000), sine("b", 1_000)],
            bounds: None,
        });
    }

    let start = Instant::now() + Duration::from_millis(20);
    engine.tick(start);
    engine.handle(Command::Resize {
        id: ChartId(1),
        width: 640,
        height: 100,
    });
    engine.tick(start + Duration::from_millis(20));

    let backend = engine.backend().expect("ready");
    backend
        .context()
        .device()
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })
        .unwrap();

    let errors: Vec<_> = rx
        .try_iter()
        .filter(|e| matches!(e, Event::Error { .. }))
        .collect();
    assert!(errors.is_empty(), "{:?}", errors);
    assert!(engine.charts().all(|c| !c.is_dirty()));

    engine.shutdown();
}

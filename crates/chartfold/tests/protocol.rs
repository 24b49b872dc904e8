mod common;

use chartfold::limits::{MAX_POINT_SIZE, MAX_ZOOM, MIN_ZOOM};
use chartfold::{ChartDirty, ChartId, ChartKind, Command, EngineState, Event};
use common::*;

#[test]
fn test_commands_before_init_are_rejected() {
    let (mut engine, rx) = engine_with(MockFactory::default());
    register(&mut engine, 1, ChartKind::Line, 64, 64);

    let errors = errors(&rx);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, None);
    assert!(matches!(engine.state(), EngineState::Uninitialized));
}

#[test]
fn test_init_twice_keeps_the_backend() {
    let (mut engine, rx) = ready_engine();
    register(&mut engine, 1, ChartKind::Line, 64, 64);
    engine.handle(Command::Init);

    assert!(drain(&rx).contains(&Event::Ready));
    assert!(engine.chart(ChartId(1)).is_some());
}

#[test]
fn test_batch_view_transform_is_atomic() {
    let (mut engine, rx) = ready_engine();
    let mut clock = Clock::new();
    for id in 1..=3 {
        register(&mut engine, id, ChartKind::Line, 64, 64);
    }
    engine.handle(Command::ViewTransform {
        id: ChartId(2),
        pan_x: 0.3,
        pan_y: -0.2,
        zoom_x: 4.0,
        zoom_y: 2.0,
    });
    engine.tick(clock.next_frame());
    let before = backend(&engine).submits;

    engine.handle(Command::BatchViewTransform {
        pan_x: 0.125,
        pan_y: -0.25,
        zoom_x: 1e12,
        zoom_y: 0.0,
        ids: vec![ChartId(1), ChartId(2), ChartId(3), ChartId(99)],
    });

    let transforms: Vec<_> = engine.charts().map(|c| c.transform).collect();
    for t in &transforms {
        let bits = |v: [f64; 2]| v.map(f64::to_bits);
        assert_eq!(bits(t.pan()), bits(transforms[0].pan()));
        assert_eq!(bits(t.zoom()), bits(transforms[0].zoom()));
    }
    assert_eq!(transforms[0].zoom(), [MAX_ZOOM, MIN_ZOOM]);
    assert!(engine.charts().all(|c| c.dirty.contains(ChartDirty::VIEW)));
    // Unknown targets are skipped, not reported.
    assert!(errors(&rx).is_empty());

    engine.tick(clock.next_frame());
    let rendered = &backend(&engine).rendered;
    assert_eq!(
        &rendered[rendered.len() - 3..],
        &[ChartId(1), ChartId(2), ChartId(3)]
    );
    assert_eq!(backend(&engine).submits, before + 1);
}

#[test]
fn test_invalid_resize_is_dropped() {
    let (mut engine, rx) = ready_engine();
    register(&mut engine, 1, ChartKind::Line, 64, 48);
    drain(&rx);
    backend(&engine).ctx.clear_calls();

    for (width, height) in [(0, 10), (10, -1), (-5, -5), (i64::MAX, 10)] {
        engine.handle(Command::Resize {
            id: ChartId(1),
            width,
            height,
        });
    }

    assert!(drain(&rx).is_empty());
    assert_eq!(backend(&engine).ctx.call_count(), 0);
    let chart = engine.chart(ChartId(1)).unwrap();
    assert_eq!((chart.width, chart.height), (64, 48));
}

#[test]
fn test_unknown_chart_is_reported() {
    let (mut engine, rx) = ready_engine();
    engine.handle(Command::SetVisibility {
        id: ChartId(7),
        visible: true,
    });
    engine.handle(Command::UnregisterChart { id: ChartId(8) });

    let errors = errors(&rx);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].0, Some(ChartId(7)));
    assert_eq!(errors[1].0, Some(ChartId(8)));
}

#[test]
fn test_duplicate_registration_is_reported() {
    let (mut engine, rx) = ready_engine();
    register(&mut engine, 1, ChartKind::Line, 64, 64);
    let live = backend(&engine).ctx.live_buffers();
    register(&mut engine, 1, ChartKind::Points, 32, 32);

    let errors = errors(&rx);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("already registered"));
    assert_eq!(backend(&engine).ctx.live_buffers(), live);
    assert_eq!(engine.chart(ChartId(1)).unwrap().kind, ChartKind::Line);
}

#[test]
fn test_values_are_clamped_silently() {
    let (mut engine, rx) = ready_engine();
    register(&mut engine, 1, ChartKind::Points, 64, 64);
    drain(&rx);

    engine.handle(Command::SetPointSize {
        id: ChartId(1),
        size: 20.0,
    });
    engine.handle(Command::ViewTransform {
        id: ChartId(1),
        pan_x: f64::INFINITY,
        pan_y: 0.0,
        zoom_x: 0.0001,
        zoom_y: f64::NAN,
    });

    assert!(drain(&rx).is_empty());
    let chart = engine.chart(ChartId(1)).unwrap();
    assert_eq!(chart.point_radius, MAX_POINT_SIZE);
    assert_eq!(chart.transform.pan(), [0.0, 0.0]);
    assert_eq!(chart.transform.zoom(), [MIN_ZOOM, 1.0]);
}

#[test]
fn test_style_and_sample_cap_are_applied() {
    let (mut engine, _rx) = ready_engine();
    let mut clock = Clock::new();
    register(&mut engine, 1, ChartKind::Box, 64, 64);
    engine.tick(clock.next_frame());

    engine.handle(Command::SetMaxSamples {
        id: ChartId(1),
        max_samples: 32,
    });
    engine.handle(Command::SetStyle {
        id: ChartId(1),
        background: Some(chartfold::Rgb::new(0.2, 0.3, 0.4)),
    });

    let chart = engine.chart(ChartId(1)).unwrap();
    assert_eq!(chart.max_samples, 32);
    assert_eq!(chart.background, Some(chartfold::Rgb::new(0.2, 0.3, 0.4)));
    assert!(chart.dirty.contains(ChartDirty::STYLE));
}

#[test]
fn test_failed_init_then_recovery() {
    let (mut engine, rx) = engine_with(MockFactory {
        failures: 1,
        ..Default::default()
    });

    engine.handle(Command::Init);
    let errors = errors(&rx);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, None);
    assert!(matches!(engine.state(), EngineState::Failed(_)));

    // Dropped without further errors while failed.
    register(&mut engine, 1, ChartKind::Line, 64, 64);
    assert!(drain(&rx).is_empty());

    engine.handle(Command::Init);
    assert_eq!(drain(&rx), vec![Event::Ready]);
    register(&mut engine, 1, ChartKind::Line, 64, 64);
    assert_eq!(drain(&rx), vec![Event::ChartRegistered(ChartId(1))]);
}

#[test]
fn test_device_loss_is_fatal_until_reinit() {
    let (mut engine, rx) = ready_engine();
    let mut clock = Clock::new();
    register(&mut engine, 1, ChartKind::Line, 64, 64);
    drain(&rx);

    let _ = backend(&engine).lost.set("test".to_string());
    engine.tick(clock.next_frame());

    let errors = errors(&rx);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("device lost"));
    assert!(engine.backend().is_none());

    engine.tick(clock.next_frame());
    update(&mut engine, 1, vec![sine("a", 10)]);
    assert!(drain(&rx).is_empty());

    engine.handle(Command::Init);
    assert_eq!(drain(&rx), vec![Event::Ready]);
    assert!(engine.chart(ChartId(1)).is_none());
    assert!(backend(&engine).rendered.is_empty());
}

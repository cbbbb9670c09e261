use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use approx::assert_abs_diff_eq;
use clipeval_animation_core::{
    AnimationClip, AnimatorCfg, CallbackEvent, ChannelMapper, ChannelMapping, ClipFormat, ClipId,
    Config, DispatchMode, Engine, EvalError, Inputs, LoopPolicy, NodeId, PropertyInterner,
    RecordingSink, TypedPath, Value, ValueKind,
};
use clipeval_test_fixtures as fixtures;

const SEC: i64 = 1_000_000_000;

fn cube_clip() -> AnimationClip {
    fixtures::clips::load("cube-bounce").expect("cube-bounce clip")
}

fn cube_mapper() -> ChannelMapper {
    fixtures::mappers::load("cube-bounce").expect("cube-bounce mapper")
}

fn path(s: &str) -> TypedPath {
    TypedPath::parse(s).unwrap()
}

fn running_cube(engine: &mut Engine) -> clipeval_animation_core::AnimatorId {
    let clip = engine.load_clip(cube_clip()).unwrap();
    engine.create_animator(AnimatorCfg {
        mapper: cube_mapper(),
        running: true,
        loops: LoopPolicy::Forever,
        ..AnimatorCfg::new(clip)
    })
}

/// it should evaluate the cube fixture into node property updates
#[test]
fn fixture_clip_drives_transform() {
    let mut engine = Engine::new(Config::lenient());
    let a = running_cube(&mut engine);
    let mut sink = RecordingSink::new();

    let report = engine.update(SEC, Inputs::default(), &mut sink);
    assert!(report.is_clean());
    assert_eq!(report.evaluated, vec![a]);

    let rec = sink.last().unwrap();
    // Scale is not in the clip: no update for it.
    assert_eq!(rec.updates.len(), 2);
    assert!(rec.update_for(NodeId(1), "Cube/Transform.scale").is_none());

    let translation = rec
        .update_for(NodeId(1), "Cube/Transform.translation")
        .unwrap();
    match translation.value {
        Value::Vec3([x, y, z]) => {
            assert_abs_diff_eq!(x, 2.0, epsilon = 1e-5);
            assert_abs_diff_eq!(y, 2.0, epsilon = 1e-3);
            assert_abs_diff_eq!(z, -1.0, epsilon = 1e-6);
        }
        ref other => panic!("expected vec3, got {other:?}"),
    }

    let rotation = rec.update_for(NodeId(1), "Cube/Transform.rotation").unwrap();
    let half = std::f32::consts::FRAC_1_SQRT_2;
    match rotation.value {
        Value::Quat(q) => {
            assert_abs_diff_eq!(q[0], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(q[1], half, epsilon = 1e-5);
            assert_abs_diff_eq!(q[2], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(q[3], half, epsilon = 1e-5);
        }
        ref other => panic!("expected quat, got {other:?}"),
    }
}

/// it should keep evaluating healthy animators when another one fails
#[test]
fn broken_animator_does_not_affect_others() {
    let mut engine = Engine::new(Config::lenient());
    let good = running_cube(&mut engine);
    let missing = engine.create_animator(AnimatorCfg {
        running: true,
        ..AnimatorCfg::new(ClipId(99))
    });
    let mut sink = RecordingSink::new();

    let report = engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(report.evaluated, vec![good]);
    assert_eq!(
        report.errors,
        vec![(missing, EvalError::ClipNotFound(ClipId(99)))]
    );
    // Precondition failures leave the animator untouched so it retries next frame.
    let m = engine.animator(missing).unwrap();
    assert!(m.is_running());
    assert_eq!(m.last_global_time_ns(), 0);
    assert_eq!(sink.records.len(), 1);
}

/// it should stop an animator whose layout reads past the clip's channels
#[test]
fn out_of_range_mapping_stops_only_that_animator() {
    let mut engine = Engine::new(Config::lenient());
    let good = running_cube(&mut engine);
    let bad = running_cube(&mut engine);
    engine
        .animator_mut(bad)
        .unwrap()
        .set_layout(ClipFormat::from_indices([0, 1, 12]), Vec::new());
    let mut sink = RecordingSink::new();

    let report = engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(report.evaluated, vec![good]);
    assert!(matches!(
        report.errors.as_slice(),
        [(id, EvalError::InvalidChannelMapping { slot: 2, source_index: 12, channel_count: 7 })]
            if *id == bad
    ));
    let b = engine.animator(bad).unwrap();
    assert!(!b.is_running());
    assert_eq!(b.last_local_time_ns(), 0);
}

/// it should keep a mis-mapped animator running when configured not to stop it
#[test]
fn out_of_range_mapping_can_be_tolerated() {
    let cfg = Config {
        stop_on_invalid_mapping: false,
        ..Config::lenient()
    };
    let mut engine = Engine::new(cfg);
    let bad = running_cube(&mut engine);
    engine
        .animator_mut(bad)
        .unwrap()
        .set_layout(ClipFormat::from_indices([40]), Vec::new());
    let mut sink = RecordingSink::new();
    let report = engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(report.errors.len(), 1);
    assert!(engine.animator(bad).unwrap().is_running());
    assert!(sink.records.is_empty());
}

/// it should pick up a new channel mapper on the next frame
#[test]
fn remapping_changes_record_layout() {
    let mut engine = Engine::new(Config::lenient());
    let a = running_cube(&mut engine);
    let mut sink = RecordingSink::new();
    engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert!(sink
        .last()
        .unwrap()
        .update_for(NodeId(1), "Cube/Transform.translation")
        .is_some());

    let remapped = ChannelMapper::from_mappings([ChannelMapping::new(
        "Location",
        NodeId(8),
        path("Lamp/Transform.translation"),
        ValueKind::Vec3,
    )]);
    engine.set_mapper(a, remapped).unwrap();
    engine.update(SEC, Inputs::default(), &mut sink);

    let rec = sink.last().unwrap();
    assert_eq!(rec.updates.len(), 1);
    assert_eq!(rec.updates[0].target, NodeId(8));
    assert_eq!(engine.animator(a).unwrap().clip_format().slot_count(), 3);
}

/// it should run immediate callbacks during update and hand back deferred ones
#[test]
fn callbacks_follow_dispatch_mode() {
    let mut engine = Engine::new(Config::lenient());
    let clip = engine.load_clip(cube_clip()).unwrap();

    let immediate_hits = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&immediate_hits);
    let immediate = engine.register_value_callback(DispatchMode::Immediate, move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let deferred = engine.register_value_callback(DispatchMode::Deferred, move |ev| {
        if let CallbackEvent::ValueChanged { value, .. } = ev {
            sink_seen.lock().unwrap().push(value.clone());
        }
    });

    let mapper = ChannelMapper::from_mappings([
        ChannelMapping::new(
            "Location",
            NodeId(1),
            path("Cube/Transform.translation"),
            ValueKind::Vec3,
        )
        .with_callback(immediate),
        ChannelMapping::new("Rotation", NodeId(1), path("Cube/Transform.rotation"), ValueKind::Quat)
            .with_callback(deferred),
    ]);
    engine.create_animator(AnimatorCfg {
        mapper,
        running: true,
        ..AnimatorCfg::new(clip)
    });

    let mut sink = RecordingSink::new();
    let report = engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(immediate_hits.load(Ordering::SeqCst), 1);
    assert_eq!(report.deferred_callbacks.len(), 1);
    assert!(seen.lock().unwrap().is_empty());

    for cb in &report.deferred_callbacks {
        cb.invoke();
    }
    let values = seen.lock().unwrap();
    assert_eq!(values.len(), 1);
    assert!(matches!(values[0], Value::Quat(_)));
}

/// it should return immediate callbacks to the host when dispatch is disabled
#[test]
fn immediate_dispatch_can_be_disabled() {
    let cfg = Config {
        dispatch_immediate_callbacks: false,
        ..Config::lenient()
    };
    let mut engine = Engine::new(cfg);
    let clip = engine.load_clip(cube_clip()).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let cb = engine.register_value_callback(DispatchMode::Immediate, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    engine.create_animator(AnimatorCfg {
        mapper: ChannelMapper::from_mappings([ChannelMapping::new(
            "Location",
            NodeId(1),
            path("Cube/Transform.translation"),
            ValueKind::Vec3,
        )
        .with_callback(cb)]),
        running: true,
        ..AnimatorCfg::new(clip)
    });
    let mut sink = RecordingSink::new();
    let report = engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(report.deferred_callbacks.len(), 1);
}

/// it should rebuild layouts when a clip's content is replaced
#[test]
fn replacing_a_clip_rebuilds_layout() {
    let mut engine = Engine::new(Config::lenient());
    let a = running_cube(&mut engine);
    let clip = engine.animator(a).unwrap().clip_id;
    let mut sink = RecordingSink::new();
    engine.update(SEC / 2, Inputs::default(), &mut sink);
    assert_eq!(sink.last().unwrap().updates.len(), 2);

    let fade: AnimationClip = fixtures::clips::load("fade-steps").unwrap();
    engine.replace_clip(clip, fade).unwrap();
    engine.update(SEC, Inputs::default(), &mut sink);
    // The fade clip has none of the mapped channels.
    assert!(sink.last().unwrap().updates.is_empty());
}

/// it should share interned property ids between engines using one interner
#[test]
fn shared_interner_gives_stable_property_ids() {
    let interner = Arc::new(PropertyInterner::new());
    let mut first = Engine::with_interner(Config::lenient(), Arc::clone(&interner));
    let mut second = Engine::with_interner(Config::lenient(), Arc::clone(&interner));
    running_cube(&mut first);
    running_cube(&mut second);
    let (mut s1, mut s2) = (RecordingSink::new(), RecordingSink::new());
    first.update(SEC, Inputs::default(), &mut s1);
    second.update(SEC, Inputs::default(), &mut s2);

    let id1 = s1.last().unwrap().updates[0].property_id;
    let id2 = s2.last().unwrap().updates[0].property_id;
    assert_eq!(id1, id2);
    assert_eq!(
        interner.resolve(id1).as_deref(),
        Some("Cube/Transform.translation")
    );
}

/// it should load engine configs from the shared fixtures
#[test]
fn configs_load_from_fixtures() {
    let lenient = Config::from_json(&fixtures::configs::json("lenient").unwrap()).unwrap();
    assert!(!lenient.assert_preconditions);
    assert_eq!(lenient.scratch_channels, 16);

    let strict: Config = fixtures::configs::load("strict").unwrap();
    assert!(strict.assert_preconditions);
    assert!(strict.stop_on_invalid_mapping);
    assert_eq!(strict.scratch_channels, Config::default().scratch_channels);
}

/// it should abort loudly on a missing clip when preconditions are asserted
#[test]
#[should_panic(expected = "not found")]
fn strict_engine_panics_on_missing_clip() {
    let strict: Config = fixtures::configs::load("strict").unwrap();
    let mut engine = Engine::new(strict);
    engine.create_animator(AnimatorCfg {
        running: true,
        ..AnimatorCfg::new(ClipId(7))
    });
    let mut sink = RecordingSink::new();
    engine.update(SEC, Inputs::default(), &mut sink);
}

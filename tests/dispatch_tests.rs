//! Integration tests for the skill-effect dispatcher and the spawn gate
//!
//! These tests verify:
//! - Unregistered skill ids fall back to impact + ring at the center
//! - A failing routine is contained and the fallback runs instead
//! - Registration is runtime-mutable and queryable
//! - The governor's spawn gate honors quality, FPS, and distance

mod common;

use bevy::prelude::*;
use common::*;

use riftbound::world::components::{GameRng, SimClock};
use riftbound::world::effects::entity::FxShape;
use riftbound::world::effects::FxContext;
use riftbound::world::perf::{FxKind, PerfGovernor, VfxQuality};
use riftbound::world::skills::registry::{
    RoutineError, SkillEffectParams, SkillEffectRegistry,
};
use riftbound::world::skills::types::SkillId;

/// One-shot dispatch driver: executes a queued params bundle against the
/// registry resource, standing in for the combat core.
#[derive(Resource, Default)]
struct PendingDispatch(Option<SkillEffectParams>);

fn drive_dispatch(
    mut pending: ResMut<PendingDispatch>,
    registry: Res<SkillEffectRegistry>,
    governor: Res<PerfGovernor>,
    clock: Res<SimClock>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
) {
    if let Some(params) = pending.0.take() {
        let mut fx = FxContext {
            commands: &mut commands,
            governor: &governor,
            rng: &mut rng,
            now: clock.now,
        };
        registry.execute(&mut fx, &params);
    }
}

fn dispatch_app() -> App {
    let mut app = test_app();
    app.init_resource::<PendingDispatch>();
    app.add_systems(Update, drive_dispatch);
    app
}

fn params_at_center(skill: SkillId) -> SkillEffectParams {
    SkillEffectParams {
        skill,
        center: Vec3::new(3.0, 0.0, 3.0),
        from: None,
        to: None,
        radius: 2.0,
        targets: Vec::new(),
        caster: Entity::PLACEHOLDER,
        caster_pos: Vec3::ZERO,
        damage: 10,
    }
}

fn count_shape(app: &mut App, matcher: fn(&FxShape) -> bool) -> usize {
    let mut query = app.world_mut().query::<&FxShape>();
    query.iter(app.world()).filter(|s| matcher(s)).count()
}

/// Unregistered id with only a center: the fallback spawns an impact
/// burst and exactly one ring at the center, and nothing propagates.
#[test]
fn test_unregistered_skill_falls_back_to_impact_and_ring() {
    let mut app = dispatch_app();
    // Replace the built-in registry with an empty one.
    app.insert_resource(SkillEffectRegistry::default());

    app.world_mut().resource_mut::<PendingDispatch>().0 = Some(params_at_center(SkillId::Blink));
    step(&mut app, 0.02);

    assert_eq!(
        count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. })),
        1,
        "fallback spawns exactly one ring at the center"
    );
    assert!(
        count_shape(&mut app, |s| matches!(s, FxShape::Pillar { .. })) >= 1,
        "fallback spawns an impact burst"
    );
}

/// With from/to present, the fallback switches to the beam + impact shape.
#[test]
fn test_fallback_uses_beam_when_endpoints_present() {
    let mut app = dispatch_app();
    app.insert_resource(SkillEffectRegistry::default());

    let mut params = params_at_center(SkillId::RiftBeam);
    params.from = Some(Vec3::ZERO);
    params.to = Some(Vec3::new(6.0, 0.0, 0.0));
    app.world_mut().resource_mut::<PendingDispatch>().0 = Some(params);
    step(&mut app, 0.02);

    assert!(count_shape(&mut app, |s| matches!(s, FxShape::Beam { .. })) >= 1);
    assert_eq!(
        count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. })),
        0,
        "beam fallback does not draw the center ring"
    );
}

fn failing_routine(_fx: &mut FxContext, _params: &SkillEffectParams) -> Result<(), RoutineError> {
    Err(RoutineError("synthetic failure".to_string()))
}

/// A routine failure is caught at the dispatch boundary and replaced by
/// the fallback; nothing escapes to the caller.
#[test]
fn test_failing_routine_is_contained() {
    let mut app = dispatch_app();
    let mut registry = SkillEffectRegistry::default();
    registry.register(SkillId::Starfall, failing_routine);
    app.insert_resource(registry);

    app.world_mut().resource_mut::<PendingDispatch>().0 =
        Some(params_at_center(SkillId::Starfall));
    step(&mut app, 0.02);

    assert_eq!(count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. })), 1);
}

fn noop_routine(_fx: &mut FxContext, _params: &SkillEffectParams) -> Result<(), RoutineError> {
    Ok(())
}

#[test]
fn test_registry_registration_is_runtime_mutable() {
    let mut registry = SkillEffectRegistry::default();
    assert!(!registry.contains(SkillId::Geyser));

    registry.register(SkillId::Geyser, failing_routine);
    assert!(registry.contains(SkillId::Geyser));

    // Overwriting is allowed; the map still reports the id as present.
    registry.register(SkillId::Geyser, noop_routine);
    assert!(registry.contains(SkillId::Geyser));
}

/// End-to-end spawn-gate scenario: low quality at 15 fps refuses even a
/// nearby effect; high quality at 60 fps within cull range allows it.
#[test]
fn test_spawn_gate_quality_and_fps_scenario() {
    let mut governor = PerfGovernor::default();
    governor.quality = VfxQuality::Low;
    for _ in 0..60 {
        governor.push_sample(1000.0 / 15.0);
    }
    let near = Vec3::new(5.0, 0.0, 5.0);
    assert!(!governor.should_spawn_vfx(FxKind::Flash, near));

    let mut governor = PerfGovernor::default();
    governor.quality = VfxQuality::High;
    for _ in 0..60 {
        governor.push_sample(1000.0 / 60.0);
    }
    assert!(governor.should_spawn_vfx(FxKind::Flash, near));
}

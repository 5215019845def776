//! Integration tests for the effect entity pool
//!
//! These tests verify:
//! - Exactly-once disposal on expiry, with no post-disposal updates
//! - Load shedding brings the pool back under the FPS-derived ceiling
//!   within a single update pass without double-disposing anything
//! - Projectile completion fires its payload exactly once
//! - Fade rates scale up when the measured frame rate drops
//! - Staged sequences self-dispose after their last stage fires

mod common;

use bevy::prelude::*;
use common::*;
use smallvec::smallvec;

use riftbound::world::components::SimClock;
use riftbound::world::effects::entity::*;
use riftbound::world::perf::PerfGovernor;

fn spawn_flash(app: &mut App, duration: f32) -> Entity {
    let now = now(app);
    app.world_mut()
        .spawn((
            FxShape::Sphere { radius: 0.3, color: Color::WHITE },
            Transform::default(),
            FxLifetime::new(now, duration),
            FxModifiers(smallvec![FxModifier::Fade { rate: 1.0 / duration }]),
            FxFade::default(),
        ))
        .id()
}

fn count_shape(app: &mut App, matcher: fn(&FxShape) -> bool) -> usize {
    let mut query = app.world_mut().query::<&FxShape>();
    query.iter(app.world()).filter(|s| matcher(s)).count()
}

/// Exactly one disposal event, on the first update where `now` reaches
/// the expiry, and no updates to the entity afterwards.
#[test]
fn test_entity_lifecycle_single_disposal() {
    let mut app = test_app();
    step(&mut app, 0.02); // settle startup

    let baseline = fx_stats(&app).disposed_total;
    let entity = spawn_flash(&mut app, 0.5);
    let expiry = now(&app) + 0.5;

    while now(&app) + 0.02 < expiry {
        step(&mut app, 0.02);
        assert!(
            app.world().get::<FxLifetime>(entity).is_some(),
            "entity alive before expiry"
        );
        assert_eq!(fx_stats(&app).disposed_total, baseline);
    }

    step(&mut app, 0.03);
    assert!(
        app.world().get::<FxLifetime>(entity).is_none(),
        "entity disposed at expiry"
    );
    assert_eq!(fx_stats(&app).disposed_total, baseline + 1);

    // No further disposal events for this entity.
    run_for(&mut app, 0.2);
    assert_eq!(fx_stats(&app).disposed_total, baseline + 1);
}

/// Forcing the live count above the ceiling must bring it back at or
/// below the ceiling within one update, without double-disposing.
#[test]
fn test_load_shedding_restores_ceiling_in_one_pass() {
    let mut app = test_app();
    step(&mut app, 0.02);

    let ceiling = app.world().resource::<PerfGovernor>().fx_ceiling();
    let spawned = ceiling + 30;
    for _ in 0..spawned {
        spawn_flash(&mut app, 60.0);
    }
    assert_eq!(live_fx(&mut app), spawned);

    let baseline = fx_stats(&app).disposed_total;
    step(&mut app, 0.02);

    assert!(
        live_fx(&mut app) <= ceiling,
        "live {} should be at or below ceiling {}",
        live_fx(&mut app),
        ceiling
    );
    // Exactly the overflow was hard-evicted; nothing disposed twice.
    assert_eq!(fx_stats(&app).disposed_total, baseline + 30);
    assert!(fx_stats(&app).shed_total > 0);

    // The soft-shed survivors fade out over the grace window instead of
    // popping, draining the pool further.
    run_for(&mut app, 0.4);
    assert!(live_fx(&mut app) < ceiling);
}

/// The projectile hands its payload back exactly once on arrival: one
/// impact decal, no repeats on later frames.
#[test]
fn test_projectile_completion_fires_once() {
    let mut app = test_app();
    step(&mut app, 0.02);
    let t0 = now(&app);

    let source = app.world_mut().spawn(Transform::default()).id();
    app.world_mut().spawn((
        FxShape::Bolt { radius: 0.2, color: Color::WHITE },
        Transform::default(),
        FxLifetime::new(t0, 10.0),
        FxProjectile {
            from: Vec3::ZERO,
            to: Vec3::new(10.0, 1.0, 0.0),
            travel_time: 0.3,
            elapsed: 0.0,
            wobble_amplitude: 0.0,
            wobble_rate: 0.0,
            trail: false,
            trail_accum: 0.0,
            payload: Some(ImpactPayload {
                source,
                target: None,
                damage: 5,
                splash_radius: None,
                chain_jumps: 0,
                sound: None,
            }),
        },
    ));

    run_for(&mut app, 0.4);
    let rings = count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. }));
    assert_eq!(rings, 1, "arrival spawns exactly one impact decal");

    // The projectile itself is disposed the frame it lands.
    let mut bolts = app.world_mut().query::<&FxProjectile>();
    assert_eq!(bolts.iter(app.world()).count(), 0);

    // Later frames do not re-fire the payload.
    run_for(&mut app, 0.1);
    let rings = count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. }));
    assert_eq!(rings, 1);
}

/// Fade decay accelerates when the measured FPS drops below the tiers.
#[test]
fn test_fade_rate_scales_with_fps() {
    let mut app = test_app();
    step(&mut app, 0.02);

    let entity = spawn_flash(&mut app, 10.0); // rate 0.1/s
    step(&mut app, 0.1);
    let healthy_alpha = app.world().get::<FxFade>(entity).unwrap().alpha;
    let healthy_drop = 1.0 - healthy_alpha;

    // Simulate a struggling device: ~15 fps samples.
    {
        let mut governor = app.world_mut().resource_mut::<PerfGovernor>();
        for _ in 0..60 {
            governor.push_sample(1000.0 / 15.0);
        }
        assert!(governor.fps < 20.0);
    }

    let before = app.world().get::<FxFade>(entity).unwrap().alpha;
    step(&mut app, 0.1);
    let after = app.world().get::<FxFade>(entity).unwrap().alpha;
    let slow_drop = before - after;

    assert!(
        slow_drop > healthy_drop * 2.0,
        "low-fps fade {} should clearly outpace healthy fade {}",
        slow_drop,
        healthy_drop
    );
}

/// Expiry can be shortened but never extended.
#[test]
fn test_expiry_only_shortens() {
    let mut life = FxLifetime::new(10.0, 1.0);
    assert_eq!(life.expires_at, 11.0);
    life.shorten_to(12.0);
    assert_eq!(life.expires_at, 11.0, "later time must not extend");
    life.shorten_to(10.2);
    assert_eq!(life.expires_at, 10.2);
}

/// A staged sequence fires each stage at its delay, then disposes its
/// carrier; the spawned entities still obey the pool contract.
#[test]
fn test_sequence_fires_stages_then_self_disposes() {
    let mut app = test_app();
    step(&mut app, 0.02);
    let t0 = now(&app);

    app.world_mut().spawn(FxSequence {
        started_at: t0,
        stages: smallvec![
            FxStage {
                delay: 0.1,
                spec: FxStageSpec::Flash {
                    center: Vec3::ZERO,
                    radius: 0.5,
                    color: Color::WHITE,
                },
            },
            FxStage {
                delay: 0.3,
                spec: FxStageSpec::RingBlast {
                    center: Vec3::ZERO,
                    radius: 3.0,
                    color: Color::WHITE,
                },
            },
        ],
        next: 0,
    });

    run_for(&mut app, 0.15);
    assert!(count_shape(&mut app, |s| matches!(s, FxShape::Sphere { .. })) >= 1);
    {
        let mut sequences = app.world_mut().query::<&FxSequence>();
        assert_eq!(sequences.iter(app.world()).count(), 1, "carrier waits for stage 2");
    }

    run_for(&mut app, 0.25);
    assert!(count_shape(&mut app, |s| matches!(s, FxShape::Ring { .. })) >= 1);
    let mut sequences = app.world_mut().query::<&FxSequence>();
    assert_eq!(sequences.iter(app.world()).count(), 0, "carrier self-disposed");
}

/// The follow modifier keeps an effect glued to its moving owner.
#[test]
fn test_follow_modifier_tracks_owner() {
    let mut app = test_app();
    step(&mut app, 0.02);
    let t0 = now(&app);

    let owner = app
        .world_mut()
        .spawn(Transform::from_translation(Vec3::new(1.0, 0.0, 1.0)))
        .id();
    let shield = app
        .world_mut()
        .spawn((
            FxShape::Shield { radius: 1.0, color: Color::WHITE },
            Transform::default(),
            FxLifetime::new(t0, 5.0),
            FxModifiers(smallvec![FxModifier::Follow { owner, offset: Vec3::Y }]),
            FxFade::default(),
        ))
        .id();

    step(&mut app, 0.02);
    app.world_mut().get_mut::<Transform>(owner).unwrap().translation = Vec3::new(4.0, 0.0, -2.0);
    step(&mut app, 0.02);

    let shield_pos = app.world().get::<Transform>(shield).unwrap().translation;
    assert!(
        shield_pos.distance(Vec3::new(4.0, 1.0, -2.0)) < 1e-4,
        "shield at {:?} should track the owner",
        shield_pos
    );
}

/// A simulation stall is clamped to the max frame delta instead of
/// producing a catch-up burst that expires everything at once.
#[test]
fn test_clock_clamp_prevents_expiry_burst() {
    let mut app = test_app();
    step(&mut app, 0.02);

    spawn_flash(&mut app, 0.5);
    // A 5-second stall arrives as one raw delta; the clock clamps it.
    {
        let mut clock = app.world_mut().resource_mut::<SimClock>();
        let raw = 5.0;
        clock.advance(raw);
    }
    app.update();

    // Only ~50ms of simulated time passed, so the effect is still alive.
    assert_eq!(live_fx(&mut app), 1);
}

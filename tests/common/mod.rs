//! Shared harness for integration tests: a headless app running the full
//! frame phases, with the simulation clock stepped manually so timing
//! assertions are exact.

// Not every test binary uses every helper.
#![allow(dead_code)]

use bevy::prelude::*;

use riftbound::combat::CombatPlugin;
use riftbound::world::combat_core::SkillLoadout;
use riftbound::world::components::*;
use riftbound::world::effects::FxStats;
use riftbound::world::perf::PerfGovernor;
use riftbound::world::skills::routines::register_builtin;
use riftbound::world::skills::{SkillConfigPlugin, SkillEffectRegistry};
use riftbound::world::systems;
use riftbound::world::{default_village_map, systems::FramePhase};

/// Build a headless app with the combat and effects systems but without
/// the real-time clock driver; tests advance [`SimClock`] themselves.
pub fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin)
        .add_plugins(CombatPlugin)
        .add_plugins(SkillConfigPlugin);

    let mut registry = SkillEffectRegistry::default();
    register_builtin(&mut registry);

    app.insert_resource(registry)
        .insert_resource(SkillLoadout::default())
        .insert_resource(default_village_map())
        .insert_resource(GameRng::from_seed(7))
        .init_resource::<SimClock>()
        .init_resource::<FrameBudget>()
        .init_resource::<AiStride>()
        .init_resource::<MoveOrder>()
        .init_resource::<FxStats>()
        .init_resource::<PerfGovernor>();

    systems::configure_frame_phases(&mut app);
    systems::add_core_systems(&mut app, || true);

    // Budget reset still has to happen every frame even though the clock
    // is manual.
    app.add_systems(Update, reset_budget.in_set(FramePhase::Input));
    app
}

fn reset_budget(mut budget: ResMut<FrameBudget>) {
    budget.begin();
}

/// Advance the simulation by one frame of `dt` seconds.
pub fn step(app: &mut App, dt: f32) {
    {
        let mut clock = app.world_mut().resource_mut::<SimClock>();
        clock.delta = dt;
        clock.now += dt;
    }
    app.update();
}

/// Advance simulated time by `seconds` in small frames.
pub fn run_for(app: &mut App, seconds: f32) {
    let mut remaining = seconds;
    while remaining > 0.0 {
        let dt = remaining.min(0.02);
        step(app, dt);
        remaining -= dt;
    }
}

/// Current simulated time.
pub fn now(app: &App) -> f32 {
    app.world().resource::<SimClock>().now
}

/// Spawn a player at `pos` with the standard test stats.
pub fn spawn_player(app: &mut App, pos: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Player,
            Vitals::new(200, 100.0, 1, 20),
            CooldownLedger::default(),
            AttackSpeed::default(),
            DamageBuff::default(),
            Uplift::default(),
            BasicAttack::default(),
            Transform::from_translation(pos),
        ))
        .id()
}

/// Spawn an enemy at `pos` with 100 hp.
pub fn spawn_enemy(app: &mut App, pos: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            Enemy {
                spawn_point: pos,
                // Passive target dummies: never aggro during tests.
                aggro_radius: 0.0,
                ..Default::default()
            },
            Vitals::new(100, 0.0, 1, 8),
            CooldownLedger::default(),
            Transform::from_translation(pos),
        ))
        .id()
}

pub fn hp_of(app: &mut App, entity: Entity) -> i32 {
    app.world().get::<Vitals>(entity).expect("entity has vitals").hp
}

pub fn mp_of(app: &mut App, entity: Entity) -> f32 {
    app.world().get::<Vitals>(entity).expect("entity has vitals").mp
}

pub fn fx_stats(app: &App) -> FxStats {
    *app.world().resource::<FxStats>()
}

/// Count live effect entities (those carrying an expiry).
pub fn live_fx(app: &mut App) -> usize {
    let mut query = app
        .world_mut()
        .query::<&riftbound::world::effects::entity::FxLifetime>();
    query.iter(app.world()).count()
}

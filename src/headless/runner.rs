//! Headless scenario execution
//!
//! Runs encounter scenarios without any graphical output, suitable for
//! automated testing: the scripted driver stands in for the input
//! collaborator, cycling through the loadout and firing basic attacks at
//! the nearest riftspawn while the normal frame phases advance the world.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use serde::Serialize;
use std::time::Duration;

use crate::combat::events::{AttackCommand, CastCommand, DamageEvent, DamageKind};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::combat::CombatPlugin;
use crate::settings::resolve_loadout;
use crate::world::combat_core::SkillLoadout;
use crate::world::components::*;
use crate::world::effects::FxStats;
use crate::world::perf::PerfGovernor;
use crate::world::skills::routines;
use crate::world::skills::types::AbilityKey;
use crate::world::skills::{SkillConfigPlugin, SkillEffectRegistry};
use crate::world::systems::{self, FramePhase};
use crate::world::{default_village_map, spawn_enemy_pack, targeting, HOME_VILLAGE};

use super::config::HeadlessScenarioConfig;

/// Result of a completed headless scenario
///
/// Provides programmatic access to scenario outcomes for testing and
/// analysis, and is what gets written to the output JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    /// Riftspawn destroyed during the run
    pub enemies_defeated: u32,
    /// Total damage the player dealt
    pub damage_dealt: i64,
    /// Total damage the player took
    pub damage_taken: i64,
    /// Player health remaining at the end
    pub final_player_hp: i32,
    /// Simulated seconds the scenario ran
    pub sim_time: f32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Resource tracking headless scenario state
#[derive(Resource)]
pub struct HeadlessState {
    pub max_duration: f32,
    pub cast_interval: f32,
    cast_accum: f32,
    next_slot: usize,
    pub output_path: Option<String>,
    pub random_seed: Option<u64>,
    pub enemies_defeated: u32,
    pub damage_dealt: i64,
    pub damage_taken: i64,
    pub complete: bool,
    pub result: Option<ScenarioResult>,
}

/// Plugin for headless scenario execution
pub struct HeadlessPlugin {
    pub config: HeadlessScenarioConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;

        let game_rng = match config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => GameRng::from_entropy(),
        };

        let mut registry = SkillEffectRegistry::default();
        routines::register_builtin(&mut registry);

        app.add_plugins(SkillConfigPlugin)
            .insert_resource(HeadlessState {
                max_duration: config.duration_secs,
                cast_interval: config.cast_interval,
                cast_accum: 0.0,
                next_slot: 0,
                output_path: config.output_path.clone(),
                random_seed: config.random_seed,
                enemies_defeated: 0,
                damage_dealt: 0,
                damage_taken: 0,
                complete: false,
                result: None,
            })
            .insert_resource(game_rng)
            .insert_resource(registry)
            .insert_resource(SkillLoadout(resolve_loadout(&config.loadout)))
            .insert_resource(default_village_map())
            .insert_resource(scenario_enemy_count(config.enemy_count))
            .init_resource::<SimClock>()
            .init_resource::<FrameBudget>()
            .init_resource::<AiStride>()
            .init_resource::<MoveOrder>()
            .init_resource::<FxStats>()
            .init_resource::<PerfGovernor>();

        systems::configure_frame_phases(app);
        systems::add_frame_clock(app);
        systems::add_core_systems(app, || true);

        app.add_systems(Startup, headless_setup)
            .add_systems(Update, headless_drive.in_set(FramePhase::Input))
            .add_systems(
                Update,
                (headless_track, headless_check_end)
                    .chain()
                    .in_set(FramePhase::PerfEval),
            )
            .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Enemy count carried into the startup system.
#[derive(Resource)]
struct ScenarioEnemyCount(usize);

fn scenario_enemy_count(count: usize) -> ScenarioEnemyCount {
    ScenarioEnemyCount(count)
}

/// Spawn the scenario world: the player by the home village and the
/// requested riftspawn pack.
fn headless_setup(
    mut commands: Commands,
    count: Res<ScenarioEnemyCount>,
    villages: Res<crate::world::zones::VillageMap>,
    mut combat_log: ResMut<CombatLog>,
) {
    combat_log.clear();
    combat_log.log(
        CombatLogEventType::WorldEvent,
        "Scenario started (headless mode)".to_string(),
    );

    let home = villages
        .village_center(HOME_VILLAGE)
        .unwrap_or(Vec3::new(-38.0, 0.0, -38.0));

    commands.spawn((
        Player,
        Vitals::new(200, 100.0, 3, 20),
        CooldownLedger::default(),
        AttackSpeed::default(),
        DamageBuff::default(),
        Uplift {
            damage_mul: 1.15,
            splash_radius: Some(3.0),
            chain_jumps: 2,
        },
        BasicAttack::default(),
        Transform::from_translation(home + Vec3::new(10.0, 0.0, 10.0)),
    ));

    spawn_enemy_pack(&mut commands, count.0);
}

/// Scripted driver standing in for the input collaborator: walk toward
/// the nearest riftspawn, keep the basic attack firing, and cycle through
/// the loadout slots at the configured interval.
fn headless_drive(
    clock: Res<SimClock>,
    mut state: ResMut<HeadlessState>,
    mut move_order: ResMut<MoveOrder>,
    mut attacks: EventWriter<AttackCommand>,
    mut casts: EventWriter<CastCommand>,
    player: Query<(Entity, &Transform, &Vitals, &BasicAttack), With<Player>>,
    enemies: Query<(Entity, &Transform, &Vitals), (With<Enemy>, Without<Player>)>,
) {
    let Ok((player_entity, transform, vitals, attack)) = player.get_single() else {
        return;
    };
    if !vitals.is_alive() {
        return;
    }

    let my_pos = transform.translation;
    let alive: Vec<(Entity, Vec3)> = enemies
        .iter()
        .filter(|(_, _, v)| v.is_alive())
        .map(|(e, t, _)| (e, t.translation))
        .collect();

    let Some((nearest, nearest_pos)) =
        targeting::nearest_within(my_pos, f32::MAX, alive.iter().copied())
    else {
        return;
    };

    let distance = my_pos.distance(nearest_pos);
    if distance > attack.range {
        move_order.destination = Some(nearest_pos);
    } else {
        move_order.destination = None;
        attacks.send(AttackCommand {
            attacker: player_entity,
            target: Some(nearest),
        });
    }

    state.cast_accum += clock.delta;
    if state.cast_accum >= state.cast_interval {
        state.cast_accum = 0.0;
        let key = AbilityKey::slots()[state.next_slot % 4];
        state.next_slot = state.next_slot.wrapping_add(1);
        casts.send(CastCommand { key, point: None });
    }
}

/// Tally damage and kills from the frame's combat events.
fn headless_track(
    mut state: ResMut<HeadlessState>,
    mut damage_events: EventReader<DamageEvent>,
) {
    for event in damage_events.read() {
        match event.kind {
            DamageKind::EnemySwing => state.damage_taken += event.amount as i64,
            _ => {
                state.damage_dealt += event.amount as i64;
                if event.killing_blow {
                    state.enemies_defeated += 1;
                }
            }
        }
    }
}

/// Close out the scenario once the simulated duration elapses.
fn headless_check_end(
    clock: Res<SimClock>,
    mut state: ResMut<HeadlessState>,
    combat_log: Res<CombatLog>,
    player: Query<&Vitals, With<Player>>,
) {
    if state.complete || clock.now < state.max_duration {
        return;
    }

    let final_hp = player.get_single().map(|v| v.hp).unwrap_or(0);
    let result = ScenarioResult {
        enemies_defeated: state.enemies_defeated,
        damage_dealt: state.damage_dealt,
        damage_taken: state.damage_taken,
        final_player_hp: final_hp,
        sim_time: clock.now,
        random_seed: state.random_seed,
    };

    println!(
        "Scenario complete: {} riftspawn defeated, {} damage dealt, {} taken over {:.1}s",
        result.enemies_defeated, result.damage_dealt, result.damage_taken, result.sim_time
    );

    if let Some(path) = &state.output_path {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    eprintln!("Failed to write scenario report: {}", e);
                } else {
                    println!("Report saved to: {}", path);
                }
            }
            Err(e) => eprintln!("Failed to serialize scenario report: {}", e),
        }
    }

    info!(
        "Combat log captured {} damage entries",
        combat_log.damage_entry_count()
    );

    state.result = Some(result);
    state.complete = true;
}

/// Exit the app when the scenario is complete
fn headless_exit_on_complete(state: Res<HeadlessState>, mut exit: EventWriter<AppExit>) {
    if state.complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless scenario with the given configuration
pub fn run_headless_scenario(config: HeadlessScenarioConfig) -> Result<(), String> {
    println!("Starting headless scenario...");
    println!("  Riftspawn: {}", config.enemy_count);
    println!("  Duration: {:.0}s", config.duration_secs);
    if let Some(seed) = config.random_seed {
        println!("  Seed: {}", seed);
    }

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 120.0,
            ))),
        )
        // Transform and hierarchy plugins needed for entity positions
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin)
        .add_plugins(CombatPlugin)
        .add_plugins(HeadlessPlugin { config })
        .run();

    Ok(())
}

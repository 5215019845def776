//! Game World
//!
//! The simulation core: actors, zones, targeting, combat resolution, the
//! effect pool, the performance governor, and the frame orchestrator.
//!
//! ## Flow
//! 1. `spawn_world` places the player by the home village and scatters
//!    riftspawn through the wilds
//! 2. Each frame runs the fixed phases configured in `systems`
//!    (input -> combat -> AI -> camera -> HUD -> effects -> perf)
//! 3. The headless runner reuses the same phases and core systems with
//!    its own driver in place of input

pub mod ai;
pub mod combat_core;
pub mod components;
pub mod effects;
pub mod input;
pub mod perf;
pub mod skills;
pub mod systems;
pub mod targeting;
pub mod zones;

use bevy::prelude::*;

use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::settings::GameSettings;
use combat_core::SkillLoadout;
use components::*;
use perf::PerfGovernor;
use skills::routines;
use skills::SkillEffectRegistry;
use systems::FramePhase;
use zones::{Village, VillageMap};

// ============================================================================
// Constants
// ============================================================================

/// Half-extent of the walkable world on X and Z.
pub const WORLD_HALF_SIZE: f32 = 60.0;

/// Player walk speed in units/second.
pub const PLAYER_MOVE_SPEED: f32 = 8.0;

/// Riftspawn pursuit speed in units/second.
pub const ENEMY_MOVE_SPEED: f32 = 4.0;

/// Slack on the basic-attack range check so targets drifting slightly out
/// of range mid-swing still connect.
pub const BASIC_RANGE_MULTIPLIER: f32 = 1.1;

/// Area/dash/blink casts without an explicit point auto-select an enemy
/// within this multiple of the skill's range.
pub const AUTO_TARGET_RANGE_FACTOR: f32 = 1.5;

/// Extra reach added to the uplift splash radius around the primary hit.
pub const SPLASH_BONUS_RADIUS: f32 = 2.5;

/// Splash hits deal this fraction of the primary damage.
pub const SPLASH_DAMAGE_FACTOR: f32 = 0.8;

/// Uplift chains search for the next hop within this radius.
pub const CHAIN_JUMP_RADIUS: f32 = 22.0;

/// Chain hits deal this fraction (per hop, compounding for skills).
pub const CHAIN_DAMAGE_FACTOR: f32 = 0.85;

/// Half-width of the dash damage sweep.
pub const DASH_HIT_WIDTH: f32 = 2.0;

/// Seconds a riftspawn stays down before re-forming.
pub const ENEMY_RESPAWN_DELAY: f32 = 10.0;

/// Player mana regeneration per second.
pub const MANA_REGEN_PER_SEC: f32 = 5.0;

/// Projectiles spawn and aim at chest height.
pub const PROJECTILE_CHEST_HEIGHT: f32 = 1.4;

/// The village the player calls home (respawn point).
pub const HOME_VILLAGE: u8 = 0;

// ============================================================================
// Plugin (graphical mode)
// ============================================================================

/// Plugin wiring the full simulation for the graphical shell. The
/// headless runner assembles the same pieces itself with its own driver.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<GameSettings>()
            .cloned()
            .unwrap_or_default();

        let mut governor = PerfGovernor::default();
        governor.quality = settings.vfx_quality;
        governor.auto_quality = settings.auto_quality;
        governor.target_fps = settings.target_fps;

        let mut registry = SkillEffectRegistry::default();
        routines::register_builtin(&mut registry);

        app.add_plugins(skills::SkillConfigPlugin)
            .insert_resource(governor)
            .insert_resource(registry)
            .insert_resource(SkillLoadout(settings.resolve_loadout()))
            .insert_resource(default_village_map())
            .init_resource::<SimClock>()
            .init_resource::<FrameBudget>()
            .init_resource::<AiStride>()
            .init_resource::<MoveOrder>()
            .init_resource::<effects::FxStats>()
            .init_resource::<GameRng>()
            .add_systems(Startup, spawn_world)
            .add_systems(
                Update,
                (input::keyboard_casts, input::mouse_hit_tests).in_set(FramePhase::Input),
            );

        systems::configure_frame_phases(app);
        systems::add_frame_clock(app);
        systems::add_core_systems(app, || true);
    }
}

/// The fixed village layout: home village in the southwest, a trade
/// village in the northeast, wilds between.
pub fn default_village_map() -> VillageMap {
    VillageMap {
        villages: vec![
            Village { id: 0, center: Vec3::new(-38.0, 0.0, -38.0), radius: 11.0 },
            Village { id: 1, center: Vec3::new(38.0, 0.0, 38.0), radius: 11.0 },
        ],
    }
}

/// Spawn the player and the riftspawn population.
pub fn spawn_world(
    mut commands: Commands,
    villages: Res<VillageMap>,
    mut log: ResMut<CombatLog>,
) {
    log.log(
        CombatLogEventType::WorldEvent,
        "The rift stirs beyond the village walls".to_string(),
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
        Transform::from_translation(home + Vec3::new(8.0, 0.0, 8.0)),
        Visibility::default(),
    ));

    spawn_enemy_pack(&mut commands, 10);
}

/// Scatter a deterministic pack of riftspawn through the wilds, keeping
/// them clear of both villages.
pub fn spawn_enemy_pack(commands: &mut Commands, count: usize) {
    for i in 0..count {
        let angle = i as f32 / count as f32 * std::f32::consts::TAU;
        let ring = 16.0 + (i % 3) as f32 * 9.0;
        let spawn = Vec3::new(angle.cos() * ring, 0.0, angle.sin() * ring);
        commands.spawn((
            Enemy {
                spawn_point: spawn,
                ..Default::default()
            },
            Vitals::new(100, 0.0, 1, 8),
            CooldownLedger::default(),
            Transform::from_translation(spawn),
            Visibility::default(),
        ));
    }
}

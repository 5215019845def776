//! Core Components and Resources
//!
//! ECS components and resources shared across the combat, AI, and effects
//! modules: actor vitals, cooldown ledgers, buffs, the simulation clock,
//! and the per-frame budget tracker.

use bevy::prelude::*;
use bevy::utils::Instant;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::time::Duration;

use crate::world::skills::types::AbilityKey;

// ============================================================================
// Simulation Clock & Frame Budget
// ============================================================================

/// Hard ceiling on the per-frame simulation delta, in seconds.
///
/// A stalled tab or debugger pause produces a huge raw delta on resume;
/// clamping prevents a catch-up burst from exploding the simulation.
pub const MAX_FRAME_DELTA: f32 = 0.05;

/// Monotonic simulation clock, advanced exactly once per frame.
///
/// All combat and effect timing reads absolute times from this clock
/// (cooldown ready-at stamps, effect expiries) rather than accumulating
/// countdown timers, so a clamped frame can never desynchronize ledgers.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SimClock {
    /// Seconds of simulated time since startup.
    pub now: f32,
    /// Clamped delta applied this frame.
    pub delta: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self { now: 0.0, delta: 0.0 }
    }
}

impl SimClock {
    /// Advance the clock by a raw frame delta, clamping to [`MAX_FRAME_DELTA`].
    pub fn advance(&mut self, raw_delta: f32) {
        self.delta = raw_delta.clamp(0.0, MAX_FRAME_DELTA);
        self.now += self.delta;
    }
}

/// Wall-clock budget for the current frame.
///
/// Late-stage optional systems (respawn checks, proximity hints) consult
/// `over_budget()` and skip entirely on frames that have already blown
/// the budget - a binary skip, never partial execution.
#[derive(Resource)]
pub struct FrameBudget {
    frame_start: Instant,
    /// Soft per-frame budget for optional work.
    pub budget: Duration,
}

impl Default for FrameBudget {
    fn default() -> Self {
        Self {
            frame_start: Instant::now(),
            budget: Duration::from_millis(14),
        }
    }
}

impl FrameBudget {
    /// Mark the start of a new frame.
    pub fn begin(&mut self) {
        self.frame_start = Instant::now();
    }

    /// True once the frame has spent its budget.
    pub fn over_budget(&self) -> bool {
        self.frame_start.elapsed() > self.budget
    }
}

/// Frame counter plus stride for throttled AI updates.
///
/// The performance governor widens the stride when the frame rate drops;
/// the AI system early-outs on frames that don't match the stride.
#[derive(Resource, Debug, Clone, Copy)]
pub struct AiStride {
    pub frame: u64,
    pub stride: u32,
}

impl Default for AiStride {
    fn default() -> Self {
        Self { frame: 0, stride: 1 }
    }
}

impl AiStride {
    pub fn should_run(&self) -> bool {
        self.stride <= 1 || self.frame % self.stride as u64 == 0
    }
}

// ============================================================================
// Random Number Generation
// ============================================================================

/// Seeded random number generator for deterministic simulation.
///
/// When a seed is provided (e.g., via headless config), the same seed will
/// always produce the same scenario outcome. Without a seed, uses system
/// entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

// ============================================================================
// Actors
// ============================================================================

/// Marker for the player character.
#[derive(Component)]
pub struct Player;

/// A hostile riftspawn.
#[derive(Component)]
pub struct Enemy {
    /// Where this enemy respawns after death.
    pub spawn_point: Vec3,
    /// Distance at which it notices and pursues the player.
    pub aggro_radius: f32,
    /// Melee swing reach.
    pub attack_range: f32,
    /// Seconds between swings.
    pub swing_cooldown: f32,
}

impl Default for Enemy {
    fn default() -> Self {
        Self {
            spawn_point: Vec3::ZERO,
            aggro_radius: 26.0,
            attack_range: 2.2,
            swing_cooldown: 1.6,
        }
    }
}

/// Health, mana, and progression stats for any combat actor.
#[derive(Component, Debug, Clone)]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
    pub mp: f32,
    pub max_mp: f32,
    pub level: u32,
    pub base_damage: i32,
}

impl Vitals {
    pub fn new(max_hp: i32, max_mp: f32, level: u32, base_damage: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            mp: max_mp,
            max_mp,
            level,
            base_damage,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage, clamping health at zero. Returns the damage actually
    /// taken (the sanctioned mutation point for incoming damage).
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        debug_assert!(amount >= 0, "take_damage: damage cannot be negative, got {}", amount);
        let applied = amount.min(self.hp);
        self.hp -= applied;
        applied
    }
}

/// Marker for an actor that died and is waiting to respawn.
#[derive(Component)]
pub struct Respawning {
    pub at: f32,
}

// ============================================================================
// Cooldowns, Buffs, and Progression
// ============================================================================

/// Per-actor cooldown ledger: ability key -> absolute ready-at timestamp.
///
/// An ability is castable iff `now >= ready_at`; a missing entry means
/// the ability has never been used and is ready.
#[derive(Component, Debug, Default)]
pub struct CooldownLedger {
    ready_at: HashMap<AbilityKey, f32>,
}

impl CooldownLedger {
    pub fn is_ready(&self, key: AbilityKey, now: f32) -> bool {
        self.ready_at.get(&key).map_or(true, |&t| now >= t)
    }

    pub fn is_on_cooldown(&self, key: AbilityKey, now: f32) -> bool {
        !self.is_ready(key, now)
    }

    /// Start a cooldown: `ready_at = now + cooldown`.
    pub fn trigger(&mut self, key: AbilityKey, now: f32, cooldown: f32) {
        self.ready_at.insert(key, now + cooldown.max(0.0));
    }

    /// Seconds until the ability is ready again (0.0 if ready now).
    pub fn remaining(&self, key: AbilityKey, now: f32) -> f32 {
        self.ready_at.get(&key).map_or(0.0, |&t| (t - now).max(0.0))
    }
}

/// Attack-speed multipliers for the basic attack cooldown.
///
/// Effective cooldown is `base / max(0.5, temporary * permanent)` - the
/// floor clamp stops stacked buffs from collapsing the cooldown entirely.
#[derive(Component, Debug, Clone, Copy)]
pub struct AttackSpeed {
    /// Short-lived buff multiplier (potions, shrines).
    pub temporary: f32,
    /// Permanent progression multiplier.
    pub permanent: f32,
}

impl Default for AttackSpeed {
    fn default() -> Self {
        Self { temporary: 1.0, permanent: 1.0 }
    }
}

impl AttackSpeed {
    pub fn effective_cooldown(&self, base: f32) -> f32 {
        base / (self.temporary * self.permanent).max(0.5)
    }
}

/// A single timed damage multiplier. At most one is active per actor;
/// newer applications overwrite. Expired buffs silently read back as 1.0.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DamageBuff {
    pub until: f32,
    pub multiplier: f32,
}

impl DamageBuff {
    pub fn apply(&mut self, now: f32, duration: f32, multiplier: f32) {
        self.until = now + duration.max(0.0);
        self.multiplier = multiplier;
    }

    /// The multiplier currently in force.
    pub fn factor(&self, now: f32) -> f32 {
        if now < self.until {
            self.multiplier
        } else {
            1.0
        }
    }
}

/// Persistent basic-attack progression modifiers.
#[derive(Component, Debug, Clone, Copy)]
pub struct Uplift {
    /// Multiplier applied on top of the buffed basic-attack damage.
    pub damage_mul: f32,
    /// Splash damage radius around the primary target, if unlocked.
    pub splash_radius: Option<f32>,
    /// Number of chain jumps, if unlocked.
    pub chain_jumps: u8,
}

impl Default for Uplift {
    fn default() -> Self {
        Self {
            damage_mul: 1.0,
            splash_radius: None,
            chain_jumps: 0,
        }
    }
}

/// Basic-attack parameters for an actor.
#[derive(Component, Debug, Clone, Copy)]
pub struct BasicAttack {
    pub cooldown: f32,
    pub range: f32,
    pub projectile_speed: f32,
}

impl Default for BasicAttack {
    fn default() -> Self {
        Self {
            cooldown: 1.0,
            range: 10.0,
            projectile_speed: 28.0,
        }
    }
}

/// Pending move order for the player (ground click).
#[derive(Resource, Default)]
pub struct MoveOrder {
    pub destination: Option<Vec3>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::skills::types::AbilityKey;

    #[test]
    fn sim_clock_clamps_stall_deltas() {
        let mut clock = SimClock::default();
        clock.advance(5.0);
        assert_eq!(clock.delta, MAX_FRAME_DELTA);
        assert_eq!(clock.now, MAX_FRAME_DELTA);

        clock.advance(0.016);
        assert!((clock.delta - 0.016).abs() < 1e-6);
    }

    #[test]
    fn cooldown_ledger_ready_at_semantics() {
        let mut ledger = CooldownLedger::default();
        assert!(ledger.is_ready(AbilityKey::Basic, 0.0));

        ledger.trigger(AbilityKey::Basic, 10.0, 1.5);
        assert!(ledger.is_on_cooldown(AbilityKey::Basic, 10.0));
        assert!(ledger.is_on_cooldown(AbilityKey::Basic, 11.49));
        assert!(ledger.is_ready(AbilityKey::Basic, 11.5));
        assert!((ledger.remaining(AbilityKey::Basic, 10.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn attack_speed_floor_clamp() {
        let speed = AttackSpeed { temporary: 0.2, permanent: 1.0 };
        // 0.2 multiplier clamps up to 0.5, so the cooldown at most doubles.
        assert!((speed.effective_cooldown(1.0) - 2.0).abs() < 1e-6);

        let fast = AttackSpeed { temporary: 2.0, permanent: 1.5 };
        assert!((fast.effective_cooldown(3.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn damage_buff_reads_back_to_one_after_expiry() {
        let mut buff = DamageBuff::default();
        assert_eq!(buff.factor(0.0), 1.0);

        buff.apply(5.0, 8.0, 1.5);
        assert_eq!(buff.factor(6.0), 1.5);
        assert_eq!(buff.factor(13.0), 1.0);
    }

    #[test]
    fn take_damage_clamps_at_zero() {
        let mut vitals = Vitals::new(50, 0.0, 1, 10);
        assert_eq!(vitals.take_damage(30), 30);
        assert_eq!(vitals.hp, 20);
        assert_eq!(vitals.take_damage(100), 20);
        assert_eq!(vitals.hp, 0);
        assert!(!vitals.is_alive());
    }
}

//! Combat Events
//!
//! Events flowing between the input layer, the combat core, and the
//! collaborator boundaries (HUD hints, audio).

use bevy::prelude::*;

use crate::world::skills::types::{AbilityKey, SkillId};

/// Sound cues, keyed by skill id or effect kind. Consumed fire-and-forget
/// by the audio collaborator; a missing sound is never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    Swing,
    Impact,
    ChainZap,
    Cast(SkillId),
    Death,
}

/// Fire-and-forget request to the audio collaborator.
#[derive(Event, Debug, Clone, Copy)]
pub struct SoundEvent {
    pub key: SoundKey,
    pub volume: f32,
}

impl SoundEvent {
    pub fn new(key: SoundKey) -> Self {
        Self { key, volume: 1.0 }
    }
}

/// What an input hit-test resolved to. The core never performs its own
/// ray intersection; the input collaborator delivers one of these per
/// click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Enemy,
    Ground,
    Player,
}

/// Resolved hit-test result from the input collaborator.
#[derive(Event, Debug, Clone, Copy)]
pub struct HitTestEvent {
    pub kind: HitKind,
    pub enemy: Option<Entity>,
    pub point: Option<Vec3>,
}

/// Request to fire a basic attack.
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackCommand {
    pub attacker: Entity,
    /// Optional explicit target; without one the attack fires toward the
    /// attacker's facing.
    pub target: Option<Entity>,
}

/// Request to cast the skill in an ability slot.
#[derive(Event, Debug, Clone, Copy)]
pub struct CastCommand {
    pub key: AbilityKey,
    /// Explicit ground point, if the player aimed one.
    pub point: Option<Vec3>,
}

/// Classification of applied damage, for logging and popup styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    BasicHit,
    Splash,
    Chain,
    Skill(SkillId),
    EnemySwing,
}

/// Fired after damage has been applied to a target.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageEvent {
    pub source: Entity,
    pub target: Entity,
    pub amount: i32,
    pub kind: DamageKind,
    pub killing_blow: bool,
}

/// Fired once when an actor's health reaches zero.
#[derive(Event, Debug, Clone, Copy)]
pub struct DeathEvent {
    pub victim: Entity,
    pub killer: Option<Entity>,
}

/// Short informational message for the HUD ("No target in range").
#[derive(Event, Debug, Clone)]
pub struct HudHintEvent {
    pub text: String,
}

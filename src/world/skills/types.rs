//! Skill Identifiers and Ability Slots
//!
//! Skill stats live in `assets/config/skills.ron` (see `config`); this
//! module only defines the identifier enums shared across the crate.

use serde::{Deserialize, Serialize};

/// The fixed set of castable ability slots: the basic attack plus four
/// loadout slots.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AbilityKey {
    Basic,
    Slot1,
    Slot2,
    Slot3,
    Slot4,
}

impl AbilityKey {
    /// The four skill slots in HUD order.
    pub fn slots() -> [AbilityKey; 4] {
        [
            AbilityKey::Slot1,
            AbilityKey::Slot2,
            AbilityKey::Slot3,
            AbilityKey::Slot4,
        ]
    }

    /// Slot index (0-3) for loadout lookup; `None` for the basic attack.
    pub fn slot_index(&self) -> Option<usize> {
        match self {
            AbilityKey::Basic => None,
            AbilityKey::Slot1 => Some(0),
            AbilityKey::Slot2 => Some(1),
            AbilityKey::Slot3 => Some(2),
            AbilityKey::Slot4 => Some(3),
        }
    }
}

/// Enum representing available skills.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SkillId {
    Starfall,   // Staged meteor eruption over an area
    ChainSpark, // Lightning that jumps between enemies
    RiftBeam,   // Focused single-target beam
    FrostNova,  // Expanding burst around the caster
    EmberWard,  // Damage buff + orbiting ward
    ShadowDash, // Fast dash that damages enemies along the path
    Blink,      // Instant teleport
    Geyser,     // Delayed ground eruption
}

impl SkillId {
    /// Every defined skill, used for config validation and loadout pools.
    pub fn all() -> [SkillId; 8] {
        [
            SkillId::Starfall,
            SkillId::ChainSpark,
            SkillId::RiftBeam,
            SkillId::FrostNova,
            SkillId::EmberWard,
            SkillId::ShadowDash,
            SkillId::Blink,
            SkillId::Geyser,
        ]
    }

    /// Parse a skill name as stored in settings/headless configs.
    pub fn parse(name: &str) -> Option<SkillId> {
        match name {
            "Starfall" => Some(SkillId::Starfall),
            "ChainSpark" => Some(SkillId::ChainSpark),
            "RiftBeam" => Some(SkillId::RiftBeam),
            "FrostNova" => Some(SkillId::FrostNova),
            "EmberWard" => Some(SkillId::EmberWard),
            "ShadowDash" => Some(SkillId::ShadowDash),
            "Blink" => Some(SkillId::Blink),
            "Geyser" => Some(SkillId::Geyser),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillId::Starfall => "Starfall",
            SkillId::ChainSpark => "ChainSpark",
            SkillId::RiftBeam => "RiftBeam",
            SkillId::FrostNova => "FrostNova",
            SkillId::EmberWard => "EmberWard",
            SkillId::ShadowDash => "ShadowDash",
            SkillId::Blink => "Blink",
            SkillId::Geyser => "Geyser",
        }
    }
}

/// Shape/type tag for a skill. Used only for target resolution, the
/// default-fallback effect choice, and the default cast sound - never for
/// bespoke damage math beyond the definition's own numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SkillKind {
    Area,
    Chain,
    Beam,
    Nova,
    Aura,
    Dash,
    Blink,
}

impl SkillKind {
    /// Kinds that auto-select a nearby enemy as the implicit cast point
    /// when no explicit point is given.
    pub fn wants_auto_point(&self) -> bool {
        matches!(self, SkillKind::Area | SkillKind::Dash | SkillKind::Blink)
    }
}

//! Skill-Effect Registry and Dispatcher
//!
//! Maps a skill id to its visual routine. Routines are plain function
//! values with a fixed signature; registration is explicit and routines
//! can be overwritten or queried at runtime, so new skill visuals never
//! touch the dispatch logic. Dispatch never lets a routine failure
//! escape: unknown ids and failed routines both fall back to a default
//! beam/impact rendition. Combat state is already final by the time a
//! routine runs, so nothing here is ever rolled back.

use bevy::prelude::*;
use std::collections::HashMap;
use std::fmt;

use super::types::SkillId;
use crate::world::effects::FxContext;

/// Failure inside a registered effect routine. Cosmetic only; the
/// dispatcher logs it and runs the fallback.
#[derive(Debug)]
pub struct RoutineError(pub String);

impl fmt::Display for RoutineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect routine failed: {}", self.0)
    }
}

/// Fully resolved parameter bundle for a skill's visual routine.
#[derive(Debug, Clone)]
pub struct SkillEffectParams {
    pub skill: SkillId,
    /// Resolved impact point.
    pub center: Vec3,
    /// Source point, when the skill has a from/to shape (beams, dashes).
    pub from: Option<Vec3>,
    /// Destination point for from/to shapes.
    pub to: Option<Vec3>,
    pub radius: f32,
    /// Enemies hit by the cast, in hit order (chains preserve jump order).
    pub targets: Vec<(Entity, Vec3)>,
    /// The caster, for owner-tracking effects.
    pub caster: Entity,
    pub caster_pos: Vec3,
    /// Pre-scaled damage the cast dealt (for intensity scaling).
    pub damage: i32,
}

/// A skill visual routine: spawns effect entities for one resolved cast.
pub type SkillRoutine = fn(&mut FxContext, &SkillEffectParams) -> Result<(), RoutineError>;

/// Runtime-registered map from skill id to visual routine.
#[derive(Resource, Default)]
pub struct SkillEffectRegistry {
    routines: HashMap<SkillId, SkillRoutine>,
}

impl SkillEffectRegistry {
    /// Register (or overwrite) the routine for a skill.
    pub fn register(&mut self, skill: SkillId, routine: SkillRoutine) {
        self.routines.insert(skill, routine);
    }

    pub fn contains(&self, skill: SkillId) -> bool {
        self.routines.contains_key(&skill)
    }

    /// Run the routine for `params.skill`, falling back to the default
    /// rendition on a missing registration or a routine failure. Never
    /// propagates an error.
    pub fn execute(&self, fx: &mut FxContext, params: &SkillEffectParams) {
        match self.routines.get(&params.skill) {
            Some(routine) => {
                if let Err(e) = routine(fx, params) {
                    warn!("{:?}: {} - running fallback effect", params.skill, e);
                    default_fallback(fx, params);
                }
            }
            None => {
                warn!(
                    "No effect routine registered for {:?} - running fallback",
                    params.skill
                );
                default_fallback(fx, params);
            }
        }
    }
}

/// Default rendition when no routine applies: beam plus impact when the
/// cast has a from/to shape, otherwise impact plus ring at the center.
pub fn default_fallback(fx: &mut FxContext, params: &SkillEffectParams) {
    let color = Color::srgb(0.8, 0.7, 1.0);
    match (params.from, params.to) {
        (Some(from), Some(to)) => {
            fx.beam(from + Vec3::Y * 1.2, to + Vec3::Y * 1.0, 0.12, color, 0.35);
            fx.impact_burst(to, params.radius.max(1.5), color, 1.0);
        }
        _ => {
            fx.impact_burst(params.center, params.radius.max(1.5), color, 1.0);
            fx.ring(
                params.center,
                params.radius.max(1.5),
                color,
                0.5,
                Some(params.radius.max(1.5) * 1.6),
            );
        }
    }
}

//! Built-in Skill Visual Routines
//!
//! One routine per shipped skill, registered at startup. Routines only
//! spawn effect entities; damage and costs are already committed by the
//! combat core before dispatch. Set-piece skills (Starfall, Geyser) stage
//! their sub-bursts through self-scheduled sequences.

use bevy::prelude::*;

use super::registry::{RoutineError, SkillEffectParams, SkillEffectRegistry};
use super::types::SkillId;
use crate::world::effects::entity::{FxStage, FxStageSpec};
use crate::world::effects::FxContext;
use crate::world::perf::FxKind;

/// Register every built-in routine.
pub fn register_builtin(registry: &mut SkillEffectRegistry) {
    registry.register(SkillId::Starfall, starfall);
    registry.register(SkillId::ChainSpark, chain_spark);
    registry.register(SkillId::RiftBeam, rift_beam);
    registry.register(SkillId::FrostNova, frost_nova);
    registry.register(SkillId::EmberWard, ember_ward);
    registry.register(SkillId::ShadowDash, shadow_dash);
    registry.register(SkillId::Blink, blink);
    registry.register(SkillId::Geyser, geyser);
}

fn starfall(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(1.0, 0.8, 0.35);
    let center = params.center;
    let radius = params.radius.max(2.0);

    // Telegraph ring, then three staged strikes marching across the area.
    fx.ring(center, radius, color, 1.2, None);

    let mut stages = vec![FxStage {
        delay: 0.25,
        spec: FxStageSpec::Eruption { center, radius: radius * 0.6, intensity: 1.2, color },
    }];
    for (i, offset_angle) in [0.9f32, 2.6f32].iter().enumerate() {
        let offset = Vec3::new(offset_angle.cos(), 0.0, offset_angle.sin()) * radius * 0.5;
        stages.push(FxStage {
            delay: 0.55 + i as f32 * 0.35,
            spec: FxStageSpec::Eruption {
                center: center + offset,
                radius: radius * 0.5,
                intensity: 1.0,
                color,
            },
        });
    }
    stages.push(FxStage {
        delay: 1.25,
        spec: FxStageSpec::RingBlast { center, radius: radius * 1.4, color },
    });
    fx.sequence(stages);
    Ok(())
}

fn chain_spark(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.55, 0.75, 1.0);
    let mut prev = params.caster_pos + Vec3::Y * 1.4;

    if params.targets.is_empty() {
        return Err(RoutineError("chain cast resolved no targets".to_string()));
    }

    // One arc per hop, in hit order, with a flash at each strike point.
    for (_, pos) in &params.targets {
        let strike = *pos + Vec3::Y * 1.0;
        fx.arc(prev, strike, color, 0.3, 0.5);
        fx.flash_sphere(strike, 0.4, color, 0.25, 1.2);
        prev = strike;
    }
    Ok(())
}

fn rift_beam(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.75, 0.4, 1.0);
    let from = params
        .from
        .ok_or_else(|| RoutineError("beam cast without source point".to_string()))?;
    let to = params
        .to
        .ok_or_else(|| RoutineError("beam cast without destination point".to_string()))?;

    fx.flash_sphere(from + Vec3::Y * 1.4, 0.3, color, 0.2, 0.8);
    fx.beam(from + Vec3::Y * 1.4, to + Vec3::Y * 1.0, 0.18, color, 0.4);
    fx.impact_burst(to, 1.8, color, 1.0);
    Ok(())
}

fn frost_nova(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.55, 0.85, 1.0);
    let center = params.caster_pos;
    let radius = params.radius.max(2.0);

    fx.ring(center, radius * 0.3, color, 0.6, Some(radius));
    fx.flash_sphere(center + Vec3::Y, radius * 0.25, color, 0.35, 2.5);
    if fx.governor.should_spawn_vfx(FxKind::Cage, center) {
        fx.cage(center, radius * 0.7, 10, color, 0.8);
    }
    fx.particle_burst(center, 14, color, 2.0);
    Ok(())
}

fn ember_ward(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(1.0, 0.5, 0.2);
    fx.ward_shield(params.caster, params.caster_pos, 1.4, color, 8.0);
    if fx.governor.should_spawn_vfx(FxKind::Orbs, params.caster_pos) {
        fx.orbit_orbs(params.caster, params.caster_pos, 3, 1.1, color, 8.0);
    }
    fx.flash_sphere(params.caster_pos + Vec3::Y, 0.6, color, 0.3, 1.5);
    Ok(())
}

fn shadow_dash(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.4, 0.2, 0.6);
    let from = params
        .from
        .ok_or_else(|| RoutineError("dash cast without source point".to_string()))?;
    let to = params
        .to
        .ok_or_else(|| RoutineError("dash cast without destination point".to_string()))?;

    // Afterimages along the travel line.
    let steps = 5;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        fx.flash_sphere(from.lerp(to, t) + Vec3::Y, 0.5, color, 0.25 + t * 0.15, 0.0);
    }
    fx.impact_burst(to, 1.5, color, 0.8);
    Ok(())
}

fn blink(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.5, 0.9, 1.0);
    let from = params.from.unwrap_or(params.caster_pos);
    let to = params.to.unwrap_or(params.center);

    fx.flash_sphere(from + Vec3::Y, 0.8, color, 0.3, -1.5);
    fx.flash_sphere(to + Vec3::Y, 0.8, color, 0.3, 1.5);
    fx.particle_burst(to, 8, color, 1.5);
    Ok(())
}

fn geyser(fx: &mut FxContext, params: &SkillEffectParams) -> Result<(), RoutineError> {
    let color = Color::srgb(0.35, 0.6, 1.0);
    let center = params.center;
    let radius = params.radius.max(2.0);

    fx.ring(center, radius * 0.5, color, 0.5, Some(radius));
    fx.sequence(vec![
        FxStage {
            delay: 0.35,
            spec: FxStageSpec::Eruption { center, radius, intensity: 1.3, color },
        },
        FxStage {
            delay: 0.65,
            spec: FxStageSpec::Flash { center: center + Vec3::Y * 1.5, radius: radius * 0.4, color },
        },
    ]);
    Ok(())
}

//! Frame Orchestration API
//!
//! This module provides a stable API for the per-frame system schedule.
//! Both graphical and headless modes should import from here rather than
//! directly from internal modules, allowing internal refactoring without
//! breaking external consumers.
//!
//! ## Frame Phases
//!
//! Each frame runs fixed phases in order:
//!
//! 1. **Input**     - clock advance, budget reset, input resolution
//! 2. **Combat**    - cast/attack resolution, movement, regeneration
//! 3. **Ai**        - enemy updates, at a governor-throttled stride
//! 4. **CameraFollow** - camera tracking (graphical only)
//! 5. **Hud**       - HUD overlays (graphical only)
//! 6. **Effects**   - cooldown-relevant effect queue update, impacts,
//!                    eviction, respawn checks
//! 7. **PerfEval**  - frame sampling and adaptive quality/stride tuning
//!
//! ## Usage
//!
//! ```ignore
//! use riftbound::world::systems;
//!
//! systems::configure_frame_phases(&mut app);
//! systems::add_frame_clock(&mut app);
//! systems::add_core_systems(&mut app, || true);
//! ```

use bevy::prelude::*;

use super::ai::enemy_ai;
use super::combat_core::{
    apply_projectile_impacts, cast_skills, move_player, process_deaths, regen_mana,
    resolve_basic_attacks, respawn_actors, route_hit_tests, tick_log_time,
    village_proximity_hints,
};
use super::components::{AiStride, FrameBudget, SimClock};
use super::effects::queue::{
    animate_fx_shapes, apply_fx_fades, evict_expired_fx, integrate_fx_particles,
    integrate_fx_projectiles, process_fx_sequences, shed_fx_load,
};
use super::perf::PerfGovernor;

/// System set labels for the fixed frame phases.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FramePhase {
    Input,
    Combat,
    Ai,
    CameraFollow,
    Hud,
    Effects,
    PerfEval,
}

/// Configures the ordering between frame phases.
///
/// Call this once during app setup before adding systems.
pub fn configure_frame_phases(app: &mut App) {
    app.configure_sets(
        Update,
        (
            FramePhase::Input,
            FramePhase::Combat,
            FramePhase::Ai,
            FramePhase::CameraFollow,
            FramePhase::Hud,
            FramePhase::Effects,
            FramePhase::PerfEval,
        )
            .chain(),
    );
}

/// Advance the simulation clock and reset the frame budget at the top of
/// each frame. Tests that drive [`SimClock`] manually skip this and step
/// the resource directly.
pub fn add_frame_clock(app: &mut App) {
    app.add_systems(Update, begin_frame.in_set(FramePhase::Input));
}

fn begin_frame(
    time: Res<Time>,
    mut clock: ResMut<SimClock>,
    mut budget: ResMut<FrameBudget>,
    mut stride: ResMut<AiStride>,
) {
    clock.advance(time.delta_secs());
    budget.begin();
    stride.frame = stride.frame.wrapping_add(1);
}

/// Adds the simulation systems shared by graphical and headless modes.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition (`|| true` for headless mode)
pub fn add_core_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase: Combat
    app.add_systems(
        Update,
        (
            tick_log_time,
            route_hit_tests,
            move_player,
            regen_mana,
            cast_skills,
            resolve_basic_attacks,
        )
            .chain()
            .in_set(FramePhase::Combat)
            .run_if(run_condition.clone()),
    );

    // Phase: Ai
    app.add_systems(
        Update,
        enemy_ai.in_set(FramePhase::Ai).run_if(run_condition.clone()),
    );

    // Phase: Effects - the fixed-order update pass over the effect pool.
    // Motion integrates first, impacts land the frame travel completes,
    // shape animation then fade run before eviction so an entity's final
    // frame is fully animated.
    app.add_systems(
        Update,
        (
            process_fx_sequences,
            shed_fx_load,
            integrate_fx_particles,
            integrate_fx_projectiles,
            apply_projectile_impacts,
            process_deaths,
            animate_fx_shapes,
            apply_fx_fades,
            evict_expired_fx,
            respawn_actors,
            village_proximity_hints,
        )
            .chain()
            .in_set(FramePhase::Effects)
            .run_if(run_condition.clone()),
    );

    // Phase: PerfEval
    app.add_systems(
        Update,
        sample_frame_perf
            .in_set(FramePhase::PerfEval)
            .run_if(run_condition),
    );
}

/// Feed the governor the raw (unclamped) frame delta and let it retune
/// quality and the AI stride for the next frame.
fn sample_frame_perf(
    time: Res<Time>,
    mut governor: ResMut<PerfGovernor>,
    mut stride: ResMut<AiStride>,
) {
    let raw_ms = time.delta_secs() * 1000.0;
    governor.push_sample(raw_ms);
    governor.maybe_auto_adjust(time.delta_secs());
    stride.stride = governor.ai_stride();
}

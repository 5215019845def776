//! Effect Entity Components
//!
//! Every transient visual is an entity carrying [`FxLifetime`] (absolute
//! expiry), an [`FxShape`] describing its renderable (opaque to the update
//! queue), and zero or more behavior modifiers. Modifiers read entity-local
//! state only; the single exception is `Follow`, which reads a live owner
//! position and never mutates it.

use bevy::prelude::*;
use smallvec::SmallVec;

use crate::combat::events::SoundKey;

/// Absolute expiry for a transient effect entity.
///
/// The expiry is fixed at creation and only ever *shortened* afterwards
/// (load shedding); once `now >= expires_at` the entity is removed and its
/// resources released exactly once.
#[derive(Component, Debug, Clone, Copy)]
pub struct FxLifetime {
    pub expires_at: f32,
    pub spawned_at: f32,
}

impl FxLifetime {
    pub fn new(now: f32, duration: f32) -> Self {
        Self {
            spawned_at: now,
            expires_at: now + duration.max(0.05),
        }
    }

    /// Shorten the expiry; never extends.
    pub fn shorten_to(&mut self, t: f32) {
        self.expires_at = self.expires_at.min(t);
    }
}

/// Per-frame behavior modifiers for an effect entity.
#[derive(Debug, Clone, Copy)]
pub enum FxModifier {
    /// Alpha decays at `rate` per second (scaled up under low FPS).
    Fade { rate: f32 },
    /// Uniform scale grows at `per_sec` units per second.
    ScaleRate { per_sec: f32 },
    /// Track a living owner's position each frame.
    Follow { owner: Entity, offset: Vec3 },
    /// Sinusoidal scale oscillation around `base_scale`.
    Pulse { base_scale: f32, amplitude: f32, rate: f32 },
    /// Constant rotation around Y, radians per second.
    Spin { rate: f32 },
    /// Revolve around the parent at fixed radius and angular rate.
    Orbit { radius: f32, rate: f32, phase: f32 },
    /// Radius grows linearly from start to end over `duration` seconds.
    Shockwave { start_radius: f32, end_radius: f32, duration: f32 },
    /// Free particle: position integrates velocity, velocity accumulates
    /// constant downward gravity.
    Particle { velocity: Vec3, gravity: f32 },
    /// Constant upward drift (damage popups).
    VerticalDrift { rate: f32 },
}

/// The modifier set attached to one effect entity.
#[derive(Component, Debug, Default)]
pub struct FxModifiers(pub SmallVec<[FxModifier; 4]>);

/// Current opacity of an effect, driven by the fade pass and read by the
/// rendering layer. Present on every entity that carries a Fade modifier.
#[derive(Component, Debug, Clone, Copy)]
pub struct FxFade {
    pub alpha: f32,
}

impl Default for FxFade {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Renderable description for an effect entity. The update queue treats
/// this as opaque; the rendering layer attaches meshes/materials for it.
#[derive(Component, Debug, Clone)]
pub enum FxShape {
    /// Point-to-point transient line.
    Beam { from: Vec3, to: Vec3, width: f32, color: Color },
    /// Jittered polyline (lightning-style).
    Arc { points: Vec<Vec3>, width: f32, color: Color },
    /// Short vertical column.
    Pillar { height: f32, radius: f32, color: Color },
    /// Ground annulus decal.
    Ring { radius: f32, color: Color },
    /// Filled sphere (flashes, geysers, impact cores).
    Sphere { radius: f32, color: Color },
    /// Projectile head.
    Bolt { radius: f32, color: Color },
    /// Translucent sphere tracking an owner (wards).
    Shield { radius: f32, color: Color },
    /// Small orb revolving around an owner.
    Orb { radius: f32, color: Color },
    /// Floating numeric label, rendered by the HUD overlay.
    Popup { text: String, color: Color, crit: bool },
}

/// Everything that happens when a projectile arrives.
///
/// Built by the combat core at cast time; the effect queue hands it back
/// exactly once via [`ProjectileImpactEvent`] the frame the projectile
/// completes its travel. This is the sole extension point that ties damage
/// timing to visual travel time.
#[derive(Debug, Clone)]
pub struct ImpactPayload {
    pub source: Entity,
    /// Primary target, if the attack had one.
    pub target: Option<Entity>,
    pub damage: i32,
    /// Splash radius around the primary target (uplift AOE).
    pub splash_radius: Option<f32>,
    /// Chain jumps remaining (uplift chains).
    pub chain_jumps: u8,
    pub sound: Option<SoundKey>,
}

/// A projectile in flight: position interpolates from->to over the travel
/// window, with a small sinusoidal wobble so shots never look identical.
#[derive(Component, Debug)]
pub struct FxProjectile {
    pub from: Vec3,
    pub to: Vec3,
    pub travel_time: f32,
    pub elapsed: f32,
    pub wobble_amplitude: f32,
    pub wobble_rate: f32,
    /// Emit intermittent trailing beams while in flight (quality-gated).
    pub trail: bool,
    pub trail_accum: f32,
    /// Taken exactly once at arrival.
    pub payload: Option<ImpactPayload>,
}

impl FxProjectile {
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.travel_time).clamp(0.0, 1.0)
    }
}

/// Fired the frame a projectile reaches its destination. Consumed in the
/// same frame by the combat core's impact applier.
#[derive(Event, Debug)]
pub struct ProjectileImpactEvent {
    pub point: Vec3,
    pub payload: ImpactPayload,
}

/// One stage of a self-scheduled effect choreography.
#[derive(Debug, Clone)]
pub struct FxStage {
    /// Seconds after the sequence started.
    pub delay: f32,
    pub spec: FxStageSpec,
}

/// What a choreography stage spawns when its delay elapses.
#[derive(Debug, Clone)]
pub enum FxStageSpec {
    /// Pillar burst + flash at a point (meteor strike, geyser plume).
    Eruption { center: Vec3, radius: f32, intensity: f32, color: Color },
    /// Single flash sphere.
    Flash { center: Vec3, radius: f32, color: Color },
    /// Expanding ground ring.
    RingBlast { center: Vec3, radius: f32, color: Color },
}

/// Carrier for staged, multi-second set-piece effects.
///
/// The sequence schedules its own sub-bursts outside the pool's per-entity
/// expiry and despawns itself once every stage has fired; the entities each
/// stage spawns still obey the normal expiry/fade contract.
#[derive(Component, Debug)]
pub struct FxSequence {
    pub started_at: f32,
    pub stages: SmallVec<[FxStage; 4]>,
    pub next: usize,
}

/// Bookkeeping for the live effect pool.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FxStats {
    /// Entities alive at the end of the last update pass.
    pub live: usize,
    /// Total disposal events since startup.
    pub disposed_total: u64,
    /// Entities whose expiry was shortened by load shedding.
    pub shed_total: u64,
}

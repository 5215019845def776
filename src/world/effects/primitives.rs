//! Effect Primitive Library
//!
//! Stateless factory methods that construct specific effect shapes and
//! enqueue them into the pool with the right modifiers. Primitives clamp
//! degenerate parameters (zero durations, negative counts) to sane
//! minimums and never fail on missing optional parameters.
//!
//! Callers are responsible for consulting the performance governor's
//! spawn gate for *optional* effects; primitives only scale counts and
//! suppress popups probabilistically per the current quality tier.

use bevy::prelude::*;
use smallvec::smallvec;

use super::entity::*;
use crate::world::components::GameRng;
use crate::world::perf::PerfGovernor;

/// Everything a primitive needs to enqueue effect entities: deferred
/// commands, the governor (for count scaling), the RNG (for jitter), and
/// the current simulation time.
pub struct FxContext<'w, 's, 'a> {
    pub commands: &'a mut Commands<'w, 's>,
    pub governor: &'a PerfGovernor,
    pub rng: &'a mut GameRng,
    pub now: f32,
}

impl<'w, 's, 'a> FxContext<'w, 's, 'a> {
    /// Point-to-point transient line.
    pub fn beam(&mut self, from: Vec3, to: Vec3, width: f32, color: Color, duration: f32) -> Entity {
        let duration = duration.max(0.05);
        self.commands
            .spawn((
                FxShape::Beam { from, to, width: width.max(0.01), color },
                Transform::from_translation((from + to) / 2.0),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![FxModifier::Fade { rate: 1.0 / duration }]),
                FxFade::default(),
            ))
            .id()
    }

    /// Lightning-style arc: a beam with procedural lateral and vertical
    /// jitter, plus a time-varying wave term so repeated arcs never look
    /// identical.
    pub fn arc(&mut self, from: Vec3, to: Vec3, color: Color, duration: f32, turbulence: f32) -> Entity {
        let duration = duration.max(0.05);
        let turbulence = turbulence.max(0.0);
        let span = to - from;
        let length = span.length();
        let segments = ((length / 1.5) as usize).clamp(4, 16);

        let side = span.cross(Vec3::Y).normalize_or_zero();
        let mut points = Vec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let mut p = from.lerp(to, t);
            if i != 0 && i != segments {
                let wave = (self.now * 13.0 + i as f32 * 1.7).sin() * 0.3;
                p += side * (self.rng.random_range(-1.0, 1.0) * turbulence + wave);
                p.y += self.rng.random_range(-0.5, 0.8) * turbulence;
            }
            points.push(p);
        }

        self.commands
            .spawn((
                FxShape::Arc { points, width: 0.08, color },
                Transform::default(),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![FxModifier::Fade { rate: 1.0 / duration }]),
                FxFade::default(),
            ))
            .id()
    }

    /// Impact burst: vertical pillars plus radial beams around a point.
    /// Counts scale with `intensity` and down with lower quality tiers.
    pub fn impact_burst(&mut self, center: Vec3, radius: f32, color: Color, intensity: f32) {
        let radius = radius.max(0.5);
        let scale = self.governor.burst_count_scale();
        let pillars = ((6.0 * intensity.max(0.1) * scale).round() as usize).clamp(1, 24);
        let rays = ((8.0 * intensity.max(0.1) * scale).round() as usize).clamp(1, 24);

        for _ in 0..pillars {
            let angle = self.rng.random_range(0.0, std::f32::consts::TAU);
            let dist = self.rng.random_range(0.0, radius * 0.6);
            let base = center + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);
            let height = self.rng.random_range(1.4, 3.2);
            let duration = self.rng.random_range(0.3, 0.55);
            self.commands.spawn((
                FxShape::Pillar { height, radius: 0.14, color },
                Transform::from_translation(base + Vec3::Y * height * 0.5),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![
                    FxModifier::ScaleRate { per_sec: 0.6 },
                    FxModifier::Fade { rate: 1.0 / duration },
                ]),
                FxFade::default(),
            ));
        }

        for _ in 0..rays {
            let angle = self.rng.random_range(0.0, std::f32::consts::TAU);
            let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
            let lift = Vec3::Y * self.rng.random_range(0.2, 0.9);
            let reach = self.rng.random_range(radius * 0.5, radius);
            self.beam(
                center + Vec3::Y * 0.3,
                center + dir * reach + lift,
                0.06,
                color,
                0.3,
            );
        }
    }

    /// Ground annulus. If `expand_to` is given, the ring grows linearly
    /// to that radius over its lifetime.
    pub fn ring(
        &mut self,
        center: Vec3,
        radius: f32,
        color: Color,
        duration: f32,
        expand_to: Option<f32>,
    ) -> Entity {
        let duration = duration.max(0.05);
        let radius = radius.max(0.1);
        let mut modifiers: FxModifiers =
            FxModifiers(smallvec![FxModifier::Fade { rate: 1.0 / duration }]);
        if let Some(end) = expand_to {
            modifiers.0.push(FxModifier::Shockwave {
                start_radius: radius,
                end_radius: end.max(radius),
                duration,
            });
        }
        self.commands
            .spawn((
                FxShape::Ring { radius, color },
                Transform::from_translation(center + Vec3::Y * 0.05),
                FxLifetime::new(self.now, duration),
                modifiers,
                FxFade::default(),
            ))
            .id()
    }

    /// Filled sphere flash with optional outward scale rate. Used for
    /// hand flashes, impact cores, and geysers.
    pub fn flash_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        color: Color,
        duration: f32,
        scale_rate: f32,
    ) -> Entity {
        let duration = duration.max(0.05);
        let mut modifiers: FxModifiers =
            FxModifiers(smallvec![FxModifier::Fade { rate: 1.0 / duration }]);
        if scale_rate != 0.0 {
            modifiers.0.push(FxModifier::ScaleRate { per_sec: scale_rate });
        }
        self.commands
            .spawn((
                FxShape::Sphere { radius: radius.max(0.05), color },
                Transform::from_translation(center),
                FxLifetime::new(self.now, duration),
                modifiers,
                FxFade::default(),
            ))
            .id()
    }

    /// Free particles bursting from a point with gravity.
    pub fn particle_burst(&mut self, center: Vec3, count: u32, color: Color, speed: f32) {
        let scale = self.governor.burst_count_scale();
        let count = ((count as f32 * scale).round() as usize).clamp(1, 48);
        for _ in 0..count {
            let angle = self.rng.random_range(0.0, std::f32::consts::TAU);
            let up = self.rng.random_range(2.0, 5.5);
            let lateral = self.rng.random_range(0.3, 1.0) * speed.max(0.5);
            let velocity = Vec3::new(angle.cos() * lateral, up, angle.sin() * lateral);
            let duration = self.rng.random_range(0.5, 0.9);
            self.commands.spawn((
                FxShape::Sphere { radius: 0.12, color },
                Transform::from_translation(center),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![
                    FxModifier::Particle { velocity, gravity: 14.0 },
                    FxModifier::Fade { rate: 1.0 / duration },
                ]),
                FxFade::default(),
            ));
        }
    }

    /// Projectile traveling from `from` to `to` at `speed` units/second.
    /// The payload is handed back exactly once via
    /// [`ProjectileImpactEvent`] when the travel completes. Returns the
    /// travel time.
    pub fn projectile(
        &mut self,
        from: Vec3,
        to: Vec3,
        speed: f32,
        color: Color,
        payload: ImpactPayload,
        trail: bool,
    ) -> f32 {
        let speed = speed.max(0.1);
        let travel_time = (from.distance(to) / speed).max(0.05);
        self.commands.spawn((
            FxShape::Bolt { radius: 0.28, color },
            Transform::from_translation(from),
            // Expiry slightly past arrival; the impact pass shortens it
            // to "now" the frame the projectile lands.
            FxLifetime::new(self.now, travel_time + 0.25),
            FxProjectile {
                from,
                to,
                travel_time,
                elapsed: 0.0,
                wobble_amplitude: 0.35,
                wobble_rate: 3.0,
                trail,
                trail_accum: 0.0,
                payload: Some(payload),
            },
        ));
        travel_time
    }

    /// Ring of vertical bars around a point.
    pub fn cage(&mut self, center: Vec3, radius: f32, bars: u32, color: Color, duration: f32) {
        let duration = duration.max(0.05);
        let bars = (bars as usize).clamp(3, 16);
        let root = self
            .commands
            .spawn((
                Transform::from_translation(center),
                Visibility::default(),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![
                    FxModifier::Spin { rate: 0.8 },
                    FxModifier::Fade { rate: 1.0 / duration },
                ]),
                FxFade::default(),
            ))
            .id();
        for i in 0..bars {
            let angle = i as f32 / bars as f32 * std::f32::consts::TAU;
            let offset = Vec3::new(angle.cos() * radius, 1.2, angle.sin() * radius);
            let bar = self
                .commands
                .spawn((
                    FxShape::Pillar { height: 2.4, radius: 0.09, color },
                    Transform::from_translation(offset),
                ))
                .id();
            self.commands.entity(root).add_child(bar);
        }
    }

    /// Wireframe-style ward sphere that tracks a moving owner with a
    /// gentle pulse.
    pub fn ward_shield(
        &mut self,
        owner: Entity,
        owner_pos: Vec3,
        radius: f32,
        color: Color,
        duration: f32,
    ) -> Entity {
        let duration = duration.max(0.05);
        let radius = radius.max(0.4);
        self.commands
            .spawn((
                FxShape::Shield { radius, color },
                Transform::from_translation(owner_pos + Vec3::Y),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![
                    FxModifier::Follow { owner, offset: Vec3::Y },
                    FxModifier::Pulse { base_scale: 1.0, amplitude: 0.05, rate: 3.0 },
                    FxModifier::Fade { rate: 0.25 / duration },
                ]),
                FxFade::default(),
            ))
            .id()
    }

    /// N orbs revolving around a tracked owner.
    pub fn orbit_orbs(
        &mut self,
        owner: Entity,
        owner_pos: Vec3,
        count: u32,
        radius: f32,
        color: Color,
        duration: f32,
    ) -> Entity {
        let duration = duration.max(0.05);
        let count = (count as usize).clamp(1, 8);
        let root = self
            .commands
            .spawn((
                Transform::from_translation(owner_pos + Vec3::Y),
                Visibility::default(),
                FxLifetime::new(self.now, duration),
                FxModifiers(smallvec![
                    FxModifier::Follow { owner, offset: Vec3::Y },
                    FxModifier::Fade { rate: 0.25 / duration },
                ]),
                FxFade::default(),
            ))
            .id();
        for i in 0..count {
            let phase = i as f32 / count as f32 * std::f32::consts::TAU;
            let orb = self
                .commands
                .spawn((
                    FxShape::Orb { radius: 0.18, color },
                    Transform::from_translation(Vec3::new(
                        phase.cos() * radius,
                        0.0,
                        phase.sin() * radius,
                    )),
                    FxModifiers(smallvec![FxModifier::Orbit {
                        radius: radius.max(0.3),
                        rate: 2.4,
                        phase,
                    }]),
                ))
                .id();
            self.commands.entity(root).add_child(orb);
        }
        root
    }

    /// Floating damage number with upward drift and fade. Quality tiers
    /// probabilistically suppress a fraction of popups to bound overlay
    /// cost; suppressed popups return `None`.
    pub fn damage_popup(&mut self, pos: Vec3, amount: i32, crit: bool) -> Option<Entity> {
        if self.rng.random_f32() > self.governor.popup_keep_chance() {
            return None;
        }
        let jitter = Vec3::new(
            self.rng.random_range(-0.6, 0.6),
            self.rng.random_range(0.0, 0.5),
            0.0,
        );
        let color = if crit {
            Color::srgb(1.0, 0.55, 0.1)
        } else {
            Color::srgb(1.0, 1.0, 1.0)
        };
        let duration = 1.2;
        Some(
            self.commands
                .spawn((
                    FxShape::Popup { text: format!("{}", amount.max(0)), color, crit },
                    Transform::from_translation(pos + Vec3::Y * 2.6 + jitter),
                    FxLifetime::new(self.now, duration),
                    FxModifiers(smallvec![
                        FxModifier::VerticalDrift { rate: 1.5 },
                        FxModifier::Fade { rate: 1.0 / duration },
                    ]),
                    FxFade::default(),
                ))
                .id(),
        )
    }

    /// Self-scheduled staged choreography carrier (see [`FxSequence`]).
    pub fn sequence(&mut self, stages: impl IntoIterator<Item = FxStage>) -> Entity {
        self.commands
            .spawn(FxSequence {
                started_at: self.now,
                stages: stages.into_iter().collect(),
                next: 0,
            })
            .id()
    }
}

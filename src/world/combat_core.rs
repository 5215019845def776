//! Combat Resolution Core
//!
//! Basic-attack and skill-cast resolution: cooldown gating, resource
//! gating, targeting, damage math, and chain/splash propagation.
//!
//! Rejected actions (cooldown, mana, range, safe zone) are silent no-ops;
//! they are expected user-input outcomes, never errors. All combat-state
//! mutation (cost deduction, cooldown start, damage) happens *before* the
//! fallible visual dispatch, so a failed routine can never corrupt combat
//! state.
//!
//! Basic attacks apply damage on projectile *arrival* - the impact payload
//! built at cast time comes back through [`ProjectileImpactEvent`] after
//! the visual travel time, and only then does the target lose health.
//! Skill damage is immediate at cast time.

use bevy::prelude::*;

use crate::combat::events::*;
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::world::components::*;
use crate::world::effects::entity::{ImpactPayload, ProjectileImpactEvent};
use crate::world::effects::FxContext;
use crate::world::perf::{FxKind, PerfGovernor};
use crate::world::skills::registry::{SkillEffectParams, SkillEffectRegistry};
use crate::world::skills::types::{AbilityKey, SkillId, SkillKind};
use crate::world::skills::SkillDefinitions;
use crate::world::targeting;
use crate::world::zones::VillageMap;
use crate::world::{
    AUTO_TARGET_RANGE_FACTOR, BASIC_RANGE_MULTIPLIER, CHAIN_DAMAGE_FACTOR, CHAIN_JUMP_RADIUS,
    DASH_HIT_WIDTH, ENEMY_RESPAWN_DELAY, HOME_VILLAGE, MANA_REGEN_PER_SEC,
    PROJECTILE_CHEST_HEIGHT, SPLASH_BONUS_RADIUS, SPLASH_DAMAGE_FACTOR,
};

/// The active 4-slot skill loadout, resolved from persisted settings.
#[derive(Resource, Debug, Clone, Copy)]
pub struct SkillLoadout(pub [SkillId; 4]);

impl Default for SkillLoadout {
    fn default() -> Self {
        Self([
            SkillId::Starfall,
            SkillId::ChainSpark,
            SkillId::FrostNova,
            SkillId::EmberWard,
        ])
    }
}

impl SkillLoadout {
    pub fn skill_for(&self, key: AbilityKey) -> Option<SkillId> {
        key.slot_index().map(|i| self.0[i])
    }
}

// ============================================================================
// Damage math
// ============================================================================

/// Basic attacks scale with the temporary buff and the uplift multiplier,
/// never with level (skills do; this asymmetry is intentional).
pub fn basic_attack_damage(base: i32, buff_factor: f32, uplift_mul: f32) -> i32 {
    let buffed = (base as f32 * buff_factor).floor();
    (buffed * uplift_mul).floor() as i32
}

/// Skill damage: `floor(base * growth^(level-1) * buff)`.
pub fn skill_damage(base: f32, growth: f32, level: u32, buff_factor: f32) -> i32 {
    let exponent = level.saturating_sub(1) as i32;
    (base * growth.powi(exponent) * buff_factor).floor() as i32
}

/// Build a chain-hit sequence starting from `start`: repeatedly the
/// nearest not-yet-hit candidate within `jump_range` of the previous hit,
/// never the same entity twice, at most `max_jumps` hops.
pub fn chain_targets(
    start: Vec3,
    jump_range: f32,
    max_jumps: u8,
    candidates: &[(Entity, Vec3)],
    already_hit: &[Entity],
) -> Vec<(Entity, Vec3)> {
    let mut hits: Vec<(Entity, Vec3)> = Vec::new();
    let mut cursor = start;
    for _ in 0..max_jumps {
        let next = candidates
            .iter()
            .filter(|(e, _)| !already_hit.contains(e) && !hits.iter().any(|(h, _)| h == e))
            .filter_map(|&(e, pos)| {
                let d = Vec3::new(pos.x - cursor.x, 0.0, pos.z - cursor.z).length();
                (d <= jump_range).then_some((e, pos, d))
            })
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap());
        let Some((entity, pos, _)) = next else { break };
        cursor = pos;
        hits.push((entity, pos));
    }
    hits
}

/// Distance from a point to a ground-plane segment, for dash sweeps.
pub fn segment_distance(point: Vec3, a: Vec3, b: Vec3) -> f32 {
    let p = Vec3::new(point.x, 0.0, point.z);
    let a = Vec3::new(a.x, 0.0, a.z);
    let b = Vec3::new(b.x, 0.0, b.z);
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-6 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

fn facing_of(transform: &Transform) -> Vec3 {
    transform.rotation * Vec3::Z
}

// ============================================================================
// Systems
// ============================================================================

/// Keep the combat log's clock in step with the simulation.
pub fn tick_log_time(clock: Res<SimClock>, mut log: ResMut<CombatLog>) {
    log.world_time = clock.now;
}

/// Route resolved input hit-tests: an enemy hit becomes a basic-attack
/// command, a ground hit becomes a move order.
pub fn route_hit_tests(
    mut hits: EventReader<HitTestEvent>,
    mut attacks: EventWriter<AttackCommand>,
    mut move_order: ResMut<MoveOrder>,
    player: Query<Entity, With<Player>>,
) {
    let Ok(player_entity) = player.get_single() else {
        return;
    };
    for hit in hits.read() {
        match hit.kind {
            HitKind::Enemy => {
                attacks.send(AttackCommand {
                    attacker: player_entity,
                    target: hit.enemy,
                });
                move_order.destination = None;
            }
            HitKind::Ground => {
                move_order.destination = hit.point;
            }
            HitKind::Player => {}
        }
    }
}

/// Walk the player toward the current move order.
pub fn move_player(
    clock: Res<SimClock>,
    mut move_order: ResMut<MoveOrder>,
    mut player: Query<(&mut Transform, &Vitals), With<Player>>,
) {
    let Some(destination) = move_order.destination else {
        return;
    };
    let Ok((mut transform, vitals)) = player.get_single_mut() else {
        return;
    };
    if !vitals.is_alive() {
        move_order.destination = None;
        return;
    }

    let my_pos = transform.translation;
    let to_dest = Vec3::new(destination.x - my_pos.x, 0.0, destination.z - my_pos.z);
    if to_dest.length() < 0.5 {
        move_order.destination = None;
        return;
    }

    let direction = to_dest.normalize_or_zero();
    let step = crate::world::PLAYER_MOVE_SPEED * clock.delta;
    transform.translation += direction * step;
    transform.translation.x = transform
        .translation
        .x
        .clamp(-crate::world::WORLD_HALF_SIZE, crate::world::WORLD_HALF_SIZE);
    transform.translation.z = transform
        .translation
        .z
        .clamp(-crate::world::WORLD_HALF_SIZE, crate::world::WORLD_HALF_SIZE);
    transform.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
}

/// Resolve queued basic attacks.
///
/// Rejection order: cooldown, then target liveness/range, then the
/// safe-zone rule (attacks spanning two different villages are illegal).
/// A successful attack starts the cooldown, computes damage up front, and
/// launches a projectile carrying the impact payload - health changes
/// only when the projectile lands.
pub fn resolve_basic_attacks(
    clock: Res<SimClock>,
    villages: Res<VillageMap>,
    governor: Res<PerfGovernor>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut attacks: EventReader<AttackCommand>,
    mut sounds: EventWriter<SoundEvent>,
    mut attackers: Query<(
        &Transform,
        &Vitals,
        &mut CooldownLedger,
        &AttackSpeed,
        &DamageBuff,
        &Uplift,
        &BasicAttack,
    )>,
    targets: Query<(&Transform, &Vitals), With<Enemy>>,
) {
    let now = clock.now;

    for command in attacks.read() {
        let Ok((transform, vitals, mut ledger, speed, buff, uplift, attack)) =
            attackers.get_mut(command.attacker)
        else {
            continue;
        };
        if !vitals.is_alive() {
            continue;
        }
        if !ledger.is_ready(AbilityKey::Basic, now) {
            continue;
        }

        let my_pos = transform.translation;

        // Validate the target, if one was given.
        let mut target_point = None;
        let mut valid_target = None;
        if let Some(target) = command.target {
            let Ok((target_transform, target_vitals)) = targets.get(target) else {
                continue;
            };
            if !target_vitals.is_alive() {
                continue;
            }
            let target_pos = target_transform.translation;
            let distance = Vec3::new(target_pos.x - my_pos.x, 0.0, target_pos.z - my_pos.z).length();
            if distance > attack.range * BASIC_RANGE_MULTIPLIER {
                continue;
            }
            if !villages.can_engage(my_pos, target_pos) {
                continue;
            }
            target_point = Some(target_pos);
            valid_target = Some(target);
        }

        ledger.trigger(
            AbilityKey::Basic,
            now,
            speed.effective_cooldown(attack.cooldown),
        );

        let damage = basic_attack_damage(vitals.base_damage, buff.factor(now), uplift.damage_mul);

        let from = my_pos + Vec3::Y * PROJECTILE_CHEST_HEIGHT;
        let to = target_point
            .map(|p| p + Vec3::Y * PROJECTILE_CHEST_HEIGHT)
            .unwrap_or_else(|| from + facing_of(transform) * attack.range);

        let mut fx = FxContext {
            commands: &mut commands,
            governor: &governor,
            rng: &mut rng,
            now,
        };
        fx.projectile(
            from,
            to,
            attack.projectile_speed,
            Color::srgb(1.0, 0.85, 0.4),
            ImpactPayload {
                source: command.attacker,
                target: valid_target,
                damage,
                splash_radius: uplift.splash_radius,
                chain_jumps: uplift.chain_jumps,
                sound: Some(SoundKey::Impact),
            },
            governor.should_spawn_vfx(FxKind::TrailBeam, from),
        );
        sounds.send(SoundEvent::new(SoundKey::Swing));
    }
}

/// Apply projectile arrivals: primary damage, hit decal, uplift splash,
/// and uplift chain propagation. Runs inside the effects phase, right
/// after projectile motion, so damage lands the same frame the travel
/// completes.
pub fn apply_projectile_impacts(
    clock: Res<SimClock>,
    governor: Res<PerfGovernor>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut log: ResMut<CombatLog>,
    mut impacts: EventReader<ProjectileImpactEvent>,
    mut sounds: EventWriter<SoundEvent>,
    mut damage_events: EventWriter<DamageEvent>,
    mut deaths: EventWriter<DeathEvent>,
    mut actors: Query<(Entity, &Transform, &mut Vitals, Option<&Enemy>)>,
) {
    let now = clock.now;

    for impact in impacts.read() {
        let payload = &impact.payload;

        // Hit decal and flash at the arrival point, regardless of whether
        // anything was struck.
        {
            let mut fx = FxContext {
                commands: &mut commands,
                governor: &governor,
                rng: &mut rng,
                now,
            };
            let ground = Vec3::new(impact.point.x, 0.0, impact.point.z);
            if fx.governor.should_spawn_vfx(FxKind::Decal, ground) {
                fx.ring(ground, 0.7, Color::srgb(1.0, 0.8, 0.4), 0.6, Some(1.6));
            }
            if fx.governor.should_spawn_vfx(FxKind::Flash, impact.point) {
                fx.flash_sphere(impact.point, 0.35, Color::srgb(1.0, 0.85, 0.4), 0.25, 1.5);
            }
        }

        let Some(primary) = payload.target else {
            continue;
        };

        // Snapshot enemy positions for splash/chain before mutating.
        let enemy_positions: Vec<(Entity, Vec3)> = actors
            .iter()
            .filter(|(e, _, v, enemy)| enemy.is_some() && v.is_alive() && *e != primary)
            .map(|(e, t, _, _)| (e, t.translation))
            .collect();

        // Primary hit.
        let Ok((_, primary_transform, mut primary_vitals, _)) = actors.get_mut(primary) else {
            continue;
        };
        if !primary_vitals.is_alive() {
            continue;
        }
        let primary_pos = primary_transform.translation;
        primary_vitals.take_damage(payload.damage);
        let killing_blow = !primary_vitals.is_alive();

        log.log_damage("Player", "Riftspawn", "Basic Attack", payload.damage, killing_blow);
        damage_events.send(DamageEvent {
            source: payload.source,
            target: primary,
            amount: payload.damage,
            kind: DamageKind::BasicHit,
            killing_blow,
        });
        if killing_blow {
            deaths.send(DeathEvent { victim: primary, killer: Some(payload.source) });
        }
        if let Some(key) = payload.sound {
            sounds.send(SoundEvent::new(key));
        }
        {
            let mut fx = FxContext {
                commands: &mut commands,
                governor: &governor,
                rng: &mut rng,
                now,
            };
            fx.damage_popup(primary_pos, payload.damage, false);
        }

        // Uplift splash: 80% of primary to everything near the primary,
        // never the primary itself a second time.
        if let Some(radius) = payload.splash_radius {
            let splash_damage =
                (payload.damage as f32 * SPLASH_DAMAGE_FACTOR).floor() as i32;
            let reach = radius + SPLASH_BONUS_RADIUS;
            let victims: Vec<(Entity, Vec3)> = enemy_positions
                .iter()
                .filter(|(_, pos)| pos.distance(primary_pos) <= reach)
                .copied()
                .collect();
            for (victim, pos) in victims {
                let Ok((_, _, mut vitals, _)) = actors.get_mut(victim) else {
                    continue;
                };
                if !vitals.is_alive() {
                    continue;
                }
                vitals.take_damage(splash_damage);
                let lethal = !vitals.is_alive();
                log.log_damage("Player", "Riftspawn", "Splash", splash_damage, lethal);
                damage_events.send(DamageEvent {
                    source: payload.source,
                    target: victim,
                    amount: splash_damage,
                    kind: DamageKind::Splash,
                    killing_blow: lethal,
                });
                if lethal {
                    deaths.send(DeathEvent { victim, killer: Some(payload.source) });
                }
                let mut fx = FxContext {
                    commands: &mut commands,
                    governor: &governor,
                    rng: &mut rng,
                    now,
                };
                fx.damage_popup(pos, splash_damage, false);
            }
        }

        // Uplift chain: hops to the nearest unhit enemy, 85% of primary
        // per hop, with a connecting arc per hop.
        if payload.chain_jumps > 0 {
            let chain_damage =
                (payload.damage as f32 * CHAIN_DAMAGE_FACTOR).floor() as i32;
            let hits = chain_targets(
                primary_pos,
                CHAIN_JUMP_RADIUS,
                payload.chain_jumps,
                &enemy_positions,
                &[primary],
            );
            let mut prev = primary_pos + Vec3::Y;
            for (victim, pos) in hits {
                let Ok((_, _, mut vitals, _)) = actors.get_mut(victim) else {
                    continue;
                };
                if !vitals.is_alive() {
                    continue;
                }
                vitals.take_damage(chain_damage);
                let lethal = !vitals.is_alive();
                log.log_damage("Player", "Riftspawn", "Chain", chain_damage, lethal);
                damage_events.send(DamageEvent {
                    source: payload.source,
                    target: victim,
                    amount: chain_damage,
                    kind: DamageKind::Chain,
                    killing_blow: lethal,
                });
                if lethal {
                    deaths.send(DeathEvent { victim, killer: Some(payload.source) });
                }
                let mut fx = FxContext {
                    commands: &mut commands,
                    governor: &governor,
                    rng: &mut rng,
                    now,
                };
                let strike = pos + Vec3::Y;
                fx.arc(prev, strike, Color::srgb(0.6, 0.8, 1.0), 0.3, 0.4);
                fx.damage_popup(pos, chain_damage, false);
                prev = strike;
            }
            sounds.send(SoundEvent::new(SoundKey::ChainZap));
        }
    }
}

/// Resolve queued skill casts.
///
/// Cooldown and mana rejections are silent. On success, cost and cooldown
/// are committed first; an area cast that then finds no qualifying target
/// aborts with a HUD hint *after* the cost is spent - deliberate,
/// documented behavior, not a bug to fix.
pub fn cast_skills(
    clock: Res<SimClock>,
    defs: Res<SkillDefinitions>,
    loadout: Res<SkillLoadout>,
    registry: Res<SkillEffectRegistry>,
    governor: Res<PerfGovernor>,
    mut rng: ResMut<GameRng>,
    mut log: ResMut<CombatLog>,
    mut commands: Commands,
    mut casts: EventReader<CastCommand>,
    mut sounds: EventWriter<SoundEvent>,
    mut hints: EventWriter<HudHintEvent>,
    mut damage_events: EventWriter<DamageEvent>,
    mut deaths: EventWriter<DeathEvent>,
    mut player: Query<
        (Entity, &mut Transform, &mut Vitals, &mut CooldownLedger, &mut DamageBuff),
        With<Player>,
    >,
    mut enemies: Query<(Entity, &Transform, &mut Vitals), (With<Enemy>, Without<Player>)>,
) {
    let now = clock.now;
    let Ok((caster, mut caster_transform, mut caster_vitals, mut ledger, mut buff)) =
        player.get_single_mut()
    else {
        return;
    };

    for command in casts.read() {
        if !caster_vitals.is_alive() {
            continue;
        }
        let Some(skill) = loadout.skill_for(command.key) else {
            continue;
        };
        let Some(def) = defs.get(&skill) else {
            warn!("Loadout references undefined skill {:?}", skill);
            continue;
        };

        if !ledger.is_ready(command.key, now) {
            continue;
        }
        if caster_vitals.mp < def.mana_cost {
            continue;
        }

        // Commit cost and cooldown before anything that can still abort.
        caster_vitals.mp -= def.mana_cost;
        ledger.trigger(command.key, now, def.cooldown);
        sounds.send(SoundEvent::new(SoundKey::Cast(skill)));
        log.log(
            CombatLogEventType::SkillCast,
            format!("Player casts {}", def.name),
        );

        let caster_pos = caster_transform.translation;
        let facing = facing_of(&caster_transform);
        let alive_enemies: Vec<(Entity, Vec3)> = enemies
            .iter()
            .filter(|(_, _, v)| v.is_alive())
            .map(|(e, t, _)| (e, t.translation))
            .collect();

        // Resolve the cast point.
        let mut point = command.point;
        if point.is_none() && def.kind.wants_auto_point() {
            let auto = targeting::nearest_within(
                caster_pos,
                def.range * AUTO_TARGET_RANGE_FACTOR,
                alive_enemies.iter().copied(),
            );
            match auto {
                Some((_, pos)) => point = Some(pos),
                None if def.kind == SkillKind::Area => {
                    // Cost and cooldown stay spent on an aim-fallback abort.
                    hints.send(HudHintEvent { text: "No target in range".to_string() });
                    continue;
                }
                None => {}
            }
        }
        let mut point = targeting::resolve_impact_point(
            caster_pos,
            facing,
            point,
            None,
            def.range,
        );
        // Clamp the point into cast range.
        let offset = Vec3::new(point.x - caster_pos.x, 0.0, point.z - caster_pos.z);
        if offset.length() > def.range {
            point = caster_pos + offset.normalize_or_zero() * def.range;
        }

        // Aimed target for single-target shapes.
        let aimed = targeting::target_in_aim_cone(
            caster_pos,
            facing,
            def.range,
            alive_enemies.iter().copied(),
        )
        .or_else(|| {
            targeting::nearest_within(caster_pos, def.range, alive_enemies.iter().copied())
                .map(|(e, _)| e)
        });

        let damage = skill_damage(
            def.damage_base,
            def.level_growth,
            caster_vitals.level,
            buff.factor(now),
        );

        // Resolve the hit list per skill shape. Damage is applied
        // immediately; visuals run afterwards and cannot roll it back.
        let mut hit_list: Vec<(Entity, Vec3)> = Vec::new();
        match def.kind {
            SkillKind::Area => {
                hit_list = alive_enemies
                    .iter()
                    .filter(|(_, pos)| pos.distance(point) <= def.radius)
                    .copied()
                    .collect();
            }
            SkillKind::Nova => {
                hit_list = alive_enemies
                    .iter()
                    .filter(|(_, pos)| pos.distance(caster_pos) <= def.radius)
                    .copied()
                    .collect();
            }
            SkillKind::Beam => {
                if let Some(target) = aimed {
                    if let Some(&(entity, pos)) =
                        alive_enemies.iter().find(|(e, _)| *e == target)
                    {
                        point = pos;
                        hit_list.push((entity, pos));
                    }
                }
            }
            SkillKind::Chain => {
                if let Some(target) = aimed {
                    if let Some(&(entity, pos)) =
                        alive_enemies.iter().find(|(e, _)| *e == target)
                    {
                        hit_list.push((entity, pos));
                        let jumps = chain_targets(
                            pos,
                            def.jump_range,
                            def.jump_count,
                            &alive_enemies,
                            &[entity],
                        );
                        hit_list.extend(jumps);
                    }
                }
            }
            SkillKind::Dash => {
                hit_list = alive_enemies
                    .iter()
                    .filter(|(_, pos)| {
                        segment_distance(*pos, caster_pos, point) <= def.radius.max(DASH_HIT_WIDTH)
                    })
                    .copied()
                    .collect();
            }
            SkillKind::Blink => {}
            SkillKind::Aura => {
                buff.apply(now, def.buff_duration, def.buff_multiplier);
            }
        }

        // Apply damage. Chains decay per hop; everything else hits flat.
        for (index, (victim, pos)) in hit_list.iter().enumerate() {
            let applied = if def.kind == SkillKind::Chain && index > 0 {
                (damage as f32 * CHAIN_DAMAGE_FACTOR.powi(index as i32)).floor() as i32
            } else {
                damage
            };
            let Ok((_, _, mut vitals)) = enemies.get_mut(*victim) else {
                continue;
            };
            if !vitals.is_alive() {
                continue;
            }
            vitals.take_damage(applied);
            let lethal = !vitals.is_alive();
            log.log_damage("Player", "Riftspawn", &def.name, applied, lethal);
            damage_events.send(DamageEvent {
                source: caster,
                target: *victim,
                amount: applied,
                kind: DamageKind::Skill(skill),
                killing_blow: lethal,
            });
            if lethal {
                deaths.send(DeathEvent { victim: *victim, killer: Some(caster) });
            }
            let mut fx = FxContext {
                commands: &mut commands,
                governor: &governor,
                rng: &mut rng,
                now,
            };
            fx.damage_popup(*pos, applied, false);
        }

        // Movement skills relocate the caster after damage resolution.
        let from = caster_pos;
        if matches!(def.kind, SkillKind::Dash | SkillKind::Blink) {
            caster_transform.translation = Vec3::new(point.x, caster_pos.y, point.z);
            let dir = (point - from).normalize_or_zero();
            if dir != Vec3::ZERO {
                caster_transform.rotation = Quat::from_rotation_y(dir.x.atan2(dir.z));
            }
        }

        // Dispatch the visual routine; combat state is already final.
        // Beams point at the struck target; dashes and blinks point at
        // the travel destination.
        let to_point = match def.kind {
            SkillKind::Beam => hit_list.first().map(|(_, p)| *p).unwrap_or(point),
            _ => point,
        };
        let params = SkillEffectParams {
            skill,
            center: point,
            from: matches!(def.kind, SkillKind::Beam | SkillKind::Dash | SkillKind::Blink)
                .then_some(from),
            to: matches!(def.kind, SkillKind::Beam | SkillKind::Dash | SkillKind::Blink)
                .then_some(to_point),
            radius: def.radius,
            targets: hit_list,
            caster,
            caster_pos: from,
            damage,
        };
        let mut fx = FxContext {
            commands: &mut commands,
            governor: &governor,
            rng: &mut rng,
            now,
        };
        registry.execute(&mut fx, &params);
    }
}

/// Handle deaths: enemy corpses burst and queue a respawn, the player is
/// revived at the home village.
pub fn process_deaths(
    clock: Res<SimClock>,
    governor: Res<PerfGovernor>,
    villages: Res<VillageMap>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut log: ResMut<CombatLog>,
    mut deaths: EventReader<DeathEvent>,
    mut sounds: EventWriter<SoundEvent>,
    mut actors: Query<(Entity, &mut Transform, &mut Vitals, Option<&Enemy>, Option<&Player>)>,
) {
    let now = clock.now;
    for death in deaths.read() {
        let Ok((entity, mut transform, mut vitals, enemy, player)) = actors.get_mut(death.victim)
        else {
            continue;
        };

        let pos = transform.translation;
        {
            let mut fx = FxContext {
                commands: &mut commands,
                governor: &governor,
                rng: &mut rng,
                now,
            };
            if fx.governor.should_spawn_vfx(FxKind::Burst, pos) {
                fx.impact_burst(pos, 1.6, Color::srgb(0.9, 0.3, 0.3), 1.0);
                fx.ring(
                    Vec3::new(pos.x, 0.0, pos.z),
                    0.8,
                    Color::srgb(0.9, 0.3, 0.3),
                    0.7,
                    Some(2.2),
                );
            }
        }
        sounds.send(SoundEvent::new(SoundKey::Death));

        if enemy.is_some() {
            commands
                .entity(entity)
                .insert(Respawning { at: now + ENEMY_RESPAWN_DELAY });
            // Sink the corpse out of sight until it respawns.
            transform.translation.y = -2.0;
        } else if player.is_some() {
            vitals.hp = vitals.max_hp;
            vitals.mp = vitals.max_mp;
            if let Some(center) = villages.village_center(HOME_VILLAGE) {
                transform.translation = center + Vec3::Y * pos.y.max(0.0);
            }
            log.log(
                CombatLogEventType::WorldEvent,
                "Player falls and awakens at the village shrine".to_string(),
            );
        }
    }
}

/// Bring respawning enemies back once their timer elapses. Optional
/// late-frame work: skipped entirely on over-budget frames.
pub fn respawn_actors(
    clock: Res<SimClock>,
    budget: Res<FrameBudget>,
    mut commands: Commands,
    mut log: ResMut<CombatLog>,
    mut respawning: Query<(Entity, &mut Transform, &mut Vitals, &Enemy, &Respawning)>,
) {
    if budget.over_budget() {
        return;
    }
    for (entity, mut transform, mut vitals, enemy, respawn) in respawning.iter_mut() {
        if clock.now < respawn.at {
            continue;
        }
        vitals.hp = vitals.max_hp;
        transform.translation = enemy.spawn_point;
        commands.entity(entity).remove::<Respawning>();
        log.log(
            CombatLogEventType::WorldEvent,
            "A riftspawn re-forms in the wilds".to_string(),
        );
    }
}

/// Announce village border crossings. Optional late-frame work: skipped
/// entirely on over-budget frames, so a hint may arrive a frame late.
pub fn village_proximity_hints(
    budget: Res<FrameBudget>,
    villages: Res<VillageMap>,
    mut hints: EventWriter<HudHintEvent>,
    mut last_zone: Local<Option<u8>>,
    player: Query<&Transform, With<Player>>,
) {
    if budget.over_budget() {
        return;
    }
    let Ok(transform) = player.get_single() else {
        return;
    };
    let zone = villages.zone_at(transform.translation);
    if zone != *last_zone {
        match zone {
            Some(id) => hints.send(HudHintEvent {
                text: format!("Entering village {} - combat is restricted here", id),
            }),
            None => hints.send(HudHintEvent {
                text: "Leaving the village - the wilds are hostile".to_string(),
            }),
        };
        *last_zone = zone;
    }
}

/// Player mana regeneration.
pub fn regen_mana(clock: Res<SimClock>, mut player: Query<&mut Vitals, With<Player>>) {
    for mut vitals in player.iter_mut() {
        if vitals.is_alive() {
            vitals.mp = (vitals.mp + MANA_REGEN_PER_SEC * clock.delta).min(vitals.max_mp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_damage_floors_and_applies_uplift() {
        // floor(20 * 1.5) = 30, then * 1.2 floored = 36
        assert_eq!(basic_attack_damage(20, 1.5, 1.2), 36);
        // no buffs: identity
        assert_eq!(basic_attack_damage(20, 1.0, 1.0), 20);
    }

    #[test]
    fn skill_damage_scales_with_level_but_floor_once() {
        // level 1: growth^0 = 1
        assert_eq!(skill_damage(42.0, 1.12, 1, 1.0), 42);
        // level 3: 42 * 1.12^2 = 52.68.. -> 52
        assert_eq!(skill_damage(42.0, 1.12, 3, 1.0), 52);
        // buff applies before flooring
        assert_eq!(skill_damage(42.0, 1.12, 1, 1.5), 63);
    }

    #[test]
    fn chain_never_revisits_and_respects_jump_cap() {
        let e = |i| Entity::from_raw(i);
        let candidates = vec![
            (e(1), Vec3::new(5.0, 0.0, 0.0)),
            (e(2), Vec3::new(10.0, 0.0, 0.0)),
            (e(3), Vec3::new(15.0, 0.0, 0.0)),
            (e(4), Vec3::new(60.0, 0.0, 0.0)), // out of reach
        ];
        let hits = chain_targets(Vec3::ZERO, 8.0, 5, &candidates, &[]);
        let ids: Vec<Entity> = hits.iter().map(|(e, _)| *e).collect();
        assert_eq!(ids, vec![e(1), e(2), e(3)]);

        let capped = chain_targets(Vec3::ZERO, 8.0, 2, &candidates, &[]);
        assert_eq!(capped.len(), 2);

        // The already-hit primary is never chained back into.
        let skipping = chain_targets(Vec3::ZERO, 8.0, 5, &candidates, &[e(1)]);
        let ids: Vec<Entity> = skipping.iter().map(|(e, _)| *e).collect();
        assert!(!ids.contains(&e(1)));
    }

    #[test]
    fn segment_distance_measures_perpendicular_and_endpoints() {
        let a = Vec3::ZERO;
        let b = Vec3::new(10.0, 0.0, 0.0);
        assert!((segment_distance(Vec3::new(5.0, 0.0, 3.0), a, b) - 3.0).abs() < 1e-5);
        assert!((segment_distance(Vec3::new(-4.0, 0.0, 0.0), a, b) - 4.0).abs() < 1e-5);
        assert!((segment_distance(Vec3::new(13.0, 0.0, 0.0), a, b) - 3.0).abs() < 1e-5);
    }
}

//! Enemy AI
//!
//! Riftspawn behavior: notice the player inside an aggro radius, close to
//! melee range, and swing on a per-enemy cooldown ledger. The whole pass
//! runs at a stride the performance governor widens under load; movement
//! compensates with a stride-scaled delta so pursuit speed stays constant.

use bevy::prelude::*;

use crate::combat::events::{DamageEvent, DamageKind, DeathEvent, SoundEvent, SoundKey};
use crate::combat::log::CombatLog;
use crate::world::components::*;
use crate::world::effects::FxContext;
use crate::world::perf::{FxKind, PerfGovernor};
use crate::world::skills::types::AbilityKey;
use crate::world::zones::VillageMap;
use crate::world::{ENEMY_MOVE_SPEED, WORLD_HALF_SIZE};

/// Pursue and swing at the player.
pub fn enemy_ai(
    clock: Res<SimClock>,
    stride: Res<AiStride>,
    governor: Res<PerfGovernor>,
    villages: Res<VillageMap>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut log: ResMut<CombatLog>,
    mut sounds: EventWriter<SoundEvent>,
    mut damage_events: EventWriter<DamageEvent>,
    mut deaths: EventWriter<DeathEvent>,
    mut enemies: Query<
        (Entity, &mut Transform, &Vitals, &Enemy, &mut CooldownLedger),
        Without<Player>,
    >,
    mut player: Query<(Entity, &Transform, &mut Vitals), With<Player>>,
) {
    if !stride.should_run() {
        return;
    }
    let Ok((player_entity, player_transform, mut player_vitals)) = player.get_single_mut() else {
        return;
    };
    if !player_vitals.is_alive() {
        return;
    }

    let now = clock.now;
    // Compensate for skipped frames so pursuit speed is stride-invariant.
    let dt = clock.delta * stride.stride.max(1) as f32;
    let player_pos = player_transform.translation;

    for (enemy_entity, mut transform, vitals, enemy, mut ledger) in enemies.iter_mut() {
        if !vitals.is_alive() {
            continue;
        }

        let my_pos = transform.translation;
        let to_player = Vec3::new(player_pos.x - my_pos.x, 0.0, player_pos.z - my_pos.z);
        let distance = to_player.length();
        if distance > enemy.aggro_radius {
            continue;
        }

        let direction = to_player.normalize_or_zero();
        if direction != Vec3::ZERO {
            transform.rotation = Quat::from_rotation_y(direction.x.atan2(direction.z));
        }

        if distance > enemy.attack_range {
            let next = my_pos + direction * ENEMY_MOVE_SPEED * dt;
            // Riftspawn never set foot inside a village.
            if villages.combat_zone_at(next).is_some() {
                continue;
            }
            transform.translation.x = next.x.clamp(-WORLD_HALF_SIZE, WORLD_HALF_SIZE);
            transform.translation.z = next.z.clamp(-WORLD_HALF_SIZE, WORLD_HALF_SIZE);
            continue;
        }

        if !ledger.is_ready(AbilityKey::Basic, now) {
            continue;
        }
        ledger.trigger(AbilityKey::Basic, now, enemy.swing_cooldown);

        let damage = vitals.base_damage;
        player_vitals.take_damage(damage);
        let killing_blow = !player_vitals.is_alive();
        log.log_damage("Riftspawn", "Player", "Swing", damage, killing_blow);
        damage_events.send(DamageEvent {
            source: enemy_entity,
            target: player_entity,
            amount: damage,
            kind: DamageKind::EnemySwing,
            killing_blow,
        });
        sounds.send(SoundEvent::new(SoundKey::Impact));

        let mut fx = FxContext {
            commands: &mut commands,
            governor: &governor,
            rng: &mut rng,
            now,
        };
        if fx.governor.should_spawn_vfx(FxKind::Flash, player_pos) {
            fx.flash_sphere(
                player_pos + Vec3::Y * 1.2,
                0.3,
                Color::srgb(0.9, 0.25, 0.2),
                0.2,
                1.0,
            );
        }
        fx.damage_popup(player_pos, damage, false);

        if killing_blow {
            deaths.send(DeathEvent {
                victim: player_entity,
                killer: Some(enemy_entity),
            });
            break;
        }
    }
}

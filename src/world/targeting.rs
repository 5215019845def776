//! Target Acquisition
//!
//! Aim-cone candidate selection and impact-point resolution, computed
//! once per cast. The cone heuristic is deliberately cheap: score every
//! alive enemy inside a forward half-angle cone and keep the best - no
//! spatial index, ties broken by iteration order (first found wins).

use bevy::prelude::*;

/// Cosine of the aim cone's half angle (~40 degrees).
pub const AIM_CONE_COS: f32 = 0.766;

/// Ephemeral targeting snapshot for a single cast.
#[derive(Debug, Clone)]
pub struct TargetingContext {
    pub source: Vec3,
    /// Explicit target, already validated alive by the caller.
    pub explicit: Option<Entity>,
    /// Aim-cone candidate, if any.
    pub aim: Option<Entity>,
    /// Resolved impact point: explicit point > target position > forward
    /// fallback.
    pub point: Vec3,
}

/// Pick the best target inside the forward aim cone.
///
/// Score is `2 * alignment - 0.01 * projected_distance`, favoring enemies
/// closest to the facing line, with a weak preference for nearer ones.
pub fn target_in_aim_cone(
    origin: Vec3,
    facing: Vec3,
    range: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<Entity> {
    let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    if forward == Vec3::ZERO {
        return None;
    }

    let mut best: Option<(Entity, f32)> = None;
    for (entity, pos) in candidates {
        let offset = Vec3::new(pos.x - origin.x, 0.0, pos.z - origin.z);
        let distance = offset.length();
        if distance > range || distance < 1e-3 {
            continue;
        }

        let dir = offset / distance;
        let alignment = dir.dot(forward);
        if alignment < AIM_CONE_COS {
            continue;
        }

        let projected = distance * alignment;
        let score = 2.0 * alignment - 0.01 * projected;
        // Strict comparison: the first candidate found wins ties.
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((entity, score));
        }
    }

    best.map(|(entity, _)| entity)
}

/// Nearest candidate within `range` of `origin`, on the ground plane.
pub fn nearest_within(
    origin: Vec3,
    range: f32,
    candidates: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Option<(Entity, Vec3)> {
    let mut best: Option<(Entity, Vec3, f32)> = None;
    for (entity, pos) in candidates {
        let d = Vec3::new(pos.x - origin.x, 0.0, pos.z - origin.z).length();
        if d > range {
            continue;
        }
        if best.map_or(true, |(_, _, bd)| d < bd) {
            best = Some((entity, pos, d));
        }
    }
    best.map(|(entity, pos, _)| (entity, pos))
}

/// Resolve the impact point for a cast: explicit point wins, then the
/// target's position, then a point directly ahead of the actor.
pub fn resolve_impact_point(
    source: Vec3,
    facing: Vec3,
    explicit_point: Option<Vec3>,
    target_pos: Option<Vec3>,
    fallback_range: f32,
) -> Vec3 {
    if let Some(point) = explicit_point {
        return point;
    }
    if let Some(pos) = target_pos {
        return pos;
    }
    let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    source + forward * fallback_range
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ent(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn cone_prefers_aligned_over_near() {
        let origin = Vec3::ZERO;
        let facing = Vec3::Z;
        // Dead ahead but further vs. nearer but off to the side.
        let ahead = (ent(1), Vec3::new(0.0, 0.0, 12.0));
        let offside = (ent(2), Vec3::new(5.0, 0.0, 6.0));
        let picked = target_in_aim_cone(origin, facing, 20.0, vec![offside, ahead]);
        assert_eq!(picked, Some(ent(1)));
    }

    #[test]
    fn cone_rejects_behind_and_out_of_range() {
        let origin = Vec3::ZERO;
        let facing = Vec3::Z;
        let behind = (ent(1), Vec3::new(0.0, 0.0, -5.0));
        let too_far = (ent(2), Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(target_in_aim_cone(origin, facing, 20.0, vec![behind, too_far]), None);
    }

    #[test]
    fn cone_first_found_wins_ties() {
        let origin = Vec3::ZERO;
        let facing = Vec3::Z;
        // Two candidates at mirrored positions score identically.
        let left = (ent(1), Vec3::new(-1.0, 0.0, 10.0));
        let right = (ent(2), Vec3::new(1.0, 0.0, 10.0));
        assert_eq!(
            target_in_aim_cone(origin, facing, 20.0, vec![left, right]),
            Some(ent(1))
        );
    }

    #[test]
    fn nearest_within_range() {
        let near = (ent(1), Vec3::new(3.0, 0.0, 0.0));
        let far = (ent(2), Vec3::new(9.0, 0.0, 0.0));
        let found = nearest_within(Vec3::ZERO, 10.0, vec![far, near]);
        assert_eq!(found.map(|(e, _)| e), Some(ent(1)));
        assert_eq!(nearest_within(Vec3::ZERO, 2.0, vec![far, near]), None);
    }

    #[test]
    fn impact_point_priority() {
        let source = Vec3::ZERO;
        let facing = Vec3::Z;
        let explicit = Some(Vec3::new(1.0, 0.0, 1.0));
        let target = Some(Vec3::new(2.0, 0.0, 2.0));

        assert_eq!(
            resolve_impact_point(source, facing, explicit, target, 8.0),
            Vec3::new(1.0, 0.0, 1.0)
        );
        assert_eq!(
            resolve_impact_point(source, facing, None, target, 8.0),
            Vec3::new(2.0, 0.0, 2.0)
        );
        assert_eq!(
            resolve_impact_point(source, facing, None, None, 8.0),
            Vec3::new(0.0, 0.0, 8.0)
        );
    }
}

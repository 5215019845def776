//! Village Safe Zones
//!
//! Villages are circular safe regions with identity. Combat across two
//! *different* villages is rejected; same-zone and zone-to-open-world
//! attacks are allowed. Zone identity for combat checks uses a shrunken
//! radius so actors straddling a boundary are treated as open-world,
//! preventing false rejections.

use bevy::prelude::*;

/// Boundary tolerance in units. An actor within this band of a village
/// edge counts as open-world for combat-legality checks.
pub const ZONE_TOLERANCE: f32 = 2.0;

/// A single village safe zone.
#[derive(Debug, Clone, Copy)]
pub struct Village {
    pub id: u8,
    pub center: Vec3,
    pub radius: f32,
}

impl Village {
    fn contains(&self, pos: Vec3, radius: f32) -> bool {
        // Zone membership is a ground-plane test; height is ignored.
        let dx = pos.x - self.center.x;
        let dz = pos.z - self.center.z;
        dx * dx + dz * dz <= radius * radius
    }
}

/// All villages in the world.
#[derive(Resource, Debug, Clone, Default)]
pub struct VillageMap {
    pub villages: Vec<Village>,
}

impl VillageMap {
    /// The village a position is inside, using the full radius.
    pub fn zone_at(&self, pos: Vec3) -> Option<u8> {
        self.villages
            .iter()
            .find(|v| v.contains(pos, v.radius))
            .map(|v| v.id)
    }

    /// The village a position is inside for combat-legality purposes
    /// (radius shrunken by [`ZONE_TOLERANCE`]).
    pub fn combat_zone_at(&self, pos: Vec3) -> Option<u8> {
        self.villages
            .iter()
            .find(|v| v.contains(pos, (v.radius - ZONE_TOLERANCE).max(0.0)))
            .map(|v| v.id)
    }

    /// Whether an attack from `a` to `b` is legal. Only attacks spanning
    /// two different villages are rejected.
    pub fn can_engage(&self, a: Vec3, b: Vec3) -> bool {
        match (self.combat_zone_at(a), self.combat_zone_at(b)) {
            (Some(za), Some(zb)) => za == zb,
            _ => true,
        }
    }

    /// Center of the named village, used for respawns.
    pub fn village_center(&self, id: u8) -> Option<Vec3> {
        self.villages.iter().find(|v| v.id == id).map(|v| v.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_villages() -> VillageMap {
        VillageMap {
            villages: vec![
                Village { id: 0, center: Vec3::new(-30.0, 0.0, 0.0), radius: 10.0 },
                Village { id: 1, center: Vec3::new(30.0, 0.0, 0.0), radius: 10.0 },
            ],
        }
    }

    #[test]
    fn cross_village_attacks_rejected() {
        let map = two_villages();
        let in_a = Vec3::new(-30.0, 0.0, 0.0);
        let in_b = Vec3::new(30.0, 0.0, 0.0);
        assert!(!map.can_engage(in_a, in_b));
    }

    #[test]
    fn same_zone_and_open_world_allowed() {
        let map = two_villages();
        let in_a = Vec3::new(-30.0, 0.0, 0.0);
        let also_a = Vec3::new(-27.0, 0.0, 0.0);
        let wilds = Vec3::new(0.0, 0.0, 0.0);
        assert!(map.can_engage(in_a, also_a));
        assert!(map.can_engage(in_a, wilds));
        assert!(map.can_engage(wilds, in_a));
    }

    #[test]
    fn boundary_tolerance_prevents_false_rejection() {
        let map = two_villages();
        // Just inside village 0's edge: within the tolerance band, so
        // treated as open-world and allowed to fight into village 1.
        let edge_of_a = Vec3::new(-30.0 + 9.5, 0.0, 0.0);
        let in_b = Vec3::new(30.0, 0.0, 0.0);
        assert_eq!(map.zone_at(edge_of_a), Some(0));
        assert_eq!(map.combat_zone_at(edge_of_a), None);
        assert!(map.can_engage(edge_of_a, in_b));
    }

    #[test]
    fn village_center_lookup() {
        let map = two_villages();
        assert_eq!(map.village_center(1), Some(Vec3::new(30.0, 0.0, 0.0)));
        assert_eq!(map.village_center(7), None);
    }
}

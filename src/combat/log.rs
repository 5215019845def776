//! Combat Logging
//!
//! Records combat events for the HUD log panel and post-run analysis.

use bevy::prelude::*;

/// A single entry in the combat log
#[derive(Debug, Clone)]
pub struct CombatLogEntry {
    /// Timestamp in world time (seconds since startup)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Skill cast
    SkillCast,
    /// Actor died
    Death,
    /// World event (respawn, zone transition, startup)
    WorldEvent,
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current world time
    pub world_time: f32,
}

impl CombatLog {
    /// Clear the log for a fresh run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.world_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.world_time,
            event_type,
            message,
        });
    }

    /// Log applied damage in the standard format.
    pub fn log_damage(
        &mut self,
        source: &str,
        target: &str,
        ability: &str,
        amount: i32,
        killing_blow: bool,
    ) {
        let message = format!(
            "{}'s {} hits {} for {} damage",
            source, ability, target, amount
        );
        self.log(CombatLogEventType::Damage, message);
        if killing_blow {
            self.log(
                CombatLogEventType::Death,
                format!("{} has been destroyed", target),
            );
        }
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Number of damage entries recorded so far.
    pub fn damage_entry_count(&self) -> usize {
        self.filter_by_type(CombatLogEventType::Damage).len()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_log_records_kill_as_death_entry() {
        let mut log = CombatLog::default();
        log.world_time = 3.5;
        log.log_damage("Player", "Riftspawn 2", "Basic Attack", 24, true);

        assert_eq!(log.damage_entry_count(), 1);
        let deaths = log.filter_by_type(CombatLogEventType::Death);
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].timestamp, 3.5);
    }

    #[test]
    fn recent_returns_chronological_tail() {
        let mut log = CombatLog::default();
        for i in 0..5 {
            log.log(CombatLogEventType::WorldEvent, format!("event {}", i));
        }
        let tail = log.recent(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].message, "event 3");
        assert_eq!(tail[1].message, "event 4");
    }
}

//! Unit tests for the combat log
//!
//! These tests verify:
//! - Damage entries follow the standard parseable message format
//! - Killing blows produce a paired death entry
//! - Filtering and recency queries behave

use regex::Regex;
use riftbound::{CombatLog, CombatLogEventType};

#[test]
fn test_damage_message_format_is_parseable() {
    let mut log = CombatLog::default();
    log.world_time = 12.25;
    log.log_damage("Player", "Riftspawn", "Chain Spark", 34, false);

    let pattern = Regex::new(r"^(.+)'s (.+) hits (.+) for (\d+) damage$").unwrap();
    let entry = &log.entries[0];
    let caps = pattern
        .captures(&entry.message)
        .expect("damage message should match the standard format");

    assert_eq!(&caps[1], "Player");
    assert_eq!(&caps[2], "Chain Spark");
    assert_eq!(&caps[3], "Riftspawn");
    assert_eq!(caps[4].parse::<i32>().unwrap(), 34);
    assert_eq!(entry.timestamp, 12.25);
    assert_eq!(entry.event_type, CombatLogEventType::Damage);
}

#[test]
fn test_killing_blow_adds_death_entry() {
    let mut log = CombatLog::default();
    log.log_damage("Player", "Riftspawn", "Starfall", 99, true);

    assert_eq!(log.filter_by_type(CombatLogEventType::Damage).len(), 1);
    let deaths = log.filter_by_type(CombatLogEventType::Death);
    assert_eq!(deaths.len(), 1);
    assert!(deaths[0].message.contains("destroyed"));
}

#[test]
fn test_non_lethal_damage_has_no_death_entry() {
    let mut log = CombatLog::default();
    log.log_damage("Riftspawn", "Player", "Swing", 8, false);
    assert!(log.filter_by_type(CombatLogEventType::Death).is_empty());
}

#[test]
fn test_clear_resets_time_and_entries() {
    let mut log = CombatLog::default();
    log.world_time = 50.0;
    log.log(CombatLogEventType::WorldEvent, "something happened".to_string());
    log.clear();

    assert!(log.entries.is_empty());
    assert_eq!(log.world_time, 0.0);
}

#[test]
fn test_recent_keeps_chronological_order() {
    let mut log = CombatLog::default();
    for i in 0..10 {
        log.log(CombatLogEventType::WorldEvent, format!("event {}", i));
    }

    let recent = log.recent(3);
    let messages: Vec<&str> = recent.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["event 7", "event 8", "event 9"]);
}

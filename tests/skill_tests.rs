//! Unit tests for skill definitions
//!
//! These tests verify that:
//! - All skills load from the RON config with valid stat values
//! - Kind-specific parameters (jumps, buffs, radii) are present
//! - Loadout resolution produces four valid, distinct skills

use riftbound::settings::resolve_loadout;
use riftbound::world::skills::types::{SkillId, SkillKind};
use riftbound::SkillDefinitions;

/// Helper to load skill definitions for tests
fn load_skills() -> SkillDefinitions {
    SkillDefinitions::default()
}

#[test]
fn test_all_skills_have_names() {
    let skills = load_skills();
    for skill in SkillId::all() {
        let def = skills.get_unchecked(&skill);
        assert!(!def.name.is_empty(), "{:?} should have a name", skill);
    }
}

#[test]
fn test_all_skills_have_non_negative_costs() {
    let skills = load_skills();
    for skill in SkillId::all() {
        let def = skills.get_unchecked(&skill);
        assert!(
            def.mana_cost >= 0.0,
            "{:?} should have non-negative mana cost, got {}",
            skill,
            def.mana_cost
        );
        assert!(
            def.cooldown >= 0.0,
            "{:?} should have non-negative cooldown, got {}",
            skill,
            def.cooldown
        );
    }
}

#[test]
fn test_all_skills_have_positive_range() {
    let skills = load_skills();
    for skill in SkillId::all() {
        let def = skills.get_unchecked(&skill);
        assert!(
            def.range > 0.0,
            "{:?} should have positive range, got {}",
            skill,
            def.range
        );
    }
}

#[test]
fn test_damage_skills_scale_upward_with_level() {
    let skills = load_skills();
    for skill in SkillId::all() {
        let def = skills.get_unchecked(&skill);
        if def.damage_base > 0.0 {
            assert!(
                def.level_growth >= 1.0,
                "{:?} growth {} would shrink damage with level",
                skill,
                def.level_growth
            );
        }
    }
}

#[test]
fn test_area_skills_have_radius() {
    let skills = load_skills();
    for skill in SkillId::all() {
        let def = skills.get_unchecked(&skill);
        if matches!(def.kind, SkillKind::Area | SkillKind::Nova) {
            assert!(
                def.radius > 0.0,
                "{:?} is an area shape and needs a radius",
                skill
            );
        }
    }
}

#[test]
fn test_chain_skill_parameters() {
    let skills = load_skills();
    let spark = skills.get_unchecked(&SkillId::ChainSpark);
    assert_eq!(spark.kind, SkillKind::Chain);
    assert!(spark.jump_count > 0);
    assert!(spark.jump_range > 0.0);
}

#[test]
fn test_aura_skill_parameters() {
    let skills = load_skills();
    let ward = skills.get_unchecked(&SkillId::EmberWard);
    assert_eq!(ward.kind, SkillKind::Aura);
    assert!(ward.buff_multiplier > 1.0);
    assert!(ward.buff_duration > 0.0);
}

#[test]
fn test_loadout_resolution_always_yields_four_distinct_skills() {
    let cases: Vec<Vec<String>> = vec![
        vec![],
        vec!["Starfall".into(), "Starfall".into()],
        vec!["bogus".into(), "".into(), "Blink".into(), "Blink".into()],
    ];
    for raw in cases {
        let resolved = resolve_loadout(&raw);
        let unique: std::collections::HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), 4, "loadout {:?} resolved with duplicates", raw);
    }
}

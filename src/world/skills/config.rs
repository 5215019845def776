//! Data-Driven Skill Configuration
//!
//! Skill stats are defined in `assets/config/skills.ron` rather than
//! hardcoded, so balance changes don't require recompilation. All skills
//! are validated to exist at startup.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{SkillId, SkillKind};

fn default_growth() -> f32 {
    1.0
}

/// Immutable descriptor for one skill, loaded from RON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Display name
    pub name: String,
    /// Resource cost
    pub mana_cost: f32,
    /// Cooldown after cast in seconds
    pub cooldown: f32,
    /// Base damage before level scaling
    #[serde(default)]
    pub damage_base: f32,
    /// Per-level damage growth factor: damage = base * growth^(level-1)
    #[serde(default = "default_growth")]
    pub level_growth: f32,
    /// Effect radius in units (areas, novas)
    #[serde(default)]
    pub radius: f32,
    /// Maximum cast range in units
    pub range: f32,
    /// Chain jump count
    #[serde(default)]
    pub jump_count: u8,
    /// Chain jump search radius
    #[serde(default)]
    pub jump_range: f32,
    /// Damage-buff multiplier (aura skills)
    #[serde(default)]
    pub buff_multiplier: f32,
    /// Damage-buff duration in seconds (aura skills)
    #[serde(default)]
    pub buff_duration: f32,
    /// Shape/type tag (target resolution + fallback visuals/sound only)
    pub kind: SkillKind,
}

/// Root structure for the skills.ron file
#[derive(Debug, Serialize, Deserialize)]
pub struct SkillsConfig {
    pub skills: HashMap<SkillId, SkillConfig>,
}

/// Resource containing all skill definitions.
///
/// Loaded from `assets/config/skills.ron` at startup. Access via
/// `Res<SkillDefinitions>` in systems.
#[derive(Resource)]
pub struct SkillDefinitions {
    definitions: HashMap<SkillId, SkillConfig>,
}

impl Default for SkillDefinitions {
    /// Load skill definitions from the default config file.
    /// Panics if the file cannot be loaded - use for tests only.
    fn default() -> Self {
        load_skill_definitions().expect("Failed to load skill definitions in Default impl")
    }
}

impl SkillDefinitions {
    pub fn new(config: SkillsConfig) -> Self {
        Self { definitions: config.skills }
    }

    pub fn get(&self, skill: &SkillId) -> Option<&SkillConfig> {
        self.definitions.get(skill)
    }

    /// Get the configuration for a skill, panicking if not found.
    /// Use this when you know the skill must exist (validated at startup).
    pub fn get_unchecked(&self, skill: &SkillId) -> &SkillConfig {
        self.definitions
            .get(skill)
            .unwrap_or_else(|| panic!("Skill {:?} not found in definitions", skill))
    }

    /// Check that every skill id has a definition.
    pub fn validate(&self) -> Result<(), Vec<SkillId>> {
        let missing: Vec<SkillId> = SkillId::all()
            .into_iter()
            .filter(|skill| !self.definitions.contains_key(skill))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &SkillId> {
        self.definitions.keys()
    }
}

/// Load skill definitions from assets/config/skills.ron
pub fn load_skill_definitions() -> Result<SkillDefinitions, String> {
    let config_path = "assets/config/skills.ron";

    let contents = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read {}: {}", config_path, e))?;

    let config: SkillsConfig =
        ron::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", config_path, e))?;

    let definitions = SkillDefinitions::new(config);

    definitions
        .validate()
        .map_err(|missing| format!("Missing skill definitions: {:?}", missing))?;

    info!(
        "Loaded {} skill definitions from {}",
        definitions.definitions.len(),
        config_path
    );

    Ok(definitions)
}

/// Bevy plugin for skill configuration loading
pub struct SkillConfigPlugin;

impl Plugin for SkillConfigPlugin {
    fn build(&self, app: &mut App) {
        match load_skill_definitions() {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                // Config must be valid for the game to function at all.
                panic!("Failed to load skill definitions: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_skills_defined_and_valid() {
        let defs = SkillDefinitions::default();
        assert!(defs.validate().is_ok());

        for skill in SkillId::all() {
            let def = defs.get_unchecked(&skill);
            assert!(!def.name.is_empty(), "{:?} should have a name", skill);
            assert!(def.mana_cost >= 0.0, "{:?} mana cost negative", skill);
            assert!(def.cooldown >= 0.0, "{:?} cooldown negative", skill);
            assert!(def.range > 0.0, "{:?} should have positive range", skill);
            assert!(def.level_growth >= 1.0, "{:?} growth below 1.0", skill);
        }
    }

    #[test]
    fn chain_skills_have_jump_parameters() {
        let defs = SkillDefinitions::default();
        let spark = defs.get_unchecked(&SkillId::ChainSpark);
        assert_eq!(spark.kind, SkillKind::Chain);
        assert!(spark.jump_count > 0);
        assert!(spark.jump_range > 0.0);
    }

    #[test]
    fn aura_skills_have_buff_parameters() {
        let defs = SkillDefinitions::default();
        let ward = defs.get_unchecked(&SkillId::EmberWard);
        assert_eq!(ward.kind, SkillKind::Aura);
        assert!(ward.buff_multiplier > 1.0);
        assert!(ward.buff_duration > 0.0);
    }
}

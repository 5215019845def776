//! JSON configuration parsing for headless mode
//!
//! Parses JSON scenario configurations for windowless encounter runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::skills::types::SkillId;

/// Headless scenario configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessScenarioConfig {
    /// Simulated seconds to run before reporting (default: 60)
    #[serde(default = "default_duration")]
    pub duration_secs: f32,
    /// Number of riftspawn to scatter through the wilds (default: 8)
    #[serde(default = "default_enemy_count")]
    pub enemy_count: usize,
    /// Skill loadout by name; empty uses the default loadout
    #[serde(default)]
    pub loadout: Vec<String>,
    /// Seconds between scripted skill casts (default: 1.5)
    #[serde(default = "default_cast_interval")]
    pub cast_interval: f32,
    /// Custom output path for the scenario report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Random seed for deterministic scenario reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_duration() -> f32 {
    60.0
}

fn default_enemy_count() -> usize {
    8
}

fn default_cast_interval() -> f32 {
    1.5
}

impl Default for HeadlessScenarioConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration(),
            enemy_count: default_enemy_count(),
            loadout: Vec::new(),
            cast_interval: default_cast_interval(),
            output_path: None,
            random_seed: None,
        }
    }
}

impl HeadlessScenarioConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessScenarioConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_secs <= 0.0 {
            return Err("duration_secs must be positive".to_string());
        }
        if self.enemy_count == 0 || self.enemy_count > 64 {
            return Err("enemy_count must be between 1 and 64".to_string());
        }
        if self.cast_interval < 0.1 {
            return Err("cast_interval must be at least 0.1 seconds".to_string());
        }
        for name in &self.loadout {
            if SkillId::parse(name).is_none() {
                return Err(format!("Unknown skill in loadout: {}", name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(HeadlessScenarioConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_loadout_skill() {
        let config = HeadlessScenarioConfig {
            loadout: vec!["Fireball".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_degenerate_scenarios() {
        let no_enemies = HeadlessScenarioConfig { enemy_count: 0, ..Default::default() };
        assert!(no_enemies.validate().is_err());

        let no_time = HeadlessScenarioConfig { duration_secs: 0.0, ..Default::default() };
        assert!(no_time.validate().is_err());
    }

    #[test]
    fn parses_minimal_json() {
        let config: HeadlessScenarioConfig =
            serde_json::from_str(r#"{"duration_secs": 10.0}"#).unwrap();
        assert_eq!(config.duration_secs, 10.0);
        assert_eq!(config.enemy_count, 8);
        assert!(config.random_seed.is_none());
    }
}

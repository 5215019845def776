//! Game settings and configuration
//!
//! Manages user preferences for graphics, visual quality, the skill
//! loadout, and keybindings. Persisted to `settings.ron` next to the
//! executable.

use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, PrimaryWindow, WindowMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::keybindings::Keybindings;
use crate::world::perf::VfxQuality;
use crate::world::skills::types::SkillId;

/// User-configurable game settings
#[derive(Resource, Clone, Debug, Serialize, Deserialize)]
pub struct GameSettings {
    pub window_mode: WindowModeOption,
    pub resolution: ResolutionOption,
    pub vsync: bool,
    pub vfx_quality: VfxQuality,
    /// Let the performance governor step the quality tier automatically.
    pub auto_quality: bool,
    pub target_fps: f32,
    /// Raw 4-slot loadout as skill names; validated by `resolve_loadout`.
    pub loadout: Vec<String>,
    pub keybindings: Keybindings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            window_mode: WindowModeOption::Windowed,
            resolution: ResolutionOption::HD720,
            vsync: true,
            vfx_quality: VfxQuality::High,
            auto_quality: true,
            target_fps: 60.0,
            loadout: DEFAULT_LOADOUT.iter().map(|s| s.name().to_string()).collect(),
            keybindings: Keybindings::default(),
        }
    }
}

/// Fallback loadout, also used to fill invalid or missing slots.
pub const DEFAULT_LOADOUT: [SkillId; 4] = [
    SkillId::Starfall,
    SkillId::ChainSpark,
    SkillId::FrostNova,
    SkillId::EmberWard,
];

impl GameSettings {
    /// Get the path to the settings file
    fn settings_path() -> PathBuf {
        PathBuf::from("settings.ron")
    }

    /// Load settings from file, or return default if file doesn't exist
    pub fn load() -> Self {
        let path = Self::settings_path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match ron::from_str(&contents) {
                    Ok(settings) => {
                        info!("Loaded settings from {:?}", path);
                        settings
                    }
                    Err(e) => {
                        warn!("Failed to parse settings file: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}", e);
                    Self::default()
                }
            }
        } else {
            info!("No settings file found, using defaults");
            Self::default()
        }
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::settings_path();
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(&path, contents)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Resolve the persisted loadout into a validated 4-slot mapping.
    ///
    /// Unknown names and missing slots fill from [`DEFAULT_LOADOUT`];
    /// duplicates are replaced by the first default skill not already in
    /// use, so the resolved loadout always holds four distinct skills.
    pub fn resolve_loadout(&self) -> [SkillId; 4] {
        resolve_loadout(&self.loadout)
    }
}

/// See [`GameSettings::resolve_loadout`].
pub fn resolve_loadout(raw: &[String]) -> [SkillId; 4] {
    let mut resolved: [SkillId; 4] = DEFAULT_LOADOUT;
    let mut used: Vec<SkillId> = Vec::with_capacity(4);

    for slot in 0..4 {
        let parsed = raw.get(slot).and_then(|name| SkillId::parse(name));
        let candidate = match parsed {
            Some(skill) if !used.contains(&skill) => skill,
            _ => {
                // Fill from the defaults, skipping anything already slotted.
                *DEFAULT_LOADOUT
                    .iter()
                    .chain(SkillId::all().iter())
                    .find(|s| !used.contains(*s))
                    .expect("skill pool is larger than the loadout")
            }
        };
        resolved[slot] = candidate;
        used.push(candidate);
    }
    resolved
}

/// Window mode options for the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowModeOption {
    Windowed,
    BorderlessFullscreen,
}

impl WindowModeOption {
    pub fn to_bevy(&self) -> WindowMode {
        match self {
            WindowModeOption::Windowed => WindowMode::Windowed,
            WindowModeOption::BorderlessFullscreen => {
                WindowMode::BorderlessFullscreen(MonitorSelection::Current)
            }
        }
    }
}

/// Resolution presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOption {
    HD720,
    HD1080,
    QHD1440,
}

impl ResolutionOption {
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            ResolutionOption::HD720 => (1280.0, 720.0),
            ResolutionOption::HD1080 => (1920.0, 1080.0),
            ResolutionOption::QHD1440 => (2560.0, 1440.0),
        }
    }
}

/// Plugin for managing game settings
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        let settings = GameSettings::load();
        let keybindings = settings.keybindings.clone();

        app.insert_resource(settings)
            .insert_resource(keybindings)
            .add_systems(Update, (save_settings_on_change, apply_runtime_settings, sync_keybindings));
    }
}

/// System to save settings when they change
fn save_settings_on_change(settings: Res<GameSettings>) {
    if settings.is_changed() && !settings.is_added() {
        if let Err(e) = settings.save() {
            error!("Failed to save settings: {}", e);
        }
    }
}

/// System to apply settings that can be changed at runtime (without restart)
/// Currently handles: VSync
fn apply_runtime_settings(
    settings: Res<GameSettings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if settings.is_changed() && !settings.is_added() {
        if let Ok(mut window) = windows.get_single_mut() {
            window.present_mode = if settings.vsync {
                PresentMode::AutoVsync
            } else {
                PresentMode::AutoNoVsync
            };
            info!("Applied VSync: {}", settings.vsync);
        }
    }
}

/// System to keep Keybindings resource in sync with GameSettings
fn sync_keybindings(settings: Res<GameSettings>, mut keybindings: ResMut<Keybindings>) {
    if settings.is_changed() && !settings.is_added() {
        *keybindings = settings.keybindings.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn valid_loadout_resolves_verbatim() {
        let raw = names(&["Blink", "Geyser", "RiftBeam", "ShadowDash"]);
        assert_eq!(
            resolve_loadout(&raw),
            [SkillId::Blink, SkillId::Geyser, SkillId::RiftBeam, SkillId::ShadowDash]
        );
    }

    #[test]
    fn unknown_names_fill_from_defaults() {
        let raw = names(&["Blink", "NotASkill", "RiftBeam"]);
        let resolved = resolve_loadout(&raw);
        assert_eq!(resolved[0], SkillId::Blink);
        assert_eq!(resolved[2], SkillId::RiftBeam);
        // Slots 1 and 3 fill from defaults without duplicating anything.
        let mut seen = resolved.to_vec();
        seen.dedup();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn duplicates_are_replaced() {
        let raw = names(&["Blink", "Blink", "Blink", "Blink"]);
        let resolved = resolve_loadout(&raw);
        assert_eq!(resolved[0], SkillId::Blink);
        let unique: std::collections::HashSet<_> = resolved.iter().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn empty_loadout_is_the_default() {
        assert_eq!(resolve_loadout(&[]), DEFAULT_LOADOUT);
    }
}

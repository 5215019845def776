//! Riftbound - Action RPG Combat Prototype
//!
//! A real-time action RPG slice: player movement, riftspawn combat, a
//! four-slot skill system with cooldowns and visual effects, and an
//! adaptive performance governor.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod camera;
pub mod cli;
pub mod combat;
pub mod headless;
pub mod keybindings;
pub mod rendering;
pub mod settings;
pub mod ui;
pub mod world;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use headless::{HeadlessScenarioConfig, ScenarioResult};
pub use world::skills::{SkillDefinitions, SkillId};

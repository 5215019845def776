//! Skill System
//!
//! Identifier types, RON-backed definitions, and the visual-effect
//! registry/dispatcher with its built-in routines.

pub mod config;
pub mod registry;
pub mod routines;
pub mod types;

pub use config::{SkillConfig, SkillConfigPlugin, SkillDefinitions};
pub use registry::{SkillEffectParams, SkillEffectRegistry};
pub use types::{AbilityKey, SkillId, SkillKind};

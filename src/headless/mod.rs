//! Headless mode for agentic testing
//!
//! This module provides functionality to run encounter scenarios without
//! any graphical output, suitable for automated testing and balance runs.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless scenario
//! cargo run --release -- --headless scenario.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "duration_secs": 60,
//!   "enemy_count": 8,
//!   "loadout": ["Starfall", "ChainSpark", "FrostNova", "EmberWard"],
//!   "random_seed": 42
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::HeadlessScenarioConfig;
pub use runner::{run_headless_scenario, ScenarioResult};

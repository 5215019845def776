//! Riftbound - Action RPG Combat Prototype
//!
//! A real-time action RPG slice: a player character, villages, riftspawn
//! packs, a four-slot skill loadout, and the combat/effects engine that
//! drives it. Runs graphically by default, or headless with `--headless`.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use riftbound::camera::CameraPlugin;
use riftbound::cli;
use riftbound::combat::CombatPlugin;
use riftbound::headless::{run_headless_scenario, HeadlessScenarioConfig};
use riftbound::rendering::RenderingPlugin;
use riftbound::settings::{GameSettings, SettingsPlugin};
use riftbound::ui::UiPlugin;
use riftbound::world::WorldPlugin;

fn main() {
    let args = cli::parse_args();

    if let Some(config_path) = args.headless {
        let mut config = match HeadlessScenarioConfig::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid headless config: {}", e);
                std::process::exit(1);
            }
        };
        if let Some(output) = args.output {
            config.output_path = Some(output.to_string_lossy().to_string());
        }
        if let Some(duration) = args.duration {
            config.duration_secs = duration;
        }
        if let Some(seed) = args.seed {
            config.random_seed = Some(seed);
        }
        if let Err(e) = run_headless_scenario(config) {
            eprintln!("Scenario failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Window settings come from the persisted user settings.
    let settings = GameSettings::load();
    let (width, height) = settings.resolution.dimensions();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Riftbound".to_string(),
                resolution: (width, height).into(),
                mode: settings.window_mode.to_bevy(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        // Our game plugins
        .add_plugins((
            EguiPlugin,
            SettingsPlugin,
            CombatPlugin,
            WorldPlugin,
            CameraPlugin,
            RenderingPlugin,
            UiPlugin,
        ))
        .run();
}

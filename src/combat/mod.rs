//! Combat Support
//!
//! Event definitions, the combat log, and the audio sink boundary. The
//! actual resolution logic lives in `world::combat_core`; this module is
//! the plumbing shared by the graphical shell, the headless runner, and
//! the tests.

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;
use crate::world::effects::entity::ProjectileImpactEvent;

/// Plugin wiring combat events and the log resource.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SoundEvent>()
            .add_event::<HitTestEvent>()
            .add_event::<AttackCommand>()
            .add_event::<CastCommand>()
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<HudHintEvent>()
            .add_event::<ProjectileImpactEvent>()
            .init_resource::<log::CombatLog>()
            .add_systems(Update, drain_sound_events);
    }
}

/// Audio collaborator boundary: sound requests are fire-and-forget and
/// failures are swallowed. The prototype logs them at debug level.
fn drain_sound_events(mut sounds: EventReader<SoundEvent>) {
    for sound in sounds.read() {
        debug!("sound: {:?} at volume {:.2}", sound.key, sound.volume);
    }
}

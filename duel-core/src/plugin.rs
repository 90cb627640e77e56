//! Bevy integration.
//!
//! The match lives in a `DuelMatch` resource and advances once per
//! `FixedUpdate` with the fixed timestep converted to milliseconds. Hosts
//! submit per-slot input through `DuelInputs` and read outcomes as
//! `DuelEvent`s. With a watched config file the match is rebuilt whenever
//! the file changes.

use std::path::PathBuf;

use bevy::prelude::*;

use crate::combat::events::CombatEvent;
use crate::combat::CombatSystem;
use crate::config::hotreload::ConfigWatcher;
use crate::config::MatchConfig;
use crate::fighter::PlayerSlot;
use crate::input::InputFrame;

pub struct DuelPlugin {
    pub config: MatchConfig,
    pub watch: Option<PathBuf>,
}

impl DuelPlugin {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            watch: None,
        }
    }

    /// Load the config from `path` and rebuild the match when it changes
    pub fn watching(path: impl Into<PathBuf>) -> Self {
        Self {
            config: MatchConfig::default(),
            watch: Some(path.into()),
        }
    }
}

impl Plugin for DuelPlugin {
    fn build(&self, app: &mut App) {
        let mut config = self.config.clone();
        if let Some(path) = &self.watch {
            match ConfigWatcher::new(path) {
                Ok(watcher) => {
                    config = watcher.current().clone();
                    app.insert_non_send_resource(DuelConfigWatcher(watcher))
                        .add_systems(Update, reload_duel_config);
                }
                Err(e) => warn!("Config watch disabled for {:?}: {}", path, e),
            }
        }

        match CombatSystem::headless(config) {
            Ok(system) => {
                app.insert_resource(DuelMatch(system));
            }
            Err(e) => error!("Invalid match config: {}", e),
        }

        app.init_resource::<DuelInputs>()
            .add_event::<DuelEvent>()
            .add_systems(FixedUpdate, tick_duel_match);
    }
}

#[derive(Resource, Deref, DerefMut)]
pub struct DuelMatch(pub CombatSystem);

/// Input submitted for the next fixed tick, one slot each. Consumed by the
/// tick; held movement persists on the fighter between submissions.
#[derive(Resource, Debug, Default)]
pub struct DuelInputs {
    frames: [Option<InputFrame>; 2],
}

impl DuelInputs {
    pub fn submit(&mut self, slot: PlayerSlot, frame: InputFrame) {
        self.frames[slot.index()] = Some(frame);
    }

    pub fn take(&mut self, slot: PlayerSlot) -> Option<InputFrame> {
        self.frames[slot.index()].take()
    }

    pub fn pending(&self, slot: PlayerSlot) -> Option<&InputFrame> {
        self.frames[slot.index()].as_ref()
    }
}

#[derive(Event, Debug, Clone, PartialEq, Deref)]
pub struct DuelEvent(pub CombatEvent);

struct DuelConfigWatcher(ConfigWatcher);

fn tick_duel_match(
    time: Res<Time>,
    duel: Option<ResMut<DuelMatch>>,
    mut inputs: ResMut<DuelInputs>,
    mut events: EventWriter<DuelEvent>,
) {
    let Some(mut duel) = duel else {
        return;
    };
    for slot in PlayerSlot::BOTH {
        if let Some(frame) = inputs.take(slot) {
            duel.apply_input(slot, &frame);
        }
    }
    duel.update(time.delta_secs() * 1000.0);
    for event in duel.drain_events() {
        events.send(DuelEvent(event));
    }
}

fn reload_duel_config(
    mut commands: Commands,
    mut watcher: NonSendMut<DuelConfigWatcher>,
) {
    let Some(config) = watcher.0.poll() else {
        return;
    };
    match CombatSystem::headless(config) {
        Ok(system) => {
            commands.insert_resource(DuelMatch(system));
            info!("Match rebuilt from reloaded config");
        }
        Err(e) => warn!("Reloaded config rejected: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::attacks::{AttackId, AttackKind, Loadout};
    use crate::fighter::FighterState;
    use crate::hitbox::BodyZone;

    fn app_with(config: MatchConfig) -> App {
        let mut app = App::new();
        app.add_plugins(DuelPlugin::new(config));
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_millis(16));
        app.insert_resource(time);
        app
    }

    #[test]
    fn test_plugin_inserts_match() {
        let app = app_with(MatchConfig::default());
        assert!(app.world().contains_resource::<DuelMatch>());
        assert!(app.world().contains_resource::<DuelInputs>());
    }

    #[test]
    fn test_invalid_config_leaves_no_match() {
        let mut config = MatchConfig::default();
        config.combat.block_reduction = 2.0;
        let app = app_with(config);
        assert!(!app.world().contains_resource::<DuelMatch>());
    }

    #[test]
    fn test_fixed_tick_consumes_inputs() {
        let mut app = app_with(MatchConfig::versus(Loadout::Bare, Loadout::Bare));
        app.world_mut()
            .resource_mut::<DuelInputs>()
            .submit(PlayerSlot::One, InputFrame::attacking(AttackKind::Light));
        app.world_mut().run_schedule(FixedUpdate);

        let duel = app.world().resource::<DuelMatch>();
        assert_eq!(duel.tick_count(), 1);
        assert!((duel.now_ms() - 16.0).abs() < 1e-3);
        assert_eq!(duel.fighter(PlayerSlot::One).state(), FighterState::Attack);
        assert!(app.world().resource::<DuelInputs>().pending(PlayerSlot::One).is_none());
    }

    #[test]
    fn test_combat_events_are_forwarded() {
        let mut app = app_with(MatchConfig::versus(Loadout::Bare, Loadout::Bare));
        app.world_mut()
            .resource_mut::<DuelMatch>()
            .apply_confirmed_hit(PlayerSlot::One, AttackId::Jab, BodyZone::Body);
        app.world_mut().run_schedule(FixedUpdate);

        assert!(app.world().resource::<Events<DuelEvent>>().len() >= 2);
        assert!(app.world().resource::<DuelMatch>().events().is_empty());
    }
}

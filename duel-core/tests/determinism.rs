//! Same config, same inputs, same tick sizes: identical matches

use duel_core::ai::profile::Difficulty;
use duel_core::attacks::Loadout;
use duel_core::config::FighterSetup;
use duel_core::replay::{play_back, state_digest, ReplayRecorder};
use duel_core::{CombatEvent, CombatSystem, MatchConfig};

const TICK_MS: f32 = 1000.0 / 60.0;

fn ai_vs_ai(seed: u64) -> MatchConfig {
    let mut config = MatchConfig::default();
    config.fighters = [FighterSetup::ai(Loadout::Sword), FighterSetup::ai(Loadout::Bare)];
    config.ai.difficulty = Difficulty::Hard;
    config.ai.seed = seed;
    config
}

fn simulate(config: &MatchConfig, ticks: u32) -> (String, Vec<CombatEvent>) {
    let mut system = CombatSystem::headless(config.clone()).unwrap();
    let mut events = Vec::new();
    for _ in 0..ticks {
        system.update(TICK_MS);
        events.extend(system.drain_events());
    }
    (state_digest(&system), events)
}

#[test]
fn identical_runs_produce_identical_matches() {
    let config = ai_vs_ai(1234);
    let (digest_a, events_a) = simulate(&config, 1800);
    let (digest_b, events_b) = simulate(&config, 1800);
    assert_eq!(digest_a, digest_b);
    assert_eq!(events_a, events_b);
}

#[test]
fn ai_match_replays_from_its_recording() {
    let config = ai_vs_ai(99);
    let mut system = CombatSystem::headless(config.clone()).unwrap();
    let mut recorder = ReplayRecorder::start(&config);
    for _ in 0..900 {
        recorder.step(&mut system, TICK_MS);
    }
    let recording = recorder.finish(&system);

    let report = play_back(&recording).unwrap();
    assert!(report.matches);
    assert_eq!(report.ticks, 900);
    assert_eq!(report.winner, system.winner());
}

#[test]
fn config_survives_ron_and_json() {
    let config = ai_vs_ai(7);
    let ron = config.to_ron_string();
    assert_eq!(MatchConfig::from_ron_str(&ron).unwrap(), config);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(MatchConfig::from_json_str(&json).unwrap(), config);
}

//! Input replay and determinism digest.
//!
//! A recording is the match config plus every input frame and every tick's
//! `dt_ms`. Replaying it through a fresh `CombatSystem` must land on the same
//! `state_digest` the original match ended with.
//!
//! Workflow:
//! 1. `ReplayRecorder::start(config)` alongside a new match
//! 2. drive the match through `recorder.apply_input` / `recorder.step`
//! 3. `recorder.finish(&system)` seals the recording with the final digest
//! 4. `play_back(&recording)` re-simulates and compares digests

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::{info, warn};

use crate::combat::CombatSystem;
use crate::config::{ConfigError, MatchConfig};
use crate::fighter::{Fighter, PlayerSlot};
use crate::hitbox::PoseProvider;
use crate::input::InputFrame;
use crate::meter::FighterMeter;

pub const REPLAY_FORMAT_VERSION: u32 = 1;

/// Input for one fighter, applied before tick `tick` is simulated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub slot: PlayerSlot,
    pub input: InputFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    pub version: u32,
    pub config: MatchConfig,
    pub duration_ticks: u64,
    pub winner: Option<PlayerSlot>,
    pub final_digest: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecording {
    pub header: ReplayHeader,
    /// `dt_ms` of every simulated tick, in order
    pub tick_dts: Vec<f32>,
    pub frames: Vec<ReplayFrame>,
}

impl ReplayRecording {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    config: MatchConfig,
    tick_dts: Vec<f32>,
    frames: Vec<ReplayFrame>,
}

impl ReplayRecorder {
    /// `config` must be the one the recorded match was built from
    pub fn start(config: &MatchConfig) -> Self {
        Self {
            config: config.clone(),
            tick_dts: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.tick_dts.len() as u64
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Record `frame` and forward it to the match
    pub fn apply_input<P: PoseProvider>(
        &mut self,
        system: &mut CombatSystem<P>,
        slot: PlayerSlot,
        frame: &InputFrame,
    ) {
        self.frames.push(ReplayFrame {
            tick: self.current_tick(),
            slot,
            input: *frame,
        });
        system.apply_input(slot, frame);
    }

    /// Record `dt_ms` and advance the match by one tick
    pub fn step<P: PoseProvider>(&mut self, system: &mut CombatSystem<P>, dt_ms: f32) {
        self.tick_dts.push(dt_ms);
        system.update(dt_ms);
    }

    pub fn finish<P: PoseProvider>(self, system: &CombatSystem<P>) -> ReplayRecording {
        let recording = ReplayRecording {
            header: ReplayHeader {
                version: REPLAY_FORMAT_VERSION,
                config: self.config,
                duration_ticks: self.tick_dts.len() as u64,
                winner: system.winner(),
                final_digest: state_digest(system),
            },
            tick_dts: self.tick_dts,
            frames: self.frames,
        };
        info!(
            ticks = recording.header.duration_ticks,
            frames = recording.frames.len(),
            "Replay recorded"
        );
        recording
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackReport {
    pub ticks: u64,
    pub digest: String,
    pub winner: Option<PlayerSlot>,
    pub matches: bool,
}

/// Re-simulate `recording` headlessly and compare the final digest
pub fn play_back(recording: &ReplayRecording) -> Result<PlaybackReport, ConfigError> {
    let mut system = CombatSystem::headless(recording.header.config.clone())?;
    let mut frames = recording.frames.iter().peekable();

    for (tick, &dt_ms) in recording.tick_dts.iter().enumerate() {
        while let Some(frame) = frames.next_if(|f| f.tick == tick as u64) {
            system.apply_input(frame.slot, &frame.input);
        }
        system.update(dt_ms);
    }
    // Inputs recorded after the last tick still count
    for frame in frames {
        system.apply_input(frame.slot, &frame.input);
    }

    let digest = state_digest(&system);
    let matches = digest == recording.header.final_digest;
    if !matches {
        warn!(
            expected = %recording.header.final_digest,
            actual = %digest,
            "Replay diverged"
        );
    }
    Ok(PlaybackReport {
        ticks: recording.tick_dts.len() as u64,
        digest,
        winner: system.winner(),
        matches,
    })
}

/// SHA3-256 over the authoritative state of both fighters, hex encoded
pub fn state_digest<P: PoseProvider>(system: &CombatSystem<P>) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update(system.tick_count().to_le_bytes());
    hasher.update(system.now_ms().to_le_bytes());
    for slot in PlayerSlot::BOTH {
        hash_fighter(&mut hasher, system.fighter(slot));
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn hash_fighter(hasher: &mut Sha3_256, fighter: &Fighter) {
    for value in [
        fighter.position.x,
        fighter.position.y,
        fighter.velocity.x,
        fighter.velocity.y,
        fighter.health(),
        fighter.clock_ms(),
        fighter.facing().sign(),
    ] {
        hasher.update(value.to_le_bytes());
    }
    hasher.update([fighter.state() as u8, fighter.loadout() as u8]);
    hasher.update(fighter.action_seq().to_le_bytes());
    match fighter.meter() {
        FighterMeter::Special(meter) => {
            hasher.update([0]);
            hasher.update(meter.value().to_le_bytes());
        }
        FighterMeter::Stun(stun) => {
            hasher.update([1]);
            hasher.update(stun.value().to_le_bytes());
            hasher.update(stun.remaining_ms().to_le_bytes());
        }
    }
}

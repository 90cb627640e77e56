//! Duel Core - 2D Fighting Game Combat Library
//!
//! Deterministic combat core for a one-on-one side-view fighter:
//! - Geometry primitives and overlap tests
//! - Attack catalog per loadout (bare hands, sword)
//! - Pose-driven hitboxes against head/body hurtboxes
//! - Fighter state machine with charge, block, hurt and stun
//! - Combat orchestrator (damage, meters, pushback, stomp, knockout)
//! - Rule-based AI opponent with telegraphed attacks
//! - Replay digest, balance simulation and a Bevy plugin

pub mod ai;
pub mod attacks;
pub mod balance;
pub mod combat;
pub mod config;
pub mod constants;
pub mod fighter;
pub mod geometry;
pub mod hitbox;
pub mod input;
pub mod logging;
pub mod meter;
pub mod plugin;
pub mod pose;
pub mod replay;
pub mod timer;

pub use combat::events::CombatEvent;
pub use combat::CombatSystem;
pub use config::{ConfigError, MatchConfig};
pub use fighter::{Fighter, PlayerSlot};
pub use input::InputFrame;
pub use plugin::DuelPlugin;

//! Per-match combat log.
//!
//! Append-only ring buffer owned by one `CombatSystem`; statistics are
//! derived from it and it is never consulted for game state.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::attacks::{AttackId, Loadout};
use crate::constants::COMBAT_LOG_CAPACITY;
use crate::fighter::PlayerSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    Hit,
    Blocked,
    PerfectBlock,
    Headshot,
    Stomp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: f32,
    pub kind: LogKind,
    pub attacker: PlayerSlot,
    pub defender: PlayerSlot,
    pub damage: f32,
    pub weapon: Loadout,
    pub attack: Option<String>,
}

/// Totals for one fighter as attacker (hits, damage, headshots, stomps)
/// and as defender (blocks, perfect blocks)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hits: u32,
    pub damage_dealt: f32,
    pub headshots: u32,
    pub stomps: u32,
    pub blocks: u32,
    pub perfect_blocks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for CombatLog {
    fn default() -> Self {
        Self::with_capacity(COMBAT_LOG_CAPACITY)
    }
}

impl CombatLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn record(
        &mut self,
        timestamp_ms: f32,
        kind: LogKind,
        attacker: PlayerSlot,
        defender: PlayerSlot,
        damage: f32,
        weapon: Loadout,
        attack: Option<AttackId>,
    ) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp_ms,
            kind,
            attacker,
            defender,
            damage,
            weapon,
            attack: attack.map(|id| id.definition().name.to_string()),
        });
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: LogKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self, player: PlayerSlot) -> CombatStats {
        let mut stats = CombatStats::default();
        for entry in &self.entries {
            if entry.attacker == player {
                stats.damage_dealt += entry.damage;
                match entry.kind {
                    LogKind::Hit => stats.hits += 1,
                    LogKind::Headshot => {
                        stats.hits += 1;
                        stats.headshots += 1;
                    }
                    LogKind::Stomp => stats.stomps += 1,
                    LogKind::Blocked | LogKind::PerfectBlock => {}
                }
            }
            if entry.defender == player {
                match entry.kind {
                    LogKind::Blocked => stats.blocks += 1,
                    LogKind::PerfectBlock => stats.perfect_blocks += 1,
                    _ => {}
                }
            }
        }
        stats
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

//! Headless AI-vs-AI balance simulation.
//!
//! Plays many full matches per (difficulty, loadout, loadout) pairing in
//! parallel with rayon. Every match gets its own seed, derived by hashing the
//! base seed with the pairing and match index, so a report is reproducible
//! from its config alone. Matches still running at the tick cap are draws.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::ai::profile::Difficulty;
use crate::attacks::Loadout;
use crate::combat::events::CombatEvent;
use crate::combat::CombatSystem;
use crate::config::{AiSettings, ConfigError, FighterSetup, MatchConfig};
use crate::fighter::PlayerSlot;
use crate::logging::TimingSpan;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub matches_per_pairing: u32,
    pub base_seed: u64,
    /// Match length cap; reaching it is a draw
    pub max_ticks: u64,
    pub dt_ms: f32,
    pub difficulties: Vec<Difficulty>,
    pub loadouts: Vec<Loadout>,
    /// Tuning shared by every simulated match; fighters and AI are overridden
    pub base: MatchConfig,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            matches_per_pairing: 50,
            base_seed: 42,
            max_ticks: 90 * 60,
            dt_ms: 1000.0 / 60.0,
            difficulties: Difficulty::ALL.to_vec(),
            loadouts: vec![Loadout::Bare, Loadout::Sword],
            base: MatchConfig::default(),
        }
    }
}

impl BalanceConfig {
    /// Every (difficulty, player one loadout, player two loadout) combination
    pub fn pairings(&self) -> Vec<Pairing> {
        let mut pairings = Vec::new();
        for &difficulty in &self.difficulties {
            for &one in &self.loadouts {
                for &two in &self.loadouts {
                    pairings.push(Pairing {
                        difficulty,
                        loadouts: [one, two],
                    });
                }
            }
        }
        pairings
    }

    fn match_config(&self, pairing: &Pairing, seed: u64) -> MatchConfig {
        MatchConfig {
            fighters: pairing.loadouts.map(FighterSetup::ai),
            ai: AiSettings {
                difficulty: pairing.difficulty,
                seed,
                ..self.base.ai.clone()
            },
            ..self.base.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub difficulty: Difficulty,
    pub loadouts: [Loadout; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairingResult {
    pub pairing: Pairing,
    pub matches: u32,
    pub wins: [u32; 2],
    pub draws: u32,
    /// Player one's share of all matches
    pub win_rate: f32,
    pub draw_rate: f32,
    pub avg_ticks: f32,
    pub avg_perfect_blocks: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub total_matches: u64,
    pub pairings: Vec<PairingResult>,
}

impl BalanceReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Pairing whose win rate is furthest from an even split
    pub fn most_lopsided(&self) -> Option<&PairingResult> {
        self.pairings.iter().max_by(|a, b| {
            let da = (a.win_rate - 0.5).abs();
            let db = (b.win_rate - 0.5).abs();
            da.total_cmp(&db)
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct MatchOutcome {
    pairing: usize,
    winner: Option<PlayerSlot>,
    ticks: u64,
    perfect_blocks: u32,
}

/// Seed for match `index` of pairing `pairing`
pub fn derive_seed(base_seed: u64, pairing: usize, index: u32) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update((pairing as u64).to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

pub fn run_balance_simulation(config: &BalanceConfig) -> Result<BalanceReport, ConfigError> {
    let _span = TimingSpan::new("balance_simulation");
    let pairings = config.pairings();

    let jobs: Vec<(usize, u32)> = (0..pairings.len())
        .flat_map(|p| (0..config.matches_per_pairing).map(move |i| (p, i)))
        .collect();

    let outcomes = jobs
        .par_iter()
        .map(|&(p, i)| {
            let seed = derive_seed(config.base_seed, p, i);
            simulate_match(config, &pairings[p], p, seed)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let results: Vec<PairingResult> = pairings
        .iter()
        .enumerate()
        .map(|(p, pairing)| summarize(*pairing, outcomes.iter().filter(|o| o.pairing == p)))
        .collect();

    info!(
        pairings = results.len(),
        matches = outcomes.len(),
        "Balance simulation finished"
    );
    Ok(BalanceReport {
        total_matches: outcomes.len() as u64,
        pairings: results,
    })
}

fn simulate_match(
    config: &BalanceConfig,
    pairing: &Pairing,
    index: usize,
    seed: u64,
) -> Result<MatchOutcome, ConfigError> {
    let mut system = CombatSystem::headless(config.match_config(pairing, seed))?;
    let mut perfect_blocks = 0;

    while system.is_active() && system.tick_count() < config.max_ticks {
        system.update(config.dt_ms);
        perfect_blocks += system
            .drain_events()
            .iter()
            .filter(|e| matches!(e, CombatEvent::Hit { perfect_block: true, .. }))
            .count() as u32;
    }

    Ok(MatchOutcome {
        pairing: index,
        winner: system.winner(),
        ticks: system.tick_count(),
        perfect_blocks,
    })
}

fn summarize<'a>(pairing: Pairing, outcomes: impl Iterator<Item = &'a MatchOutcome>) -> PairingResult {
    let mut matches = 0u32;
    let mut wins = [0u32; 2];
    let mut draws = 0u32;
    let mut ticks = 0u64;
    let mut perfect_blocks = 0u32;

    for outcome in outcomes {
        matches += 1;
        ticks += outcome.ticks;
        perfect_blocks += outcome.perfect_blocks;
        match outcome.winner {
            Some(slot) => wins[slot.index()] += 1,
            None => draws += 1,
        }
    }

    let n = matches.max(1) as f32;
    PairingResult {
        pairing,
        matches,
        wins,
        draws,
        win_rate: wins[0] as f32 / n,
        draw_rate: draws as f32 / n,
        avg_ticks: ticks as f32 / n,
        avg_perfect_blocks: perfect_blocks as f32 / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> BalanceConfig {
        BalanceConfig {
            matches_per_pairing: 3,
            max_ticks: 600,
            difficulties: vec![Difficulty::Hard],
            ..BalanceConfig::default()
        }
    }

    #[test]
    fn test_pairings_cover_every_combination() {
        let config = BalanceConfig::default();
        assert_eq!(config.pairings().len(), 3 * 2 * 2);
    }

    #[test]
    fn test_seeds_are_distinct_and_stable() {
        assert_eq!(derive_seed(42, 1, 2), derive_seed(42, 1, 2));
        assert_ne!(derive_seed(42, 0, 0), derive_seed(42, 0, 1));
        assert_ne!(derive_seed(42, 0, 0), derive_seed(42, 1, 0));
        assert_ne!(derive_seed(42, 0, 0), derive_seed(43, 0, 0));
    }

    #[test]
    fn test_small_simulation_accounts_for_every_match() {
        let config = small_config();
        let report = run_balance_simulation(&config).unwrap();
        assert_eq!(report.total_matches, 4 * 3);
        assert_eq!(report.pairings.len(), 4);
        for result in &report.pairings {
            assert_eq!(result.matches, 3);
            assert_eq!(result.wins[0] + result.wins[1] + result.draws, 3);
            assert!((0.0..=1.0).contains(&result.win_rate));
            assert!((0.0..=1.0).contains(&result.draw_rate));
            assert!(result.avg_ticks <= 600.0);
        }
        assert!(report.most_lopsided().is_some());
    }

    #[test]
    fn test_simulation_is_reproducible() {
        let config = BalanceConfig {
            matches_per_pairing: 2,
            loadouts: vec![Loadout::Sword],
            ..small_config()
        };
        let a = run_balance_simulation(&config).unwrap();
        let b = run_balance_simulation(&config).unwrap();
        assert_eq!(a, b);
        assert!(a.to_json().unwrap().contains("avg_perfect_blocks"));
    }

    #[test]
    fn test_tick_cap_is_a_draw() {
        let config = BalanceConfig {
            matches_per_pairing: 1,
            max_ticks: 1,
            loadouts: vec![Loadout::Bare],
            ..small_config()
        };
        let report = run_balance_simulation(&config).unwrap();
        assert_eq!(report.pairings[0].draws, 1);
        assert_eq!(report.pairings[0].avg_ticks, 1.0);
    }
}

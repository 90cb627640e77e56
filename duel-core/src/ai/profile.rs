use serde::{Deserialize, Serialize};

use crate::attacks::Loadout;
use crate::constants::{AI_BARE_RANGE_BONUS, AI_BARE_TELEGRAPH_SCALE, AI_SWORD_RANGE_BONUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Bundled behavior tuning selected by difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProfile {
    pub reaction_ms: f32,
    /// 0..1, scales urge growth and the below-threshold attack roll
    pub aggressiveness: f32,
    pub block_chance: f32,
    /// Base attack range before the loadout bonus (px)
    pub attack_range: f32,
    /// Base telegraph hold before the loadout scale (ms)
    pub telegraph_ms: f32,
    pub heavy_chance: f32,
    pub attack_cooldown_ms: f32,
    pub retreat_chance: f32,
    pub drift_chance: f32,
}

impl AiProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                reaction_ms: 400.0,
                aggressiveness: 0.3,
                block_chance: 0.15,
                attack_range: 55.0,
                telegraph_ms: 700.0,
                heavy_chance: 0.2,
                attack_cooldown_ms: 1200.0,
                retreat_chance: 0.2,
                drift_chance: 0.3,
            },
            Difficulty::Medium => Self {
                reaction_ms: 250.0,
                aggressiveness: 0.55,
                block_chance: 0.35,
                attack_range: 60.0,
                telegraph_ms: 500.0,
                heavy_chance: 0.35,
                attack_cooldown_ms: 900.0,
                retreat_chance: 0.3,
                drift_chance: 0.45,
            },
            Difficulty::Hard => Self {
                reaction_ms: 150.0,
                aggressiveness: 0.8,
                block_chance: 0.6,
                attack_range: 65.0,
                telegraph_ms: 350.0,
                heavy_chance: 0.5,
                attack_cooldown_ms: 600.0,
                retreat_chance: 0.4,
                drift_chance: 0.6,
            },
        }
    }

    /// Range at which the AI considers itself able to hit
    pub fn effective_range(&self, loadout: Loadout) -> f32 {
        match loadout {
            Loadout::Sword => self.attack_range + AI_SWORD_RANGE_BONUS,
            Loadout::Bare => self.attack_range + AI_BARE_RANGE_BONUS,
        }
    }

    pub fn telegraph_time(&self, loadout: Loadout) -> f32 {
        match loadout {
            Loadout::Sword => self.telegraph_ms,
            Loadout::Bare => self.telegraph_ms * AI_BARE_TELEGRAPH_SCALE,
        }
    }

    /// Bare-handed AI never blocks
    pub fn block_chance(&self, loadout: Loadout) -> f32 {
        match loadout {
            Loadout::Sword => self.block_chance,
            Loadout::Bare => 0.0,
        }
    }
}

impl Default for AiProfile {
    fn default() -> Self {
        Self::for_difficulty(Difficulty::default())
    }
}

//! Damage resolution for a confirmed hit.
//!
//! Pure: takes the attack, struck region, the defender's guard and both
//! sides' bonuses, and returns the final damage plus how the hit was
//! defended. Multipliers are applied before anything is reported, so
//! nothing downstream rewrites a damage figure after the fact.

use serde::{Deserialize, Serialize};

use crate::attacks::AttackId;
use crate::config::{BonusMultipliers, CombatTuning};
use crate::fighter::DefenseStatus;
use crate::hitbox::BodyZone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockOutcome {
    Unblocked,
    PerfectBlock,
    /// Held zone matched the hit
    Blocked,
    WrongZone,
}

impl BlockOutcome {
    pub fn is_blocked(self) -> bool {
        self != BlockOutcome::Unblocked
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: f32,
    pub block: BlockOutcome,
    pub headshot: bool,
}

/// Final damage of `attack` landing on `zone`
pub fn resolve_damage(
    attack: AttackId,
    zone: BodyZone,
    defense: DefenseStatus,
    attacker: &BonusMultipliers,
    defender: &BonusMultipliers,
    tuning: &CombatTuning,
) -> DamageOutcome {
    let def = attack.definition();
    let headshot = zone == BodyZone::Head;

    let mut damage = def.damage * attacker.damage;
    if headshot {
        damage *= def
            .headshot_multiplier
            .unwrap_or(tuning.headshot_multiplier);
    }

    let perfect_window = tuning.perfect_block_window_ms + defender.perfect_block_window_bonus_ms;

    let block = match defense {
        DefenseStatus::Open => BlockOutcome::Unblocked,
        // Zone does not matter for a perfect block, only timing
        DefenseStatus::Blocking { elapsed_ms, .. } | DefenseStatus::Grace { elapsed_ms }
            if elapsed_ms <= perfect_window =>
        {
            BlockOutcome::PerfectBlock
        }
        DefenseStatus::Grace { .. } => BlockOutcome::Unblocked,
        DefenseStatus::Blocking { zone: held, .. } => {
            if held.guard_stance() == zone.required_guard() {
                BlockOutcome::Blocked
            } else {
                BlockOutcome::WrongZone
            }
        }
    };

    let damage = match block {
        BlockOutcome::Unblocked => damage,
        BlockOutcome::PerfectBlock => 0.0,
        BlockOutcome::Blocked => {
            let reduction = (tuning.block_reduction + defender.block_reduction).clamp(0.0, 1.0);
            damage * (1.0 - reduction)
        }
        BlockOutcome::WrongZone => damage * (1.0 - tuning.wrong_zone_reduction),
    };

    DamageOutcome {
        damage,
        block,
        headshot,
    }
}

//! Match configuration.
//!
//! Every option has a default, so an empty RON/JSON document is a valid
//! config. Loaded configs are validated before a match will accept them.

pub mod hotreload;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::profile::Difficulty;
use crate::attacks::Loadout;
use crate::constants::*;
use crate::fighter::{Controller, PlayerSlot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Block / damage rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub perfect_block_window_ms: f32,
    pub block_grace_ms: f32,
    pub block_reduction: f32,
    pub wrong_zone_reduction: f32,
    pub headshot_multiplier: f32,
    pub stomp_damage: f32,
    pub stomp_radius: f32,
    pub perfect_block_knockback: f32,
    pub facing_tolerance: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            perfect_block_window_ms: PERFECT_BLOCK_WINDOW_MS,
            block_grace_ms: BLOCK_GRACE_MS,
            block_reduction: BLOCK_REDUCTION,
            wrong_zone_reduction: WRONG_ZONE_BLOCK_REDUCTION,
            headshot_multiplier: HEADSHOT_MULTIPLIER,
            stomp_damage: STOMP_DAMAGE,
            stomp_radius: STOMP_RADIUS,
            perfect_block_knockback: PERFECT_BLOCK_KNOCKBACK,
            facing_tolerance: FACING_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StunTuning {
    pub max: f32,
    pub head_hit: f32,
    pub body_hit: f32,
    pub perfect_block_bonus: f32,
    pub duration_ms: f32,
}

impl Default for StunTuning {
    fn default() -> Self {
        Self {
            max: STUN_MAX,
            head_hit: STUN_HEAD_HIT,
            body_hit: STUN_BODY_HIT,
            perfect_block_bonus: STUN_PERFECT_BLOCK_BONUS,
            duration_ms: STUN_DURATION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub ground_y: f32,
    pub spawn_x: [f32; 2],
    pub min_separation: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min_x: ARENA_MIN_X,
            max_x: ARENA_MAX_X,
            ground_y: GROUND_Y,
            spawn_x: [SPAWN_ONE_X, SPAWN_TWO_X],
            min_separation: MIN_SEPARATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FighterSetup {
    pub controller: Controller,
    pub loadout: Loadout,
    pub max_health: f32,
    /// Health carried over from a previous fight; `None` starts full
    pub starting_health: Option<f32>,
}

impl Default for FighterSetup {
    fn default() -> Self {
        Self {
            controller: Controller::Human,
            loadout: Loadout::Bare,
            max_health: DEFAULT_MAX_HEALTH,
            starting_health: None,
        }
    }
}

impl FighterSetup {
    pub fn human(loadout: Loadout) -> Self {
        Self {
            loadout,
            ..Self::default()
        }
    }

    pub fn ai(loadout: Loadout) -> Self {
        Self {
            controller: Controller::Ai,
            loadout,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    pub difficulty: Difficulty,
    pub seed: u64,
    pub decision_interval_ms: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            seed: 42,
            decision_interval_ms: AI_DECISION_INTERVAL_MS,
        }
    }
}

/// Meta-progression bonuses for one fighter. The neutral value of every
/// field leaves combat unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusMultipliers {
    pub damage: f32,
    /// Added to the correct-zone block reduction
    pub block_reduction: f32,
    pub vampirism_stacks: u32,
    pub stun_rate: f32,
    pub special_charge_rate: f32,
    pub perfect_block_window_bonus_ms: f32,
    pub speed: f32,
    pub jump_power: f32,
}

impl Default for BonusMultipliers {
    fn default() -> Self {
        Self {
            damage: 1.0,
            block_reduction: 0.0,
            vampirism_stacks: 0,
            stun_rate: 1.0,
            special_charge_rate: 1.0,
            perfect_block_window_bonus_ms: 0.0,
            speed: 1.0,
            jump_power: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusAssignment {
    pub target: PlayerSlot,
    pub bonuses: BonusMultipliers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub combat: CombatTuning,
    pub stun: StunTuning,
    pub special_max: f32,
    pub arena: ArenaConfig,
    pub fighters: [FighterSetup; 2],
    pub ai: AiSettings,
    pub bonus: Option<BonusAssignment>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            combat: CombatTuning::default(),
            stun: StunTuning::default(),
            special_max: SPECIAL_MAX,
            arena: ArenaConfig::default(),
            fighters: [
                FighterSetup::human(Loadout::Bare),
                FighterSetup::ai(Loadout::Sword),
            ],
            ai: AiSettings::default(),
            bonus: None,
        }
    }
}

impl MatchConfig {
    /// Both fighters human-controlled
    pub fn versus(one: Loadout, two: Loadout) -> Self {
        Self {
            fighters: [FighterSetup::human(one), FighterSetup::human(two)],
            ..Self::default()
        }
    }

    /// Human in slot one against an AI in slot two
    pub fn against_ai(human: Loadout, ai: Loadout, difficulty: Difficulty) -> Self {
        let mut config = Self {
            fighters: [FighterSetup::human(human), FighterSetup::ai(ai)],
            ..Self::default()
        };
        config.ai.difficulty = difficulty;
        config
    }

    pub fn setup(&self, slot: PlayerSlot) -> &FighterSetup {
        &self.fighters[slot.index()]
    }

    /// Bonuses applying to `slot` (neutral when none are assigned)
    pub fn bonuses_for(&self, slot: PlayerSlot) -> BonusMultipliers {
        match &self.bonus {
            Some(assignment) if assignment.target == slot => assignment.bonuses.clone(),
            _ => BonusMultipliers::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.combat;
        if c.perfect_block_window_ms < 0.0 {
            return Err(invalid("combat.perfect_block_window_ms", "must be >= 0"));
        }
        if c.block_grace_ms < 0.0 {
            return Err(invalid("combat.block_grace_ms", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&c.block_reduction) {
            return Err(invalid("combat.block_reduction", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&c.wrong_zone_reduction) {
            return Err(invalid("combat.wrong_zone_reduction", "must be within 0..=1"));
        }
        if c.headshot_multiplier < 1.0 {
            return Err(invalid("combat.headshot_multiplier", "must be >= 1"));
        }
        if c.stomp_damage < 0.0 || c.stomp_radius <= 0.0 {
            return Err(invalid("combat.stomp", "damage must be >= 0 and radius > 0"));
        }

        let s = &self.stun;
        if s.max <= 0.0 {
            return Err(invalid("stun.max", "must be > 0"));
        }
        if s.duration_ms <= 0.0 {
            return Err(invalid("stun.duration_ms", "must be > 0"));
        }
        if s.head_hit < 0.0 || s.body_hit < 0.0 || s.perfect_block_bonus < 0.0 {
            return Err(invalid("stun", "contributions must be >= 0"));
        }
        if self.special_max <= 0.0 {
            return Err(invalid("special_max", "must be > 0"));
        }

        let a = &self.arena;
        if a.max_x <= a.min_x {
            return Err(invalid("arena", "max_x must be greater than min_x"));
        }
        if a.spawn_x.iter().any(|x| *x < a.min_x || *x > a.max_x) {
            return Err(invalid("arena.spawn_x", "spawn points must lie inside the arena"));
        }
        if a.min_separation < 0.0 {
            return Err(invalid("arena.min_separation", "must be >= 0"));
        }

        for setup in &self.fighters {
            if setup.max_health <= 0.0 {
                return Err(invalid("fighters.max_health", "must be > 0"));
            }
            if let Some(start) = setup.starting_health {
                if start <= 0.0 || start > setup.max_health {
                    return Err(invalid(
                        "fighters.starting_health",
                        "must be within (0, max_health]",
                    ));
                }
            }
        }

        if self.ai.decision_interval_ms <= 0.0 {
            return Err(invalid("ai.decision_interval_ms", "must be > 0"));
        }

        if let Some(assignment) = &self.bonus {
            let b = &assignment.bonuses;
            if b.damage < 0.0 || b.stun_rate < 0.0 || b.special_charge_rate < 0.0 {
                return Err(invalid("bonus", "rates must be >= 0"));
            }
            if b.speed <= 0.0 || b.jump_power <= 0.0 {
                return Err(invalid("bonus", "speed and jump_power must be > 0"));
            }
        }

        Ok(())
    }

    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by file extension (`.ron` or `.json`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    pub fn to_ron_string(&self) -> String {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MatchConfig::default().validate().is_ok());
        assert_eq!(MatchConfig::default().combat.perfect_block_window_ms, 300.0);
    }

    #[test]
    fn test_empty_documents_use_defaults() {
        assert_eq!(MatchConfig::from_json_str("{}").unwrap(), MatchConfig::default());
        assert_eq!(
            MatchConfig::from_ron_str("(special_max: 100.0)").unwrap(),
            MatchConfig::default()
        );
    }

    #[test]
    fn test_partial_override() {
        let config =
            MatchConfig::from_json_str(r#"{"combat":{"perfect_block_window_ms":250}}"#).unwrap();
        assert_eq!(config.combat.perfect_block_window_ms, 250.0);
        assert_eq!(config.combat.block_reduction, BLOCK_REDUCTION);
    }

    #[test]
    fn test_ron_roundtrip_through_text() {
        let config = MatchConfig::against_ai(Loadout::Sword, Loadout::Bare, Difficulty::Hard);
        let parsed = MatchConfig::from_ron_str(&config.to_ron_string()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_bad_reduction() {
        let mut config = MatchConfig::default();
        config.combat.block_reduction = 1.5;
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "combat.block_reduction"),
            other => panic!("Expected invalid field, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_starting_health_above_max() {
        let mut config = MatchConfig::default();
        config.fighters[0].starting_health = Some(150.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bonuses_only_for_target() {
        let mut config = MatchConfig::default();
        config.bonus = Some(BonusAssignment {
            target: PlayerSlot::One,
            bonuses: BonusMultipliers {
                damage: 1.25,
                ..BonusMultipliers::default()
            },
        });
        assert_eq!(config.bonuses_for(PlayerSlot::One).damage, 1.25);
        assert_eq!(config.bonuses_for(PlayerSlot::Two).damage, 1.0);
    }

    #[test]
    fn test_load_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("match.json");
        std::fs::write(&json, r#"{"special_max": 80}"#).unwrap();
        assert_eq!(MatchConfig::load(&json).unwrap().special_max, 80.0);

        let toml = dir.path().join("match.toml");
        std::fs::write(&toml, "").unwrap();
        assert!(matches!(
            MatchConfig::load(&toml),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}

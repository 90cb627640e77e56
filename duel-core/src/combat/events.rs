use serde::{Deserialize, Serialize};

use crate::attacks::{AttackId, AttackKind};
use crate::fighter::PlayerSlot;
use crate::hitbox::BodyZone;

/// Outbound notifications, in the order the tick produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    HealthChanged {
        player: PlayerSlot,
        health: f32,
        max_health: f32,
    },
    StunMeterChanged {
        player: PlayerSlot,
        value: f32,
    },
    SpecialMeterChanged {
        player: PlayerSlot,
        value: f32,
    },
    StunStarted {
        player: PlayerSlot,
    },
    StunEnded {
        player: PlayerSlot,
    },
    Hit {
        attacker: PlayerSlot,
        defender: PlayerSlot,
        attack: Option<AttackId>,
        damage: f32,
        blocked: bool,
        zone: BodyZone,
        perfect_block: bool,
    },
    Knockout {
        loser: PlayerSlot,
    },
    /// Once per AI attack commitment, with the total lead time before the
    /// hitbox goes live
    AiTelegraph {
        player: PlayerSlot,
        kind: AttackKind,
        attack: AttackId,
        lead_time_ms: f32,
    },
}

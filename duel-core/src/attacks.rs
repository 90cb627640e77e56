//! Attack catalog: static per-attack data and the input → attack mapping.
//!
//! Each loadout owns a light, a heavy and a special attack. Heavy attacks
//! carry a charge-up, and the sword heavy charges longer than the bare one.

use serde::{Deserialize, Serialize};

/// What a fighter has in hand. May change mid-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Loadout {
    #[default]
    Bare,
    Sword,
}

impl Loadout {
    /// Whether the pose carries a weapon grip → tip segment
    pub fn has_weapon_line(&self) -> bool {
        matches!(self, Loadout::Sword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Loadout::Bare => "bare",
            Loadout::Sword => "sword",
        }
    }
}

/// Attack button pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    Light,
    Heavy,
    Special,
}

/// Coarse vertical region used both as attack target and as block stance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HitZone {
    Top,
    #[default]
    Center,
    Bottom,
}

impl HitZone {
    /// Stance that guards this zone. Bottom has no stance of its own and
    /// falls back to center.
    pub fn guard_stance(self) -> HitZone {
        match self {
            HitZone::Top => HitZone::Top,
            HitZone::Center | HitZone::Bottom => HitZone::Center,
        }
    }
}

/// Bone or attachment the hitbox follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxSource {
    RightHand,
    RightFoot,
    Weapon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitboxShape {
    Point,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackId {
    Jab,
    Uppercut,
    Flurry,
    Slash,
    HeavySlash,
    Whirlwind,
}

impl AttackId {
    pub const ALL: [AttackId; 6] = [
        AttackId::Jab,
        AttackId::Uppercut,
        AttackId::Flurry,
        AttackId::Slash,
        AttackId::HeavySlash,
        AttackId::Whirlwind,
    ];

    pub fn definition(self) -> &'static AttackDefinition {
        match self {
            AttackId::Jab => &JAB,
            AttackId::Uppercut => &UPPERCUT,
            AttackId::Flurry => &FLURRY,
            AttackId::Slash => &SLASH,
            AttackId::HeavySlash => &HEAVY_SLASH,
            AttackId::Whirlwind => &WHIRLWIND,
        }
    }

    pub fn loadout(self) -> Loadout {
        match self {
            AttackId::Jab | AttackId::Uppercut | AttackId::Flurry => Loadout::Bare,
            AttackId::Slash | AttackId::HeavySlash | AttackId::Whirlwind => Loadout::Sword,
        }
    }
}

/// Immutable description of one attack
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackDefinition {
    pub id: AttackId,
    pub name: &'static str,
    pub animation: &'static str,
    pub source: HitboxSource,
    pub shape: HitboxShape,
    pub damage: f32,
    pub zone: HitZone,
    /// Point radius, or line thickness
    pub radius: f32,
    pub headshot_multiplier: Option<f32>,
    /// Knockback impulse applied to an unblocked defender (px/s)
    pub knockback: Option<f32>,
    /// Repeat-hit cadence within one active window
    pub hit_interval_ms: Option<f32>,
    /// 0 = fires immediately
    pub charge_up_ms: f32,
    /// Distinct wind-up clip, if the attack has one
    pub charge_pose: Option<&'static str>,
    /// How long the hitbox stays live
    pub active_ms: f32,
    /// Full animation length; the fighter returns to idle after it
    pub animation_ms: f32,
    /// How far the striking limb extends from the body center (px)
    pub reach: f32,
    pub special_charge: f32,
}

impl AttackDefinition {
    pub fn is_charged(&self) -> bool {
        self.charge_up_ms > 0.0
    }

    pub fn is_multi_hit(&self) -> bool {
        self.hit_interval_ms.is_some()
    }

    /// Clip played while winding up
    pub fn windup_clip(&self) -> &'static str {
        self.charge_pose.unwrap_or(self.animation)
    }
}

static JAB: AttackDefinition = AttackDefinition {
    id: AttackId::Jab,
    name: "Jab",
    animation: "punch_jab",
    source: HitboxSource::RightHand,
    shape: HitboxShape::Point,
    damage: 8.0,
    zone: HitZone::Center,
    radius: 18.0,
    headshot_multiplier: None,
    knockback: None,
    hit_interval_ms: None,
    charge_up_ms: 0.0,
    charge_pose: None,
    active_ms: 150.0,
    animation_ms: 350.0,
    reach: 70.0,
    special_charge: 8.0,
};

static UPPERCUT: AttackDefinition = AttackDefinition {
    id: AttackId::Uppercut,
    name: "Uppercut",
    animation: "punch_uppercut",
    source: HitboxSource::RightHand,
    shape: HitboxShape::Point,
    damage: 20.0,
    zone: HitZone::Top,
    radius: 20.0,
    headshot_multiplier: Some(1.8),
    knockback: Some(300.0),
    hit_interval_ms: None,
    charge_up_ms: 300.0,
    charge_pose: Some("uppercut_windup"),
    active_ms: 200.0,
    animation_ms: 600.0,
    reach: 60.0,
    special_charge: 15.0,
};

static FLURRY: AttackDefinition = AttackDefinition {
    id: AttackId::Flurry,
    name: "Flurry",
    animation: "punch_flurry",
    source: HitboxSource::RightHand,
    shape: HitboxShape::Point,
    damage: 5.0,
    zone: HitZone::Center,
    radius: 22.0,
    headshot_multiplier: None,
    knockback: None,
    hit_interval_ms: Some(120.0),
    charge_up_ms: 0.0,
    charge_pose: None,
    active_ms: 600.0,
    animation_ms: 800.0,
    reach: 75.0,
    special_charge: 0.0,
};

static SLASH: AttackDefinition = AttackDefinition {
    id: AttackId::Slash,
    name: "Slash",
    animation: "sword_slash",
    source: HitboxSource::Weapon,
    shape: HitboxShape::Line,
    damage: 12.0,
    zone: HitZone::Center,
    radius: 10.0,
    headshot_multiplier: None,
    knockback: Some(150.0),
    hit_interval_ms: None,
    charge_up_ms: 0.0,
    charge_pose: None,
    active_ms: 200.0,
    animation_ms: 450.0,
    reach: 40.0,
    special_charge: 10.0,
};

static HEAVY_SLASH: AttackDefinition = AttackDefinition {
    id: AttackId::HeavySlash,
    name: "Heavy Slash",
    animation: "sword_heavy_slash",
    source: HitboxSource::Weapon,
    shape: HitboxShape::Line,
    damage: 26.0,
    zone: HitZone::Top,
    radius: 12.0,
    headshot_multiplier: None,
    knockback: Some(450.0),
    hit_interval_ms: None,
    charge_up_ms: 500.0,
    charge_pose: Some("sword_overhead_windup"),
    active_ms: 250.0,
    animation_ms: 850.0,
    reach: 40.0,
    special_charge: 20.0,
};

static WHIRLWIND: AttackDefinition = AttackDefinition {
    id: AttackId::Whirlwind,
    name: "Whirlwind",
    animation: "sword_whirlwind",
    source: HitboxSource::Weapon,
    shape: HitboxShape::Line,
    damage: 9.0,
    zone: HitZone::Center,
    radius: 14.0,
    headshot_multiplier: None,
    knockback: Some(200.0),
    hit_interval_ms: Some(150.0),
    charge_up_ms: 0.0,
    charge_pose: None,
    active_ms: 750.0,
    animation_ms: 1000.0,
    reach: 40.0,
    special_charge: 0.0,
};

/// Attack a button press resolves to for a loadout
pub fn attack_for(loadout: Loadout, kind: AttackKind) -> AttackId {
    match (loadout, kind) {
        (Loadout::Bare, AttackKind::Light) => AttackId::Jab,
        (Loadout::Bare, AttackKind::Heavy) => AttackId::Uppercut,
        (Loadout::Bare, AttackKind::Special) => AttackId::Flurry,
        (Loadout::Sword, AttackKind::Light) => AttackId::Slash,
        (Loadout::Sword, AttackKind::Heavy) => AttackId::HeavySlash,
        (Loadout::Sword, AttackKind::Special) => AttackId::Whirlwind,
    }
}

/// Every attack reachable with a loadout
pub fn attacks_for(loadout: Loadout) -> impl Iterator<Item = AttackId> {
    AttackId::ALL
        .into_iter()
        .filter(move |id| id.loadout() == loadout)
}

//! Hitbox resolution against live skeletal poses.
//!
//! The animation system is an external oracle (`PoseProvider`); this module
//! only turns an attack + sampled bones into a concrete hitbox and tests it
//! against a defender's hurtboxes. Head is always tested before body so an
//! overlapping body box can never mask a headshot.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::attacks::{AttackId, HitZone, HitboxShape, HitboxSource, Loadout};
use crate::fighter::Fighter;
use crate::geometry::{self, Aabb, Capsule, Circle};

/// Attack-relevant bones and attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bone {
    Head,
    RightHand,
    LeftHand,
    RightFoot,
    LeftFoot,
    WeaponGrip,
    WeaponTip,
}

/// Region of the defender that was struck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyZone {
    Head,
    Body,
}

impl BodyZone {
    /// Block stance that matches a hit on this region
    pub fn required_guard(self) -> HitZone {
        match self {
            BodyZone::Head => HitZone::Top,
            BodyZone::Body => HitZone::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hurtboxes {
    pub head: Circle,
    pub body: Aabb,
}

/// One fighter's bones for the current tick. `None` = not posed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub head: Option<Vec2>,
    pub right_hand: Option<Vec2>,
    pub left_hand: Option<Vec2>,
    pub right_foot: Option<Vec2>,
    pub left_foot: Option<Vec2>,
    pub weapon_grip: Option<Vec2>,
    pub weapon_tip: Option<Vec2>,
    pub hurtboxes: Hurtboxes,
}

impl Pose {
    pub fn bone(&self, bone: Bone) -> Option<Vec2> {
        match bone {
            Bone::Head => self.head,
            Bone::RightHand => self.right_hand,
            Bone::LeftHand => self.left_hand,
            Bone::RightFoot => self.right_foot,
            Bone::LeftFoot => self.left_foot,
            Bone::WeaponGrip => self.weapon_grip,
            Bone::WeaponTip => self.weapon_tip,
        }
    }
}

/// External animation oracle, sampled once per fighter per tick
pub trait PoseProvider {
    fn sample(&self, fighter: &Fighter) -> Pose;
}

/// Concrete damage shape for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hitbox {
    Point(Circle),
    Line(Capsule),
}

fn source_bone(source: HitboxSource) -> Bone {
    match source {
        HitboxSource::RightHand => Bone::RightHand,
        HitboxSource::RightFoot => Bone::RightFoot,
        HitboxSource::Weapon => Bone::WeaponTip,
    }
}

/// Build the hitbox of `attack` from the sampled pose. `None` when the bone
/// it follows is not available, which means no hit is possible this tick.
pub fn resolve_hitbox(attack: AttackId, pose: &Pose, loadout: Loadout) -> Option<Hitbox> {
    let def = attack.definition();

    if def.source == HitboxSource::Weapon
        && def.shape == HitboxShape::Line
        && loadout.has_weapon_line()
    {
        let grip = pose.weapon_grip?;
        let tip = pose.weapon_tip?;
        return Some(Hitbox::Line(Capsule::new(grip, tip, def.radius)));
    }

    let at = pose.bone(source_bone(def.source))?;
    Some(Hitbox::Point(Circle::new(at, def.radius)))
}

/// Which hurtbox the hitbox touches, head first
pub fn check_against_hurtboxes(hitbox: &Hitbox, hurtboxes: &Hurtboxes) -> Option<BodyZone> {
    let (head, body) = match hitbox {
        Hitbox::Point(circle) => (
            geometry::circle_circle(circle, &hurtboxes.head),
            geometry::circle_box(circle, &hurtboxes.body),
        ),
        Hitbox::Line(capsule) => (
            geometry::capsule_circle(capsule, &hurtboxes.head),
            geometry::capsule_box(capsule, &hurtboxes.body),
        ),
    };

    if head {
        Some(BodyZone::Head)
    } else if body {
        Some(BodyZone::Body)
    } else {
        None
    }
}

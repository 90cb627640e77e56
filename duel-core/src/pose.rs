//! Deterministic pose provider derived from fighter kinematics.
//!
//! Stands in for the skeletal animation system in headless runs. World is
//! y-up and `Fighter::position` is the point between the feet.

use bevy::math::Vec2;

use crate::attacks::HitZone;
use crate::fighter::{AttackPhase, Fighter};
use crate::geometry::{Aabb, Circle};
use crate::hitbox::{Hurtboxes, Pose, PoseProvider};

#[derive(Debug, Clone, PartialEq)]
pub struct ProceduralPose {
    pub body_size: Vec2,
    pub body_center_height: f32,
    pub head_height: f32,
    pub head_radius: f32,
    pub shoulder_height: f32,
    pub foot_spread: f32,
    pub blade_length: f32,
}

impl Default for ProceduralPose {
    fn default() -> Self {
        Self {
            body_size: Vec2::new(60.0, 120.0),
            body_center_height: 70.0,
            head_height: 150.0,
            head_radius: 20.0,
            shoulder_height: 90.0,
            foot_spread: 12.0,
            blade_length: 110.0,
        }
    }
}

impl ProceduralPose {
    fn zone_height(&self, zone: HitZone) -> f32 {
        match zone {
            HitZone::Top => self.head_height,
            HitZone::Center => self.shoulder_height,
            HitZone::Bottom => 30.0,
        }
    }

    pub fn hurtboxes(&self, fighter: &Fighter) -> Hurtboxes {
        let p = fighter.position;
        let f = fighter.facing().sign();
        Hurtboxes {
            head: Circle::new(Vec2::new(p.x + f * 4.0, p.y + self.head_height), self.head_radius),
            body: Aabb::new(Vec2::new(p.x, p.y + self.body_center_height), self.body_size),
        }
    }

    fn right_hand(&self, fighter: &Fighter) -> Vec2 {
        let p = fighter.position;
        let f = fighter.facing().sign();
        match (fighter.current_attack(), fighter.attack_phase()) {
            (Some(id), Some(AttackPhase::Executing)) => {
                let def = id.definition();
                Vec2::new(p.x + f * def.reach, p.y + self.zone_height(def.zone))
            }
            (Some(_), Some(AttackPhase::WindingUp | AttackPhase::Paused)) => {
                Vec2::new(p.x - f * 10.0, p.y + self.shoulder_height + 10.0)
            }
            _ => Vec2::new(p.x + f * 25.0, p.y + self.shoulder_height),
        }
    }
}

impl PoseProvider for ProceduralPose {
    fn sample(&self, fighter: &Fighter) -> Pose {
        let p = fighter.position;
        let f = fighter.facing().sign();
        let hand = self.right_hand(fighter);
        let (grip, tip) = if fighter.loadout().has_weapon_line() {
            (Some(hand), Some(hand + Vec2::new(f * self.blade_length, 0.0)))
        } else {
            (None, None)
        };

        Pose {
            head: Some(Vec2::new(p.x + f * 4.0, p.y + self.head_height)),
            right_hand: Some(hand),
            left_hand: Some(Vec2::new(p.x + f * 15.0, p.y + self.shoulder_height - 5.0)),
            right_foot: Some(Vec2::new(p.x + self.foot_spread, p.y)),
            left_foot: Some(Vec2::new(p.x - self.foot_spread, p.y)),
            weapon_grip: grip,
            weapon_tip: tip,
            hurtboxes: self.hurtboxes(fighter),
        }
    }
}

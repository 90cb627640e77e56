//! Kinematics and fighter-vs-fighter spacing.

use super::{AnimationCue, Fighter, FighterState};
use crate::constants::{BLOCK_PUSH_RATIO, GRAVITY, GROUND_FRICTION};

/// Reference frame time the friction constant is expressed in
const FRICTION_FRAME_MS: f32 = 1000.0 / 60.0;

/// Integrate one tick: gravity while airborne, landing, ground friction
/// and the world bounds clamp.
pub fn integrate(fighter: &mut Fighter, dt_ms: f32) {
    let dt = dt_ms / 1000.0;
    let airborne = fighter.state == FighterState::Jump || fighter.position.y > fighter.ground_y;

    if airborne {
        fighter.velocity.y += GRAVITY * dt;
    }
    fighter.position += fighter.velocity * dt;

    if fighter.position.y <= fighter.ground_y {
        fighter.position.y = fighter.ground_y;
        if fighter.velocity.y < 0.0 {
            fighter.velocity.y = 0.0;
            if fighter.state == FighterState::Jump {
                land(fighter);
            }
        }
    }

    let sliding = !matches!(fighter.state, FighterState::Move | FighterState::Jump);
    if sliding && fighter.velocity.x != 0.0 {
        fighter.velocity.x *= GROUND_FRICTION.powf(dt_ms / FRICTION_FRAME_MS);
        if fighter.velocity.x.abs() < 1.0 {
            fighter.velocity.x = 0.0;
        }
    }

    let (min_x, max_x) = fighter.bounds;
    if fighter.position.x < min_x || fighter.position.x > max_x {
        fighter.position.x = fighter.position.x.clamp(min_x, max_x);
        fighter.velocity.x = 0.0;
    }
}

fn land(fighter: &mut Fighter) {
    fighter.stomped = false;
    match fighter.held_direction {
        Some(dir) => {
            fighter.state = FighterState::Move;
            fighter.velocity.x = dir.sign() * fighter.move_speed();
            fighter.animation = AnimationCue::play(if fighter.running { "run" } else { "walk" });
        }
        None => {
            fighter.state = FighterState::Idle;
            fighter.velocity.x = 0.0;
            fighter.animation = AnimationCue::play("idle");
        }
    }
}

fn push_ratio(state: FighterState) -> f32 {
    match state {
        FighterState::Attack => 0.0,
        FighterState::Block => BLOCK_PUSH_RATIO,
        _ => 1.0,
    }
}

/// Separate two fighters closer than `min_separation`. Attackers hold
/// their ground, blockers give a little, everyone else gives fully.
/// Suspended while either fighter is jumping. Returns whether anyone moved.
pub fn apply_pushback(a: &mut Fighter, b: &mut Fighter, min_separation: f32) -> bool {
    if a.state == FighterState::Jump || b.state == FighterState::Jump {
        return false;
    }
    let dx = b.position.x - a.position.x;
    let overlap = min_separation - dx.abs();
    if overlap <= 0.0 {
        return false;
    }

    let (ra, rb) = (push_ratio(a.state), push_ratio(b.state));
    let total = ra + rb;
    if total <= 0.0 {
        return false;
    }

    // Coincident fighters separate by slot order
    let dir = if dx > 0.0 {
        1.0
    } else if dx < 0.0 {
        -1.0
    } else if a.slot < b.slot {
        1.0
    } else {
        -1.0
    };

    a.position.x -= dir * overlap * (ra / total);
    b.position.x += dir * overlap * (rb / total);

    for f in [a, b] {
        let (min_x, max_x) = f.bounds;
        f.position.x = f.position.x.clamp(min_x, max_x);
    }
    true
}

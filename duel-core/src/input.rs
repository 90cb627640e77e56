//! Normalized per-tick input.
//!
//! Local devices and remote peers both reduce to an [`InputFrame`], which is
//! the only thing `Fighter::apply_input` understands.

use serde::{Deserialize, Serialize};

use crate::attacks::{AttackKind, HitZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Left,
    Right,
}

impl MoveDirection {
    pub fn sign(self) -> f32 {
        match self {
            MoveDirection::Left => -1.0,
            MoveDirection::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            MoveDirection::Left => MoveDirection::Right,
            MoveDirection::Right => MoveDirection::Left,
        }
    }

    /// Direction from `from_x` toward `to_x` (right when equal)
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x < from_x {
            MoveDirection::Left
        } else {
            MoveDirection::Right
        }
    }
}

/// One tick of input for one fighter. `jump` and `attack` are edges, the
/// rest are held state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputFrame {
    pub movement: Option<MoveDirection>,
    pub run: bool,
    pub jump: bool,
    pub attack: Option<AttackKind>,
    pub block: Option<HitZone>,
}

impl InputFrame {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn moving(direction: MoveDirection) -> Self {
        Self {
            movement: Some(direction),
            ..Self::default()
        }
    }

    pub fn attacking(kind: AttackKind) -> Self {
        Self {
            attack: Some(kind),
            ..Self::default()
        }
    }

    pub fn blocking(zone: HitZone) -> Self {
        Self {
            block: Some(zone),
            ..Self::default()
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn with_run(mut self) -> Self {
        self.run = true;
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toward() {
        assert_eq!(MoveDirection::toward(100.0, 50.0), MoveDirection::Left);
        assert_eq!(MoveDirection::toward(100.0, 150.0), MoveDirection::Right);
        assert_eq!(MoveDirection::Left.opposite(), MoveDirection::Right);
    }

    #[test]
    fn test_builders() {
        let frame = InputFrame::moving(MoveDirection::Left).with_run().with_jump();
        assert_eq!(frame.movement, Some(MoveDirection::Left));
        assert!(frame.run && frame.jump);
        assert!(frame.attack.is_none() && frame.block.is_none());
    }

    #[test]
    fn test_remote_frame_from_json() {
        let json = r#"{"movement":null,"run":false,"jump":false,"attack":"Heavy","block":null}"#;
        let frame = InputFrame::from_json(json).unwrap();
        assert_eq!(frame, InputFrame::attacking(AttackKind::Heavy));
        assert!(InputFrame::from_json("{not json").is_none());
    }
}

//! Stun and special meters.
//!
//! Both share the clamped [`Meter`] primitive. The stun variant adds a timed
//! stun state that reports its own end exactly once.

use serde::{Deserialize, Serialize};

use crate::constants::{SPECIAL_MAX, STUN_DURATION_MS, STUN_MAX};

/// Clamped accumulator in `[0, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    value: f32,
    max: f32,
}

impl Meter {
    pub fn new(max: f32) -> Self {
        Self {
            value: 0.0,
            max: max.max(0.0),
        }
    }

    pub fn special() -> Self {
        Self::new(SPECIAL_MAX)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.value / self.max
        }
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    /// Clamp-add and return the new value
    pub fn add(&mut self, amount: f32) -> f32 {
        self.value = (self.value + amount).clamp(0.0, self.max);
        self.value
    }

    pub fn fill(&mut self) {
        self.value = self.max;
    }

    /// Empty the meter, returning what it held
    pub fn consume(&mut self) -> f32 {
        std::mem::replace(&mut self.value, 0.0)
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::special()
    }
}

/// Stun accumulator plus the stun countdown it triggers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StunMeter {
    meter: Meter,
    stunned: bool,
    remaining_ms: f32,
    duration_ms: f32,
}

impl StunMeter {
    pub fn new(max: f32, duration_ms: f32) -> Self {
        Self {
            meter: Meter::new(max),
            stunned: false,
            remaining_ms: 0.0,
            duration_ms,
        }
    }

    pub fn value(&self) -> f32 {
        self.meter.value()
    }

    pub fn max(&self) -> f32 {
        self.meter.max()
    }

    pub fn is_full(&self) -> bool {
        self.meter.is_full()
    }

    pub fn is_stunned(&self) -> bool {
        self.stunned
    }

    pub fn remaining_ms(&self) -> f32 {
        self.remaining_ms
    }

    pub fn add(&mut self, amount: f32) -> f32 {
        self.meter.add(amount)
    }

    pub fn trigger_stun(&mut self) {
        self.stunned = true;
        self.remaining_ms = self.duration_ms;
    }

    /// Count the stun down. Returns `true` on the tick the stun ends, and only then.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        if !self.stunned {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.stunned = false;
            self.remaining_ms = 0.0;
            self.meter.reset();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.meter.reset();
        self.stunned = false;
        self.remaining_ms = 0.0;
    }
}

impl Default for StunMeter {
    fn default() -> Self {
        Self::new(STUN_MAX, STUN_DURATION_MS)
    }
}

/// The one meter a fighter carries, chosen by who controls it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FighterMeter {
    /// Human side: charged by landing hits, filled by perfect blocks
    Special(Meter),
    /// AI side: filled by taking hits, stuns when full
    Stun(StunMeter),
}

impl FighterMeter {
    pub fn special(&self) -> Option<&Meter> {
        match self {
            Self::Special(m) => Some(m),
            Self::Stun(_) => None,
        }
    }

    pub fn special_mut(&mut self) -> Option<&mut Meter> {
        match self {
            Self::Special(m) => Some(m),
            Self::Stun(_) => None,
        }
    }

    pub fn stun(&self) -> Option<&StunMeter> {
        match self {
            Self::Stun(s) => Some(s),
            Self::Special(_) => None,
        }
    }

    pub fn stun_mut(&mut self) -> Option<&mut StunMeter> {
        match self {
            Self::Stun(s) => Some(s),
            Self::Special(_) => None,
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Special(m) => m.reset(),
            Self::Stun(s) => s.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_clamps_to_max() {
        let mut m = Meter::new(100.0);
        assert_eq!(m.add(70.0), 70.0);
        assert_eq!(m.add(70.0), 100.0);
        assert!(m.is_full());
        assert_eq!(m.add(-250.0), 0.0);
    }

    #[test]
    fn test_consume_returns_previous() {
        let mut m = Meter::new(100.0);
        m.fill();
        assert_eq!(m.consume(), 100.0);
        assert_eq!(m.value(), 0.0);
    }

    #[test]
    fn test_stun_end_signalled_once() {
        let mut s = StunMeter::new(100.0, 2000.0);
        s.add(100.0);
        s.trigger_stun();
        assert!(s.is_stunned());
        assert!(!s.update(1000.0));
        assert!(s.update(1000.0), "stun should end at exactly 2000ms");
        assert!(!s.is_stunned());
        assert_eq!(s.value(), 0.0, "meter zeroes when stun ends");
        assert!(!s.update(16.0), "end is reported only once");
    }

    #[test]
    fn test_update_without_stun_is_noop() {
        let mut s = StunMeter::default();
        s.add(40.0);
        assert!(!s.update(5000.0));
        assert_eq!(s.value(), 40.0);
    }

    #[test]
    fn test_fighter_meter_roles_are_exclusive() {
        let human = FighterMeter::Special(Meter::special());
        let ai = FighterMeter::Stun(StunMeter::default());
        assert!(human.special().is_some() && human.stun().is_none());
        assert!(ai.stun().is_some() && ai.special().is_none());
    }
}

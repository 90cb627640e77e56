//! Named, cancellable delayed actions driven by the tick's delta time.
//!
//! Timers carry a data payload instead of a closure; whoever owns the bag
//! interprets the payloads `advance` hands back. Setting a timer under an
//! existing name replaces it. Fire order within one advance is by due time,
//! then by scheduling order, so replays are deterministic.

#[derive(Debug, Clone)]
struct Scheduled<A> {
    name: String,
    remaining_ms: f32,
    order: u64,
    action: A,
}

#[derive(Debug, Clone)]
pub struct TimerBag<A> {
    timers: Vec<Scheduled<A>>,
    next_order: u64,
}

impl<A> Default for TimerBag<A> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_order: 0,
        }
    }
}

impl<A> TimerBag<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` after `delay_ms`, replacing any timer under `name`
    pub fn set(&mut self, name: impl Into<String>, action: A, delay_ms: f32) {
        let name = name.into();
        self.timers.retain(|t| t.name != name);
        self.timers.push(Scheduled {
            name,
            remaining_ms: delay_ms.max(0.0),
            order: self.next_order,
            action,
        });
        self.next_order += 1;
    }

    pub fn clear(&mut self, name: &str) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.name != name);
        self.timers.len() != before
    }

    pub fn clear_all(&mut self) {
        self.timers.clear();
    }

    /// Drop every timer whose name starts with `prefix`; returns how many
    pub fn clear_by_prefix(&mut self, prefix: &str) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| !t.name.starts_with(prefix));
        before - self.timers.len()
    }

    pub fn has(&self, name: &str) -> bool {
        self.timers.iter().any(|t| t.name == name)
    }

    pub fn remaining_ms(&self, name: &str) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.remaining_ms)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every timer by `dt_ms` and return the payloads that came due
    pub fn advance(&mut self, dt_ms: f32) -> Vec<A> {
        for timer in &mut self.timers {
            timer.remaining_ms -= dt_ms;
        }

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].remaining_ms <= 0.0 {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }

        due.sort_by(|a, b| {
            a.remaining_ms
                .total_cmp(&b.remaining_ms)
                .then(a.order.cmp(&b.order))
        });
        due.into_iter().map(|t| t.action).collect()
    }
}

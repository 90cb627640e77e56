//! Rule-based fighter AI.
//!
//! Decides on a fixed interval rather than every tick, which stands in for
//! human reaction delay. Each decision runs block > attack > reposition in
//! strict priority order, with attacks gated by an urge accumulator. Attacks
//! go through the same telegraph protocol a human-facing fighter exposes:
//! wind up, freeze, report the lead time, then execute.
//!
//! Every AI timer captures the AI sequence id; `stop`, stun and telegraph
//! cancellation bump it.

pub mod profile;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attacks::{attack_for, AttackId, AttackKind, HitZone, Loadout};
use crate::combat::events::CombatEvent;
use crate::constants::{
    AI_ANTI_STUNLOCK_HITS, AI_BLOCK_HOLD_MS, AI_COMBO_WINDOW_MS, AI_DANGER_MARGIN,
    AI_POST_HIT_BLOCK_SCALE, AI_RECOVERY_BUFFER_MS, AI_RUN_DISTANCE_SCALE, AI_TOO_CLOSE_SCALE,
    AI_URGE_DECAY, AI_URGE_GROWTH, AI_URGE_RETAINED, AI_URGE_THRESHOLD, HURT_RECOVERY_MS,
};
use crate::fighter::{AttackPhase, Fighter, FighterState, PlayerSlot};
use crate::input::MoveDirection;
use crate::timer::TimerBag;
use profile::AiProfile;

/// Extra wait after a flinch before a post-hit action, so it lands after
/// the fighter's hurt recovery
const POST_HIT_MARGIN_MS: f32 = 20.0;
const RETREAT_MS: f32 = 400.0;

const TIMER_PENDING: &str = "ai:pending";
const TIMER_EXECUTE: &str = "ai:execute";
const TIMER_RECOVER: &str = "ai:recover";
const TIMER_BLOCK: &str = "ai:block";
const TIMER_RETREAT: &str = "ai:retreat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiMode {
    Idle,
    Approaching,
    Attacking,
    Blocking,
    Retreating,
    Telegraphing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionPriority {
    Retreat,
    Attack,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiAction {
    Block,
    Attack,
    Retreat,
}

impl AiAction {
    fn priority(self) -> ActionPriority {
        match self {
            AiAction::Block => ActionPriority::Block,
            AiAction::Attack => ActionPriority::Attack,
            AiAction::Retreat => ActionPriority::Retreat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AiTimer {
    Pending { seq: u64, action: AiAction },
    Execute { seq: u64 },
    Recover { seq: u64 },
    ReleaseBlock { seq: u64 },
    EndRetreat { seq: u64 },
}

impl AiTimer {
    fn seq(self) -> u64 {
        match self {
            Self::Pending { seq, .. }
            | Self::Execute { seq }
            | Self::Recover { seq }
            | Self::ReleaseBlock { seq }
            | Self::EndRetreat { seq } => seq,
        }
    }
}

/// Attack the AI has committed to and is winding up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telegraph {
    pub kind: AttackKind,
    pub attack: AttackId,
    /// Fighter action sequence right after the wind-up started
    fighter_seq: u64,
    scheduled: bool,
}

impl Telegraph {
    pub fn is_heavy(&self) -> bool {
        self.kind == AttackKind::Heavy
    }
}

#[derive(Debug, Clone)]
pub struct FighterAi {
    slot: PlayerSlot,
    profile: AiProfile,
    decision_interval_ms: f32,
    active: bool,
    mode: AiMode,
    urge: f32,
    consecutive_hits: u32,
    last_hit_taken_ms: Option<f32>,
    pending: Option<ActionPriority>,
    telegraph: Option<Telegraph>,
    moving: Option<(MoveDirection, bool)>,
    last_attack_ms: Option<f32>,
    decision_accum_ms: f32,
    seq: u64,
    timers: TimerBag<AiTimer>,
    rng: Xoshiro256PlusPlus,
    now_ms: f32,
}

impl FighterAi {
    pub fn new(
        slot: PlayerSlot,
        profile: AiProfile,
        decision_interval_ms: f32,
        seed: u64,
    ) -> Self {
        Self {
            slot,
            profile,
            decision_interval_ms,
            active: true,
            mode: AiMode::Idle,
            urge: 0.0,
            consecutive_hits: 0,
            last_hit_taken_ms: None,
            pending: None,
            telegraph: None,
            moving: None,
            last_attack_ms: None,
            decision_accum_ms: 0.0,
            seq: 0,
            timers: TimerBag::new(),
            rng: Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(slot.index() as u64)),
            now_ms: 0.0,
        }
    }

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn profile(&self) -> &AiProfile {
        &self.profile
    }

    pub fn mode(&self) -> AiMode {
        self.mode
    }

    pub fn urge(&self) -> f32 {
        self.urge
    }

    pub fn consecutive_hits(&self) -> u32 {
        self.consecutive_hits
    }

    pub fn pending_priority(&self) -> Option<ActionPriority> {
        self.pending
    }

    pub fn telegraph(&self) -> Option<&Telegraph> {
        self.telegraph.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Resume deciding after `stop`
    pub fn start(&mut self) {
        self.active = true;
        self.decision_accum_ms = 0.0;
    }

    /// Halt and drop everything scheduled
    pub fn stop(&mut self, me: &mut Fighter) {
        self.active = false;
        self.abandon(me);
        self.stop_moving(me);
        me.stop_block();
        debug!(player = self.slot.number(), "AI stopped");
    }

    pub fn update(
        &mut self,
        dt_ms: f32,
        me: &mut Fighter,
        opponent: &Fighter,
        events: &mut Vec<CombatEvent>,
    ) {
        self.now_ms += dt_ms;
        if !self.active || me.is_dead() || me.is_stunned() {
            return;
        }

        for action in self.timers.advance(dt_ms) {
            self.run_timer(action, me, opponent);
        }

        // The fighter dropped our wind-up (loadout swap, external cancel)
        if self
            .telegraph
            .is_some_and(|t| t.fighter_seq != me.action_seq())
        {
            self.cancel_telegraph(me);
        }

        self.poll_telegraph(me, events);

        self.decision_accum_ms += dt_ms;
        if self.decision_accum_ms >= self.decision_interval_ms {
            self.decision_accum_ms -= self.decision_interval_ms;
            self.decide(me, opponent);
        }
    }

    /// Struck by an unblocked hit. Ignored entirely under super armor.
    pub fn on_hit(&mut self, me: &mut Fighter) {
        if !self.active || me.has_super_armor() || me.is_dead() {
            return;
        }

        let within_combo = self
            .last_hit_taken_ms
            .is_some_and(|last| self.now_ms - last <= AI_COMBO_WINDOW_MS);
        self.consecutive_hits = if within_combo { self.consecutive_hits + 1 } else { 1 };
        self.last_hit_taken_ms = Some(self.now_ms);

        if matches!(self.telegraph, Some(t) if !t.is_heavy()) {
            self.cancel_telegraph(me);
        }

        let delay = HURT_RECOVERY_MS + POST_HIT_MARGIN_MS;
        let loadout = me.loadout();

        if self.consecutive_hits >= AI_ANTI_STUNLOCK_HITS {
            self.consecutive_hits = 0;
            let action = match loadout {
                Loadout::Bare => AiAction::Retreat,
                Loadout::Sword => AiAction::Block,
            };
            debug!(player = self.slot.number(), ?action, "Anti-stunlock response");
            self.force_action(action, delay);
            return;
        }

        let block_chance = (self.profile.block_chance(loadout) * AI_POST_HIT_BLOCK_SCALE).min(1.0);
        if self.roll(block_chance) {
            self.schedule_action(AiAction::Block, delay);
        } else if self.roll(self.profile.retreat_chance) {
            self.schedule_action(AiAction::Retreat, delay);
        }
    }

    pub fn on_stunned(&mut self, me: &mut Fighter) {
        self.abandon(me);
        self.moving = None;
    }

    pub fn on_stun_end(&mut self) {
        self.mode = AiMode::Idle;
        self.decision_accum_ms = 0.0;
    }

    // --- decision loop ---

    fn decide(&mut self, me: &mut Fighter, opponent: &Fighter) {
        let distance = (opponent.position.x - me.position.x).abs();
        let loadout = me.loadout();
        let range = self.profile.effective_range(loadout);
        let in_range = distance <= range;

        if in_range {
            self.urge += AI_URGE_GROWTH * self.profile.aggressiveness;
        } else {
            self.urge = (self.urge - AI_URGE_DECAY).max(0.0);
        }

        if opponent.is_dead() || matches!(me.state(), FighterState::Hurt | FighterState::Jump) {
            return;
        }

        // Block
        let threatened =
            opponent.state() == FighterState::Attack && distance <= range + AI_DANGER_MARGIN;
        if threatened
            && self.mode != AiMode::Blocking
            && self.roll(self.profile.block_chance(loadout))
        {
            let committed = self.mode == AiMode::Attacking
                || self.telegraph.is_some_and(|t| t.is_heavy())
                || me.has_super_armor();
            if !committed {
                if self.telegraph.is_some() {
                    self.cancel_telegraph(me);
                }
                trace!(player = self.slot.number(), distance, "Block scheduled");
                self.schedule_action(AiAction::Block, self.profile.reaction_ms);
                return;
            }
        }

        // Attack
        let busy = matches!(
            self.mode,
            AiMode::Attacking | AiMode::Blocking | AiMode::Telegraphing
        );
        let cooled = self
            .last_attack_ms
            .map_or(true, |last| self.now_ms - last >= self.profile.attack_cooldown_ms);
        if in_range && !busy && cooled && self.pending.is_none() && me.can_attack() {
            let fire = self.urge >= AI_URGE_THRESHOLD
                || self.roll(self.urge * self.profile.aggressiveness);
            if fire && self.schedule_action(AiAction::Attack, self.profile.reaction_ms) {
                return;
            }
        }

        // Reposition
        if busy || self.pending.is_some() || !me.can_move() {
            return;
        }
        let toward = MoveDirection::toward(me.position.x, opponent.position.x);
        if !in_range {
            let run = distance > range * AI_RUN_DISTANCE_SCALE;
            self.move_to(me, toward, run);
            self.mode = AiMode::Approaching;
        } else if distance < range * AI_TOO_CLOSE_SCALE {
            if self.roll(self.profile.retreat_chance) {
                self.move_to(me, toward.opposite(), false);
                self.mode = AiMode::Retreating;
            } else {
                self.stop_moving(me);
                self.mode = AiMode::Idle;
            }
        } else if self.roll(self.profile.drift_chance) {
            self.move_to(me, toward, false);
            self.mode = AiMode::Approaching;
        } else {
            self.stop_moving(me);
            self.mode = AiMode::Idle;
        }
    }

    /// Queue `action` unless something of higher priority is already pending
    fn schedule_action(&mut self, action: AiAction, delay_ms: f32) -> bool {
        let priority = action.priority();
        if self.pending.is_some_and(|p| p > priority) {
            return false;
        }
        self.force_action(action, delay_ms);
        true
    }

    fn force_action(&mut self, action: AiAction, delay_ms: f32) {
        self.pending = Some(action.priority());
        self.timers
            .set(TIMER_PENDING, AiTimer::Pending { seq: self.seq, action }, delay_ms);
    }

    fn run_timer(&mut self, timer: AiTimer, me: &mut Fighter, opponent: &Fighter) {
        if timer.seq() != self.seq {
            trace!(player = self.slot.number(), ?timer, "Stale AI timer ignored");
            return;
        }
        match timer {
            AiTimer::Pending { action, .. } => {
                self.pending = None;
                match action {
                    AiAction::Block => self.begin_block(me, opponent),
                    AiAction::Attack => self.begin_attack(me),
                    AiAction::Retreat => self.begin_retreat(me, opponent),
                }
            }
            AiTimer::Execute { .. } => self.execute(me),
            AiTimer::Recover { .. } => {
                me.set_super_armor(false);
                self.telegraph = None;
                self.mode = AiMode::Idle;
            }
            AiTimer::ReleaseBlock { .. } => {
                if self.mode == AiMode::Blocking {
                    me.stop_block();
                    self.mode = AiMode::Idle;
                }
            }
            AiTimer::EndRetreat { .. } => {
                if self.mode == AiMode::Retreating {
                    self.stop_moving(me);
                    self.mode = AiMode::Idle;
                }
            }
        }
    }

    fn begin_block(&mut self, me: &mut Fighter, opponent: &Fighter) {
        if self.telegraph.is_some() || !me.can_block() {
            return;
        }
        self.stop_moving(me);
        let zone = opponent
            .current_attack()
            .map_or(HitZone::Center, |id| id.definition().zone.guard_stance());
        if me.start_block(zone) || me.is_blocking() {
            self.mode = AiMode::Blocking;
            self.timers
                .set(TIMER_BLOCK, AiTimer::ReleaseBlock { seq: self.seq }, AI_BLOCK_HOLD_MS);
            debug!(player = self.slot.number(), ?zone, "AI blocking");
        }
    }

    fn begin_retreat(&mut self, me: &mut Fighter, opponent: &Fighter) {
        if !me.can_move() {
            return;
        }
        let away = MoveDirection::toward(me.position.x, opponent.position.x).opposite();
        self.move_to(me, away, false);
        self.mode = AiMode::Retreating;
        self.timers
            .set(TIMER_RETREAT, AiTimer::EndRetreat { seq: self.seq }, RETREAT_MS);
    }

    /// Commit: pick light or heavy and start the wind-up
    fn begin_attack(&mut self, me: &mut Fighter) {
        if self.telegraph.is_some() || !me.can_attack() {
            return;
        }
        self.stop_moving(me);

        let kind = if self.roll(self.profile.heavy_chance) {
            AttackKind::Heavy
        } else {
            AttackKind::Light
        };
        if kind == AttackKind::Heavy {
            me.set_super_armor(true);
        }
        if !me.start_attack_telegraph(kind) {
            me.set_super_armor(false);
            return;
        }

        self.telegraph = Some(Telegraph {
            kind,
            attack: attack_for(me.loadout(), kind),
            fighter_seq: me.action_seq(),
            scheduled: false,
        });
        self.mode = AiMode::Telegraphing;
        self.last_attack_ms = Some(self.now_ms);
        // Urge only drops once the wind-up is actually committed
        self.urge *= AI_URGE_RETAINED;
        debug!(player = self.slot.number(), ?kind, "AI committed to attack");
    }

    /// Once the wind-up has frozen, schedule execution and report the lead
    fn poll_telegraph(&mut self, me: &Fighter, events: &mut Vec<CombatEvent>) {
        let Some(telegraph) = self.telegraph.as_mut() else {
            return;
        };
        if telegraph.scheduled
            || self.mode != AiMode::Telegraphing
            || me.attack_phase() != Some(AttackPhase::Paused)
        {
            return;
        }
        telegraph.scheduled = true;

        let def = telegraph.attack.definition();
        let lead_time_ms = self.profile.telegraph_time(me.loadout()) + def.charge_up_ms;
        self.timers
            .set(TIMER_EXECUTE, AiTimer::Execute { seq: self.seq }, lead_time_ms);
        events.push(CombatEvent::AiTelegraph {
            player: self.slot,
            kind: telegraph.kind,
            attack: telegraph.attack,
            lead_time_ms,
        });
        debug!(player = self.slot.number(), attack = def.name, lead_time_ms, "AI telegraph");
    }

    fn execute(&mut self, me: &mut Fighter) {
        let valid = self.active
            && self.mode == AiMode::Telegraphing
            && self
                .telegraph
                .is_some_and(|t| t.fighter_seq == me.action_seq());
        if !valid || !me.execute_telegraphed_attack() {
            trace!(player = self.slot.number(), "Telegraph invalidated before execute");
            self.cancel_telegraph(me);
            return;
        }

        let recover_ms = me
            .active_attack()
            .map_or(0.0, |id| id.definition().animation_ms)
            + AI_RECOVERY_BUFFER_MS;
        self.mode = AiMode::Attacking;
        self.timers
            .set(TIMER_RECOVER, AiTimer::Recover { seq: self.seq }, recover_ms);
    }

    fn cancel_telegraph(&mut self, me: &mut Fighter) {
        self.seq += 1;
        self.timers.clear(TIMER_EXECUTE);
        self.timers.clear(TIMER_RECOVER);
        if let Some(t) = self.telegraph.take() {
            if t.fighter_seq == me.action_seq() {
                me.cancel_attack();
            }
        }
        me.set_super_armor(false);
        if matches!(self.mode, AiMode::Telegraphing | AiMode::Attacking) {
            self.mode = AiMode::Idle;
        }
        self.pending = None;
        self.timers.clear(TIMER_PENDING);
    }

    /// Drop every scheduled AI action and any wind-up in progress
    fn abandon(&mut self, me: &mut Fighter) {
        self.seq += 1;
        self.timers.clear_by_prefix("ai:");
        if let Some(t) = self.telegraph.take() {
            if t.fighter_seq == me.action_seq() {
                me.cancel_attack();
            }
        }
        me.set_super_armor(false);
        self.pending = None;
        self.mode = AiMode::Idle;
    }

    fn move_to(&mut self, me: &mut Fighter, dir: MoveDirection, run: bool) {
        // Re-sync if the fighter dropped out of Move behind our back
        if self.moving == Some((dir, run)) && me.state() == FighterState::Move {
            return;
        }
        me.set_movement(Some(dir), run);
        self.moving = Some((dir, run));
    }

    fn stop_moving(&mut self, me: &mut Fighter) {
        if self.moving.is_some() || me.state() == FighterState::Move {
            me.set_movement(None, false);
        }
        self.moving = None;
    }

    fn roll(&mut self, chance: f32) -> bool {
        chance > 0.0 && self.rng.gen::<f32>() < chance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::profile::Difficulty;
    use crate::config::FighterSetup;

    const TICK: f32 = 1000.0 / 60.0;

    fn setup(loadout: Loadout, difficulty: Difficulty, gap: f32) -> (FighterAi, Fighter, Fighter) {
        let mut me = Fighter::spawn(PlayerSlot::Two, &FighterSetup::ai(loadout));
        let mut opponent = Fighter::spawn(PlayerSlot::One, &FighterSetup::human(Loadout::Bare));
        me.position.x = 600.0;
        opponent.position.x = 600.0 - gap;
        let ai = FighterAi::new(
            PlayerSlot::Two,
            AiProfile::for_difficulty(difficulty),
            200.0,
            7,
        );
        (ai, me, opponent)
    }

    fn tick(ai: &mut FighterAi, me: &mut Fighter, opponent: &mut Fighter) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        me.update(TICK);
        opponent.update(TICK);
        ai.update(TICK, me, opponent, &mut events);
        events
    }

    #[test]
    fn test_bare_ai_never_blocks() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Bare, Difficulty::Hard, 80.0);
        assert!(opponent.start_attack_telegraph(AttackKind::Light));
        for _ in 0..600 {
            tick(&mut ai, &mut me, &mut opponent);
            assert_ne!(ai.mode(), AiMode::Blocking);
            assert!(!me.is_blocking());
            assert_ne!(ai.pending_priority(), Some(ActionPriority::Block));
        }
    }

    #[test]
    fn test_sword_ai_blocks_threats() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, Difficulty::Hard, 120.0);
        assert!(opponent.start_attack_telegraph(AttackKind::Light));
        let mut blocked = false;
        for _ in 0..600 {
            tick(&mut ai, &mut me, &mut opponent);
            blocked |= me.is_blocking();
        }
        assert!(blocked, "hard sword AI should block a sustained threat");
    }

    #[test]
    fn test_urge_grows_in_range_and_decays_out_of_range() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, Difficulty::Medium, 100.0);
        // Held block keeps the AI from firing so urge can only build
        me.start_block(HitZone::Center);
        let mut last = ai.urge();
        for _ in 0..120 {
            tick(&mut ai, &mut me, &mut opponent);
            assert!(ai.urge() >= last);
            last = ai.urge();
        }
        assert!(last > AI_URGE_THRESHOLD);

        opponent.position.x = 0.0;
        for _ in 0..120 {
            tick(&mut ai, &mut me, &mut opponent);
            assert!(ai.urge() <= last);
            last = ai.urge();
        }
    }

    #[test]
    fn test_urge_drops_once_per_committed_attack() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium] {
            let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, difficulty, 100.0);
            let mut last = ai.urge();
            let mut committing = false;
            let (mut cuts, mut commits) = (0, 0);
            for _ in 0..6000 {
                tick(&mut ai, &mut me, &mut opponent);
                // Pin the gap so the AI stays in range the whole time
                me.position.x = 600.0;

                let committed = ai.telegraph().is_some();
                if committed && !committing {
                    commits += 1;
                    assert!(ai.urge() < last, "{difficulty:?}: commit without urge reset");
                }
                if ai.urge() < last {
                    cuts += 1;
                    assert!(committed && !committing, "{difficulty:?}: urge cut without a commit");
                }
                committing = committed;
                last = ai.urge();
            }
            assert!(commits > 0, "{difficulty:?} AI never attacked");
            assert_eq!(cuts, commits);
        }
    }

    #[test]
    fn test_telegraph_reports_lead_time_then_executes() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, Difficulty::Hard, 100.0);
        let mut telegraph = None;
        for _ in 0..1200 {
            let events = tick(&mut ai, &mut me, &mut opponent);
            if let Some(event) = events
                .into_iter()
                .find(|e| matches!(e, CombatEvent::AiTelegraph { .. }))
            {
                telegraph = Some(event);
                break;
            }
        }
        let Some(CombatEvent::AiTelegraph {
            attack,
            lead_time_ms,
            ..
        }) = telegraph
        else {
            panic!("AI never telegraphed");
        };
        let expected = ai.profile().telegraph_time(Loadout::Sword) + attack.definition().charge_up_ms;
        assert!((lead_time_ms - expected).abs() < 1e-3);
        assert_eq!(me.attack_phase(), Some(AttackPhase::Paused));

        let mut telegraphs = 0;
        let mut elapsed = 0.0;
        while elapsed < lead_time_ms + 40.0 {
            telegraphs += tick(&mut ai, &mut me, &mut opponent)
                .iter()
                .filter(|e| matches!(e, CombatEvent::AiTelegraph { .. }))
                .count();
            elapsed += TICK;
        }
        assert_eq!(telegraphs, 0, "telegraph is reported once per commitment");
        assert_eq!(me.active_attack(), Some(attack));
        assert_eq!(ai.mode(), AiMode::Attacking);
    }

    #[test]
    fn test_on_hit_ignored_under_super_armor() {
        let (mut ai, mut me, _) = setup(Loadout::Sword, Difficulty::Medium, 100.0);
        me.set_super_armor(true);
        ai.on_hit(&mut me);
        assert_eq!(ai.consecutive_hits(), 0);
        assert_eq!(ai.pending_priority(), None);
    }

    #[test]
    fn test_anti_stunlock() {
        let (mut ai, mut me, _) = setup(Loadout::Sword, Difficulty::Easy, 100.0);
        for _ in 0..AI_ANTI_STUNLOCK_HITS {
            ai.on_hit(&mut me);
        }
        assert_eq!(ai.pending_priority(), Some(ActionPriority::Block));
        assert_eq!(ai.consecutive_hits(), 0);

        let (mut bare, mut me, _) = setup(Loadout::Bare, Difficulty::Easy, 100.0);
        for _ in 0..AI_ANTI_STUNLOCK_HITS {
            bare.on_hit(&mut me);
        }
        assert_eq!(bare.pending_priority(), Some(ActionPriority::Retreat));
    }

    #[test]
    fn test_stun_abandons_telegraph() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, Difficulty::Hard, 100.0);
        for _ in 0..1200 {
            tick(&mut ai, &mut me, &mut opponent);
            if ai.telegraph().is_some() {
                break;
            }
        }
        assert!(ai.telegraph().is_some());
        let seq = ai.seq();

        me.meter_mut().stun_mut().unwrap().add(100.0);
        assert!(me.enter_stun());
        ai.on_stunned(&mut me);
        assert!(ai.seq() > seq);
        assert!(ai.telegraph().is_none());
        assert!(!me.has_super_armor());

        for _ in 0..100 {
            tick(&mut ai, &mut me, &mut opponent);
            assert!(!me.hitbox_active());
        }
    }

    #[test]
    fn test_stopped_ai_does_nothing() {
        let (mut ai, mut me, mut opponent) = setup(Loadout::Sword, Difficulty::Hard, 500.0);
        ai.stop(&mut me);
        for _ in 0..300 {
            tick(&mut ai, &mut me, &mut opponent);
        }
        assert_eq!(me.state(), FighterState::Idle);
        assert_eq!(me.position.x, 600.0);
    }
}

//! Fighter state machine.
//!
//! One `Fighter` per combatant. All timed transitions (wind-up hold, charge
//! release, hitbox end, return to idle, hurt recovery) go through the
//! fighter's own [`TimerBag`] and carry the action sequence id captured when
//! they were scheduled. Anything that invalidates an in-flight action bumps
//! the sequence, so the stale timer fires as a no-op.
//!
//! Stun is an orthogonal flag on the stun meter rather than a state: a
//! stunned fighter sits in `Hurt` with the dazed clip until the stun ends.

pub mod physics;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::attacks::{attack_for, AttackId, AttackKind, HitZone, Loadout};
use crate::config::{ArenaConfig, BonusMultipliers, FighterSetup};
use crate::constants::{
    HURT_RECOVERY_MS, JUMP_VELOCITY, RUN_SPEED, STUN_TIME_SCALE, WALK_SPEED, WINDUP_HOLD_MS,
};
use crate::input::{InputFrame, MoveDirection};
use crate::meter::{FighterMeter, Meter, StunMeter};
use crate::timer::TimerBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    One,
    Two,
}

impl PlayerSlot {
    pub const BOTH: [PlayerSlot; 2] = [PlayerSlot::One, PlayerSlot::Two];

    pub fn index(self) -> usize {
        match self {
            PlayerSlot::One => 0,
            PlayerSlot::Two => 1,
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }

    /// 1-based player number for display
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterState {
    Idle,
    Move,
    Block,
    Attack,
    Hurt,
    Dead,
    Jump,
}

/// Progress of the current attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    /// Wind-up clip playing, not yet frozen
    WindingUp,
    /// Frozen on the wind-up frame (charging or telegraphing)
    Paused,
    /// Hitbox live
    Executing,
    /// Hitbox off, animation finishing
    Recovering,
}

/// What the presentation layer should be playing
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationCue {
    pub clip: &'static str,
    pub paused: bool,
    pub time_scale: f32,
}

impl AnimationCue {
    fn play(clip: &'static str) -> Self {
        Self {
            clip,
            paused: false,
            time_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    pub blocking: bool,
    pub zone: HitZone,
    /// Fighter clock when the current block attempt began
    pub started_at_ms: f32,
    pub released_at_ms: Option<f32>,
    pub last_zone: Option<HitZone>,
}

impl Default for BlockState {
    fn default() -> Self {
        Self {
            blocking: false,
            zone: HitZone::Center,
            started_at_ms: 0.0,
            released_at_ms: None,
            last_zone: None,
        }
    }
}

/// Defender's guard as seen by damage resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefenseStatus {
    Open,
    Blocking { zone: HitZone, elapsed_ms: f32 },
    /// Block released recently; only a perfect block is still possible.
    /// `elapsed_ms` runs from the start of the released block.
    Grace { elapsed_ms: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FighterTimer {
    ChargeHold { seq: u64, release_after_ms: Option<f32> },
    ChargeRelease { seq: u64 },
    HitboxOff { seq: u64 },
    ReturnToIdle { seq: u64 },
    HurtRecover { seq: u64 },
}

impl FighterTimer {
    fn seq(self) -> u64 {
        match self {
            Self::ChargeHold { seq, .. }
            | Self::ChargeRelease { seq }
            | Self::HitboxOff { seq }
            | Self::ReturnToIdle { seq }
            | Self::HurtRecover { seq } => seq,
        }
    }
}

const TIMER_CHARGE: &str = "fighter:charge";
const TIMER_HITBOX: &str = "fighter:hitbox";
const TIMER_IDLE: &str = "fighter:idle";
const TIMER_HURT: &str = "fighter:hurt";

#[derive(Debug, Clone)]
pub struct Fighter {
    slot: PlayerSlot,
    controller: Controller,
    loadout: Loadout,
    spawn_x: f32,

    pub position: Vec2,
    pub velocity: Vec2,
    facing: Facing,
    ground_y: f32,
    bounds: (f32, f32),

    state: FighterState,
    active_attack: Option<AttackId>,
    pending_attack: Option<AttackId>,
    phase: Option<AttackPhase>,
    hitbox_active: bool,
    hit_registered: bool,
    last_hit_at_ms: Option<f32>,
    super_armor: bool,
    block: BlockState,

    health: f32,
    max_health: f32,
    meter: FighterMeter,
    bonuses: BonusMultipliers,

    held_direction: Option<MoveDirection>,
    running: bool,
    stomped: bool,
    animation: AnimationCue,

    action_seq: u64,
    timers: TimerBag<FighterTimer>,
    clock_ms: f32,
}

impl Fighter {
    pub fn new(
        slot: PlayerSlot,
        setup: &FighterSetup,
        arena: &ArenaConfig,
        meter: FighterMeter,
    ) -> Self {
        let spawn_x = arena.spawn_x[slot.index()];
        let max_health = setup.max_health;
        Self {
            slot,
            controller: setup.controller,
            loadout: setup.loadout,
            spawn_x,
            position: Vec2::new(spawn_x, arena.ground_y),
            velocity: Vec2::ZERO,
            facing: default_facing(slot),
            ground_y: arena.ground_y,
            bounds: (arena.min_x, arena.max_x),
            state: FighterState::Idle,
            active_attack: None,
            pending_attack: None,
            phase: None,
            hitbox_active: false,
            hit_registered: false,
            last_hit_at_ms: None,
            super_armor: false,
            block: BlockState::default(),
            health: setup.starting_health.unwrap_or(max_health).min(max_health),
            max_health,
            meter,
            bonuses: BonusMultipliers::default(),
            held_direction: None,
            running: false,
            stomped: false,
            animation: AnimationCue::play("idle"),
            action_seq: 0,
            timers: TimerBag::new(),
            clock_ms: 0.0,
        }
    }

    /// Default-arena fighter with the meter its controller implies
    pub fn spawn(slot: PlayerSlot, setup: &FighterSetup) -> Self {
        let meter = match setup.controller {
            Controller::Human => FighterMeter::Special(Meter::special()),
            Controller::Ai => FighterMeter::Stun(StunMeter::default()),
        };
        Self::new(slot, setup, &ArenaConfig::default(), meter)
    }

    pub fn with_bonuses(mut self, bonuses: BonusMultipliers) -> Self {
        self.bonuses = bonuses;
        self
    }

    // --- accessors ---

    pub fn slot(&self) -> PlayerSlot {
        self.slot
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    pub fn is_ai(&self) -> bool {
        self.controller == Controller::Ai
    }

    pub fn loadout(&self) -> Loadout {
        self.loadout
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn ground_y(&self) -> f32 {
        self.ground_y
    }

    pub fn bounds(&self) -> (f32, f32) {
        self.bounds
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn active_attack(&self) -> Option<AttackId> {
        self.active_attack
    }

    pub fn pending_attack(&self) -> Option<AttackId> {
        self.pending_attack
    }

    /// Attack currently owned by the fighter, whichever stage it is in
    pub fn current_attack(&self) -> Option<AttackId> {
        self.active_attack.or(self.pending_attack)
    }

    pub fn attack_phase(&self) -> Option<AttackPhase> {
        self.phase
    }

    pub fn hitbox_active(&self) -> bool {
        self.hitbox_active
    }

    pub fn has_super_armor(&self) -> bool {
        self.super_armor
    }

    pub fn block(&self) -> &BlockState {
        &self.block
    }

    pub fn is_blocking(&self) -> bool {
        self.block.blocking
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_dead(&self) -> bool {
        self.state == FighterState::Dead
    }

    pub fn meter(&self) -> &FighterMeter {
        &self.meter
    }

    pub fn meter_mut(&mut self) -> &mut FighterMeter {
        &mut self.meter
    }

    pub fn is_stunned(&self) -> bool {
        self.meter.stun().is_some_and(StunMeter::is_stunned)
    }

    pub fn bonuses(&self) -> &BonusMultipliers {
        &self.bonuses
    }

    pub fn animation(&self) -> AnimationCue {
        self.animation
    }

    pub fn action_seq(&self) -> u64 {
        self.action_seq
    }

    pub fn clock_ms(&self) -> f32 {
        self.clock_ms
    }

    pub fn held_direction(&self) -> Option<MoveDirection> {
        self.held_direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_grounded(&self) -> bool {
        self.position.y <= self.ground_y
    }

    pub fn has_stomped(&self) -> bool {
        self.stomped
    }

    /// Latch the once-per-jump stomp
    pub fn mark_stomped(&mut self) {
        self.stomped = true;
    }

    /// Whether `target_x` is in front of the fighter, allowing `tolerance`
    /// pixels behind
    pub fn is_facing_toward(&self, target_x: f32, tolerance: f32) -> bool {
        (target_x - self.position.x) * self.facing.sign() >= -tolerance
    }

    // --- guards ---

    pub fn can_attack(&self) -> bool {
        !self.is_stunned() && matches!(self.state, FighterState::Idle | FighterState::Move)
    }

    pub fn can_block(&self) -> bool {
        !self.is_stunned()
            && matches!(
                self.state,
                FighterState::Idle | FighterState::Move | FighterState::Block
            )
    }

    pub fn can_move(&self) -> bool {
        !self.is_stunned() && matches!(self.state, FighterState::Idle | FighterState::Move)
    }

    pub fn can_jump(&self) -> bool {
        self.can_move() && self.is_grounded()
    }

    // --- input ---

    /// Shared entry point for local and remote input
    pub fn apply_input(&mut self, frame: &InputFrame) {
        match frame.block {
            Some(zone) => {
                self.start_block(zone);
            }
            None if self.block.blocking => {
                self.stop_block();
            }
            None => {}
        }
        if frame.jump {
            self.jump();
        }
        if let Some(kind) = frame.attack {
            self.start_attack(kind);
        }
        self.set_movement(frame.movement, frame.run);
    }

    /// Held movement. Re-issuing the current command is a no-op.
    pub fn set_movement(&mut self, direction: Option<MoveDirection>, run: bool) -> bool {
        let unchanged = self.held_direction == direction && self.running == run;
        self.held_direction = direction;
        self.running = run;

        if !self.can_move() {
            return false;
        }

        match direction {
            Some(dir) => {
                if unchanged && self.state == FighterState::Move {
                    return false;
                }
                self.state = FighterState::Move;
                self.velocity.x = dir.sign() * self.move_speed();
                self.animation = AnimationCue::play(if run { "run" } else { "walk" });
                true
            }
            None => {
                if self.state != FighterState::Move {
                    return false;
                }
                self.state = FighterState::Idle;
                self.velocity.x = 0.0;
                self.animation = AnimationCue::play("idle");
                true
            }
        }
    }

    fn move_speed(&self) -> f32 {
        let base = if self.running { RUN_SPEED } else { WALK_SPEED };
        base * self.bonuses.speed
    }

    pub fn jump(&mut self) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.velocity.y = JUMP_VELOCITY * self.bonuses.jump_power;
        self.velocity.x = match self.held_direction {
            Some(dir) if self.state == FighterState::Move => dir.sign() * self.move_speed(),
            _ => 0.0,
        };
        self.state = FighterState::Jump;
        self.stomped = false;
        self.animation = AnimationCue::play("jump");
        debug!(player = self.slot.number(), "Jump");
        true
    }

    // --- attacks ---

    /// Start the attack `kind` maps to. Charged attacks wind up, freeze on
    /// the wind-up frame for their charge time, then execute.
    pub fn start_attack(&mut self, kind: AttackKind) -> bool {
        if !self.can_attack() {
            return false;
        }
        if kind == AttackKind::Special {
            match self.meter.special_mut() {
                Some(meter) if meter.is_full() => {
                    meter.consume();
                }
                _ => return false,
            }
        }

        let id = attack_for(self.loadout, kind);
        let def = id.definition();
        self.enter_attack_state();

        if def.is_charged() {
            self.begin_windup(id, Some(def.charge_up_ms));
        } else {
            self.execute(id);
        }
        debug!(player = self.slot.number(), attack = def.name, "Attack started");
        true
    }

    /// Wind up `kind` and freeze on the wind-up frame without a release
    /// timer. The caller finishes it with [`Fighter::execute_telegraphed_attack`].
    pub fn start_attack_telegraph(&mut self, kind: AttackKind) -> bool {
        if !self.can_attack() || kind == AttackKind::Special {
            return false;
        }
        let id = attack_for(self.loadout, kind);
        self.enter_attack_state();
        self.begin_windup(id, None);
        debug!(player = self.slot.number(), attack = id.definition().name, "Telegraph started");
        true
    }

    /// Resume a frozen telegraph and activate its hitbox
    pub fn execute_telegraphed_attack(&mut self) -> bool {
        if self.state != FighterState::Attack || self.phase != Some(AttackPhase::Paused) {
            return false;
        }
        match self.pending_attack {
            Some(id) => {
                self.execute(id);
                true
            }
            None => false,
        }
    }

    /// Abort whatever attack is in progress and return to idle
    pub fn cancel_attack(&mut self) -> bool {
        if self.state != FighterState::Attack {
            return false;
        }
        self.invalidate_actions();
        self.clear_attack();
        self.state = FighterState::Idle;
        self.velocity.x = 0.0;
        self.animation = AnimationCue::play("idle");
        true
    }

    pub fn set_super_armor(&mut self, on: bool) {
        self.super_armor = on;
    }

    /// Whether the live hitbox may land a hit this tick. Multi-hit attacks
    /// re-open after their interval.
    pub fn can_register_hit(&self) -> bool {
        let Some(id) = self.active_attack else {
            return false;
        };
        if !self.hitbox_active {
            return false;
        }
        if !self.hit_registered {
            return true;
        }
        match (id.definition().hit_interval_ms, self.last_hit_at_ms) {
            (Some(interval), Some(last)) => self.clock_ms - last >= interval,
            _ => false,
        }
    }

    pub fn register_hit(&mut self) {
        self.hit_registered = true;
        self.last_hit_at_ms = Some(self.clock_ms);
    }

    fn enter_attack_state(&mut self) {
        self.invalidate_actions();
        self.state = FighterState::Attack;
        self.velocity.x = 0.0;
    }

    fn begin_windup(&mut self, id: AttackId, release_after_ms: Option<f32>) {
        let def = id.definition();
        self.pending_attack = Some(id);
        self.phase = Some(AttackPhase::WindingUp);
        self.animation = AnimationCue::play(def.windup_clip());
        self.timers.set(
            TIMER_CHARGE,
            FighterTimer::ChargeHold {
                seq: self.action_seq,
                release_after_ms,
            },
            WINDUP_HOLD_MS,
        );
    }

    fn execute(&mut self, id: AttackId) {
        let def = id.definition();
        self.pending_attack = None;
        self.active_attack = Some(id);
        self.phase = Some(AttackPhase::Executing);
        self.hitbox_active = true;
        self.hit_registered = false;
        self.last_hit_at_ms = None;
        self.animation = AnimationCue::play(def.animation);

        let seq = self.action_seq;
        self.timers.set(TIMER_HITBOX, FighterTimer::HitboxOff { seq }, def.active_ms);
        self.timers.set(TIMER_IDLE, FighterTimer::ReturnToIdle { seq }, def.animation_ms);
        debug!(player = self.slot.number(), attack = def.name, "Hitbox active");
    }

    fn clear_attack(&mut self) {
        self.active_attack = None;
        self.pending_attack = None;
        self.phase = None;
        self.hitbox_active = false;
        self.hit_registered = false;
        self.last_hit_at_ms = None;
    }

    /// Bump the sequence and drop every scheduled transition
    fn invalidate_actions(&mut self) {
        self.action_seq += 1;
        self.timers.clear_all();
    }

    // --- blocking ---

    /// Hold block in `zone`. Switching zones restarts the perfect-block clock.
    pub fn start_block(&mut self, zone: HitZone) -> bool {
        if !self.can_block() {
            return false;
        }
        if self.block.blocking {
            if self.block.zone == zone {
                return false;
            }
            self.block.zone = zone;
            self.block.started_at_ms = self.clock_ms;
            self.animation = AnimationCue::play(block_clip(zone));
            trace!(player = self.slot.number(), ?zone, "Block zone switched");
            return true;
        }

        self.block = BlockState {
            blocking: true,
            zone,
            started_at_ms: self.clock_ms,
            released_at_ms: None,
            last_zone: self.block.last_zone,
        };
        self.state = FighterState::Block;
        self.velocity.x = 0.0;
        self.animation = AnimationCue::play(block_clip(zone));
        debug!(player = self.slot.number(), ?zone, "Block started");
        true
    }

    pub fn stop_block(&mut self) -> bool {
        if !self.block.blocking {
            return false;
        }
        self.block.blocking = false;
        self.block.released_at_ms = Some(self.clock_ms);
        self.block.last_zone = Some(self.block.zone);
        if self.state == FighterState::Block {
            self.state = FighterState::Idle;
            self.animation = AnimationCue::play("idle");
        }
        true
    }

    pub fn defense_status(&self, grace_ms: f32) -> DefenseStatus {
        let elapsed_ms = self.clock_ms - self.block.started_at_ms;
        if self.block.blocking {
            return DefenseStatus::Blocking {
                zone: self.block.zone,
                elapsed_ms,
            };
        }
        match self.block.released_at_ms {
            Some(released) if self.clock_ms - released <= grace_ms => {
                DefenseStatus::Grace { elapsed_ms }
            }
            _ => DefenseStatus::Open,
        }
    }

    // --- damage ---

    /// Flinch from an unblocked hit. Super armor and an ongoing stun both
    /// suppress it.
    pub fn apply_hurt(&mut self) -> bool {
        if self.is_dead() || self.super_armor || self.is_stunned() {
            return false;
        }
        self.invalidate_actions();
        self.clear_attack();
        self.block.blocking = false;
        self.state = FighterState::Hurt;
        self.animation = AnimationCue::play("hurt");
        self.timers.set(
            TIMER_HURT,
            FighterTimer::HurtRecover { seq: self.action_seq },
            HURT_RECOVERY_MS,
        );
        debug!(player = self.slot.number(), "Hurt");
        true
    }

    /// Horizontal impulse; positive pushes right
    pub fn knockback(&mut self, impulse: f32) {
        if self.is_dead() {
            return;
        }
        self.velocity.x = impulse;
    }

    /// Returns the health left
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.health
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_dead() {
            self.health = (self.health + amount.max(0.0)).min(self.max_health);
        }
        self.health
    }

    /// Put the fighter into the dazed stun. Needs a stun meter.
    pub fn enter_stun(&mut self) -> bool {
        if self.is_dead() || self.is_stunned() {
            return false;
        }
        let Some(stun) = self.meter.stun_mut() else {
            return false;
        };
        stun.trigger_stun();

        self.invalidate_actions();
        self.clear_attack();
        self.super_armor = false;
        self.block.blocking = false;
        self.state = FighterState::Hurt;
        self.animation = AnimationCue {
            clip: "stunned",
            paused: false,
            time_scale: STUN_TIME_SCALE,
        };
        debug!(player = self.slot.number(), "Stunned");
        true
    }

    /// Count the stun down; `true` on the tick it ends
    pub fn update_stun(&mut self, dt_ms: f32) -> bool {
        let ended = self
            .meter
            .stun_mut()
            .is_some_and(|stun| stun.update(dt_ms));
        if ended && !self.is_dead() {
            self.state = FighterState::Idle;
            self.velocity.x = 0.0;
            self.animation = AnimationCue::play("idle");
            debug!(player = self.slot.number(), "Stun ended");
        }
        ended
    }

    /// Terminal. Returns `false` if already dead.
    pub fn die(&mut self) -> bool {
        if self.is_dead() {
            return false;
        }
        self.invalidate_actions();
        self.clear_attack();
        self.super_armor = false;
        self.block.blocking = false;
        if let Some(stun) = self.meter.stun_mut() {
            stun.reset();
        }
        self.state = FighterState::Dead;
        self.animation = AnimationCue::play("ko");
        debug!(player = self.slot.number(), "Dead");
        true
    }

    // --- per tick ---

    /// Auto-face the opponent unless facing is locked
    pub fn update_facing(&mut self, opponent_x: f32) {
        if matches!(
            self.state,
            FighterState::Attack | FighterState::Hurt | FighterState::Dead | FighterState::Jump
        ) {
            return;
        }
        if opponent_x < self.position.x {
            self.facing = Facing::Left;
        } else if opponent_x > self.position.x {
            self.facing = Facing::Right;
        }
    }

    /// Advance the fighter clock, fire due timers and integrate physics
    pub fn update(&mut self, dt_ms: f32) {
        self.clock_ms += dt_ms;
        for action in self.timers.advance(dt_ms) {
            self.run_timer(action);
        }
        physics::integrate(self, dt_ms);
    }

    fn run_timer(&mut self, action: FighterTimer) {
        if action.seq() != self.action_seq {
            trace!(player = self.slot.number(), ?action, "Stale fighter timer ignored");
            return;
        }
        match action {
            FighterTimer::ChargeHold { seq, release_after_ms } => {
                if self.state != FighterState::Attack || self.pending_attack.is_none() {
                    return;
                }
                self.phase = Some(AttackPhase::Paused);
                self.animation.paused = true;
                if let Some(ms) = release_after_ms {
                    self.timers
                        .set(TIMER_CHARGE, FighterTimer::ChargeRelease { seq }, ms);
                }
            }
            FighterTimer::ChargeRelease { .. } => {
                if self.state != FighterState::Attack {
                    return;
                }
                if let Some(id) = self.pending_attack {
                    self.execute(id);
                }
            }
            FighterTimer::HitboxOff { .. } => {
                self.hitbox_active = false;
                if self.state == FighterState::Attack {
                    self.phase = Some(AttackPhase::Recovering);
                }
            }
            FighterTimer::ReturnToIdle { .. } => {
                if self.state != FighterState::Attack {
                    return;
                }
                self.clear_attack();
                self.state = FighterState::Idle;
                self.animation = AnimationCue::play("idle");
            }
            FighterTimer::HurtRecover { .. } => {
                if self.state == FighterState::Hurt && !self.is_stunned() {
                    self.state = FighterState::Idle;
                    self.animation = AnimationCue::play("idle");
                }
            }
        }
    }

    /// Swap loadout mid-match, dropping any attack in progress
    pub fn equip(&mut self, loadout: Loadout) -> bool {
        if self.is_dead() || self.loadout == loadout {
            return false;
        }
        self.cancel_attack();
        self.loadout = loadout;
        debug!(player = self.slot.number(), loadout = loadout.as_str(), "Loadout changed");
        true
    }

    /// Back to spawn with all sub-state cleared. With `carry_health` the
    /// current health is kept.
    pub fn reset(&mut self, carry_health: bool) {
        self.invalidate_actions();
        self.clear_attack();
        self.position = Vec2::new(self.spawn_x, self.ground_y);
        self.velocity = Vec2::ZERO;
        self.facing = default_facing(self.slot);
        self.state = FighterState::Idle;
        self.super_armor = false;
        self.block = BlockState::default();
        self.meter.reset();
        self.held_direction = None;
        self.running = false;
        self.stomped = false;
        self.animation = AnimationCue::play("idle");
        self.clock_ms = 0.0;
        if !carry_health {
            self.health = self.max_health;
        }
    }
}

fn default_facing(slot: PlayerSlot) -> Facing {
    match slot {
        PlayerSlot::One => Facing::Right,
        PlayerSlot::Two => Facing::Left,
    }
}

fn block_clip(zone: HitZone) -> &'static str {
    match zone.guard_stance() {
        HitZone::Top => "block_top",
        _ => "block_center",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1000.0 / 60.0;

    fn human(loadout: Loadout) -> Fighter {
        Fighter::spawn(PlayerSlot::One, &FighterSetup::human(loadout))
    }

    fn ai(loadout: Loadout) -> Fighter {
        Fighter::spawn(PlayerSlot::Two, &FighterSetup::ai(loadout))
    }

    fn run(fighter: &mut Fighter, ms: f32) {
        let mut left = ms;
        while left > 0.0 {
            let dt = left.min(TICK);
            fighter.update(dt);
            left -= dt;
        }
    }

    #[test]
    fn test_uncharged_attack_runs_to_idle() {
        let mut f = human(Loadout::Bare);
        assert!(f.start_attack(AttackKind::Light));
        assert_eq!(f.state(), FighterState::Attack);
        assert_eq!(f.active_attack(), Some(AttackId::Jab));
        assert!(f.hitbox_active());

        run(&mut f, 160.0);
        assert!(!f.hitbox_active());
        assert_eq!(f.attack_phase(), Some(AttackPhase::Recovering));

        run(&mut f, 200.0);
        assert_eq!(f.state(), FighterState::Idle);
        assert_eq!(f.active_attack(), None);
    }

    #[test]
    fn test_charged_attack_pauses_then_executes() {
        let mut f = human(Loadout::Bare);
        assert!(f.start_attack(AttackKind::Heavy));
        assert_eq!(f.pending_attack(), Some(AttackId::Uppercut));
        assert_eq!(f.attack_phase(), Some(AttackPhase::WindingUp));
        assert_eq!(f.animation().clip, "uppercut_windup");

        run(&mut f, WINDUP_HOLD_MS + 1.0);
        assert_eq!(f.attack_phase(), Some(AttackPhase::Paused));
        assert!(f.animation().paused);
        assert!(!f.hitbox_active());

        run(&mut f, 310.0);
        assert_eq!(f.attack_phase(), Some(AttackPhase::Executing));
        assert_eq!(f.active_attack(), Some(AttackId::Uppercut));
        assert!(f.hitbox_active());
    }

    #[test]
    fn test_interrupted_charge_never_fires() {
        let mut f = human(Loadout::Sword);
        f.start_attack(AttackKind::Heavy);
        run(&mut f, 200.0);
        let seq = f.action_seq();
        assert!(f.apply_hurt());
        assert!(f.action_seq() > seq);

        run(&mut f, 2000.0);
        assert_eq!(f.active_attack(), None);
        assert!(!f.hitbox_active());
        assert_eq!(f.state(), FighterState::Idle);
    }

    #[test]
    fn test_attack_guards() {
        let mut f = human(Loadout::Bare);
        f.start_block(HitZone::Center);
        assert!(!f.start_attack(AttackKind::Light), "cannot attack from block");
        f.stop_block();
        assert!(f.start_attack(AttackKind::Light));
        assert!(!f.start_attack(AttackKind::Light), "already attacking");
    }

    #[test]
    fn test_special_needs_full_meter() {
        let mut f = human(Loadout::Bare);
        assert!(!f.start_attack(AttackKind::Special));
        f.meter_mut().special_mut().unwrap().fill();
        assert!(f.start_attack(AttackKind::Special));
        assert_eq!(f.active_attack(), Some(AttackId::Flurry));
        assert_eq!(f.meter().special().unwrap().value(), 0.0);
    }

    #[test]
    fn test_multi_hit_cadence() {
        let mut f = human(Loadout::Bare);
        f.meter_mut().special_mut().unwrap().fill();
        f.start_attack(AttackKind::Special);
        assert!(f.can_register_hit());
        f.register_hit();
        assert!(!f.can_register_hit());
        run(&mut f, 125.0);
        assert!(f.can_register_hit(), "flurry re-opens after its interval");

        let mut single = human(Loadout::Bare);
        single.start_attack(AttackKind::Light);
        single.register_hit();
        run(&mut single, 100.0);
        assert!(!single.can_register_hit());
    }

    #[test]
    fn test_telegraph_waits_for_execute() {
        let mut f = ai(Loadout::Sword);
        assert!(f.start_attack_telegraph(AttackKind::Light));
        run(&mut f, 2000.0);
        assert_eq!(f.attack_phase(), Some(AttackPhase::Paused));
        assert_eq!(f.state(), FighterState::Attack);
        assert!(f.execute_telegraphed_attack());
        assert!(f.hitbox_active());
        assert!(!f.execute_telegraphed_attack());
    }

    #[test]
    fn test_movement_is_idempotent() {
        let mut f = human(Loadout::Bare);
        assert!(f.set_movement(Some(MoveDirection::Right), false));
        assert!(!f.set_movement(Some(MoveDirection::Right), false));
        assert!(f.set_movement(Some(MoveDirection::Right), true));
        assert!(f.set_movement(None, false));
        assert_eq!(f.state(), FighterState::Idle);
    }

    #[test]
    fn test_zone_switch_restarts_block_clock() {
        let mut f = human(Loadout::Bare);
        f.start_block(HitZone::Center);
        run(&mut f, 400.0);
        match f.defense_status(150.0) {
            DefenseStatus::Blocking { elapsed_ms, .. } => assert!(elapsed_ms >= 399.0),
            other => panic!("Expected blocking, got {:?}", other),
        }
        assert!(f.start_block(HitZone::Top));
        match f.defense_status(150.0) {
            DefenseStatus::Blocking { zone, elapsed_ms } => {
                assert_eq!(zone, HitZone::Top);
                assert_eq!(elapsed_ms, 0.0);
            }
            other => panic!("Expected blocking, got {:?}", other),
        }
        assert!(!f.start_block(HitZone::Top), "same zone is a no-op");
    }

    #[test]
    fn test_grace_after_release() {
        let mut f = human(Loadout::Bare);
        f.start_block(HitZone::Top);
        run(&mut f, 100.0);
        f.stop_block();
        assert_eq!(f.block().last_zone, Some(HitZone::Top));
        run(&mut f, 100.0);
        assert!(matches!(f.defense_status(150.0), DefenseStatus::Grace { .. }));
        run(&mut f, 100.0);
        assert_eq!(f.defense_status(150.0), DefenseStatus::Open);
    }

    #[test]
    fn test_super_armor_blocks_hurt() {
        let mut f = ai(Loadout::Sword);
        f.start_attack_telegraph(AttackKind::Heavy);
        f.set_super_armor(true);
        assert!(!f.apply_hurt());
        assert_eq!(f.state(), FighterState::Attack);
    }

    #[test]
    fn test_stun_lifecycle() {
        let mut f = ai(Loadout::Sword);
        f.meter_mut().stun_mut().unwrap().add(100.0);
        assert!(f.enter_stun());
        assert_eq!(f.state(), FighterState::Hurt);
        assert_eq!(f.animation().time_scale, STUN_TIME_SCALE);
        assert!(!f.apply_hurt(), "stun is not replaced by a flinch");
        assert!(!f.can_attack() && !f.can_block() && !f.can_move());

        assert!(!f.update_stun(1000.0));
        assert!(f.update_stun(1000.0));
        assert_eq!(f.state(), FighterState::Idle);
        assert!(!f.is_stunned());
    }

    #[test]
    fn test_human_has_no_stun() {
        let mut f = human(Loadout::Bare);
        assert!(!f.enter_stun());
    }

    #[test]
    fn test_dead_is_terminal() {
        let mut f = human(Loadout::Bare);
        f.apply_damage(500.0);
        assert_eq!(f.health(), 0.0);
        assert!(f.die());
        assert!(!f.die());
        assert!(!f.start_attack(AttackKind::Light));
        assert!(!f.start_block(HitZone::Top));
        assert!(!f.jump());
        assert!(!f.apply_hurt());
        f.update_facing(0.0);
        run(&mut f, 1000.0);
        assert_eq!(f.state(), FighterState::Dead);
    }

    #[test]
    fn test_facing_lock() {
        let mut f = human(Loadout::Bare);
        f.update_facing(f.position.x - 100.0);
        assert_eq!(f.facing(), Facing::Left);
        f.start_attack(AttackKind::Light);
        f.update_facing(f.position.x + 100.0);
        assert_eq!(f.facing(), Facing::Left, "facing locked while attacking");
    }

    #[test]
    fn test_equip_cancels_attack() {
        let mut f = human(Loadout::Bare);
        f.start_attack(AttackKind::Heavy);
        assert!(f.equip(Loadout::Sword));
        assert_eq!(f.state(), FighterState::Idle);
        assert_eq!(f.pending_attack(), None);
        assert_eq!(f.loadout(), Loadout::Sword);
    }

    #[test]
    fn test_reset_keeps_carried_health() {
        let mut f = human(Loadout::Bare);
        f.apply_damage(30.0);
        f.start_attack(AttackKind::Light);
        f.reset(true);
        assert_eq!(f.health(), 70.0);
        assert_eq!(f.state(), FighterState::Idle);
        f.reset(false);
        assert_eq!(f.health(), f.max_health());
    }
}

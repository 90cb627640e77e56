//! Combat orchestrator.
//!
//! Owns both fighters, their AIs, the pose provider and the per-match log.
//! One `update(dt_ms)` runs the fixed tick order:
//!
//! 1. stun countdowns
//! 2. fighter clocks, timers and physics, then AI decisions
//! 3. mutual facing
//! 4. pushback
//! 5. jump stomps
//! 6. attack collisions, player one before player two
//! 7. knockout
//!
//! Once a knockout is recorded the match is inactive and further updates,
//! inputs and confirmed hits are ignored.

pub mod damage;
pub mod events;
pub mod log;

use tracing::{debug, info, trace};

use crate::ai::profile::AiProfile;
use crate::ai::FighterAi;
use crate::attacks::AttackId;
use crate::config::{ConfigError, MatchConfig};
use crate::constants::VAMPIRISM_HEAL_PER_STACK;
use crate::fighter::{physics, Controller, Fighter, FighterState, PlayerSlot};
use crate::geometry::{self, Circle};
use crate::hitbox::{self, BodyZone, PoseProvider};
use crate::input::InputFrame;
use crate::meter::{FighterMeter, Meter, StunMeter};
use crate::pose::ProceduralPose;
use self::damage::{resolve_damage, BlockOutcome};
use self::events::CombatEvent;
use self::log::{CombatLog, LogKind};

pub struct CombatSystem<P: PoseProvider = ProceduralPose> {
    config: MatchConfig,
    fighters: [Fighter; 2],
    ais: [Option<FighterAi>; 2],
    pose: P,
    log: CombatLog,
    events: Vec<CombatEvent>,
    now_ms: f32,
    tick: u64,
    active: bool,
    winner: Option<PlayerSlot>,
}

impl CombatSystem<ProceduralPose> {
    /// Match driven by the built-in procedural pose
    pub fn headless(config: MatchConfig) -> Result<Self, ConfigError> {
        Self::new(config, ProceduralPose::default())
    }
}

impl<P: PoseProvider> CombatSystem<P> {
    pub fn new(config: MatchConfig, pose: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let fighters = PlayerSlot::BOTH.map(|slot| build_fighter(&config, slot));
        let ais = PlayerSlot::BOTH.map(|slot| build_ai(&config, slot));
        info!(
            p1 = config.fighters[0].loadout.as_str(),
            p2 = config.fighters[1].loadout.as_str(),
            difficulty = config.ai.difficulty.as_str(),
            "Match created"
        );
        Ok(Self {
            config,
            fighters,
            ais,
            pose,
            log: CombatLog::default(),
            events: Vec::new(),
            now_ms: 0.0,
            tick: 0,
            active: true,
            winner: None,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn fighter(&self, slot: PlayerSlot) -> &Fighter {
        &self.fighters[slot.index()]
    }

    pub fn fighter_mut(&mut self, slot: PlayerSlot) -> &mut Fighter {
        &mut self.fighters[slot.index()]
    }

    pub fn ai(&self, slot: PlayerSlot) -> Option<&FighterAi> {
        self.ais[slot.index()].as_ref()
    }

    pub fn pose(&self) -> &P {
        &self.pose
    }

    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    pub fn now_ms(&self) -> f32 {
        self.now_ms
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn winner(&self) -> Option<PlayerSlot> {
        self.winner
    }

    /// Events produced since the last drain, in order
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Shared entry point for local and remote input. AI-controlled slots
    /// ignore it.
    pub fn apply_input(&mut self, slot: PlayerSlot, frame: &InputFrame) {
        if !self.active {
            return;
        }
        let fighter = &mut self.fighters[slot.index()];
        if fighter.controller() == Controller::Ai {
            trace!(player = slot.number(), "Input ignored for AI slot");
            return;
        }
        fighter.apply_input(frame);
    }

    pub fn update(&mut self, dt_ms: f32) {
        if !self.active {
            return;
        }
        self.now_ms += dt_ms;
        self.tick += 1;

        self.update_stuns(dt_ms);

        for fighter in &mut self.fighters {
            fighter.update(dt_ms);
        }
        for slot in PlayerSlot::BOTH {
            if let Some(ai) = self.ais[slot.index()].as_mut() {
                let (me, opponent) = pair_mut(&mut self.fighters, slot);
                ai.update(dt_ms, me, opponent, &mut self.events);
            }
        }

        let [one, two] = &mut self.fighters;
        let (x1, x2) = (one.position.x, two.position.x);
        one.update_facing(x2);
        two.update_facing(x1);

        physics::apply_pushback(one, two, self.config.arena.min_separation);

        for slot in PlayerSlot::BOTH {
            self.check_stomp(slot);
        }
        for slot in PlayerSlot::BOTH {
            self.check_attack(slot);
        }

        self.check_knockout();
    }

    /// Run the full damage rules for a hit confirmed outside the collision
    /// pass, e.g. by an authoritative peer
    pub fn apply_confirmed_hit(&mut self, attacker: PlayerSlot, attack: AttackId, zone: BodyZone) -> bool {
        if !self.active {
            return false;
        }
        if self.fighter(attacker).is_dead() || self.fighter(attacker.opponent()).is_dead() {
            return false;
        }
        self.resolve_hit(attacker, attack, zone);
        self.check_knockout();
        true
    }

    /// New round: fighters back to spawn, log and clock cleared, AIs rebuilt
    pub fn reset(&mut self, carry_health: bool) {
        for fighter in &mut self.fighters {
            fighter.reset(carry_health);
        }
        self.ais = PlayerSlot::BOTH.map(|slot| build_ai(&self.config, slot));
        self.log.clear();
        self.events.clear();
        self.now_ms = 0.0;
        self.tick = 0;
        self.active = true;
        self.winner = None;
        info!(carry_health, "Match reset");
    }

    fn update_stuns(&mut self, dt_ms: f32) {
        for slot in PlayerSlot::BOTH {
            let fighter = &mut self.fighters[slot.index()];
            if !fighter.update_stun(dt_ms) {
                continue;
            }
            self.events.push(CombatEvent::StunEnded { player: slot });
            self.events.push(CombatEvent::StunMeterChanged {
                player: slot,
                value: 0.0,
            });
            if let Some(ai) = self.ais[slot.index()].as_mut() {
                ai.on_stun_end();
            }
        }
    }

    /// Once per jump, feet against the opponent's hurtboxes. Unblockable,
    /// no knockback.
    fn check_stomp(&mut self, slot: PlayerSlot) {
        let tuning = &self.config.combat;
        let (jumper, target) = pair_mut(&mut self.fighters, slot);
        if jumper.state() != FighterState::Jump || jumper.has_stomped() || target.is_dead() {
            return;
        }

        let feet = self.pose.sample(jumper);
        let hurtboxes = self.pose.sample(target).hurtboxes;
        let zone = [feet.right_foot, feet.left_foot]
            .into_iter()
            .flatten()
            .map(|foot| Circle::new(foot, tuning.stomp_radius))
            .find_map(|foot| {
                if geometry::circle_circle(&foot, &hurtboxes.head) {
                    Some(BodyZone::Head)
                } else if geometry::circle_box(&foot, &hurtboxes.body) {
                    Some(BodyZone::Body)
                } else {
                    None
                }
            });
        let Some(zone) = zone else {
            return;
        };

        jumper.mark_stomped();
        let damage = tuning.stomp_damage;
        let health = target.apply_damage(damage);
        self.events.push(CombatEvent::HealthChanged {
            player: target.slot(),
            health,
            max_health: target.max_health(),
        });
        self.events.push(CombatEvent::Hit {
            attacker: slot,
            defender: target.slot(),
            attack: None,
            damage,
            blocked: false,
            zone,
            perfect_block: false,
        });
        self.log.record(
            self.now_ms,
            LogKind::Stomp,
            slot,
            target.slot(),
            damage,
            jumper.loadout(),
            None,
        );
        debug!(player = slot.number(), damage, "Stomp");
    }

    fn check_attack(&mut self, slot: PlayerSlot) {
        let tolerance = self.config.combat.facing_tolerance;
        let (attacker, defender) = pair_mut(&mut self.fighters, slot);
        let Some(attack) = attacker.active_attack() else {
            return;
        };
        if !attacker.can_register_hit() || defender.is_dead() {
            return;
        }
        if !attacker.is_facing_toward(defender.position.x, tolerance) {
            return;
        }

        let pose = self.pose.sample(attacker);
        let Some(hitbox) = hitbox::resolve_hitbox(attack, &pose, attacker.loadout()) else {
            return;
        };
        let hurtboxes = self.pose.sample(defender).hurtboxes;
        let Some(zone) = hitbox::check_against_hurtboxes(&hitbox, &hurtboxes) else {
            return;
        };

        attacker.register_hit();
        self.resolve_hit(slot, attack, zone);
    }

    fn resolve_hit(&mut self, attacker_slot: PlayerSlot, attack: AttackId, zone: BodyZone) {
        let defender_slot = attacker_slot.opponent();
        let tuning = &self.config.combat;
        let stun = &self.config.stun;
        let (attacker, defender) = pair_mut(&mut self.fighters, attacker_slot);

        let defense = defender.defense_status(tuning.block_grace_ms);
        let outcome = resolve_damage(
            attack,
            zone,
            defense,
            attacker.bonuses(),
            defender.bonuses(),
            tuning,
        );
        let def = attack.definition();

        if outcome.damage > 0.0 {
            let health = defender.apply_damage(outcome.damage);
            self.events.push(CombatEvent::HealthChanged {
                player: defender_slot,
                health,
                max_health: defender.max_health(),
            });
        }

        let log_kind = match outcome.block {
            BlockOutcome::PerfectBlock => {
                let away = if attacker.position.x < defender.position.x {
                    -1.0
                } else {
                    1.0
                };
                attacker.knockback(away * tuning.perfect_block_knockback);

                if let Some(meter) = defender.meter_mut().special_mut() {
                    meter.fill();
                    let value = meter.value();
                    self.events.push(CombatEvent::SpecialMeterChanged {
                        player: defender_slot,
                        value,
                    });
                }

                if defender.controller() == Controller::Human && !attacker.is_stunned() {
                    let bonus = stun.perfect_block_bonus * defender.bonuses().stun_rate;
                    if let Some(meter) = attacker.meter_mut().stun_mut() {
                        let value = meter.add(bonus);
                        let full = meter.is_full();
                        self.events.push(CombatEvent::StunMeterChanged {
                            player: attacker_slot,
                            value,
                        });
                        if full && attacker.enter_stun() {
                            self.events.push(CombatEvent::StunStarted {
                                player: attacker_slot,
                            });
                            if let Some(ai) = self.ais[attacker_slot.index()].as_mut() {
                                ai.on_stunned(attacker);
                            }
                        }
                    }
                }
                LogKind::PerfectBlock
            }
            BlockOutcome::Blocked | BlockOutcome::WrongZone => LogKind::Blocked,
            BlockOutcome::Unblocked => {
                if !defender.has_super_armor() {
                    defender.apply_hurt();
                    if let Some(force) = def.knockback {
                        defender.knockback(attacker.facing().sign() * force);
                    }
                }
                if let Some(ai) = self.ais[defender_slot.index()].as_mut() {
                    ai.on_hit(defender);
                }

                let stacks = attacker.bonuses().vampirism_stacks;
                if outcome.damage > 0.0 && stacks > 0 {
                    let health = attacker.heal(stacks as f32 * VAMPIRISM_HEAL_PER_STACK);
                    self.events.push(CombatEvent::HealthChanged {
                        player: attacker_slot,
                        health,
                        max_health: attacker.max_health(),
                    });
                }

                let charge = def.special_charge * attacker.bonuses().special_charge_rate;
                if charge > 0.0 {
                    if let Some(meter) = attacker.meter_mut().special_mut() {
                        let value = meter.add(charge);
                        self.events.push(CombatEvent::SpecialMeterChanged {
                            player: attacker_slot,
                            value,
                        });
                    }
                }

                if !defender.is_stunned() {
                    let base = match zone {
                        BodyZone::Head => stun.head_hit,
                        BodyZone::Body => stun.body_hit,
                    };
                    let amount = base * attacker.bonuses().stun_rate;
                    if let Some(meter) = defender.meter_mut().stun_mut() {
                        let value = meter.add(amount);
                        let full = meter.is_full();
                        self.events.push(CombatEvent::StunMeterChanged {
                            player: defender_slot,
                            value,
                        });
                        if full && defender.enter_stun() {
                            self.events.push(CombatEvent::StunStarted {
                                player: defender_slot,
                            });
                            if let Some(ai) = self.ais[defender_slot.index()].as_mut() {
                                ai.on_stunned(defender);
                            }
                        }
                    }
                }

                if outcome.headshot {
                    LogKind::Headshot
                } else {
                    LogKind::Hit
                }
            }
        };

        self.log.record(
            self.now_ms,
            log_kind,
            attacker_slot,
            defender_slot,
            outcome.damage,
            attacker.loadout(),
            Some(attack),
        );
        self.events.push(CombatEvent::Hit {
            attacker: attacker_slot,
            defender: defender_slot,
            attack: Some(attack),
            damage: outcome.damage,
            blocked: outcome.block.is_blocked(),
            zone,
            perfect_block: outcome.block == BlockOutcome::PerfectBlock,
        });
        debug!(
            attacker = attacker_slot.number(),
            attack = def.name,
            damage = outcome.damage,
            block = ?outcome.block,
            ?zone,
            "Hit resolved"
        );
    }

    /// Player one is checked first, and only one knockout is ever recorded
    fn check_knockout(&mut self) {
        if !self.active {
            return;
        }
        let Some(loser) = PlayerSlot::BOTH
            .into_iter()
            .find(|slot| self.fighters[slot.index()].health() <= 0.0)
        else {
            return;
        };

        self.fighters[loser.index()].die();
        self.active = false;
        self.winner = Some(loser.opponent());
        self.events.push(CombatEvent::Knockout { loser });

        for slot in PlayerSlot::BOTH {
            if let Some(ai) = self.ais[slot.index()].as_mut() {
                ai.stop(&mut self.fighters[slot.index()]);
            }
        }
        info!(loser = loser.number(), tick = self.tick, "Knockout");
    }
}

/// (`slot`'s fighter, its opponent)
fn pair_mut(fighters: &mut [Fighter; 2], slot: PlayerSlot) -> (&mut Fighter, &mut Fighter) {
    let [one, two] = fighters;
    match slot {
        PlayerSlot::One => (one, two),
        PlayerSlot::Two => (two, one),
    }
}

fn build_fighter(config: &MatchConfig, slot: PlayerSlot) -> Fighter {
    let setup = config.setup(slot);
    let meter = match setup.controller {
        Controller::Human => FighterMeter::Special(Meter::new(config.special_max)),
        Controller::Ai => FighterMeter::Stun(StunMeter::new(config.stun.max, config.stun.duration_ms)),
    };
    Fighter::new(slot, setup, &config.arena, meter).with_bonuses(config.bonuses_for(slot))
}

fn build_ai(config: &MatchConfig, slot: PlayerSlot) -> Option<FighterAi> {
    match config.setup(slot).controller {
        Controller::Ai => Some(FighterAi::new(
            slot,
            AiProfile::for_difficulty(config.ai.difficulty),
            config.ai.decision_interval_ms,
            config.ai.seed,
        )),
        Controller::Human => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::{AttackKind, HitZone, Loadout};
    use crate::config::{BonusAssignment, BonusMultipliers};

    const TICK: f32 = 1000.0 / 60.0;

    fn versus(one: Loadout, two: Loadout) -> CombatSystem {
        CombatSystem::headless(MatchConfig::versus(one, two)).unwrap()
    }

    fn close_in(sys: &mut CombatSystem, gap: f32) {
        sys.fighter_mut(PlayerSlot::One).position.x = 500.0;
        sys.fighter_mut(PlayerSlot::Two).position.x = 500.0 + gap;
    }

    #[test]
    fn test_jab_lands_through_collision() {
        let mut sys = versus(Loadout::Bare, Loadout::Bare);
        close_in(&mut sys, 80.0);
        sys.apply_input(PlayerSlot::One, &InputFrame::attacking(AttackKind::Light));
        sys.update(TICK);

        let defender = sys.fighter(PlayerSlot::Two);
        assert_eq!(defender.health(), 92.0);
        assert_eq!(defender.state(), FighterState::Hurt);
        assert_eq!(sys.log().count(LogKind::Hit), 1);

        // One hit per swing
        sys.update(TICK);
        assert_eq!(sys.fighter(PlayerSlot::Two).health(), 92.0);
    }

    /// Pose whose striking hand sits behind the fighter
    struct BackhandPose(ProceduralPose);

    impl PoseProvider for BackhandPose {
        fn sample(&self, fighter: &Fighter) -> hitbox::Pose {
            let mut pose = self.0.sample(fighter);
            let p = fighter.position;
            pose.right_hand = Some(bevy::math::Vec2::new(p.x - fighter.facing().sign() * 70.0, p.y + 90.0));
            pose
        }
    }

    #[test]
    fn test_attack_behind_the_attacker_never_lands() {
        let config = MatchConfig::versus(Loadout::Bare, Loadout::Bare);
        let mut sys = CombatSystem::new(config, BackhandPose(ProceduralPose::default())).unwrap();
        sys.fighter_mut(PlayerSlot::One).position.x = 500.0;
        sys.fighter_mut(PlayerSlot::Two).position.x = 580.0;
        sys.apply_input(PlayerSlot::One, &InputFrame::attacking(AttackKind::Light));
        // Facing is locked mid-attack, so the opponent is now behind
        sys.fighter_mut(PlayerSlot::Two).position.x = 430.0;
        for _ in 0..10 {
            sys.update(TICK);
        }
        assert_eq!(sys.fighter(PlayerSlot::Two).health(), 100.0);
        assert_eq!(sys.log().count(LogKind::Hit), 0);
    }

    #[test]
    fn test_stomp_once_per_jump() {
        let mut sys = versus(Loadout::Bare, Loadout::Bare);
        close_in(&mut sys, 80.0);
        sys.apply_input(PlayerSlot::One, &InputFrame::idle().with_jump());
        assert_eq!(sys.fighter(PlayerSlot::One).state(), FighterState::Jump);

        for _ in 0..40 {
            let x = sys.fighter(PlayerSlot::One).position.x;
            sys.fighter_mut(PlayerSlot::Two).position.x = x;
            sys.update(TICK);
        }
        assert_eq!(sys.log().count(LogKind::Stomp), 1);
        assert_eq!(sys.fighter(PlayerSlot::Two).health(), 95.0);
        assert_eq!(sys.fighter(PlayerSlot::Two).state(), FighterState::Idle);
    }

    #[test]
    fn test_confirmed_hit_updates_meters() {
        let mut sys = CombatSystem::headless(MatchConfig::against_ai(
            Loadout::Bare,
            Loadout::Sword,
            crate::ai::profile::Difficulty::Easy,
        ))
        .unwrap();
        assert!(sys.apply_confirmed_hit(PlayerSlot::One, AttackId::Jab, BodyZone::Head));

        let special = sys.fighter(PlayerSlot::One).meter().special().unwrap().value();
        assert_eq!(special, 8.0);
        let stun = sys.fighter(PlayerSlot::Two).meter().stun().unwrap().value();
        assert_eq!(stun, 30.0);
        assert_eq!(sys.log().count(LogKind::Headshot), 1);
        assert!(sys
            .drain_events()
            .iter()
            .any(|e| matches!(e, CombatEvent::StunMeterChanged { value, .. } if *value == 30.0)));
    }

    #[test]
    fn test_vampirism_heals_attacker() {
        let mut config = MatchConfig::versus(Loadout::Bare, Loadout::Bare);
        config.fighters[0].starting_health = Some(50.0);
        config.bonus = Some(BonusAssignment {
            target: PlayerSlot::One,
            bonuses: BonusMultipliers {
                vampirism_stacks: 2,
                ..BonusMultipliers::default()
            },
        });
        let mut sys = CombatSystem::headless(config).unwrap();
        sys.apply_confirmed_hit(PlayerSlot::One, AttackId::Jab, BodyZone::Body);
        assert_eq!(sys.fighter(PlayerSlot::One).health(), 54.0);
    }

    #[test]
    fn test_blocked_hit_does_not_hurt() {
        let mut sys = versus(Loadout::Bare, Loadout::Sword);
        sys.apply_input(PlayerSlot::Two, &InputFrame::blocking(HitZone::Center));
        for _ in 0..30 {
            sys.update(TICK);
        }
        sys.apply_confirmed_hit(PlayerSlot::One, AttackId::Jab, BodyZone::Body);
        let defender = sys.fighter(PlayerSlot::Two);
        assert_eq!(defender.state(), FighterState::Block);
        assert!((defender.health() - (100.0 - 8.0 * 0.4)).abs() < 1e-3);
        assert_eq!(sys.log().count(LogKind::Blocked), 1);
    }

    #[test]
    fn test_knockout_fires_once_and_freezes_match() {
        let mut sys = versus(Loadout::Sword, Loadout::Bare);
        for _ in 0..10 {
            sys.apply_confirmed_hit(PlayerSlot::One, AttackId::HeavySlash, BodyZone::Body);
        }
        let knockouts = sys
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, CombatEvent::Knockout { .. }))
            .count();
        assert_eq!(knockouts, 1);
        assert!(!sys.is_active());
        assert_eq!(sys.winner(), Some(PlayerSlot::One));
        assert_eq!(sys.fighter(PlayerSlot::Two).health(), 0.0);
        assert_eq!(sys.fighter(PlayerSlot::Two).state(), FighterState::Dead);

        let tick = sys.tick_count();
        sys.update(TICK);
        assert_eq!(sys.tick_count(), tick);
        assert!(!sys.apply_confirmed_hit(PlayerSlot::One, AttackId::Slash, BodyZone::Body));
    }

    #[test]
    fn test_ai_slot_ignores_input() {
        let mut sys = CombatSystem::headless(MatchConfig::default()).unwrap();
        sys.apply_input(PlayerSlot::Two, &InputFrame::blocking(HitZone::Top));
        assert!(!sys.fighter(PlayerSlot::Two).is_blocking());
    }

    #[test]
    fn test_reset_restores_round() {
        let mut sys = versus(Loadout::Bare, Loadout::Bare);
        sys.apply_confirmed_hit(PlayerSlot::One, AttackId::Uppercut, BodyZone::Body);
        sys.update(TICK);
        sys.reset(false);
        assert_eq!(sys.fighter(PlayerSlot::Two).health(), 100.0);
        assert!(sys.log().is_empty());
        assert_eq!(sys.tick_count(), 0);
        assert!(sys.is_active());
    }
}

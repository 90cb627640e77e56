use criterion::{black_box, criterion_group, criterion_main, Criterion};

use duel_core::ai::profile::Difficulty;
use duel_core::attacks::{AttackId, Loadout};
use duel_core::combat::damage::resolve_damage;
use duel_core::config::{BonusMultipliers, CombatTuning, FighterSetup};
use duel_core::fighter::DefenseStatus;
use duel_core::hitbox::{self, BodyZone, PoseProvider};
use duel_core::pose::ProceduralPose;
use duel_core::replay::state_digest;
use duel_core::{CombatSystem, Fighter, MatchConfig, PlayerSlot};

const TICK_MS: f32 = 1000.0 / 60.0;

fn ai_vs_ai() -> MatchConfig {
    let mut config = MatchConfig::against_ai(Loadout::Sword, Loadout::Bare, Difficulty::Hard);
    config.fighters[0] = FighterSetup::ai(Loadout::Sword);
    config
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("combat_tick_ai_vs_ai", |b| {
        let mut system = CombatSystem::headless(ai_vs_ai()).unwrap();
        b.iter(|| {
            if !system.is_active() {
                system.reset(false);
            }
            system.update(black_box(TICK_MS));
            black_box(system.drain_events());
        })
    });

    c.bench_function("full_match_600_ticks", |b| {
        b.iter(|| {
            let mut system = CombatSystem::headless(ai_vs_ai()).unwrap();
            for _ in 0..600 {
                system.update(TICK_MS);
            }
            black_box(system.winner())
        })
    });
}

fn bench_hit_resolution(c: &mut Criterion) {
    let tuning = CombatTuning::default();
    let neutral = BonusMultipliers::default();
    c.bench_function("resolve_damage", |b| {
        b.iter(|| {
            resolve_damage(
                black_box(AttackId::HeavySlash),
                black_box(BodyZone::Head),
                black_box(DefenseStatus::Blocking {
                    zone: duel_core::attacks::HitZone::Center,
                    elapsed_ms: 450.0,
                }),
                &neutral,
                &neutral,
                &tuning,
            )
        })
    });

    let pose = ProceduralPose::default();
    let attacker = Fighter::spawn(PlayerSlot::One, &FighterSetup::human(Loadout::Sword));
    let defender = Fighter::spawn(PlayerSlot::Two, &FighterSetup::human(Loadout::Bare));
    c.bench_function("hitbox_vs_hurtboxes", |b| {
        b.iter(|| {
            let sampled = pose.sample(black_box(&attacker));
            let hurtboxes = pose.sample(black_box(&defender)).hurtboxes;
            hitbox::resolve_hitbox(AttackId::Slash, &sampled, Loadout::Sword)
                .and_then(|h| hitbox::check_against_hurtboxes(&h, &hurtboxes))
        })
    });
}

fn bench_digest(c: &mut Criterion) {
    let system = CombatSystem::headless(ai_vs_ai()).unwrap();
    c.bench_function("state_digest", |b| b.iter(|| state_digest(black_box(&system))));
}

criterion_group!(benches, bench_tick, bench_hit_resolution, bench_digest);
criterion_main!(benches);

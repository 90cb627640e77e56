//! Centralized game constants for the duel combat core.
//!
//! Everything here is a default; the tunable subset is mirrored in
//! `config::MatchConfig` and may be overridden per match. Per-attack numbers
//! live in `attacks` as the single source of truth.

// =====================================================
// Blocking
// =====================================================

/// Perfect-block window measured from block start (ms)
pub const PERFECT_BLOCK_WINDOW_MS: f32 = 300.0;

/// Grace window after releasing block in which only a perfect block can happen (ms)
pub const BLOCK_GRACE_MS: f32 = 150.0;

/// Damage reduction when the held zone matches the incoming hit
pub const BLOCK_REDUCTION: f32 = 0.6;

/// Damage reduction when blocking the wrong zone
pub const WRONG_ZONE_BLOCK_REDUCTION: f32 = 0.4;

/// Distance the attacker is shoved back after being perfect-blocked (px/s impulse)
pub const PERFECT_BLOCK_KNOCKBACK: f32 = 420.0;

// =====================================================
// Damage
// =====================================================

/// Headshot multiplier for attacks that do not define their own
pub const HEADSHOT_MULTIPLIER: f32 = 1.5;

/// Flat damage of a jump stomp (unblockable)
pub const STOMP_DAMAGE: f32 = 5.0;

/// Radius of the foot contact circles used for stomps
pub const STOMP_RADIUS: f32 = 20.0;

/// Health restored per vampirism stack on an unblocked damaging hit
pub const VAMPIRISM_HEAL_PER_STACK: f32 = 2.0;

/// A target further than this behind the attacker's facing can never be hit (px)
pub const FACING_TOLERANCE: f32 = 20.0;

// =====================================================
// Meters
// =====================================================

pub const STUN_MAX: f32 = 100.0;
pub const STUN_HEAD_HIT: f32 = 30.0;
pub const STUN_BODY_HIT: f32 = 10.0;

/// Stun added to an AI attacker whose hit was perfect-blocked by the human side
pub const STUN_PERFECT_BLOCK_BONUS: f32 = 20.0;

pub const STUN_DURATION_MS: f32 = 2000.0;

/// Animation time scale of the dazed loop while stunned
pub const STUN_TIME_SCALE: f32 = 0.5;

pub const SPECIAL_MAX: f32 = 100.0;

// =====================================================
// Fighter timing
// =====================================================

/// Wind-up hold before a charged/telegraphed attack freezes on its wind-up frame (ms)
pub const WINDUP_HOLD_MS: f32 = 120.0;

/// Flinch duration before a hurt fighter returns to idle (ms)
pub const HURT_RECOVERY_MS: f32 = 400.0;

// =====================================================
// Physics (y-up world, px and px/s)
// =====================================================

pub const WALK_SPEED: f32 = 220.0;
pub const RUN_SPEED: f32 = 380.0;
pub const JUMP_VELOCITY: f32 = 1000.0;
pub const GRAVITY: f32 = -2400.0;

/// Per-60Hz-frame horizontal velocity retention when not actively moving
pub const GROUND_FRICTION: f32 = 0.80;

pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

// =====================================================
// Arena
// =====================================================

pub const ARENA_MIN_X: f32 = 0.0;
pub const ARENA_MAX_X: f32 = 1200.0;
pub const GROUND_Y: f32 = 0.0;
pub const SPAWN_ONE_X: f32 = 400.0;
pub const SPAWN_TWO_X: f32 = 800.0;

/// Fighters are pushed apart when closer than this (px)
pub const MIN_SEPARATION: f32 = 70.0;

/// Pushback share of a fighter that is blocking (attacking = 0, otherwise 1)
pub const BLOCK_PUSH_RATIO: f32 = 0.3;

// =====================================================
// AI
// =====================================================

pub const AI_DECISION_INTERVAL_MS: f32 = 200.0;

/// Extra effective range for a sword-armed AI
pub const AI_SWORD_RANGE_BONUS: f32 = 120.0;

/// Extra effective range for a bare-handed AI
pub const AI_BARE_RANGE_BONUS: f32 = 50.0;

/// Telegraph scale for bare-handed strikes
pub const AI_BARE_TELEGRAPH_SCALE: f32 = 0.8;

/// How much further than its own range the AI watches for incoming attacks
pub const AI_DANGER_MARGIN: f32 = 60.0;

/// Urge at which an attack fires deterministically
pub const AI_URGE_THRESHOLD: f32 = 1.0;

/// Urge gained per in-range decision tick at aggressiveness 1.0
pub const AI_URGE_GROWTH: f32 = 0.25;

/// Urge lost per out-of-range decision tick
pub const AI_URGE_DECAY: f32 = 0.05;

/// Share of urge kept after an attack fires
pub const AI_URGE_RETAINED: f32 = 0.3;

/// Recovery buffer after an AI attack's animation before it acts again (ms)
pub const AI_RECOVERY_BUFFER_MS: f32 = 200.0;

/// Hits within this window count toward the same combo (ms)
pub const AI_COMBO_WINDOW_MS: f32 = 1200.0;

/// Consecutive hits that force a block
pub const AI_ANTI_STUNLOCK_HITS: u32 = 3;

/// Block chance multiplier right after being hit
pub const AI_POST_HIT_BLOCK_SCALE: f32 = 1.5;

/// How long an AI block is held before release (ms)
pub const AI_BLOCK_HOLD_MS: f32 = 500.0;

/// Beyond effective range times this, the AI runs instead of walking
pub const AI_RUN_DISTANCE_SCALE: f32 = 2.5;

/// Closer than effective range times this counts as "too close"
pub const AI_TOO_CLOSE_SCALE: f32 = 0.45;

// =====================================================
// Combat log
// =====================================================

pub const COMBAT_LOG_CAPACITY: usize = 256;

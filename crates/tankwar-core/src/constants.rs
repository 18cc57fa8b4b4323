//! Simulation constants and tuning defaults.
//!
//! Per-agent values are copied into `AgentConfig` at creation; these are
//! only the defaults a level file falls back to.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 50;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Sensors ---

/// Vision range (meters).
pub const DETECTION_RANGE: f32 = 20.0;

/// Hearing range (meters).
pub const HEARING_RANGE: f32 = 15.0;

/// Full vision cone angle (degrees). The test uses half of it either side of forward.
pub const FIELD_OF_VIEW_DEG: f32 = 120.0;

/// Minimum time between two positive hearing checks (seconds).
pub const HEARING_COOLDOWN_SECS: f32 = 2.0;

/// Engagement range of the ambush archetype (meters).
pub const AMBUSH_RANGE: f32 = 10.0;

// --- Movement ---

pub const CHASE_SPEED: f32 = 6.0;
pub const FLEE_SPEED: f32 = 8.0;
pub const PATROL_SPEED: f32 = 4.0;

/// Maximum body rotation rate while steering (degrees per second).
pub const TURN_RATE_DEG: f32 = 180.0;

/// Distance at which a patrol waypoint counts as reached (meters).
pub const WAYPOINT_TOLERANCE: f32 = 1.0;

// --- Weapons ---

pub const PROJECTILE_SPEED: f32 = 20.0;
pub const PROJECTILE_DAMAGE: f32 = 10.0;

/// Minimum interval between shots (seconds).
pub const FIRE_INTERVAL_SECS: f32 = 1.5;

/// Facing alignment required before Attack fires.
pub const ATTACK_ALIGNMENT: f32 = 0.95;

/// Facing alignment required for the fire-while-chasing shortcut.
pub const CHASE_ALIGNMENT: f32 = 0.9;

/// Distance in front of the hull at which projectiles spawn (meters).
pub const MUZZLE_OFFSET: f32 = 1.5;

/// Projectile lifetime before it is removed (seconds).
pub const PROJECTILE_LIFESPAN_SECS: f32 = 2.0;

/// Radius of a projectile for hit tests (meters).
pub const PROJECTILE_RADIUS: f32 = 0.2;

// --- Attack ---

/// Time without sight before Attack gives up and returns to Ambush (seconds).
pub const LOST_SIGHT_GRACE_SECS: f32 = 2.0;

// --- Flee ---

/// Distance of a freshly picked flee destination from the agent (meters).
pub const FLEE_DISTANCE: f32 = 10.0;

/// Distance from the threat at which a fleeing agent feels safe (meters).
pub const SAFE_DISTANCE: f32 = 15.0;

/// Interval between flee destination refreshes (seconds).
pub const FLEE_REFRESH_SECS: f32 = 0.5;

/// Length of the obstacle probe cast toward the flee destination (meters).
pub const FLEE_PROBE_DISTANCE: f32 = 3.0;

// --- Bodies ---

/// Collider radius of a tank hull (meters).
pub const TANK_RADIUS: f32 = 1.0;

/// Starting and maximum hit points of a tank.
pub const TANK_MAX_HEALTH: f32 = 100.0;

/// How long the player stays audible after firing (seconds).
pub const PLAYER_FIRE_NOISE_SECS: f32 = 0.5;

/// Half extent of the square arena (meters). Projectiles beyond it are removed.
pub const ARENA_HALF_EXTENT: f32 = 100.0;

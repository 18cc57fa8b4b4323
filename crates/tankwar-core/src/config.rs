//! Per-agent and per-level configuration.
//!
//! Every field falls back to the defaults in `constants` when omitted from a
//! level file, so a minimal agent entry is just an archetype and a position.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::enums::Archetype;
use crate::error::ConfigError;

/// Vision and hearing parameters. Immutable after the agent is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub detection_range: f32,
    pub hearing_range: f32,
    /// Full cone angle in degrees.
    pub field_of_view_deg: f32,
    pub hearing_cooldown_secs: f32,
    /// Only meaningful for the Ambush archetype.
    pub ambush_range: Option<f32>,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            detection_range: constants::DETECTION_RANGE,
            hearing_range: constants::HEARING_RANGE,
            field_of_view_deg: constants::FIELD_OF_VIEW_DEG,
            hearing_cooldown_secs: constants::HEARING_COOLDOWN_SECS,
            ambush_range: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedProfile {
    pub chase: f32,
    pub flee: f32,
    pub patrol: f32,
    /// Degrees per second.
    pub turn_rate_deg: f32,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            chase: constants::CHASE_SPEED,
            flee: constants::FLEE_SPEED,
            patrol: constants::PATROL_SPEED,
            turn_rate_deg: constants::TURN_RATE_DEG,
        }
    }
}

/// Gun parameters. An agent without one never fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub projectile_speed: f32,
    pub damage: f32,
    pub fire_interval_secs: f32,
    /// Minimum dot(forward, to-target) before Attack fires.
    pub attack_alignment: f32,
    /// Minimum dot(forward, to-target) for the fire-while-chasing shortcut.
    pub chase_alignment: f32,
    pub muzzle_offset: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            projectile_speed: constants::PROJECTILE_SPEED,
            damage: constants::PROJECTILE_DAMAGE,
            fire_interval_secs: constants::FIRE_INTERVAL_SECS,
            attack_alignment: constants::ATTACK_ALIGNMENT,
            chase_alignment: constants::CHASE_ALIGNMENT,
            muzzle_offset: constants::MUZZLE_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    pub waypoint_tolerance: f32,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            waypoint_tolerance: constants::WAYPOINT_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    pub lost_sight_grace_secs: f32,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            lost_sight_grace_secs: constants::LOST_SIGHT_GRACE_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleeConfig {
    pub flee_distance: f32,
    pub safe_distance: f32,
    pub refresh_secs: f32,
    pub probe_distance: f32,
}

impl Default for FleeConfig {
    fn default() -> Self {
        Self {
            flee_distance: constants::FLEE_DISTANCE,
            safe_distance: constants::SAFE_DISTANCE,
            refresh_secs: constants::FLEE_REFRESH_SECS,
            probe_distance: constants::FLEE_PROBE_DISTANCE,
        }
    }
}

fn default_weapon() -> Option<WeaponConfig> {
    Some(WeaponConfig::default())
}

/// Complete tuning of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub archetype: Archetype,
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub speeds: SpeedProfile,
    #[serde(default = "default_weapon")]
    pub weapon: Option<WeaponConfig>,
    #[serde(default)]
    pub patrol: PatrolConfig,
    #[serde(default)]
    pub attack: AttackConfig,
    #[serde(default)]
    pub flee: FleeConfig,
}

impl AgentConfig {
    /// Default tuning for an archetype.
    pub fn for_archetype(archetype: Archetype) -> Self {
        let ambush_range = match archetype {
            Archetype::Ambush => Some(constants::AMBUSH_RANGE),
            _ => None,
        };
        Self {
            archetype,
            sensors: SensorConfig {
                ambush_range,
                ..SensorConfig::default()
            },
            speeds: SpeedProfile::default(),
            weapon: default_weapon(),
            patrol: PatrolConfig::default(),
            attack: AttackConfig::default(),
            flee: FleeConfig::default(),
        }
    }

    /// Effective ambush range gate, if this agent uses one.
    pub fn ambush_range(&self) -> Option<f32> {
        match self.archetype {
            Archetype::Ambush => self.sensors.ambush_range,
            _ => None,
        }
    }

    /// Fix up recoverable inconsistencies, warning about each.
    ///
    /// An ambush range on a non-Ambush archetype is dropped; an Ambush agent
    /// without one gets the default.
    pub fn normalized(mut self) -> Self {
        match (self.archetype, self.sensors.ambush_range) {
            (Archetype::Ambush, None) => {
                self.sensors.ambush_range = Some(constants::AMBUSH_RANGE);
            }
            (Archetype::Ambush, Some(_)) => {}
            (archetype, Some(range)) => {
                tracing::warn!(
                    ?archetype,
                    range,
                    "ambush range ignored on non-ambush archetype"
                );
                self.sensors.ambush_range = None;
            }
            (_, None) => {}
        }
        self
    }

    /// Reject values the behaviors cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("detection_range", self.sensors.detection_range)?;
        positive("hearing_range", self.sensors.hearing_range)?;
        if !(self.sensors.field_of_view_deg > 0.0 && self.sensors.field_of_view_deg <= 360.0) {
            return Err(ConfigError::FieldOfView(self.sensors.field_of_view_deg));
        }
        non_negative("hearing_cooldown_secs", self.sensors.hearing_cooldown_secs)?;
        if let Some(range) = self.sensors.ambush_range {
            positive("ambush_range", range)?;
        }
        positive("speeds.chase", self.speeds.chase)?;
        positive("speeds.flee", self.speeds.flee)?;
        positive("speeds.patrol", self.speeds.patrol)?;
        positive("speeds.turn_rate_deg", self.speeds.turn_rate_deg)?;
        if let Some(weapon) = &self.weapon {
            positive("weapon.projectile_speed", weapon.projectile_speed)?;
            non_negative("weapon.damage", weapon.damage)?;
            non_negative("weapon.fire_interval_secs", weapon.fire_interval_secs)?;
        }
        positive("patrol.waypoint_tolerance", self.patrol.waypoint_tolerance)?;
        non_negative("attack.lost_sight_grace_secs", self.attack.lost_sight_grace_secs)?;
        positive("flee.flee_distance", self.flee.flee_distance)?;
        positive("flee.safe_distance", self.flee.safe_distance)?;
        positive("flee.refresh_secs", self.flee.refresh_secs)?;
        positive("flee.probe_distance", self.flee.probe_distance)?;
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn default_forward() -> Vec3 {
    Vec3::Z
}

fn default_looping() -> bool {
    true
}

/// One agent placement in a level file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpawn {
    pub position: Vec3,
    #[serde(default = "default_forward")]
    pub forward: Vec3,
    #[serde(flatten)]
    pub config: AgentConfig,
    #[serde(default)]
    pub waypoints: Vec<Vec3>,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

/// A static spherical obstacle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleSpawn {
    pub position: Vec3,
    pub radius: f32,
}

/// A complete arena layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Overrides the engine seed when present.
    pub seed: Option<u64>,
    /// Candidate player spawn points. The first is used at load.
    pub player_spawns: Vec<Vec3>,
    pub obstacles: Vec<ObstacleSpawn>,
    pub agents: Vec<AgentSpawn>,
}

impl LevelConfig {
    /// Parse, normalize and validate a level from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut level: LevelConfig = serde_json::from_str(json)?;
        for spawn in &mut level.agents {
            spawn.config = spawn.config.normalized();
        }
        level.validate()?;
        Ok(level)
    }

    /// Read a level file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if obstacle.radius <= 0.0 {
                return Err(ConfigError::ObstacleRadius {
                    index,
                    radius: obstacle.radius,
                });
            }
        }
        for (index, spawn) in self.agents.iter().enumerate() {
            spawn.config.validate().map_err(|source| ConfigError::Agent {
                index,
                source: Box::new(source),
            })?;
        }
        Ok(())
    }
}

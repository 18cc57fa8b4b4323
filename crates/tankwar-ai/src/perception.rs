//! Vision and hearing tests.
//!
//! Vision is stateless per call. Hearing is debounced through a small
//! `HearingMemory` owned by the agent; the current time is always passed in.

use tankwar_core::config::SensorConfig;
use tankwar_core::types::Pose;

use crate::world::{TargetView, WorldQuery};

/// Vision cone plus line-of-sight test.
///
/// True only if the target lies strictly inside half the field of view,
/// strictly inside detection range, and a ray toward it capped at
/// detection range strikes the target first.
pub fn can_see_target(
    pose: &Pose,
    target: Option<&TargetView>,
    sensors: &SensorConfig,
    world: &dyn WorldQuery,
) -> bool {
    let Some(target) = target else {
        return false;
    };
    let direction = pose.direction_to(target.position);
    let angle = pose.angle_to(target.position);
    let distance = pose.range_to(target.position);

    if angle >= sensors.field_of_view_deg / 2.0 || distance >= sensors.detection_range {
        return false;
    }

    matches!(
        world.cast(pose.position, direction, sensors.detection_range),
        Some(hit) if hit.object == target.id
    )
}

/// Vision gated by a shorter engagement range.
pub fn can_see_target_within(
    pose: &Pose,
    target: Option<&TargetView>,
    sensors: &SensorConfig,
    range: f32,
    world: &dyn WorldQuery,
) -> bool {
    let Some(view) = target else {
        return false;
    };
    if pose.range_to(view.position) >= range {
        return false;
    }
    can_see_target(pose, target, sensors, world)
}

/// Noise within hearing range, ignoring the debounce.
pub fn is_audible(pose: &Pose, target: Option<&TargetView>, sensors: &SensorConfig) -> bool {
    match target {
        Some(target) => {
            target.making_noise && pose.range_to(target.position) <= sensors.hearing_range
        }
        None => false,
    }
}

/// Debounced hearing test. Stamps `memory` on success.
pub fn can_hear_target(
    pose: &Pose,
    target: Option<&TargetView>,
    sensors: &SensorConfig,
    memory: &mut HearingMemory,
    now: f32,
) -> bool {
    if !is_audible(pose, target, sensors) {
        return false;
    }
    if !memory.admits(now, sensors.hearing_cooldown_secs) {
        return false;
    }
    memory.last_heard = Some(now);
    true
}

/// When the agent last heard something. Only `can_hear_target` writes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HearingMemory {
    last_heard: Option<f32>,
}

impl HearingMemory {
    pub fn last_heard(&self) -> Option<f32> {
        self.last_heard
    }

    fn admits(&self, now: f32, cooldown: f32) -> bool {
        match self.last_heard {
            Some(last) => now > last + cooldown,
            None => true,
        }
    }
}

//! Waypoint routes walked by the Patrol behavior.

use glam::Vec3;

/// Ordered waypoints with a cursor.
///
/// Insertion order is patrol order. The cursor only moves when
/// `next_waypoint` is called or the route is restarted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatrolRoute {
    waypoints: Vec<Vec3>,
    cursor: usize,
    looping: bool,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>, looping: bool) -> Self {
        Self {
            waypoints,
            cursor: 0,
            looping,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoints(&self) -> &[Vec3] {
        &self.waypoints
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Waypoint under the cursor, then advance.
    ///
    /// A looping route wraps to the first waypoint; a one-shot route yields
    /// `None` once every waypoint has been handed out.
    pub fn next_waypoint(&mut self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        if self.cursor >= self.waypoints.len() {
            if !self.looping {
                return None;
            }
            self.cursor = 0;
        }
        let waypoint = self.waypoints[self.cursor];
        self.cursor += 1;
        Some(waypoint)
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.cursor >= self.waypoints.len()
    }

    // --- Level setup ---

    pub fn push(&mut self, waypoint: Vec3) {
        self.waypoints.push(waypoint);
    }

    pub fn extend(&mut self, waypoints: impl IntoIterator<Item = Vec3>) {
        self.waypoints.extend(waypoints);
    }

    /// Swap in a new route and rewind.
    pub fn replace(&mut self, waypoints: Vec<Vec3>, looping: bool) {
        self.waypoints = waypoints;
        self.looping = looping;
        self.cursor = 0;
    }

    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}

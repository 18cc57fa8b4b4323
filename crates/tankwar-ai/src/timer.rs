//! Armed deadlines for grace periods.
//!
//! A deadline remembers the behavior generation it was armed under. Once the
//! agent transitions, the generation moves on and the deadline never fires.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    at: f32,
    generation: u64,
}

impl Deadline {
    pub fn arm(now: f32, delay_secs: f32, generation: u64) -> Self {
        Self {
            at: now + delay_secs,
            generation,
        }
    }

    pub fn at(&self) -> f32 {
        self.at
    }

    pub fn is_stale(&self, generation: u64) -> bool {
        self.generation != generation
    }

    /// True once `now` reaches the deadline, unless it is stale.
    pub fn is_due(&self, now: f32, generation: u64) -> bool {
        !self.is_stale(generation) && now >= self.at
    }
}

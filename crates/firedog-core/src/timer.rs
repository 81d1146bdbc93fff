use serde::{Deserialize, Serialize};

/// A boolean status paired with a countdown in milliseconds.
///
/// Ticking never drives `remaining_ms` below zero. Clearing sets the flag
/// false and the timer to 0; there is no other cancellation path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedFlag {
    pub active: bool,
    pub remaining_ms: f32,
}

impl TimedFlag {
    /// Activate (or refresh) the flag for `duration_ms`.
    pub fn start(&mut self, duration_ms: f32) {
        self.active = true;
        self.remaining_ms = duration_ms.max(0.0);
    }

    /// Advance by `dt_ms`. Returns true on the tick the flag expires.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        if !self.active {
            return false;
        }
        self.remaining_ms = (self.remaining_ms - dt_ms).max(0.0);
        if self.remaining_ms <= 0.0 {
            self.active = false;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.remaining_ms = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// An ability timer that climbs toward its cap: `elapsed = min(elapsed + dt, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub elapsed_ms: f32,
    pub cap_ms: f32,
}

impl Cooldown {
    /// A cooldown that starts full (ability immediately available).
    pub fn ready(cap_ms: f32) -> Self {
        Self {
            elapsed_ms: cap_ms,
            cap_ms,
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.elapsed_ms = (self.elapsed_ms + dt_ms).min(self.cap_ms);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed_ms >= self.cap_ms
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
    }

    pub fn fill(&mut self) {
        self.elapsed_ms = self.cap_ms;
    }
}

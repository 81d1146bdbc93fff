use serde::{Deserialize, Serialize};

use crate::config::EnergyConfig;

/// Latch transitions reported by [`Energy::tick`] and [`Energy::spend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyEvent {
    Exhausted,
    Recovered,
}

/// What is drawing on the pool this frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyDrain {
    pub poisoned: bool,
    pub rolling: bool,
    pub blue_potion: bool,
}

/// Clamped energy pool with passive regeneration and an exhaustion latch.
///
/// The latch sets when the pool hits 0 and only releases once it climbs
/// back to `exhaustion_recovery`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub value: f32,
    pub max: f32,
    pub exhausted: bool,
    tick_accum_ms: f32,
}

impl Energy {
    pub fn full(max: f32) -> Self {
        Self {
            value: max,
            max,
            exhausted: false,
            tick_accum_ms: 0.0,
        }
    }

    /// Advance regeneration and rolling drain by `dt_ms`.
    pub fn tick(&mut self, dt_ms: f32, drain: EnergyDrain, cfg: &EnergyConfig) -> Option<EnergyEvent> {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return None;
        }

        self.tick_accum_ms += dt_ms;
        while self.tick_accum_ms >= cfg.tick_interval_ms {
            self.tick_accum_ms -= cfg.tick_interval_ms;
            if drain.poisoned {
                self.value -= cfg.poison_drain_per_tick;
            } else {
                self.value += cfg.regen_per_tick;
            }
        }

        if drain.rolling {
            if drain.blue_potion {
                self.value += cfg.blue_potion_roll_regen_per_ms * dt_ms;
            } else {
                self.value -= cfg.roll_drain_per_ms * dt_ms;
            }
        }

        self.settle(cfg.exhaustion_recovery)
    }

    /// Deduct `cost`, clamping at 0. Callers check [`Energy::exhausted`] first.
    pub fn spend(&mut self, cost: f32, recovery: f32) -> Option<EnergyEvent> {
        self.value -= cost;
        self.settle(recovery)
    }

    fn settle(&mut self, recovery: f32) -> Option<EnergyEvent> {
        self.value = self.value.clamp(0.0, self.max);
        if !self.exhausted && self.value <= 0.0 {
            self.exhausted = true;
            return Some(EnergyEvent::Exhausted);
        }
        if self.exhausted && self.value >= recovery {
            self.exhausted = false;
            return Some(EnergyEvent::Recovered);
        }
        None
    }
}

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use firedog_core::input::Key;
use firedog_core::timer::TimedFlag;

use crate::config::StatusConfig;

/// Timed statuses a player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Slow,
    Poison,
    Freeze,
    Confusion,
    RedPotion,
    BluePotion,
    Invisibility,
}

impl StatusKind {
    pub const ALL: [StatusKind; 7] = [
        StatusKind::Slow,
        StatusKind::Poison,
        StatusKind::Freeze,
        StatusKind::Confusion,
        StatusKind::RedPotion,
        StatusKind::BluePotion,
        StatusKind::Invisibility,
    ];

    pub fn duration_ms(self, cfg: &StatusConfig) -> f32 {
        match self {
            StatusKind::Slow => cfg.slow_ms,
            StatusKind::Poison => cfg.poison_ms,
            StatusKind::Freeze => cfg.freeze_ms,
            StatusKind::Confusion => cfg.confusion_ms,
            StatusKind::RedPotion => cfg.red_potion_ms,
            StatusKind::BluePotion => cfg.blue_potion_ms,
            StatusKind::Invisibility => cfg.invisibility_ms,
        }
    }
}

/// Result of [`StatusEffects::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Started,
    Refreshed,
    Ignored,
}

/// Speed and weight constants that slow modifies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementConstants {
    pub normal_speed: f32,
    pub max_speed: f32,
    pub weight: f32,
}

impl MovementConstants {
    /// Slowed constants, always derived from the baseline so re-applying
    /// never compounds.
    pub fn slowed(self, cfg: &StatusConfig) -> Self {
        Self {
            normal_speed: self.normal_speed * cfg.slow_normal_speed_factor,
            max_speed: self.max_speed * cfg.slow_max_speed_factor,
            weight: self.weight * cfg.slow_weight_factor,
        }
    }
}

/// Bank of independent status timers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub slowed: TimedFlag,
    pub poisoned: TimedFlag,
    pub frozen: TimedFlag,
    pub confused: TimedFlag,
    pub red_potion: TimedFlag,
    pub blue_potion: TimedFlag,
    pub invisible: TimedFlag,
    /// Movement keys in effect before confusion scrambled them.
    pub original_movement_keys: Option<[Key; 4]>,
}

impl StatusEffects {
    pub fn flag(&self, kind: StatusKind) -> &TimedFlag {
        match kind {
            StatusKind::Slow => &self.slowed,
            StatusKind::Poison => &self.poisoned,
            StatusKind::Freeze => &self.frozen,
            StatusKind::Confusion => &self.confused,
            StatusKind::RedPotion => &self.red_potion,
            StatusKind::BluePotion => &self.blue_potion,
            StatusKind::Invisibility => &self.invisible,
        }
    }

    fn flag_mut(&mut self, kind: StatusKind) -> &mut TimedFlag {
        match kind {
            StatusKind::Slow => &mut self.slowed,
            StatusKind::Poison => &mut self.poisoned,
            StatusKind::Freeze => &mut self.frozen,
            StatusKind::Confusion => &mut self.confused,
            StatusKind::RedPotion => &mut self.red_potion,
            StatusKind::BluePotion => &mut self.blue_potion,
            StatusKind::Invisibility => &mut self.invisible,
        }
    }

    pub fn is_active(&self, kind: StatusKind) -> bool {
        self.flag(kind).is_active()
    }

    /// Start or refresh `kind`, applying the poison/freeze/potion arbitration.
    pub fn apply(&mut self, kind: StatusKind, cfg: &StatusConfig, exhausted: bool) -> Applied {
        if kind == StatusKind::Poison
            && (self.frozen.is_active() || self.blue_potion.is_active() || exhausted)
        {
            return Applied::Ignored;
        }
        if matches!(kind, StatusKind::Freeze | StatusKind::BluePotion) {
            self.poisoned.clear();
        }

        let flag = self.flag_mut(kind);
        let applied = if flag.is_active() {
            Applied::Refreshed
        } else {
            Applied::Started
        };
        flag.start(kind.duration_ms(cfg));
        applied
    }

    pub fn clear(&mut self, kind: StatusKind) {
        self.flag_mut(kind).clear();
    }

    /// Count every timer down by `dt_ms`, returning the statuses that expired.
    pub fn tick(&mut self, dt_ms: f32) -> SmallVec<[StatusKind; 4]> {
        let mut expired = SmallVec::new();
        for kind in StatusKind::ALL {
            if self.flag_mut(kind).tick(dt_ms) {
                expired.push(kind);
            }
        }
        expired
    }
}

/// Scramble the four movement keys.
///
/// The result is a permutation of `keys` that differs from it in at least
/// two slots. Up to `attempts` random shuffles are tried; if none qualifies
/// the first two distinct keys are swapped. A binding whose keys are all
/// equal has no such permutation and is returned unchanged.
pub fn confuse_movement_keys<R: Rng + ?Sized>(
    keys: &[Key; 4],
    rng: &mut R,
    attempts: u32,
) -> [Key; 4] {
    for _ in 0..attempts {
        let mut shuffled = keys.clone();
        shuffled.shuffle(&mut *rng);
        if differing_slots(keys, &shuffled) >= 2 {
            return shuffled;
        }
    }

    let mut swapped = keys.clone();
    for i in 0..swapped.len() {
        if let Some(j) = (i + 1..swapped.len()).find(|&j| swapped[j] != swapped[i]) {
            swapped.swap(i, j);
            return swapped;
        }
    }
    swapped
}

fn differing_slots(a: &[Key; 4], b: &[Key; 4]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

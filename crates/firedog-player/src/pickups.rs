use firedog_core::entity::PickupKind;

use crate::config::PickupConfig;
use crate::status::StatusKind;

/// What consuming a pickup does to the player or world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickupEffect {
    AddTime(f32),
    AddLife,
    AddCoins(u32),
    Status(StatusKind),
    /// Lose a life and flinch into Hit.
    Harm,
}

/// Resolve a random power-up from a uniform roll in `[0, 1)`.
///
/// Oxygen is only offered underwater, where it displaces part of the
/// health and coin share.
pub fn random_power(roll: f32, underwater: bool) -> PickupKind {
    if underwater {
        match roll {
            r if r < 0.30 => PickupKind::OxygenTank,
            r if r < 0.55 => PickupKind::HealthLive,
            r if r < 0.80 => PickupKind::Coin,
            r if r < 0.90 => PickupKind::RedPotion,
            _ => PickupKind::BluePotion,
        }
    } else {
        match roll {
            r if r < 0.30 => PickupKind::HealthLive,
            r if r < 0.65 => PickupKind::Coin,
            r if r < 0.825 => PickupKind::RedPotion,
            _ => PickupKind::BluePotion,
        }
    }
}

/// Effect of a concrete pickup. `RandomPower` must be resolved first.
pub fn pickup_effect(kind: PickupKind, cfg: &PickupConfig) -> Option<PickupEffect> {
    let effect = match kind {
        PickupKind::OxygenTank => PickupEffect::AddTime(cfg.oxygen_bonus_ms),
        PickupKind::HealthLive => PickupEffect::AddLife,
        PickupKind::Coin => PickupEffect::AddCoins(cfg.coin_bonus),
        PickupKind::RedPotion => PickupEffect::Status(StatusKind::RedPotion),
        PickupKind::BluePotion => PickupEffect::Status(StatusKind::BluePotion),
        PickupKind::RandomPower => return None,
        PickupKind::IceDrink => PickupEffect::Status(StatusKind::Slow),
        PickupKind::Cauldron => PickupEffect::Status(StatusKind::Poison),
        PickupKind::DeadSkull => PickupEffect::Harm,
        PickupKind::Confuse => PickupEffect::Status(StatusKind::Confusion),
    };
    Some(effect)
}

/// Floating text shown when a pickup is consumed.
pub fn pickup_message(kind: PickupKind, cfg: &PickupConfig) -> String {
    match kind {
        PickupKind::OxygenTank => format!("+{}s", (cfg.oxygen_bonus_ms / 1000.0).round()),
        PickupKind::HealthLive => "+1 life".to_string(),
        PickupKind::Coin => format!("+{}", cfg.coin_bonus),
        PickupKind::RedPotion => "Red potion".to_string(),
        PickupKind::BluePotion => "Blue potion".to_string(),
        PickupKind::RandomPower => "?".to_string(),
        PickupKind::IceDrink => "Slowed".to_string(),
        PickupKind::Cauldron => "Poisoned".to_string(),
        PickupKind::DeadSkull => "-1 life".to_string(),
        PickupKind::Confuse => "Confused".to_string(),
    }
}

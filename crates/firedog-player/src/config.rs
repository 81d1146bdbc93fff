use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Movement constants for every physics regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub player_width: f32,
    pub player_height: f32,
    pub normal_speed: f32,
    pub max_speed: f32,
    pub weight: f32,
    /// Upward velocity subtracted on a grounded jump.
    pub jump_impulse: f32,
    pub dive_velocity: f32,
    pub frame_interval_ms: f32,
    pub ice_acceleration: f32,
    /// Acceleration multiplier applied while reversing on ice.
    pub ice_turn_resistance: f32,
    pub ice_friction: f32,
    pub ice_slide_friction: f32,
    pub ice_slide_grace_ms: f32,
    pub ice_drift: f32,
    pub ice_drift_threshold: f32,
    pub underwater_drag: f32,
    pub underwater_nudge: f32,
    pub space_gravity: f32,
    pub space_jump_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            player_width: 100.0,
            player_height: 91.3,
            normal_speed: 6.0,
            max_speed: 10.0,
            weight: 1.0,
            jump_impulse: 27.0,
            dive_velocity: 15.0,
            frame_interval_ms: 50.0,
            ice_acceleration: 0.35,
            ice_turn_resistance: 0.4,
            ice_friction: 0.9,
            ice_slide_friction: 0.98,
            ice_slide_grace_ms: 250.0,
            ice_drift: 0.02,
            ice_drift_threshold: 0.05,
            underwater_drag: 0.08,
            underwater_nudge: 5.0,
            space_gravity: 0.15,
            space_jump_velocity: 8.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub max: f32,
    pub tick_interval_ms: f32,
    pub regen_per_tick: f32,
    pub poison_drain_per_tick: f32,
    pub roll_drain_per_ms: f32,
    pub blue_potion_roll_regen_per_ms: f32,
    /// Energy the exhausted latch waits for before releasing.
    pub exhaustion_recovery: f32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            tick_interval_ms: 100.0,
            regen_per_tick: 0.4,
            poison_drain_per_tick: 1.0,
            roll_drain_per_ms: 0.04,
            blue_potion_roll_regen_per_ms: 0.02,
            exhaustion_recovery: 20.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilitiesConfig {
    pub fireball_cost: f32,
    pub fireball_cooldown_ms: f32,
    pub dive_cooldown_ms: f32,
    pub invisibility_cooldown_ms: f32,
    pub projectile_speed: f32,
    pub red_potion_projectiles: u32,
    pub projectile_max_size: f32,
    pub underwater_projectile_max_size: f32,
}

impl Default for AbilitiesConfig {
    fn default() -> Self {
        Self {
            fireball_cost: 8.0,
            fireball_cooldown_ms: 1000.0,
            dive_cooldown_ms: 800.0,
            invisibility_cooldown_ms: 30_000.0,
            projectile_speed: 10.0,
            red_potion_projectiles: 7,
            projectile_max_size: 40.0,
            underwater_projectile_max_size: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub slow_ms: f32,
    pub poison_ms: f32,
    pub freeze_ms: f32,
    pub confusion_ms: f32,
    pub red_potion_ms: f32,
    pub blue_potion_ms: f32,
    pub invisibility_ms: f32,
    pub slow_normal_speed_factor: f32,
    pub slow_max_speed_factor: f32,
    pub slow_weight_factor: f32,
    /// Random shuffles tried before the deterministic swap fallback.
    pub confusion_attempts: u32,
    pub blue_potion_scroll_multiplier: f32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            slow_ms: 10_000.0,
            poison_ms: 5_000.0,
            freeze_ms: 3_000.0,
            confusion_ms: 10_000.0,
            red_potion_ms: 15_000.0,
            blue_potion_ms: 15_000.0,
            invisibility_ms: 5_000.0,
            slow_normal_speed_factor: 4.0 / 6.0,
            slow_max_speed_factor: 0.6,
            slow_weight_factor: 1.5,
            confusion_attempts: 8,
            blue_potion_scroll_multiplier: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    pub enemy_cooldown_ms: f32,
    pub boss_collision_cooldown_ms: f32,
    pub coin_theft_min: u32,
    pub coin_theft_max: u32,
    pub splash_particles: u32,
    pub blue_potion_splash_particles: u32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            enemy_cooldown_ms: 1000.0,
            boss_collision_cooldown_ms: 1000.0,
            coin_theft_min: 10,
            coin_theft_max: 20,
            splash_particles: 30,
            blue_potion_splash_particles: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    pub oxygen_bonus_ms: f32,
    pub coin_bonus: u32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            oxygen_bonus_ms: 10_000.0,
            coin_bonus: 10,
        }
    }
}

/// Top-level player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub physics: PhysicsConfig,
    pub energy: EnergyConfig,
    pub abilities: AbilitiesConfig,
    pub status: StatusConfig,
    pub collision: CollisionConfig,
    pub pickups: PickupConfig,
    pub rng_seed: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            energy: EnergyConfig::default(),
            abilities: AbilitiesConfig::default(),
            status: StatusConfig::default(),
            collision: CollisionConfig::default(),
            pickups: PickupConfig::default(),
            rng_seed: 0x00f1_7ed0,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid player config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid player config: {0}")]
    Invalid(String),
}

impl PlayerConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: PlayerConfig = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a TOML file. Falls back to defaults if the file is missing
    /// or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("FIREDOG_PLAYER_CONFIG")
            .unwrap_or_else(|_| "config/player.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PlayerConfig::default()
                },
            },
            Err(_) => PlayerConfig::default(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        if p.player_width <= 0.0 || p.player_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "player dimensions must be positive".into(),
            ));
        }
        if p.frame_interval_ms <= 0.0 || self.energy.tick_interval_ms <= 0.0 {
            return Err(ConfigError::Invalid("intervals must be positive".into()));
        }
        if self.energy.max <= 0.0 || self.energy.exhaustion_recovery > self.energy.max {
            return Err(ConfigError::Invalid(format!(
                "exhaustion_recovery {} exceeds energy max {}",
                self.energy.exhaustion_recovery, self.energy.max
            )));
        }
        if self.collision.coin_theft_min > self.collision.coin_theft_max {
            return Err(ConfigError::Invalid(
                "coin_theft_min exceeds coin_theft_max".into(),
            ));
        }
        if self.abilities.red_potion_projectiles == 0 {
            return Err(ConfigError::Invalid(
                "red_potion_projectiles must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

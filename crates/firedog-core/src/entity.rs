use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arena::SlotId;

/// Handle to an enemy stored in [`crate::world::World::enemies`].
pub type EnemyId = SlotId;

/// Axis-aligned bounding box, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Strict overlap test; touching edges do not count.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Capability tag that selects a row of the collision outcome tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyCategory {
    #[default]
    Plain,
    Thief,
    Ink,
    Explosive,
    Electric,
    Acid,
    Frost,
    Ice,
    BossBody,
    BossBarrier,
}

impl EnemyCategory {
    pub fn is_boss(self) -> bool {
        matches!(self, EnemyCategory::BossBody | EnemyCategory::BossBarrier)
    }
}

/// A hostile entity or enemy projectile overlapping the play field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub hitbox: Hitbox,
    pub lives: u32,
    pub category: EnemyCategory,
    pub deals_direct_hit_damage: bool,
    pub barrier_active: bool,
    pub marked_for_deletion: bool,
}

impl Enemy {
    pub fn new(category: EnemyCategory, hitbox: Hitbox, lives: u32) -> Self {
        Self {
            hitbox,
            lives,
            category,
            deals_direct_hit_damage: true,
            barrier_active: category == EnemyCategory::BossBarrier,
            marked_for_deletion: false,
        }
    }

    /// Remove one life. Returns true if this killed the enemy.
    pub fn take_hit(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.marked_for_deletion = true;
        }
        self.lives == 0
    }

    pub fn kill(&mut self) {
        self.lives = 0;
        self.marked_for_deletion = true;
    }
}

/// Raw enemy data as delivered by level/spawner code. Every field is
/// optional so malformed records can be rejected at the boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub lives: Option<u32>,
    /// Absent categories resolve to [`EnemyCategory::Plain`].
    pub category: Option<EnemyCategory>,
    pub deals_direct_hit_damage: Option<bool>,
    pub is_barrier_active: Option<bool>,
}

/// Why an [`EnemyRecord`] was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestError {
    #[error("enemy record is missing `{0}`")]
    MissingField(&'static str),
    #[error("enemy field `{field}` is not finite: {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("enemy size must be positive, got {width}x{height}")]
    NonPositiveSize { width: f32, height: f32 },
    #[error("enemy must spawn with at least one life")]
    ZeroLives,
}

fn finite(field: &'static str, value: Option<f32>) -> Result<f32, IngestError> {
    let value = value.ok_or(IngestError::MissingField(field))?;
    if !value.is_finite() {
        return Err(IngestError::NonFinite { field, value });
    }
    Ok(value)
}

impl TryFrom<EnemyRecord> for Enemy {
    type Error = IngestError;

    fn try_from(record: EnemyRecord) -> Result<Self, Self::Error> {
        let x = finite("x", record.x)?;
        let y = finite("y", record.y)?;
        let width = finite("width", record.width)?;
        let height = finite("height", record.height)?;
        if width <= 0.0 || height <= 0.0 {
            return Err(IngestError::NonPositiveSize { width, height });
        }
        let lives = record.lives.ok_or(IngestError::MissingField("lives"))?;
        if lives == 0 {
            return Err(IngestError::ZeroLives);
        }
        let category = record.category.unwrap_or_default();

        let mut enemy = Enemy::new(category, Hitbox::new(x, y, width, height), lives);
        if let Some(direct) = record.deals_direct_hit_damage {
            enemy.deals_direct_hit_damage = direct;
        }
        if let Some(barrier) = record.is_barrier_active {
            enemy.barrier_active = barrier;
        }
        Ok(enemy)
    }
}

/// Sprite variant of a player projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSprite {
    Fireball,
    PotionFireball,
    Bubble,
    PotionBubble,
}

/// A player-fired projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub hitbox: Hitbox,
    pub vx: f32,
    pub vy: f32,
    pub sprite: ProjectileSprite,
    pub max_size: f32,
    pub marked_for_deletion: bool,
}

/// Collectible kinds. The first group are power-ups, the second power-downs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    OxygenTank,
    HealthLive,
    Coin,
    RedPotion,
    BluePotion,
    RandomPower,
    IceDrink,
    Cauldron,
    DeadSkull,
    Confuse,
}

impl PickupKind {
    pub fn is_power_down(self) -> bool {
        matches!(
            self,
            PickupKind::IceDrink | PickupKind::Cauldron | PickupKind::DeadSkull | PickupKind::Confuse
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub hitbox: Hitbox,
    pub kind: PickupKind,
    pub marked_for_deletion: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, hitbox: Hitbox) -> Self {
        Self {
            hitbox,
            kind,
            marked_for_deletion: false,
        }
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arena::SlotArena;
use crate::audio::AudioQueue;
use crate::effects::{EffectLayer, FloatingMessage, VisualEffect};
use crate::entity::{Enemy, EnemyId, EnemyRecord, IngestError, Pickup, Projectile};

pub const DEFAULT_WIDTH: f32 = 1600.0;
pub const DEFAULT_HEIGHT: f32 = 500.0;
pub const DEFAULT_GROUND_MARGIN: f32 = 80.0;
pub const DEFAULT_BASE_SCROLL: f32 = 3.0;
pub const DEFAULT_LIVES: u32 = 5;

/// Boss-fight flags that gate transitions and collisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossStatus {
    pub visible: bool,
    /// Short window after a teleport during which boss contact is skipped.
    pub post_teleport_safe: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutsceneStatus {
    pub active: bool,
    pub cabin_fully_visible: bool,
}

/// Frame context owned by the outer simulation and lent to the player
/// core for the duration of one update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub ground_margin: f32,
    /// Base scroll speed; transitions multiply it into `scroll_speed`.
    pub max_speed: f32,
    pub scroll_speed: f32,

    pub boss: BossStatus,
    pub cutscene: CutsceneStatus,

    pub enemies: SlotArena<Enemy>,
    pub power_ups: Vec<Pickup>,
    pub power_downs: Vec<Pickup>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<VisualEffect>,
    pub collisions: Vec<VisualEffect>,
    pub floating_messages: Vec<FloatingMessage>,
    pub audio: AudioQueue,

    pub lives: u32,
    pub coins: u32,
    /// Remaining level time (oxygen when underwater), in milliseconds.
    pub time_ms: f32,
    pub game_over: bool,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            ground_margin: DEFAULT_GROUND_MARGIN,
            max_speed: DEFAULT_BASE_SCROLL,
            scroll_speed: 0.0,
            boss: BossStatus::default(),
            cutscene: CutsceneStatus::default(),
            enemies: SlotArena::new(),
            power_ups: Vec::new(),
            power_downs: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            collisions: Vec::new(),
            floating_messages: Vec::new(),
            audio: AudioQueue::default(),
            lives: DEFAULT_LIVES,
            coins: 0,
            time_ms: 60_000.0,
            game_over: false,
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Y coordinate of an entity of `entity_height` standing on the ground.
    pub fn ground_y(&self, entity_height: f32) -> f32 {
        self.height - entity_height - self.ground_margin
    }

    /// Boss or cutscene on screen: world scroll stops.
    pub fn scroll_frozen(&self) -> bool {
        self.boss.visible || self.cutscene.active
    }

    /// Validate and insert an enemy record.
    pub fn spawn_enemy(&mut self, record: EnemyRecord) -> Result<EnemyId, IngestError> {
        match Enemy::try_from(record) {
            Ok(enemy) => Ok(self.enemies.insert(enemy)),
            Err(e) => {
                debug!(error = %e, "rejected enemy record");
                Err(e)
            }
        }
    }

    pub fn insert_enemy(&mut self, enemy: Enemy) -> EnemyId {
        self.enemies.insert(enemy)
    }

    /// Push an effect into the collection its kind belongs to.
    pub fn spawn_effect(&mut self, effect: VisualEffect) {
        match effect.kind.layer() {
            EffectLayer::Particles => self.particles.push(effect),
            EffectLayer::Collisions => self.collisions.push(effect),
        }
    }

    pub fn add_message(&mut self, text: impl Into<String>, x: f32, y: f32) {
        self.floating_messages.push(FloatingMessage {
            text: text.into(),
            x,
            y,
        });
    }

    /// Drop every record flagged for deletion. Removed enemy slots are
    /// recycled with a new generation. Returns the number of enemies removed.
    pub fn sweep(&mut self) -> usize {
        let removed = self.enemies.retain(|_, e| !e.marked_for_deletion);
        self.projectiles.retain(|p| !p.marked_for_deletion);
        self.power_ups.retain(|p| !p.marked_for_deletion);
        self.power_downs.retain(|p| !p.marked_for_deletion);
        removed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectKind;
    use crate::entity::{EnemyCategory, Hitbox};

    fn record() -> EnemyRecord {
        EnemyRecord {
            x: Some(100.0),
            y: Some(200.0),
            width: Some(40.0),
            height: Some(40.0),
            lives: Some(1),
            category: Some(EnemyCategory::Plain),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_level_layout() {
        let world = World::default();
        assert_eq!(world.width, 1600.0);
        assert_eq!(world.lives, 5);
        assert!((world.ground_y(91.3) - 328.7).abs() < 1e-3);
        assert!(!world.scroll_frozen());
    }

    #[test]
    fn freeze_from_boss_or_cutscene() {
        let mut world = World::default();
        world.boss.visible = true;
        assert!(world.scroll_frozen());
        world.boss.visible = false;
        world.cutscene.active = true;
        assert!(world.scroll_frozen());
    }

    #[test]
    fn spawn_enemy_rejects_bad_records() {
        let mut world = World::default();
        assert!(world.spawn_enemy(record()).is_ok());
        let bad = EnemyRecord {
            height: Some(-1.0),
            ..record()
        };
        assert!(world.spawn_enemy(bad).is_err());
        assert_eq!(world.enemies.len(), 1);
    }

    #[test]
    fn effects_route_by_layer() {
        let mut world = World::default();
        world.spawn_effect(VisualEffect::new(EffectKind::Dust, 0.0, 0.0));
        world.spawn_effect(VisualEffect::new(EffectKind::Explosion, 0.0, 0.0));
        assert_eq!(world.particles.len(), 1);
        assert_eq!(world.collisions.len(), 1);
    }

    #[test]
    fn sweep_recycles_marked_enemies() {
        let mut world = World::default();
        let keep = world.insert_enemy(Enemy::new(
            EnemyCategory::Plain,
            Hitbox::new(0.0, 0.0, 1.0, 1.0),
            1,
        ));
        let doomed = world.spawn_enemy(record()).unwrap();
        world.enemies.get_mut(doomed).unwrap().kill();

        assert_eq!(world.sweep(), 1);
        assert!(world.enemies.contains(keep));
        assert!(!world.enemies.contains(doomed));

        let reborn = world.spawn_enemy(record()).unwrap();
        assert_eq!(reborn.index, doomed.index);
        assert_ne!(reborn, doomed);
    }
}

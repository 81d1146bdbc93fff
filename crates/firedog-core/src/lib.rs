pub mod arena;
pub mod audio;
pub mod effects;
pub mod entity;
pub mod input;
pub mod timer;
pub mod world;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::entity::{Enemy, EnemyCategory, EnemyId, Hitbox, Pickup, PickupKind};
    use crate::input::{Action, InputSnapshot, KeyBindings};
    use crate::world::World;

    /// A default world with a player-sized ground line and no entities.
    pub fn make_world() -> World {
        World::default()
    }

    /// Insert a `size`×`size` enemy with its top-left corner at (x, y).
    pub fn spawn_enemy_at(
        world: &mut World,
        category: EnemyCategory,
        x: f32,
        y: f32,
        size: f32,
        lives: u32,
    ) -> EnemyId {
        world.insert_enemy(Enemy::new(category, Hitbox::new(x, y, size, size), lives))
    }

    /// Place a pickup in the collection matching its kind.
    pub fn spawn_pickup_at(world: &mut World, kind: PickupKind, x: f32, y: f32) {
        let pickup = Pickup::new(kind, Hitbox::new(x, y, 30.0, 30.0));
        if kind.is_power_down() {
            world.power_downs.push(pickup);
        } else {
            world.power_ups.push(pickup);
        }
    }

    /// Input snapshot holding the default keys for `actions`.
    pub fn held(actions: &[Action]) -> InputSnapshot {
        let bindings = KeyBindings::default();
        let mut input = InputSnapshot::new();
        for action in actions {
            if let Some(key) = bindings.key_for(*action) {
                input.press(key.clone());
            }
        }
        input
    }
}

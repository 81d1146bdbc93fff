use rand::Rng;
use serde::{Deserialize, Serialize};

use firedog_core::entity::Hitbox;

use crate::config::PhysicsConfig;
use crate::status::MovementConstants;

/// Position, velocity, and size of the player in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

impl Body {
    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.x, self.y, self.width, self.height)
    }

    pub fn grounded(&self, ground_y: f32) -> bool {
        self.y >= ground_y
    }
}

/// Level-wide movement modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub underwater: bool,
    pub ice: bool,
    pub zero_gravity: bool,
}

/// Vertical integration scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalRegime {
    Normal,
    Underwater,
    Space,
}

impl Environment {
    pub fn regime(&self) -> VerticalRegime {
        if self.zero_gravity {
            VerticalRegime::Space
        } else if self.underwater {
            VerticalRegime::Underwater
        } else {
            VerticalRegime::Normal
        }
    }
}

/// Accumulated sliding velocity on ice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IceMotion {
    pub vx: f32,
    /// Time since horizontal input was last held.
    pub since_release_ms: f32,
}

impl IceMotion {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Speed cap for a horizontal direction. Backing up against the scroll
/// uses the higher cap unless a boss or cutscene holds the world still.
pub fn speed_cap(movement: &MovementConstants, dir: f32, world_frozen: bool) -> f32 {
    if dir < 0.0 && !world_frozen {
        movement.max_speed
    } else {
        movement.normal_speed
    }
}

fn clamp_x(body: &mut Body, world_width: f32) -> bool {
    let max_x = (world_width - body.width).max(0.0);
    let clamped = body.x.clamp(0.0, max_x);
    let hit = clamped != body.x;
    body.x = clamped;
    hit
}

/// Direct horizontal control: `vx = dir * cap * factor`.
pub fn move_ground(body: &mut Body, dir: f32, cap: f32, factor: f32, world_width: f32) {
    body.vx = dir * cap * factor;
    body.x += body.vx;
    clamp_x(body, world_width);
}

/// Accelerate toward the held direction, coast with friction otherwise.
#[allow(clippy::too_many_arguments)]
pub fn move_ice<R: Rng + ?Sized>(
    body: &mut Body,
    ice: &mut IceMotion,
    dir: f32,
    cap: f32,
    factor: f32,
    dt_ms: f32,
    cfg: &PhysicsConfig,
    rng: &mut R,
    world_width: f32,
) {
    let dir = dir * factor;
    if dir != 0.0 {
        let reversing = ice.vx != 0.0 && ice.vx.signum() != dir.signum();
        let accel = if reversing {
            cfg.ice_acceleration * cfg.ice_turn_resistance
        } else {
            cfg.ice_acceleration
        };
        // Braking out of a faster reversal is bounded by the old speed, not the new cap.
        let limit = if reversing { cap.max(ice.vx.abs()) } else { cap };
        ice.vx = (ice.vx + dir * accel).clamp(-limit, limit);
        ice.since_release_ms = 0.0;
    } else {
        ice.since_release_ms += dt_ms;
        if ice.since_release_ms <= cfg.ice_slide_grace_ms {
            ice.vx *= cfg.ice_slide_friction;
        } else {
            ice.vx *= cfg.ice_friction;
            if ice.vx.abs() < cfg.ice_drift_threshold && cfg.ice_drift > 0.0 {
                ice.vx = rng.random_range(-cfg.ice_drift..=cfg.ice_drift);
            }
        }
    }

    body.vx = ice.vx;
    body.x += body.vx;
    if clamp_x(body, world_width) {
        ice.vx = 0.0;
        body.vx = 0.0;
    }
}

/// Standard gravity: fall by `weight` per frame until grounded.
pub fn fall_normal(body: &mut Body, weight: f32, ground_y: f32) {
    body.y += body.vy;
    if body.grounded(ground_y) {
        body.vy = 0.0;
    } else {
        body.vy += weight;
    }
    body.y = body.y.min(ground_y);
}

/// Buoyant sinking: gravity is divided by buoyancy and velocity is damped
/// harder the deeper the player is.
pub fn fall_underwater(
    body: &mut Body,
    weight: f32,
    buoyancy: &mut f32,
    ground_y: f32,
    cfg: &PhysicsConfig,
) {
    *buoyancy = buoyancy.clamp(1.0, 4.0);
    body.y += body.vy;
    if body.grounded(ground_y) {
        body.vy = 0.0;
    } else {
        body.vy += weight / (4.0 * *buoyancy);
        let depth = if ground_y > 0.0 {
            (body.y / ground_y).clamp(0.0, 1.0)
        } else {
            0.0
        };
        body.vy -= body.vy * cfg.underwater_drag * (1.0 + depth) / *buoyancy;
    }
    body.y = body.y.clamp(0.0, ground_y.max(0.0));
}

/// Zero gravity: weak constant pull, ceiling at y = 0.
pub fn fall_space(body: &mut Body, ground_y: f32, cfg: &PhysicsConfig) {
    body.y += body.vy;
    if body.grounded(ground_y) {
        body.vy = 0.0;
    } else {
        body.vy += cfg.space_gravity;
    }
    if body.y < 0.0 {
        body.y = 0.0;
        body.vy = body.vy.max(0.0);
    }
    body.y = body.y.min(ground_y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const WIDTH: f32 = 1600.0;
    const GROUND: f32 = 328.7;

    fn body() -> Body {
        Body {
            x: 500.0,
            y: GROUND,
            vx: 0.0,
            vy: 0.0,
            width: 100.0,
            height: 91.3,
        }
    }

    fn movement() -> MovementConstants {
        MovementConstants {
            normal_speed: 6.0,
            max_speed: 10.0,
            weight: 1.0,
        }
    }

    // ================================================================
    // Horizontal
    // ================================================================

    #[test]
    fn backing_up_uses_max_speed_unless_frozen() {
        assert_eq!(speed_cap(&movement(), -1.0, false), 10.0);
        assert_eq!(speed_cap(&movement(), -1.0, true), 6.0);
        assert_eq!(speed_cap(&movement(), 1.0, false), 6.0);
    }

    #[test]
    fn ground_motion_clamps_to_world() {
        let mut b = body();
        b.x = 3.0;
        move_ground(&mut b, -1.0, 10.0, 1.0, WIDTH);
        assert_eq!(b.x, 0.0);

        b.x = WIDTH - b.width - 1.0;
        move_ground(&mut b, 1.0, 6.0, 1.0, WIDTH);
        assert_eq!(b.x, WIDTH - b.width);

        let x = b.x;
        move_ground(&mut b, -1.0, 6.0, 0.0, WIDTH);
        assert_eq!(b.x, x, "zero factor ignores input");
    }

    #[test]
    fn ice_accelerates_then_caps() {
        let cfg = PhysicsConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = body();
        let mut ice = IceMotion::default();
        move_ice(&mut b, &mut ice, 1.0, 6.0, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        assert!((ice.vx - 0.35).abs() < 1e-6);
        for _ in 0..100 {
            move_ice(&mut b, &mut ice, 1.0, 6.0, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        }
        assert_eq!(ice.vx, 6.0);
    }

    #[test]
    fn ice_turn_resistance_when_reversing() {
        let cfg = PhysicsConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = body();
        let mut ice = IceMotion {
            vx: 2.0,
            since_release_ms: 0.0,
        };
        move_ice(&mut b, &mut ice, -1.0, 10.0, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        assert!((ice.vx - (2.0 - 0.35 * 0.4)).abs() < 1e-6);
    }

    #[test]
    fn reversing_from_backing_speed_decelerates_gradually() {
        let cfg = PhysicsConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = body();
        let mut ice = IceMotion {
            vx: -10.0,
            since_release_ms: 0.0,
        };
        let forward_cap = speed_cap(&movement(), 1.0, false);
        move_ice(&mut b, &mut ice, 1.0, forward_cap, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        assert!((ice.vx - (-10.0 + 0.35 * 0.4)).abs() < 1e-5, "vx = {}", ice.vx);

        for _ in 0..200 {
            move_ice(&mut b, &mut ice, 1.0, forward_cap, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        }
        assert_eq!(ice.vx, forward_cap);
    }

    #[test]
    fn ice_slides_then_brakes_then_drifts() {
        let cfg = PhysicsConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut b = body();
        let mut ice = IceMotion {
            vx: 4.0,
            since_release_ms: 0.0,
        };
        move_ice(&mut b, &mut ice, 0.0, 6.0, 1.0, 100.0, &cfg, &mut rng, WIDTH);
        assert!((ice.vx - 4.0 * 0.98).abs() < 1e-5, "grace window slide");

        move_ice(&mut b, &mut ice, 0.0, 6.0, 1.0, 200.0, &cfg, &mut rng, WIDTH);
        assert!((ice.vx - 4.0 * 0.98 * 0.9).abs() < 1e-5, "friction after grace");

        for _ in 0..200 {
            move_ice(&mut b, &mut ice, 0.0, 6.0, 1.0, 16.0, &cfg, &mut rng, WIDTH);
        }
        assert!(ice.vx.abs() <= cfg.ice_drift, "settles into idle drift");
    }

    // ================================================================
    // Vertical
    // ================================================================

    #[test]
    fn gravity_accumulates_until_landing() {
        let mut b = body();
        b.vy = -27.0;
        fall_normal(&mut b, 1.0, GROUND);
        assert!((b.y - (GROUND - 27.0)).abs() < 1e-4);
        assert_eq!(b.vy, -26.0);
        for _ in 0..200 {
            fall_normal(&mut b, 1.0, GROUND);
        }
        assert_eq!(b.y, GROUND);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn underwater_buoyancy_is_clamped_and_damps() {
        let cfg = PhysicsConfig::default();
        let mut b = body();
        b.y = 100.0;
        b.vy = 5.0;
        let mut buoyancy = 9.0;
        fall_underwater(&mut b, 1.0, &mut buoyancy, GROUND, &cfg);
        assert_eq!(buoyancy, 4.0);
        assert!(b.vy < 5.0, "drag slows the sink");
        assert!(b.vy > 0.0);
    }

    #[test]
    fn underwater_never_leaves_the_water_column() {
        let cfg = PhysicsConfig::default();
        let mut b = body();
        b.y = 2.0;
        b.vy = -30.0;
        let mut buoyancy = 1.0;
        fall_underwater(&mut b, 1.0, &mut buoyancy, GROUND, &cfg);
        assert_eq!(b.y, 0.0);
    }

    #[test]
    fn space_gravity_is_weak_with_ceiling() {
        let cfg = PhysicsConfig::default();
        let mut b = body();
        b.y = 100.0;
        fall_space(&mut b, GROUND, &cfg);
        assert!((b.vy - 0.15).abs() < 1e-6);

        b.y = 1.0;
        b.vy = -8.0;
        fall_space(&mut b, GROUND, &cfg);
        assert_eq!(b.y, 0.0);
        assert_eq!(b.vy, 0.0);
    }

    #[test]
    fn regime_priority() {
        let env = Environment {
            underwater: true,
            zero_gravity: true,
            ice: false,
        };
        assert_eq!(env.regime(), VerticalRegime::Space);
        assert_eq!(Environment::default().regime(), VerticalRegime::Normal);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn positions_stay_in_bounds(
                dirs in proptest::collection::vec(-1i8..=1, 1..200),
                start_x in 0.0f32..1500.0,
                on_ice in any::<bool>(),
                seed in any::<u64>(),
            ) {
                let cfg = PhysicsConfig::default();
                let mut rng = StdRng::seed_from_u64(seed);
                let mut b = body();
                b.x = start_x;
                let mut ice = IceMotion::default();
                for d in dirs {
                    let dir = d as f32;
                    let cap = speed_cap(&movement(), dir, false);
                    if on_ice {
                        move_ice(&mut b, &mut ice, dir, cap, 1.0, 16.0, &cfg, &mut rng, WIDTH);
                        prop_assert!(ice.vx.abs() <= movement().max_speed + 1e-4);
                    } else {
                        move_ground(&mut b, dir, cap, 1.0, WIDTH);
                    }
                    prop_assert!(b.x >= 0.0 && b.x <= WIDTH - b.width);
                }
            }

            #[test]
            fn underwater_y_stays_in_column(
                vy in -40.0f32..40.0,
                y in 0.0f32..GROUND,
                buoyancy in 0.0f32..10.0,
                frames in 1usize..100,
            ) {
                let cfg = PhysicsConfig::default();
                let mut b = body();
                b.y = y;
                b.vy = vy;
                let mut buoy = buoyancy;
                for _ in 0..frames {
                    fall_underwater(&mut b, 1.0, &mut buoy, GROUND, &cfg);
                    prop_assert!((0.0..=GROUND).contains(&b.y));
                    prop_assert!((1.0..=4.0).contains(&buoy));
                }
            }
        }
    }
}

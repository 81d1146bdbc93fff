use serde::{Deserialize, Serialize};

use firedog_core::entity::{Hitbox, Projectile, ProjectileSprite};
use firedog_core::timer::Cooldown;

use crate::config::AbilitiesConfig;

/// Initial projectile edge length; projectiles grow toward their max size.
const PROJECTILE_SPAWN_SIZE: f32 = 20.0;
/// Growth per frame until `max_size`.
const PROJECTILE_GROWTH: f32 = 2.0;

/// Ability cooldown timers. Each climbs toward its cap and is reset on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityTimers {
    pub fireball: Cooldown,
    pub dive: Cooldown,
    pub invisibility: Cooldown,
}

impl AbilityTimers {
    pub fn new(cfg: &AbilitiesConfig) -> Self {
        Self {
            fireball: Cooldown::ready(cfg.fireball_cooldown_ms),
            dive: Cooldown::ready(cfg.dive_cooldown_ms),
            invisibility: Cooldown::ready(cfg.invisibility_cooldown_ms),
        }
    }

    pub fn tick(&mut self, dt_ms: f32) {
        self.fireball.tick(dt_ms);
        self.dive.tick(dt_ms);
        self.invisibility.tick(dt_ms);
    }
}

/// Why a fireball request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireBlocked {
    CoolingDown,
    Exhausted,
    CabinVisible,
}

/// Everything the fireball gate and volley depend on.
#[derive(Debug, Clone, Copy)]
pub struct FireContext {
    pub exhausted: bool,
    pub cabin_fully_visible: bool,
    pub underwater: bool,
    pub red_potion: bool,
    /// +1 facing right, -1 facing left.
    pub facing: f32,
    pub mouth_x: f32,
    pub mouth_y: f32,
}

pub fn can_fire(timer: &Cooldown, ctx: &FireContext) -> Result<(), FireBlocked> {
    if !timer.is_ready() {
        return Err(FireBlocked::CoolingDown);
    }
    if ctx.exhausted {
        return Err(FireBlocked::Exhausted);
    }
    if ctx.cabin_fully_visible {
        return Err(FireBlocked::CabinVisible);
    }
    Ok(())
}

pub fn projectile_sprite(underwater: bool, red_potion: bool) -> ProjectileSprite {
    match (underwater, red_potion) {
        (false, false) => ProjectileSprite::Fireball,
        (false, true) => ProjectileSprite::PotionFireball,
        (true, false) => ProjectileSprite::Bubble,
        (true, true) => ProjectileSprite::PotionBubble,
    }
}

/// Build the projectiles for one shot: a single straight shot, or a fan
/// with vertical speeds spread evenly around zero under the red potion.
pub fn fireball_volley(ctx: &FireContext, cfg: &AbilitiesConfig) -> Vec<Projectile> {
    let sprite = projectile_sprite(ctx.underwater, ctx.red_potion);
    let max_size = if ctx.underwater {
        cfg.underwater_projectile_max_size
    } else {
        cfg.projectile_max_size
    };
    let count = if ctx.red_potion {
        cfg.red_potion_projectiles.max(1)
    } else {
        1
    };
    let half = (count as f32 - 1.0) / 2.0;
    let size = PROJECTILE_SPAWN_SIZE.min(max_size);

    (0..count)
        .map(|i| Projectile {
            hitbox: Hitbox::new(ctx.mouth_x, ctx.mouth_y - size / 2.0, size, size),
            vx: ctx.facing * cfg.projectile_speed,
            vy: i as f32 - half,
            sprite,
            max_size,
            marked_for_deletion: false,
        })
        .collect()
}

/// Move every live projectile one frame, growing it toward its max size
/// and flagging the ones that left the world.
pub fn advance_projectiles(projectiles: &mut [Projectile], world_width: f32, world_height: f32) {
    for p in projectiles.iter_mut().filter(|p| !p.marked_for_deletion) {
        p.hitbox.x += p.vx;
        p.hitbox.y += p.vy;
        if p.hitbox.width < p.max_size {
            let grown = (p.hitbox.width + PROJECTILE_GROWTH).min(p.max_size);
            p.hitbox.y -= (grown - p.hitbox.height) / 2.0;
            p.hitbox.width = grown;
            p.hitbox.height = grown;
        }
        let hb = &p.hitbox;
        if hb.x + hb.width < 0.0 || hb.x > world_width || hb.y + hb.height < 0.0 || hb.y > world_height {
            p.marked_for_deletion = true;
        }
    }
}

/// Invisibility needs a full cooldown and an unexhausted pool.
pub fn can_turn_invisible(timer: &Cooldown, exhausted: bool) -> bool {
    timer.is_ready() && !exhausted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> FireContext {
        FireContext {
            exhausted: false,
            cabin_fully_visible: false,
            underwater: false,
            red_potion: false,
            facing: 1.0,
            mouth_x: 80.0,
            mouth_y: 300.0,
        }
    }

    #[test]
    fn single_shot_by_default() {
        let shots = fireball_volley(&ctx(), &AbilitiesConfig::default());
        assert_eq!(shots.len(), 1);
        assert_eq!(shots[0].sprite, ProjectileSprite::Fireball);
        assert_eq!(shots[0].vx, 10.0);
        assert_eq!(shots[0].vy, 0.0);
        assert_eq!(shots[0].max_size, 40.0);
    }

    #[test]
    fn red_potion_fans_seven() {
        let c = FireContext {
            red_potion: true,
            underwater: true,
            facing: -1.0,
            ..ctx()
        };
        let shots = fireball_volley(&c, &AbilitiesConfig::default());
        assert_eq!(shots.len(), 7);
        let vys: Vec<f32> = shots.iter().map(|p| p.vy).collect();
        assert_eq!(vys, vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]);
        assert!(shots.iter().all(|p| p.sprite == ProjectileSprite::PotionBubble));
        assert!(shots.iter().all(|p| p.vx == -10.0 && p.max_size == 60.0));
    }

    #[test]
    fn fire_gate_order() {
        let mut timer = Cooldown::ready(1000.0);
        assert_eq!(can_fire(&timer, &ctx()), Ok(()));
        let tired = FireContext {
            exhausted: true,
            ..ctx()
        };
        assert_eq!(can_fire(&timer, &tired), Err(FireBlocked::Exhausted));
        let cabin = FireContext {
            cabin_fully_visible: true,
            ..ctx()
        };
        assert_eq!(can_fire(&timer, &cabin), Err(FireBlocked::CabinVisible));
        timer.reset();
        assert_eq!(can_fire(&timer, &ctx()), Err(FireBlocked::CoolingDown));
    }

    #[test]
    fn projectiles_grow_and_leave() {
        let mut shots = fireball_volley(&ctx(), &AbilitiesConfig::default());
        for _ in 0..20 {
            advance_projectiles(&mut shots, 1600.0, 500.0);
        }
        assert_eq!(shots[0].hitbox.width, 40.0);
        assert!(!shots[0].marked_for_deletion);
        for _ in 0..200 {
            advance_projectiles(&mut shots, 1600.0, 500.0);
        }
        assert!(shots[0].marked_for_deletion);
    }
}

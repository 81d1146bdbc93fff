//! Contact and projectile resolution against enemies.
//!
//! Outcomes are plain data: one row per [`EnemyCategory`] in a vulnerable
//! table and an aggressive table. The player's mode picks the table.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use firedog_core::audio::SoundCue;
use firedog_core::effects::{EffectKind, VisualEffect};
use firedog_core::entity::{EnemyCategory, EnemyId};
use firedog_core::world::World;

use crate::Player;
use crate::state::PlayerState;
use crate::status::StatusKind;

/// Classified result of one overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionOutcome {
    NormalHit,
    StunOnly,
    Poison,
    Slow,
    Freeze,
    InkSplash,
    CoinTheft,
    EnemyDamage,
    EnemyDeath,
    BossDamage,
    Ignored,
}

/// What happens to the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyPolicy {
    Spare,
    Damage,
    Kill,
}

/// What happens to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPolicy {
    Unharmed,
    /// Hit state, one life and one coin.
    Hit,
    /// Stunned state, no life or coin loss.
    Stun,
    HitWithStatus(StatusKind),
    StealCoins,
    /// Boss contact, gated by the boss-collision timer.
    BossGated,
}

/// One row of an outcome table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeRule {
    pub outcome: CollisionOutcome,
    pub effect: EffectKind,
    pub cue: SoundCue,
    pub enemy: EnemyPolicy,
    pub player: PlayerPolicy,
    /// Resets the boss-collision timer.
    pub drains_boss_timer: bool,
}

const fn rule(
    outcome: CollisionOutcome,
    effect: EffectKind,
    cue: SoundCue,
    enemy: EnemyPolicy,
    player: PlayerPolicy,
) -> OutcomeRule {
    OutcomeRule {
        outcome,
        effect,
        cue,
        enemy,
        player,
        drains_boss_timer: false,
    }
}

use self::CollisionOutcome as O;
use self::EnemyPolicy as En;
use self::PlayerPolicy as P;
use firedog_core::audio::SoundCue as S;
use firedog_core::effects::EffectKind as E;

/// Rows in [`category_index`] order.
static VULNERABLE: [OutcomeRule; 10] = [
    rule(O::NormalHit, E::Blood, S::Hit, En::Spare, P::Hit),
    rule(O::CoinTheft, E::CoinLoss, S::CoinLoss, En::Spare, P::StealCoins),
    rule(O::InkSplash, E::InkSplash, S::InkSplat, En::Spare, P::Hit),
    rule(O::NormalHit, E::Explosion, S::Explosion, En::Kill, P::Hit),
    OutcomeRule {
        drains_boss_timer: true,
        ..rule(O::StunOnly, E::Electricity, S::Electric, En::Kill, P::Stun)
    },
    rule(O::Poison, E::PoisonSplash, S::Poison, En::Spare, P::HitWithStatus(StatusKind::Poison)),
    rule(O::Freeze, E::FreezeBurst, S::Freeze, En::Kill, P::HitWithStatus(StatusKind::Freeze)),
    rule(O::Slow, E::IceBurst, S::Slow, En::Spare, P::HitWithStatus(StatusKind::Slow)),
    rule(O::BossDamage, E::BossHit, S::BossHit, En::Spare, P::BossGated),
    rule(O::BossDamage, E::BossHit, S::BossHit, En::Spare, P::BossGated),
];

static AGGRESSIVE: [OutcomeRule; 10] = [
    rule(O::EnemyDamage, E::Blood, S::EnemyPoof, En::Damage, P::Unharmed),
    rule(O::EnemyDeath, E::Blood, S::EnemyPoof, En::Kill, P::Unharmed),
    rule(O::EnemyDamage, E::Blood, S::EnemyPoof, En::Damage, P::Unharmed),
    rule(O::EnemyDeath, E::Explosion, S::Explosion, En::Kill, P::Unharmed),
    rule(O::EnemyDeath, E::Electricity, S::Electric, En::Kill, P::Unharmed),
    rule(O::EnemyDamage, E::PoisonSplash, S::EnemyPoof, En::Damage, P::Unharmed),
    rule(O::EnemyDeath, E::FreezeBurst, S::Freeze, En::Kill, P::Unharmed),
    rule(O::EnemyDamage, E::IceBurst, S::EnemyPoof, En::Damage, P::Unharmed),
    rule(O::BossDamage, E::BossHit, S::BossHit, En::Damage, P::BossGated),
    rule(O::BossDamage, E::BossHit, S::BossHit, En::Spare, P::BossGated),
];

fn category_index(category: EnemyCategory) -> usize {
    match category {
        EnemyCategory::Plain => 0,
        EnemyCategory::Thief => 1,
        EnemyCategory::Ink => 2,
        EnemyCategory::Explosive => 3,
        EnemyCategory::Electric => 4,
        EnemyCategory::Acid => 5,
        EnemyCategory::Frost => 6,
        EnemyCategory::Ice => 7,
        EnemyCategory::BossBody => 8,
        EnemyCategory::BossBarrier => 9,
    }
}

pub fn vulnerable_rule(category: EnemyCategory) -> &'static OutcomeRule {
    &VULNERABLE[category_index(category)]
}

pub fn aggressive_rule(category: EnemyCategory) -> &'static OutcomeRule {
    &AGGRESSIVE[category_index(category)]
}

/// Per-enemy countdowns suppressing repeat vulnerable-mode hits.
///
/// Entries floor at zero and are dropped once expired or once their enemy
/// handle no longer resolves, so the map never outgrows the live set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CooldownMap {
    entries: HashMap<EnemyId, f32>,
}

impl CooldownMap {
    pub fn arm(&mut self, id: EnemyId, ms: f32) {
        self.entries.insert(id, ms.max(0.0));
    }

    pub fn remaining(&self, id: EnemyId) -> Option<f32> {
        self.entries.get(&id).copied()
    }

    pub fn is_cooling(&self, id: EnemyId) -> bool {
        self.remaining(id).is_some_and(|ms| ms > 0.0)
    }

    /// Decrement every entry, pruning expired and dead ones.
    pub fn tick(&mut self, dt_ms: f32, is_live: impl Fn(EnemyId) -> bool) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.entries.retain(|id, ms| {
            *ms = (*ms - dt_ms).max(0.0);
            *ms > 0.0 && is_live(*id)
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// How an enemy was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitSource {
    Contact,
    Projectile,
}

/// One resolved overlap, reported from [`Player::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCollision {
    pub enemy: EnemyId,
    pub category: EnemyCategory,
    pub source: HitSource,
    pub outcome: CollisionOutcome,
}

impl Player {
    /// Resolve every enemy overlapping the player, then every projectile.
    pub(crate) fn resolve_collisions(&mut self, world: &mut World) -> Vec<ResolvedCollision> {
        let mut resolved = self.resolve_contacts(world);
        resolved.extend(resolve_projectiles(world));
        resolved
    }

    fn resolve_contacts(&mut self, world: &mut World) -> Vec<ResolvedCollision> {
        let hitbox = self.body.hitbox();
        let touching: Vec<EnemyId> = world
            .enemies
            .iter()
            .filter(|(_, e)| !e.marked_for_deletion && e.hitbox.overlaps(&hitbox))
            .map(|(id, _)| id)
            .collect();

        let mut resolved = Vec::with_capacity(touching.len());
        for id in touching {
            let Some(category) = world.enemies.get(id).map(|e| e.category) else {
                continue;
            };
            // Aggressive mode is re-read per enemy: an earlier hit may have
            // knocked the player out of Rolling.
            let aggressive = self.state.is_aggressive();
            if category.is_boss() && world.boss.post_teleport_safe && !aggressive {
                continue;
            }

            let outcome = if aggressive {
                self.contact_aggressive(id, world)
            } else {
                self.contact_vulnerable(id, world)
            };
            trace!(enemy = ?id, ?category, ?outcome, "contact resolved");
            resolved.push(ResolvedCollision {
                enemy: id,
                category,
                source: HitSource::Contact,
                outcome,
            });
        }
        resolved
    }

    fn contact_vulnerable(&mut self, id: EnemyId, world: &mut World) -> CollisionOutcome {
        if self.status.invisible.is_active() || self.enemy_cooldowns.is_cooling(id) {
            return CollisionOutcome::Ignored;
        }
        let Some(enemy) = world.enemies.get(id) else {
            return CollisionOutcome::Ignored;
        };
        let rule = *vulnerable_rule(enemy.category);
        let (direct, barrier, center) = (
            enemy.deals_direct_hit_damage,
            enemy.barrier_active,
            enemy.hitbox.center(),
        );

        if rule.outcome == CollisionOutcome::NormalHit && !direct {
            return CollisionOutcome::Ignored;
        }
        if rule.player == PlayerPolicy::BossGated && !self.boss_gate_open(enemy.category, barrier) {
            return CollisionOutcome::Ignored;
        }

        apply_enemy_policy(world, id, rule.enemy);
        world.spawn_effect(VisualEffect::new(rule.effect, center.0, center.1));
        world.audio.play_once(rule.cue);

        match rule.player {
            PlayerPolicy::Unharmed => {},
            PlayerPolicy::Hit => self.take_hit(PlayerState::Hit, world),
            PlayerPolicy::Stun => self.enter_recovery(PlayerState::Stunned, world),
            PlayerPolicy::HitWithStatus(kind) => {
                self.take_hit(PlayerState::Hit, world);
                self.apply_status(kind, world);
            },
            PlayerPolicy::StealCoins => self.steal_coins(world, center),
            PlayerPolicy::BossGated => {
                self.boss_collision.reset();
                self.take_hit(PlayerState::Hit, world);
            },
        }
        if rule.drains_boss_timer {
            self.boss_collision.reset();
        }
        self.enemy_cooldowns
            .arm(id, self.config.collision.enemy_cooldown_ms);
        rule.outcome
    }

    fn contact_aggressive(&mut self, id: EnemyId, world: &mut World) -> CollisionOutcome {
        let Some(enemy) = world.enemies.get(id) else {
            return CollisionOutcome::Ignored;
        };
        let rule = *aggressive_rule(enemy.category);
        let center = enemy.hitbox.center();

        if rule.player == PlayerPolicy::BossGated {
            if !self.boss_gate_open(enemy.category, enemy.barrier_active) {
                return CollisionOutcome::Ignored;
            }
            self.boss_collision.reset();
            world.lives = world.lives.saturating_sub(1);
        }

        let killed = apply_enemy_policy(world, id, rule.enemy);
        world.spawn_effect(VisualEffect::new(rule.effect, center.0, center.1));
        world.audio.play_once(rule.cue);

        if rule.outcome == CollisionOutcome::EnemyDamage && killed {
            CollisionOutcome::EnemyDeath
        } else {
            rule.outcome
        }
    }

    fn boss_gate_open(&self, category: EnemyCategory, barrier_active: bool) -> bool {
        if category == EnemyCategory::BossBarrier && !barrier_active {
            return false;
        }
        self.boss_collision.is_ready()
    }

    fn steal_coins(&mut self, world: &mut World, at: (f32, f32)) {
        let cfg = &self.config.collision;
        let amount = self
            .rng
            .random_range(cfg.coin_theft_min..=cfg.coin_theft_max.max(cfg.coin_theft_min));
        let stolen = amount.min(world.coins);
        world.coins -= stolen;
        world.add_message(format!("-{stolen}"), at.0, at.1);
        for _ in 0..stolen.max(1) {
            let jitter_x = self.rng.random_range(-20.0..=20.0);
            let jitter_y = self.rng.random_range(-20.0..=20.0);
            world.spawn_effect(VisualEffect::new(
                EffectKind::CoinLoss,
                at.0 + jitter_x,
                at.1 + jitter_y,
            ));
        }
    }
}

/// Returns true if the enemy died.
fn apply_enemy_policy(world: &mut World, id: EnemyId, policy: EnemyPolicy) -> bool {
    let Some(enemy) = world.enemies.get_mut(id) else {
        return false;
    };
    match policy {
        EnemyPolicy::Spare => false,
        EnemyPolicy::Damage => enemy.take_hit(),
        EnemyPolicy::Kill => {
            enemy.kill();
            true
        },
    }
}

/// Each live projectile hits at most one enemy, and each enemy takes at
/// most one projectile hit per frame. Barriers and the post-teleport window
/// only gate body contact, not projectiles.
fn resolve_projectiles(world: &mut World) -> Vec<ResolvedCollision> {
    let mut hit_this_frame: HashSet<EnemyId> = HashSet::new();
    let mut resolved = Vec::new();

    for i in 0..world.projectiles.len() {
        if world.projectiles[i].marked_for_deletion {
            continue;
        }
        let pbox = world.projectiles[i].hitbox;
        let target = world
            .enemies
            .iter()
            .find(|(id, e)| {
                !e.marked_for_deletion && !hit_this_frame.contains(id) && e.hitbox.overlaps(&pbox)
            })
            .map(|(id, e)| (id, e.category, e.hitbox.center()));
        let Some((id, category, center)) = target else {
            continue;
        };

        hit_this_frame.insert(id);
        world.projectiles[i].marked_for_deletion = true;
        let killed = apply_enemy_policy(world, id, EnemyPolicy::Damage);
        let effect = aggressive_rule(category).effect;
        world.spawn_effect(VisualEffect::new(effect, center.0, center.1));
        world.audio.play_once(SoundCue::FireballHit);

        let outcome = if killed {
            CollisionOutcome::EnemyDeath
        } else {
            CollisionOutcome::EnemyDamage
        };
        trace!(enemy = ?id, ?category, ?outcome, "projectile resolved");
        resolved.push(ResolvedCollision {
            enemy: id,
            category,
            source: HitSource::Projectile,
            outcome,
        });
    }
    resolved
}

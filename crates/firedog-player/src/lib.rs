pub mod abilities;
pub mod collision;
pub mod config;
pub mod energy;
pub mod physics;
pub mod pickups;
pub mod snapshot;
pub mod state;
pub mod status;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use firedog_core::audio::SoundCue;
use firedog_core::effects::{EffectKind, VisualEffect};
use firedog_core::entity::{Pickup, PickupKind};
use firedog_core::input::{Action, InputSnapshot, KeyBindings, is_action_active};
use firedog_core::timer::Cooldown;
use firedog_core::world::World;

use abilities::{AbilityTimers, FireBlocked, FireContext};
use collision::{CooldownMap, ResolvedCollision};
use config::PlayerConfig;
use energy::{Energy, EnergyDrain, EnergyEvent};
use physics::{Body, Environment, IceMotion, VerticalRegime};
use pickups::PickupEffect;
use state::{Commands, EntryContext, PlayerState, StateCommand, StateInput};
use status::{Applied, MovementConstants, StatusEffects, StatusKind};

/// Actions sampled from one frame of input. All false while frozen.
#[derive(Debug, Clone, Copy, Default)]
struct Actions {
    forward: bool,
    back: bool,
    jump: bool,
    jump_pressed: bool,
    sit: bool,
    roll: bool,
    fireball: bool,
    invisible: bool,
}

/// What happened during one [`Player::update`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub collisions: Vec<ResolvedCollision>,
    pub pickups: Vec<PickupKind>,
    pub projectiles_fired: usize,
}

/// The player entity: state machine, physics, statuses, energy, abilities
/// and collision handling, advanced once per frame by [`Player::update`].
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
    pub body: Body,
    /// +1 facing right, -1 facing left.
    pub facing: f32,
    state: PlayerState,
    previous_state: PlayerState,
    frame_x: u32,
    frame_timer_ms: f32,
    pub energy: Energy,
    pub status: StatusEffects,
    baseline: MovementConstants,
    pub movement: MovementConstants,
    pub abilities: AbilityTimers,
    pub boss_collision: Cooldown,
    pub enemy_cooldowns: CooldownMap,
    pub environment: Environment,
    pub ice: IceMotion,
    pub buoyancy: f32,
    pub double_jump_available: bool,
    pub bindings: KeyBindings,
    jump_was_held: bool,
    death_animation_complete: bool,
    rng: StdRng,
}

impl Player {
    pub fn new(config: PlayerConfig, world: &World) -> Self {
        let p = &config.physics;
        let baseline = MovementConstants {
            normal_speed: p.normal_speed,
            max_speed: p.max_speed,
            weight: p.weight,
        };
        let body = Body {
            x: 0.0,
            y: world.ground_y(p.player_height),
            vx: 0.0,
            vy: 0.0,
            width: p.player_width,
            height: p.player_height,
        };
        Self {
            body,
            facing: 1.0,
            state: PlayerState::Sitting,
            previous_state: PlayerState::Sitting,
            frame_x: 0,
            frame_timer_ms: 0.0,
            energy: Energy::full(config.energy.max),
            status: StatusEffects::default(),
            baseline,
            movement: baseline,
            abilities: AbilityTimers::new(&config.abilities),
            boss_collision: Cooldown::ready(config.collision.boss_collision_cooldown_ms),
            enemy_cooldowns: CooldownMap::default(),
            environment: Environment::default(),
            ice: IceMotion::default(),
            buoyancy: 1.0,
            double_jump_available: true,
            bindings: KeyBindings::default(),
            jump_was_held: false,
            death_animation_complete: false,
            rng: StdRng::seed_from_u64(config.rng_seed),
            config,
        }
    }

    /// Restore the freshly constructed state. Level mode flags are kept.
    pub fn reset(&mut self, world: &mut World) {
        let environment = self.environment;
        *self = Player::new(self.config.clone(), world);
        self.environment = environment;
        world.scroll_speed = 0.0;
        debug!("player reset");
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn previous_state(&self) -> PlayerState {
        self.previous_state
    }

    pub fn frame_x(&self) -> u32 {
        self.frame_x
    }

    pub fn death_animation_complete(&self) -> bool {
        self.death_animation_complete
    }

    pub fn baseline(&self) -> MovementConstants {
        self.baseline
    }

    pub fn ground_y(&self, world: &World) -> f32 {
        world.ground_y(self.body.height)
    }

    pub fn is_grounded(&self, world: &World) -> bool {
        self.body.grounded(self.ground_y(world))
    }

    /// Advance the player by one frame of `dt_ms` milliseconds.
    pub fn update(&mut self, input: &InputSnapshot, dt_ms: f32, world: &mut World) -> FrameReport {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let mut report = FrameReport::default();

        self.abilities.tick(dt_ms);
        self.boss_collision.tick(dt_ms);

        self.tick_energy(dt_ms);
        self.tick_status(dt_ms, world);

        if !self.death_animation_complete {
            let actions = self.sample_actions(input);
            let commands = state::handle_input(self.state, &self.state_input(&actions, world));
            self.run_commands(commands, world);
            report.projectiles_fired = self.use_abilities(&actions, world);
            abilities::advance_projectiles(&mut world.projectiles, world.width, world.height);
            self.integrate(&actions, dt_ms, world);
            self.animate(dt_ms);
            report.collisions = self.resolve_collisions(world);
            report.pickups = self.collect_pickups(world);
        }

        self.enemy_cooldowns
            .tick(dt_ms, |id| world.enemies.contains(id));

        if world.lives == 0 {
            world.game_over = true;
        }
        if world.game_over && self.state != PlayerState::Dying {
            self.set_state(PlayerState::Dying, 0.0, world);
        }
        report
    }

    // ================================================================
    // State machine
    // ================================================================

    /// Switch to `next`, re-deriving world scroll and running exit/entry effects.
    pub fn set_state(&mut self, next: PlayerState, multiplier: f32, world: &mut World) {
        let from = self.state;
        if from != next {
            self.run_commands(state::on_exit(from), world);
            if next == PlayerState::Dying {
                info!(lives = world.lives, "game over, player dying");
            }
        }
        self.previous_state = from;
        self.state = next;
        self.frame_x = 0;
        self.frame_timer_ms = 0.0;
        world.scroll_speed = self.scroll_speed_for(next, multiplier, world);
        debug!(?from, to = ?next, scroll_speed = world.scroll_speed, "state transition");

        let ctx = EntryContext {
            grounded: self.is_grounded(world),
            underwater: self.environment.underwater,
            zero_gravity: self.environment.zero_gravity,
            double_jump_available: self.double_jump_available,
            y: self.body.y,
        };
        self.run_commands(state::on_enter(next, ctx), world);
    }

    fn scroll_speed_for(&self, state: PlayerState, multiplier: f32, world: &World) -> f32 {
        if world.scroll_frozen() || self.status.frozen.is_active() {
            0.0
        } else if state == PlayerState::Rolling && self.status.blue_potion.is_active() {
            world.max_speed * self.config.status.blue_potion_scroll_multiplier
        } else {
            world.max_speed * multiplier
        }
    }

    fn rederive_scroll(&self, world: &mut World) {
        if world.scroll_frozen() || self.status.frozen.is_active() {
            return;
        }
        world.scroll_speed = self.scroll_speed_for(self.state, self.state.speed_multiplier(), world);
    }

    /// Enter Hit or Stunned unless already recovering or dying.
    pub(crate) fn enter_recovery(&mut self, state: PlayerState, world: &mut World) {
        if self.state.is_recovering() || self.state == PlayerState::Dying {
            return;
        }
        self.set_state(state, 0.0, world);
    }

    /// Lose one life and one coin, then flinch.
    pub(crate) fn take_hit(&mut self, state: PlayerState, world: &mut World) {
        world.lives = world.lives.saturating_sub(1);
        world.coins = world.coins.saturating_sub(1);
        self.enter_recovery(state, world);
    }

    fn sample_actions(&mut self, input: &InputSnapshot) -> Actions {
        let held = |action| is_action_active(&self.bindings, action, input);
        let jump = held(Action::Jump);
        let sampled = Actions {
            forward: held(Action::MoveForward),
            back: held(Action::MoveBack),
            jump,
            jump_pressed: jump && !self.jump_was_held,
            sit: held(Action::Sit),
            roll: self.bindings.roll_requested(input),
            fireball: self.bindings.fireball_requested(input),
            invisible: self.bindings.invisible_requested(input),
        };
        self.jump_was_held = jump;
        if self.status.frozen.is_active() {
            return Actions::default();
        }
        sampled
    }

    fn state_input(&self, actions: &Actions, world: &World) -> StateInput {
        StateInput {
            forward: actions.forward,
            back: actions.back,
            jump: actions.jump,
            jump_pressed: actions.jump_pressed,
            sit: actions.sit,
            roll: actions.roll,
            grounded: self.is_grounded(world),
            underwater: self.environment.underwater,
            zero_gravity: self.environment.zero_gravity,
            slowed: self.status.slowed.is_active(),
            blue_potion: self.status.blue_potion.is_active(),
            exhausted: self.energy.exhausted,
            world_frozen: world.scroll_frozen(),
            boss_visible: world.boss.visible,
            cabin_fully_visible: world.cutscene.cabin_fully_visible,
            game_over: world.game_over,
            dive_ready: self.abilities.dive.is_ready(),
            double_jump_available: self.double_jump_available,
            y: self.body.y,
            vy: self.body.vy,
            weight: self.movement.weight,
            frame_x: self.frame_x,
            previous: self.previous_state,
        }
    }

    fn run_commands(&mut self, commands: Commands, world: &mut World) {
        let phys = &self.config.physics;
        let (jump_impulse, space_jump, dive_velocity, nudge) = (
            phys.jump_impulse,
            phys.space_jump_velocity,
            phys.dive_velocity,
            phys.underwater_nudge,
        );
        for command in commands {
            match command {
                StateCommand::SetState { state, multiplier } => {
                    self.set_state(state, multiplier, world)
                },
                StateCommand::JumpImpulse => {
                    if self.environment.zero_gravity {
                        self.body.vy = -space_jump;
                    } else {
                        self.body.vy -= jump_impulse;
                    }
                },
                StateCommand::DoubleJump => {
                    self.body.vy = -space_jump;
                    self.double_jump_available = false;
                },
                StateCommand::DiveImpulse => self.body.vy = dive_velocity,
                StateCommand::ResetDiveCooldown => self.abilities.dive.reset(),
                StateCommand::SwimUp { buoyancy } => {
                    self.body.y = (self.body.y - nudge).max(0.0);
                    self.buoyancy = buoyancy;
                },
                StateCommand::Particle(kind) => {
                    let (x, y) = self.particle_origin(kind);
                    world.spawn_effect(VisualEffect::new(kind, x, y));
                },
                StateCommand::SplashBurst { boosted } => self.splash(boosted, world),
                StateCommand::Play { cue, options } => world.audio.play(cue, options),
                StateCommand::Stop(cue) => world.audio.stop(cue),
                StateCommand::LatchDeath => {
                    if !self.death_animation_complete {
                        self.death_animation_complete = true;
                        info!("death animation complete");
                    }
                },
            }
        }
    }

    fn particle_origin(&self, kind: EffectKind) -> (f32, f32) {
        let b = &self.body;
        match kind {
            EffectKind::FireTrail => (b.x + b.width * 0.5, b.y + b.height * 0.5),
            _ => (b.x + b.width * 0.5, b.y + b.height),
        }
    }

    fn splash(&mut self, boosted: bool, world: &mut World) {
        let cfg = &self.config.collision;
        let count = if boosted {
            cfg.blue_potion_splash_particles
        } else {
            cfg.splash_particles
        };
        let (x, y) = self.particle_origin(EffectKind::Splash);
        for _ in 0..count {
            let dx = self.rng.random_range(-self.body.width * 0.5..=self.body.width * 0.5);
            let size = self.rng.random_range(0.5..=1.5);
            world.spawn_effect(VisualEffect::new(EffectKind::Splash, x + dx, y).with_size(size));
        }
    }

    /// Advance one sprite frame per whole interval elapsed, carrying the
    /// remainder. Hit, Stunned and Dying hold their last frame until the
    /// next transition check reads it.
    fn animate(&mut self, dt_ms: f32) {
        let interval = self.config.physics.frame_interval_ms;
        if interval <= 0.0 {
            return;
        }
        self.frame_timer_ms += dt_ms;
        let max_frame = self.state.animation().max_frame;
        while self.frame_timer_ms >= interval {
            if self.frame_x < max_frame {
                self.frame_x += 1;
            } else if self.state.loops() && !self.state.is_recovering() {
                self.frame_x = 0;
            } else {
                self.frame_timer_ms = self.frame_timer_ms.min(interval);
                break;
            }
            self.frame_timer_ms -= interval;
        }
    }

    // ================================================================
    // Physics
    // ================================================================

    fn integrate(&mut self, actions: &Actions, dt_ms: f32, world: &World) {
        let dir = match (actions.forward, actions.back) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        let factor = if self.status.frozen.is_active() {
            0.0
        } else {
            self.state.horizontal_factor()
        };
        if dir != 0.0 && factor > 0.0 {
            self.facing = dir;
        }

        let cap = physics::speed_cap(&self.movement, dir, world.scroll_frozen());
        if self.environment.ice {
            physics::move_ice(
                &mut self.body,
                &mut self.ice,
                dir,
                cap,
                factor,
                dt_ms,
                &self.config.physics,
                &mut self.rng,
                world.width,
            );
        } else {
            physics::move_ground(&mut self.body, dir, cap, factor, world.width);
        }

        let ground_y = self.ground_y(world);
        match self.environment.regime() {
            VerticalRegime::Normal => physics::fall_normal(&mut self.body, self.movement.weight, ground_y),
            VerticalRegime::Underwater => physics::fall_underwater(
                &mut self.body,
                self.movement.weight,
                &mut self.buoyancy,
                ground_y,
                &self.config.physics,
            ),
            VerticalRegime::Space => {
                physics::fall_space(&mut self.body, ground_y, &self.config.physics);
                if self.body.grounded(ground_y) {
                    self.double_jump_available = true;
                }
            },
        }
    }

    // ================================================================
    // Energy and statuses
    // ================================================================

    fn tick_energy(&mut self, dt_ms: f32) {
        let drain = EnergyDrain {
            poisoned: self.status.poisoned.is_active(),
            rolling: self.state == PlayerState::Rolling,
            blue_potion: self.status.blue_potion.is_active(),
        };
        let event = self.energy.tick(dt_ms, drain, &self.config.energy);
        log_energy_event(event, self.energy.value);
    }

    fn spend_energy(&mut self, cost: f32) {
        let event = self.energy.spend(cost, self.config.energy.exhaustion_recovery);
        log_energy_event(event, self.energy.value);
    }

    fn tick_status(&mut self, dt_ms: f32, world: &mut World) {
        if self.status.poisoned.is_active() && self.energy.exhausted {
            self.status.clear(StatusKind::Poison);
            debug!("poison cleared by exhaustion");
        }
        for kind in self.status.tick(dt_ms) {
            debug!(?kind, "status expired");
            self.on_status_expired(kind, world);
        }
    }

    fn on_status_expired(&mut self, kind: StatusKind, world: &mut World) {
        match kind {
            StatusKind::Slow => self.movement = self.baseline,
            StatusKind::Confusion => {
                if let Some(keys) = self.status.original_movement_keys.take() {
                    self.bindings.set_movement_keys(keys);
                }
            },
            StatusKind::Freeze | StatusKind::BluePotion => self.rederive_scroll(world),
            StatusKind::Poison | StatusKind::RedPotion | StatusKind::Invisibility => {},
        }
    }

    /// Count down only the slow status; restores baseline movement on expiry.
    pub fn check_slowed(&mut self, dt_ms: f32) {
        if self.status.slowed.tick(dt_ms) {
            self.movement = self.baseline;
            debug!(kind = ?StatusKind::Slow, "status expired");
        }
    }

    /// Start or refresh a status and apply its entry side effects.
    pub fn apply_status(&mut self, kind: StatusKind, world: &mut World) -> Applied {
        let applied = self
            .status
            .apply(kind, &self.config.status, self.energy.exhausted);
        if applied == Applied::Ignored {
            debug!(?kind, "status ignored");
            return applied;
        }
        debug!(?kind, ?applied, "status applied");

        match kind {
            StatusKind::Slow => self.movement = self.baseline.slowed(&self.config.status),
            StatusKind::Freeze => {
                self.body.vx = 0.0;
                self.ice.reset();
                world.scroll_speed = 0.0;
            },
            StatusKind::Confusion if applied == Applied::Started => {
                let keys = self.bindings.movement_keys();
                let scrambled = status::confuse_movement_keys(
                    &keys,
                    &mut self.rng,
                    self.config.status.confusion_attempts,
                );
                self.bindings.set_movement_keys(scrambled);
                self.status.original_movement_keys = Some(keys);
            },
            StatusKind::BluePotion => self.rederive_scroll(world),
            _ => {},
        }
        applied
    }

    // ================================================================
    // Abilities
    // ================================================================

    fn use_abilities(&mut self, actions: &Actions, world: &mut World) -> usize {
        if self.state == PlayerState::Dying {
            return 0;
        }
        let mut fired = 0;
        if actions.fireball {
            fired = self.try_fireball(world).unwrap_or(0);
        }
        if actions.invisible {
            self.try_invisibility(world);
        }
        fired
    }

    fn fire_context(&self, world: &World) -> FireContext {
        let b = &self.body;
        FireContext {
            exhausted: self.energy.exhausted,
            cabin_fully_visible: world.cutscene.cabin_fully_visible,
            underwater: self.environment.underwater,
            red_potion: self.status.red_potion.is_active(),
            facing: self.facing,
            mouth_x: b.x + b.width * 0.5 + self.facing * b.width * 0.3,
            mouth_y: b.y + b.height * 0.4,
        }
    }

    /// Fire if the cooldown, energy and cabin gates allow. Returns the
    /// number of projectiles spawned.
    pub fn try_fireball(&mut self, world: &mut World) -> Result<usize, FireBlocked> {
        let ctx = self.fire_context(world);
        abilities::can_fire(&self.abilities.fireball, &ctx)?;

        let volley = abilities::fireball_volley(&ctx, &self.config.abilities);
        let count = volley.len();
        world.projectiles.extend(volley);
        self.spend_energy(self.config.abilities.fireball_cost);
        self.abilities.fireball.reset();
        world.audio.play_once(if ctx.underwater {
            SoundCue::BubbleShot
        } else {
            SoundCue::FireballShot
        });
        debug!(count, energy = self.energy.value, "fireball");
        Ok(count)
    }

    pub fn try_invisibility(&mut self, world: &mut World) -> bool {
        if !abilities::can_turn_invisible(&self.abilities.invisibility, self.energy.exhausted) {
            return false;
        }
        self.apply_status(StatusKind::Invisibility, world);
        self.abilities.invisibility.reset();
        world.audio.play_once(SoundCue::Invisible);
        true
    }

    // ================================================================
    // Pickups
    // ================================================================

    fn collect_pickups(&mut self, world: &mut World) -> Vec<PickupKind> {
        let hitbox = self.body.hitbox();
        let mut taken: Vec<Pickup> = Vec::new();
        for pickup in world
            .power_ups
            .iter_mut()
            .chain(world.power_downs.iter_mut())
            .filter(|p| !p.marked_for_deletion && p.hitbox.overlaps(&hitbox))
        {
            pickup.marked_for_deletion = true;
            taken.push(pickup.clone());
        }

        let mut kinds = Vec::with_capacity(taken.len());
        for pickup in taken {
            let kind = if pickup.kind == PickupKind::RandomPower {
                let roll: f32 = self.rng.random();
                pickups::random_power(roll, self.environment.underwater)
            } else {
                pickup.kind
            };
            let (x, y) = pickup.hitbox.center();
            world.add_message(pickups::pickup_message(kind, &self.config.pickups), x, y);
            world.audio.play_once(if kind.is_power_down() {
                SoundCue::PowerDown
            } else {
                SoundCue::PowerUp
            });
            if let Some(effect) = pickups::pickup_effect(kind, &self.config.pickups) {
                self.apply_pickup(effect, world);
            }
            debug!(?kind, "pickup collected");
            kinds.push(kind);
        }
        kinds
    }

    fn apply_pickup(&mut self, effect: PickupEffect, world: &mut World) {
        match effect {
            PickupEffect::AddTime(ms) => world.time_ms += ms,
            PickupEffect::AddLife => world.lives += 1,
            PickupEffect::AddCoins(n) => world.coins += n,
            PickupEffect::Status(kind) => {
                self.apply_status(kind, world);
            },
            PickupEffect::Harm => {
                world.lives = world.lives.saturating_sub(1);
                self.enter_recovery(PlayerState::Hit, world);
            },
        }
    }
}

fn log_energy_event(event: Option<EnergyEvent>, value: f32) {
    match event {
        Some(EnergyEvent::Exhausted) => debug!(value, "energy exhausted"),
        Some(EnergyEvent::Recovered) => debug!(value, "energy recovered"),
        None => {},
    }
}

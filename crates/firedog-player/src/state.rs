//! Player movement/animation modes and their guarded transitions.
//!
//! Transitions are pure: [`handle_input`] inspects a [`StateInput`] and
//! returns a list of [`StateCommand`]s that the [`crate::Player`] executes.

use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use firedog_core::audio::{PlayOptions, SoundCue};
use firedog_core::effects::EffectKind;

/// The ten mutually exclusive player modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Sitting,
    Running,
    Jumping,
    Falling,
    Rolling,
    Diving,
    Stunned,
    Hit,
    Standing,
    Dying,
}

/// Sprite-sheet row and last frame index of a state's animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationWindow {
    pub row: u32,
    pub max_frame: u32,
}

impl PlayerState {
    pub const ALL: [PlayerState; 10] = [
        PlayerState::Sitting,
        PlayerState::Running,
        PlayerState::Jumping,
        PlayerState::Falling,
        PlayerState::Rolling,
        PlayerState::Diving,
        PlayerState::Stunned,
        PlayerState::Hit,
        PlayerState::Standing,
        PlayerState::Dying,
    ];

    pub fn animation(self) -> AnimationWindow {
        let (row, max_frame) = match self {
            PlayerState::Standing => (0, 6),
            PlayerState::Jumping => (1, 6),
            PlayerState::Falling => (2, 6),
            PlayerState::Running => (3, 8),
            PlayerState::Stunned | PlayerState::Hit => (4, 10),
            PlayerState::Sitting => (5, 4),
            PlayerState::Rolling | PlayerState::Diving => (6, 6),
            PlayerState::Dying => (8, 11),
        };
        AnimationWindow { row, max_frame }
    }

    /// Scroll multiplier this state sets on entry.
    pub fn speed_multiplier(self) -> f32 {
        match self {
            PlayerState::Running | PlayerState::Jumping | PlayerState::Falling => 1.0,
            PlayerState::Rolling => 2.0,
            _ => 0.0,
        }
    }

    /// Whether held horizontal input moves the player in this state.
    pub fn horizontal_factor(self) -> f32 {
        match self {
            PlayerState::Running
            | PlayerState::Jumping
            | PlayerState::Falling
            | PlayerState::Rolling
            | PlayerState::Diving => 1.0,
            _ => 0.0,
        }
    }

    /// Rolling and Diving damage enemies on contact.
    pub fn is_aggressive(self) -> bool {
        matches!(self, PlayerState::Rolling | PlayerState::Diving)
    }

    pub fn is_recovering(self) -> bool {
        matches!(self, PlayerState::Hit | PlayerState::Stunned)
    }

    /// Dying holds its last frame; every other animation loops.
    pub fn loops(self) -> bool {
        self != PlayerState::Dying
    }
}

/// Everything a transition guard may look at, sampled once per frame.
///
/// Action flags are already masked: a frozen player reports nothing held.
#[derive(Debug, Clone, Copy)]
pub struct StateInput {
    pub forward: bool,
    pub back: bool,
    pub jump: bool,
    /// Rising edge of `jump`.
    pub jump_pressed: bool,
    pub sit: bool,
    pub roll: bool,

    pub grounded: bool,
    pub underwater: bool,
    pub zero_gravity: bool,
    pub slowed: bool,
    pub blue_potion: bool,
    pub exhausted: bool,
    /// Boss or cutscene on screen.
    pub world_frozen: bool,
    pub boss_visible: bool,
    pub cabin_fully_visible: bool,
    pub game_over: bool,
    pub dive_ready: bool,
    pub double_jump_available: bool,

    pub y: f32,
    pub vy: f32,
    pub weight: f32,
    pub frame_x: u32,
    pub previous: PlayerState,
}

/// Side effects requested by a transition, executed in order by the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateCommand {
    SetState { state: PlayerState, multiplier: f32 },
    /// Grounded jump impulse.
    JumpImpulse,
    /// Mid-air jump in zero gravity; consumes the double jump.
    DoubleJump,
    DiveImpulse,
    ResetDiveCooldown,
    /// Underwater swim stroke: nudge upward and set buoyancy.
    SwimUp { buoyancy: f32 },
    /// One ambient particle at the player's feet or tail.
    Particle(EffectKind),
    SplashBurst { boosted: bool },
    Play { cue: SoundCue, options: PlayOptions },
    Stop(SoundCue),
    LatchDeath,
}

pub type Commands = SmallVec<[StateCommand; 4]>;

fn go(state: PlayerState, multiplier: f32) -> StateCommand {
    StateCommand::SetState { state, multiplier }
}

/// Buoyancy band for an underwater swimmer at height `y`.
pub fn buoyancy_for_depth(y: f32) -> f32 {
    if y < 100.0 {
        1.0
    } else if y < 200.0 {
        2.0
    } else if y < 300.0 {
        3.0
    } else {
        4.0
    }
}

/// Evaluate `state`'s guards for one frame.
pub fn handle_input(state: PlayerState, input: &StateInput) -> Commands {
    use PlayerState::*;

    if input.game_over && state != Dying {
        return smallvec![go(Dying, 0.0)];
    }

    let horizontal = input.forward || input.back;
    let mut out = Commands::new();

    match state {
        Sitting => {
            if horizontal {
                out.push(go(Running, 1.0));
            } else if input.jump {
                out.push(go(Jumping, 1.0));
            } else if input.roll && !input.cabin_fully_visible && !input.exhausted {
                out.push(go(Rolling, 2.0));
            } else if input.roll
                && input.cabin_fully_visible
                && input.boss_visible
                && input.exhausted
            {
                out.push(go(Rolling, 0.0));
            }
        },
        Running => {
            out.push(StateCommand::Particle(if input.slowed {
                EffectKind::IceCrystal
            } else {
                EffectKind::Dust
            }));
            if input.world_frozen && !horizontal {
                out.push(go(Standing, 0.0));
            } else if input.sit && !horizontal {
                out.push(go(Sitting, 0.0));
            } else if input.jump {
                out.push(go(Jumping, 1.0));
            } else if input.roll && !input.exhausted {
                out.push(go(Rolling, 2.0));
            }
        },
        Standing => {
            if horizontal {
                out.push(go(Running, 1.0));
            } else if input.jump {
                out.push(go(Jumping, 1.0));
            } else if input.sit {
                out.push(go(Sitting, 0.0));
            } else if input.roll && !input.exhausted {
                out.push(go(Rolling, 2.0));
            } else if !input.world_frozen {
                out.push(go(Running, 1.0));
            }
        },
        Jumping => {
            let swimming_up = input.underwater && input.jump;
            if swimming_up {
                out.push(StateCommand::SwimUp {
                    buoyancy: buoyancy_for_depth(input.y),
                });
            }
            if !input.underwater && input.vy > input.weight {
                out.push(go(Falling, 1.0));
            } else if input.underwater && !input.jump {
                out.push(go(Falling, 1.0));
            } else if input.roll && !input.exhausted {
                out.push(go(Rolling, 2.0));
            } else if input.sit && input.dive_ready {
                out.push(go(Diving, 0.0));
            } else if input.grounded && input.vy >= 0.0 && !swimming_up {
                out.push(go(Running, 1.0));
            }
        },
        Falling => {
            if input.grounded {
                out.push(go(Running, 1.0));
            } else if input.roll && !input.exhausted {
                out.push(go(Rolling, 2.0));
            } else if input.sit && input.dive_ready {
                out.push(go(Diving, 0.0));
            } else if input.underwater && input.jump {
                out.push(go(Jumping, 1.0));
            } else if input.zero_gravity && input.jump_pressed && input.double_jump_available {
                out.push(go(Jumping, 1.0));
            }
        },
        Rolling => {
            out.push(StateCommand::Particle(EffectKind::FireTrail));
            let land_or_fall = if input.grounded {
                go(Running, 1.0)
            } else {
                go(Falling, 1.0)
            };
            if input.exhausted {
                out.push(land_or_fall);
            } else if input.roll && input.jump && input.grounded {
                out.push(if input.underwater {
                    StateCommand::SwimUp {
                        buoyancy: buoyancy_for_depth(input.y),
                    }
                } else {
                    StateCommand::JumpImpulse
                });
            } else if input.roll && input.sit && !input.grounded && input.dive_ready {
                out.push(go(Diving, 0.0));
            } else if !input.roll {
                out.push(land_or_fall);
            }
        },
        Diving => {
            if input.grounded {
                out.push(go(Running, 1.0));
                out.push(StateCommand::SplashBurst {
                    boosted: input.blue_potion,
                });
                out.push(StateCommand::Play {
                    cue: SoundCue::DiveLanding,
                    options: PlayOptions::ONE_SHOT,
                });
            }
        },
        Hit | Stunned => {
            if input.frame_x >= state.animation().max_frame {
                if !input.grounded {
                    out.push(go(Falling, 1.0));
                } else if input.previous == Sitting {
                    out.push(go(Sitting, 0.0));
                } else {
                    out.push(go(Running, 1.0));
                }
            }
        },
        Dying => {
            if input.frame_x >= state.animation().max_frame
                && (input.grounded || input.underwater || input.zero_gravity)
            {
                out.push(StateCommand::LatchDeath);
            }
        },
    }
    out
}

/// Conditions read by entry effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryContext {
    pub grounded: bool,
    pub underwater: bool,
    pub zero_gravity: bool,
    pub double_jump_available: bool,
    pub y: f32,
}

/// Fixed side effects of entering `state`.
pub fn on_enter(state: PlayerState, ctx: EntryContext) -> Commands {
    match state {
        PlayerState::Jumping if ctx.grounded && ctx.underwater => {
            smallvec![StateCommand::SwimUp {
                buoyancy: buoyancy_for_depth(ctx.y),
            }]
        },
        PlayerState::Jumping if ctx.grounded => smallvec![
            StateCommand::JumpImpulse,
            StateCommand::Play {
                cue: SoundCue::Jump,
                options: PlayOptions::ONE_SHOT,
            },
        ],
        PlayerState::Jumping if ctx.zero_gravity && ctx.double_jump_available => {
            smallvec![StateCommand::DoubleJump]
        },
        PlayerState::Rolling => smallvec![StateCommand::Play {
            cue: SoundCue::Roll,
            options: PlayOptions::LOOP,
        }],
        PlayerState::Diving => {
            smallvec![StateCommand::DiveImpulse, StateCommand::ResetDiveCooldown]
        },
        PlayerState::Dying => smallvec![StateCommand::Play {
            cue: SoundCue::Death,
            options: PlayOptions::ONE_SHOT,
        }],
        _ => Commands::new(),
    }
}

/// Side effects of leaving `state`.
pub fn on_exit(state: PlayerState) -> Commands {
    match state {
        PlayerState::Rolling => smallvec![StateCommand::Stop(SoundCue::Roll)],
        _ => Commands::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::PlayerState::*;

    fn idle() -> StateInput {
        StateInput {
            forward: false,
            back: false,
            jump: false,
            jump_pressed: false,
            sit: false,
            roll: false,
            grounded: true,
            underwater: false,
            zero_gravity: false,
            slowed: false,
            blue_potion: false,
            exhausted: false,
            world_frozen: false,
            boss_visible: false,
            cabin_fully_visible: false,
            game_over: false,
            dive_ready: true,
            double_jump_available: true,
            y: 0.0,
            vy: 0.0,
            weight: 1.0,
            frame_x: 0,
            previous: Sitting,
        }
    }

    fn next_state(cmds: &Commands) -> Option<(PlayerState, f32)> {
        cmds.iter().find_map(|c| match c {
            StateCommand::SetState { state, multiplier } => Some((*state, *multiplier)),
            _ => None,
        })
    }

    // ================================================================
    // Tables
    // ================================================================

    #[test]
    fn animation_windows() {
        assert_eq!(Sitting.animation(), AnimationWindow { row: 5, max_frame: 4 });
        assert_eq!(Running.animation().max_frame, 8);
        assert_eq!(Dying.animation(), AnimationWindow { row: 8, max_frame: 11 });
        assert!(!Dying.loops());
        assert!(Hit.loops());
    }

    #[test]
    fn only_rolling_and_diving_are_aggressive() {
        let aggressive: Vec<_> = PlayerState::ALL
            .into_iter()
            .filter(|s| s.is_aggressive())
            .collect();
        assert_eq!(aggressive, vec![Rolling, Diving]);
    }

    // ================================================================
    // Guards
    // ================================================================

    #[test]
    fn game_over_forces_dying_from_anywhere() {
        let input = StateInput {
            game_over: true,
            forward: true,
            ..idle()
        };
        for state in PlayerState::ALL {
            let cmds = handle_input(state, &input);
            if state == Dying {
                assert_eq!(next_state(&cmds), None);
            } else {
                assert_eq!(next_state(&cmds), Some((Dying, 0.0)), "from {state:?}");
            }
        }
    }

    #[test]
    fn sitting_roll_blocked_by_cabin_and_exhaustion() {
        let roll = StateInput {
            roll: true,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Sitting, &roll)), Some((Rolling, 2.0)));

        let cabin = StateInput {
            cabin_fully_visible: true,
            ..roll
        };
        assert_eq!(next_state(&handle_input(Sitting, &cabin)), None);

        let tired = StateInput {
            exhausted: true,
            ..roll
        };
        assert_eq!(next_state(&handle_input(Sitting, &tired)), None);
    }

    #[test]
    fn cabin_with_boss_and_exhaustion_rolls_in_place() {
        let stuck = StateInput {
            roll: true,
            cabin_fully_visible: true,
            boss_visible: true,
            exhausted: true,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Sitting, &stuck)), Some((Rolling, 0.0)));

        let rested = StateInput {
            exhausted: false,
            ..stuck
        };
        assert_eq!(next_state(&handle_input(Sitting, &rested)), None);
    }

    #[test]
    fn running_trail_depends_on_slow() {
        let cmds = handle_input(Running, &idle());
        assert_eq!(cmds[0], StateCommand::Particle(EffectKind::Dust));
        let slowed = StateInput {
            slowed: true,
            ..idle()
        };
        let cmds = handle_input(Running, &slowed);
        assert_eq!(cmds[0], StateCommand::Particle(EffectKind::IceCrystal));
    }

    #[test]
    fn running_stands_when_world_freezes() {
        let frozen = StateInput {
            world_frozen: true,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Running, &frozen)), Some((Standing, 0.0)));

        let moving = StateInput {
            forward: true,
            ..frozen
        };
        assert_eq!(next_state(&handle_input(Running, &moving)), None);
    }

    #[test]
    fn standing_resumes_when_world_thaws() {
        let frozen = StateInput {
            world_frozen: true,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Standing, &frozen)), None);
        assert_eq!(next_state(&handle_input(Standing, &idle())), Some((Running, 1.0)));
    }

    #[test]
    fn jumping_falls_past_weight() {
        let rising = StateInput {
            grounded: false,
            vy: -5.0,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Jumping, &rising)), None);
        let apex = StateInput { vy: 1.5, ..rising };
        assert_eq!(next_state(&handle_input(Jumping, &apex)), Some((Falling, 1.0)));
    }

    #[test]
    fn underwater_jump_swims_by_depth_band() {
        let swim = StateInput {
            underwater: true,
            jump: true,
            grounded: false,
            y: 250.0,
            vy: 3.0,
            ..idle()
        };
        let cmds = handle_input(Jumping, &swim);
        assert_eq!(cmds[0], StateCommand::SwimUp { buoyancy: 3.0 });
        assert_eq!(next_state(&cmds), None, "vy past weight does not fall underwater");

        let released = StateInput {
            jump: false,
            ..swim
        };
        assert_eq!(next_state(&handle_input(Jumping, &released)), Some((Falling, 1.0)));
    }

    #[test]
    fn underwater_floor_jump_swims_instead_of_leaping() {
        let floor = EntryContext {
            grounded: true,
            underwater: true,
            y: 328.7,
            ..Default::default()
        };
        assert_eq!(
            on_enter(Jumping, floor).as_slice(),
            &[StateCommand::SwimUp { buoyancy: 4.0 }]
        );
    }

    #[test]
    fn falling_double_jump_needs_edge_and_charge() {
        let air = StateInput {
            grounded: false,
            zero_gravity: true,
            jump: true,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Falling, &air)), None, "held is not pressed");

        let pressed = StateInput {
            jump_pressed: true,
            ..air
        };
        assert_eq!(next_state(&handle_input(Falling, &pressed)), Some((Jumping, 1.0)));

        let spent = StateInput {
            double_jump_available: false,
            ..pressed
        };
        assert_eq!(next_state(&handle_input(Falling, &spent)), None);
    }

    #[test]
    fn rolling_exits() {
        let rolling = StateInput {
            roll: true,
            ..idle()
        };
        let cmds = handle_input(Rolling, &rolling);
        assert_eq!(cmds[0], StateCommand::Particle(EffectKind::FireTrail));
        assert_eq!(next_state(&cmds), None);

        let jump = StateInput {
            jump: true,
            ..rolling
        };
        assert!(handle_input(Rolling, &jump).contains(&StateCommand::JumpImpulse));

        let swim = StateInput {
            underwater: true,
            y: 150.0,
            ..jump
        };
        let cmds = handle_input(Rolling, &swim);
        assert!(!cmds.contains(&StateCommand::JumpImpulse));
        assert!(cmds.contains(&StateCommand::SwimUp { buoyancy: 2.0 }));

        let airborne_release = StateInput {
            grounded: false,
            ..idle()
        };
        assert_eq!(
            next_state(&handle_input(Rolling, &airborne_release)),
            Some((Falling, 1.0))
        );

        let exhausted = StateInput {
            exhausted: true,
            ..rolling
        };
        assert_eq!(next_state(&handle_input(Rolling, &exhausted)), Some((Running, 1.0)));
    }

    #[test]
    fn dive_landing_splashes() {
        let cmds = handle_input(
            Diving,
            &StateInput {
                blue_potion: true,
                ..idle()
            },
        );
        assert_eq!(next_state(&cmds), Some((Running, 1.0)));
        assert!(cmds.contains(&StateCommand::SplashBurst { boosted: true }));
    }

    #[test]
    fn hit_recovers_to_previous_posture() {
        let done = StateInput {
            frame_x: 10,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Hit, &done)), Some((Sitting, 0.0)));

        let was_running = StateInput {
            previous: Running,
            ..done
        };
        assert_eq!(next_state(&handle_input(Stunned, &was_running)), Some((Running, 1.0)));

        let airborne = StateInput {
            grounded: false,
            ..done
        };
        assert_eq!(next_state(&handle_input(Hit, &airborne)), Some((Falling, 1.0)));

        let mid = StateInput {
            frame_x: 9,
            ..idle()
        };
        assert_eq!(next_state(&handle_input(Hit, &mid)), None);
    }

    #[test]
    fn dying_latches_only_when_settled() {
        let last_frame_airborne = StateInput {
            frame_x: 11,
            grounded: false,
            ..idle()
        };
        assert!(handle_input(Dying, &last_frame_airborne).is_empty());

        let underwater = StateInput {
            underwater: true,
            ..last_frame_airborne
        };
        assert_eq!(
            handle_input(Dying, &underwater).as_slice(),
            &[StateCommand::LatchDeath]
        );
    }

    // ================================================================
    // Entry effects
    // ================================================================

    #[test]
    fn jump_entry_impulse_only_from_ground() {
        let ground = EntryContext {
            grounded: true,
            ..Default::default()
        };
        assert!(on_enter(Jumping, ground).contains(&StateCommand::JumpImpulse));

        let air = EntryContext::default();
        assert!(on_enter(Jumping, air).is_empty());

        let space = EntryContext {
            zero_gravity: true,
            double_jump_available: true,
            ..Default::default()
        };
        assert_eq!(on_enter(Jumping, space).as_slice(), &[StateCommand::DoubleJump]);
    }

    #[test]
    fn rolling_loops_its_cue_until_exit() {
        assert_eq!(
            on_enter(Rolling, EntryContext::default()).as_slice(),
            &[StateCommand::Play {
                cue: SoundCue::Roll,
                options: PlayOptions::LOOP
            }]
        );
        assert_eq!(on_exit(Rolling).as_slice(), &[StateCommand::Stop(SoundCue::Roll)]);
        assert!(on_exit(Running).is_empty());
    }
}

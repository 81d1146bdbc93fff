//! Serializable capture of the player's per-frame state for debug dumps and
//! replay checkpoints, encoded with MessagePack. Capture only, no restore path.

use serde::{Deserialize, Serialize};

use firedog_core::timer::Cooldown;

use crate::Player;
use crate::abilities::AbilityTimers;
use crate::energy::Energy;
use crate::physics::{Body, Environment};
use crate::state::PlayerState;
use crate::status::StatusEffects;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub body: Body,
    pub facing: f32,
    pub state: PlayerState,
    pub previous_state: PlayerState,
    pub frame_x: u32,
    pub energy: Energy,
    pub status: StatusEffects,
    pub abilities: AbilityTimers,
    pub boss_collision: Cooldown,
    pub environment: Environment,
    pub buoyancy: f32,
    pub double_jump_available: bool,
    pub death_animation_complete: bool,
}

pub fn encode_snapshot(snapshot: &PlayerSnapshot) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec(snapshot)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<PlayerSnapshot, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}

impl Player {
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            body: self.body,
            facing: self.facing,
            state: self.state,
            previous_state: self.previous_state,
            frame_x: self.frame_x,
            energy: self.energy.clone(),
            status: self.status.clone(),
            abilities: self.abilities.clone(),
            boss_collision: self.boss_collision,
            environment: self.environment,
            buoyancy: self.buoyancy,
            double_jump_available: self.double_jump_available,
            death_animation_complete: self.death_animation_complete,
        }
    }
}

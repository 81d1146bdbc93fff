use serde::{Deserialize, Serialize};

/// Audio cues the player core can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Roll,
    DiveLanding,
    FireballShot,
    BubbleShot,
    FireballHit,
    Hit,
    Explosion,
    Electric,
    Poison,
    Freeze,
    Slow,
    InkSplat,
    CoinLoss,
    EnemyPoof,
    BossHit,
    PowerUp,
    PowerDown,
    Invisible,
    Death,
}

/// Playback flags forwarded to the audio collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOptions {
    pub looped: bool,
    pub allow_overlap: bool,
    /// Do not restart the cue if it is already playing.
    pub suppress_restart: bool,
}

impl PlayOptions {
    pub const ONE_SHOT: PlayOptions = PlayOptions {
        looped: false,
        allow_overlap: true,
        suppress_restart: false,
    };

    pub const LOOP: PlayOptions = PlayOptions {
        looped: true,
        allow_overlap: false,
        suppress_restart: true,
    };
}

/// A request to the audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCommand {
    Play { cue: SoundCue, options: PlayOptions },
    Stop(SoundCue),
}

/// Host-side audio mixer.
pub trait AudioSink {
    fn play_sound(&mut self, cue: SoundCue, options: PlayOptions);
    fn stop_sound(&mut self, cue: SoundCue);
}

/// Queue of audio commands emitted during a frame.
///
/// The core never blocks on audio; the host drains the queue into its
/// [`AudioSink`] once per frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioQueue {
    commands: Vec<AudioCommand>,
}

impl AudioQueue {
    pub fn play(&mut self, cue: SoundCue, options: PlayOptions) {
        self.commands.push(AudioCommand::Play { cue, options });
    }

    pub fn play_once(&mut self, cue: SoundCue) {
        self.play(cue, PlayOptions::ONE_SHOT);
    }

    pub fn stop(&mut self, cue: SoundCue) {
        self.commands.push(AudioCommand::Stop(cue));
    }

    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    /// Whether a `Play` for `cue` is queued.
    pub fn contains_play(&self, cue: SoundCue) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, AudioCommand::Play { cue: queued, .. } if *queued == cue))
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Forward every queued command to `sink` in order, leaving the queue empty.
    pub fn flush(&mut self, sink: &mut dyn AudioSink) {
        for command in self.commands.drain(..) {
            match command {
                AudioCommand::Play { cue, options } => sink.play_sound(cue, options),
                AudioCommand::Stop(cue) => sink.stop_sound(cue),
            }
        }
    }
}

use serde::{Deserialize, Serialize};

/// Visual-effect constructors understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Default blood/poof burst.
    Blood,
    Explosion,
    Electricity,
    PoisonSplash,
    FreezeBurst,
    IceBurst,
    InkSplash,
    BossHit,
    CoinLoss,
    Dust,
    IceCrystal,
    Splash,
    FireTrail,
}

/// Which shared output collection an effect is pushed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectLayer {
    Particles,
    Collisions,
}

impl EffectKind {
    pub fn layer(self) -> EffectLayer {
        match self {
            EffectKind::CoinLoss
            | EffectKind::Dust
            | EffectKind::IceCrystal
            | EffectKind::Splash
            | EffectKind::FireTrail => EffectLayer::Particles,
            _ => EffectLayer::Collisions,
        }
    }
}

/// A request to construct one visual effect at a world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualEffect {
    pub kind: EffectKind,
    pub x: f32,
    pub y: f32,
    /// Category-specific scale (particle size, burst radius).
    pub size: f32,
}

impl VisualEffect {
    pub fn new(kind: EffectKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            size: 1.0,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Short text that floats up from a position (coin gains, losses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingMessage {
    pub text: String,
    pub x: f32,
    pub y: f32,
}

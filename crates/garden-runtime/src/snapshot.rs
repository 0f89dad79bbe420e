use garden_core::{Biome, GrowableEntity};
use thiserror::Error;

/// Read-only copy of the state a presentation layer renders.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSnapshot {
    pub currency: f64,
    pub level: u32,
    pub capacity: u32,
    pub entities: Vec<GrowableEntity>,
    /// Aggregate currency per second, multipliers applied.
    pub yield_rate: f64,
    pub multiplier: f64,
    pub biome: Biome,
}

/// How [`crate::GameEngine::initialize`] obtained its starting state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStart {
    /// State restored from a save record.
    Restored,
    /// No save found; fresh state.
    Fresh,
    /// Every storage tier failed; fresh state in memory.
    LoadFailed,
}

/// Why a producer purchase is not allowed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PurchaseBlock {
    #[error("capacity full")]
    CapacityFull,
    #[error("type limit reached")]
    TypeLimit,
}

#![deny(warnings)]

//! Game engine for Idle Garden.
//!
//! [`GameEngine`] owns all mutable economic state of a session: currency,
//! player level, garden capacity, the garden itself and the purchased and
//! unlocked sets. It validates every command against the catalog, applies
//! the rules from `garden-econ`, saves through a [`persistence::SaveStore`]
//! and notifies registered listeners so a presentation layer can pull a fresh
//! [`GameSnapshot`].
//!
//! Player-facing rejections (insufficient funds, full garden, locked
//! upgrades) are silent no-ops. Only [`GameEngine::save_game`] reports the
//! outcome of a write.

mod engine;
mod snapshot;

pub use engine::GameEngine;
pub use garden_econ::ChainStatus;
pub use snapshot::{GameSnapshot, PurchaseBlock, SessionStart};

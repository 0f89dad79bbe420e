#![deny(warnings)]

//! Economic rules for Idle Garden.
//!
//! This crate provides the pure pricing and progression helpers the engine
//! applies:
//! - Compounding purchase price per owned unit of a producer type
//! - Linear level-up pricing and salvage value on sale
//! - Multiplicative stacking of global upgrades
//! - Player level derived from garden size
//! - Status of an entry in a prerequisite chain

use std::collections::BTreeSet;
use thiserror::Error;

/// Each additional unit of one producer type costs this much more than the last.
pub const PURCHASE_GROWTH: f64 = 1.2;
/// Level-up price per current level, as a fraction of the template's base cost.
pub const UPGRADE_COST_FACTOR: f64 = 0.5;
/// Fraction of invested value refunded on sale.
pub const SALVAGE_RATE: f64 = 0.45;
/// Producers needed per player level.
pub const ENTITIES_PER_LEVEL: usize = 3;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Base costs must be finite and strictly positive.
    #[error("invalid base cost: {0}")]
    InvalidPrice(f64),
    /// Result overflowed to a non-finite value.
    #[error("non-finite price")]
    NonFinite,
}

fn check_base_cost(base_cost: f64) -> Result<(), EconError> {
    if !base_cost.is_finite() || base_cost <= 0.0 {
        return Err(EconError::InvalidPrice(base_cost));
    }
    Ok(())
}

/// Price of the next unit of a producer when `owned` units of that type exist.
///
/// `floor(base_cost * 1.2^owned)`.
///
/// Example:
/// assert_eq!(purchase_cost(10.0, 0).unwrap(), 10.0);
/// assert_eq!(purchase_cost(10.0, 1).unwrap(), 12.0);
pub fn purchase_cost(base_cost: f64, owned: usize) -> Result<f64, EconError> {
    check_base_cost(base_cost)?;
    let exp = i32::try_from(owned).map_err(|_| EconError::NonFinite)?;
    let cost = (base_cost * PURCHASE_GROWTH.powi(exp)).floor();
    if !cost.is_finite() {
        return Err(EconError::NonFinite);
    }
    Ok(cost)
}

/// Price of raising a producer from `level` to `level + 1`.
///
/// `floor(base_cost * 0.5 * level)`.
pub fn upgrade_cost(base_cost: f64, level: u32) -> Result<f64, EconError> {
    check_base_cost(base_cost)?;
    let cost = (base_cost * UPGRADE_COST_FACTOR * f64::from(level)).floor();
    if !cost.is_finite() {
        return Err(EconError::NonFinite);
    }
    Ok(cost)
}

/// Refund for selling a producer with the given invested value.
///
/// Example:
/// assert_eq!(sell_value(100.0), 45.0);
pub fn sell_value(invested_value: f64) -> f64 {
    (invested_value * SALVAGE_RATE).floor().max(0.0)
}

/// Product of all multipliers; 1.0 when empty.
pub fn stacked_multiplier<I>(multipliers: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    multipliers.into_iter().product()
}

/// `1 + floor(entity_count / 3)`.
pub fn level_for_entity_count(entity_count: usize) -> u32 {
    let level = 1 + entity_count / ENTITIES_PER_LEVEL;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// Raise `current` to the level implied by `entity_count`, never lowering it.
pub fn ratchet_level(current: u32, entity_count: usize) -> u32 {
    current.max(level_for_entity_count(entity_count))
}

/// Purchase state of one entry in a prerequisite chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainStatus {
    /// Already purchased.
    Owned,
    /// First in chain, or its predecessor is owned.
    Available,
    /// Predecessor not yet owned.
    Locked,
}

/// Status of `id` within `chain`, or `None` if `id` is not part of it.
pub fn chain_status<'a, T, I>(chain: I, owned: &BTreeSet<T>, id: &T) -> Option<ChainStatus>
where
    T: Ord + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut prev = None;
    for entry in chain {
        if entry == id {
            if owned.contains(id) {
                return Some(ChainStatus::Owned);
            }
            return match prev {
                Some(p) if !owned.contains(p) => Some(ChainStatus::Locked),
                _ => Some(ChainStatus::Available),
            };
        }
        prev = Some(entry);
    }
    None
}

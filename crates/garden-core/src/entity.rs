//! Growable producers.

use serde::{Deserialize, Serialize};

use crate::{InstanceId, ProducerId};

/// Growth factor applied per level by [`GrowthCurve::Exponential`].
pub const EXPONENTIAL_BASE: f64 = 1.5;

/// Yield curve of a producer. Fixed at creation from the template kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthCurve {
    /// `base * level`. Crops use this curve.
    Linear,
    /// `base * 1.5^level`. Trees use this curve.
    Exponential,
}

impl GrowthCurve {
    /// Per-second yield for a producer of this curve before global multipliers.
    pub fn base_rate(self, base_yield: f64, level: u32) -> f64 {
        match self {
            GrowthCurve::Linear => base_yield * f64::from(level),
            GrowthCurve::Exponential => base_yield * EXPONENTIAL_BASE.powf(f64::from(level)),
        }
    }
}

/// A single owned producer instance.
///
/// `level` and `invested_value` only ever grow; both move together through
/// [`GrowableEntity::level_up`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowableEntity {
    id: InstanceId,
    template_id: ProducerId,
    display_name: String,
    curve: GrowthCurve,
    level: u32,
    base_yield: f64,
    invested_value: f64,
}

impl GrowableEntity {
    /// Create a producer. A `level` of 0 is raised to 1.
    pub fn new(
        id: InstanceId,
        template_id: ProducerId,
        display_name: impl Into<String>,
        curve: GrowthCurve,
        level: u32,
        base_yield: f64,
        invested_value: f64,
    ) -> Self {
        Self {
            id,
            template_id,
            display_name: display_name.into(),
            curve,
            level: level.max(1),
            base_yield,
            invested_value,
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn template_id(&self) -> &ProducerId {
        &self.template_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn curve(&self) -> GrowthCurve {
        self.curve
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn base_yield(&self) -> f64 {
        self.base_yield
    }

    /// Total currency spent acquiring and upgrading this instance.
    pub fn invested_value(&self) -> f64 {
        self.invested_value
    }

    /// Currency per second under the given global multiplier.
    pub fn yield_rate(&self, global_multiplier: f64) -> f64 {
        self.curve.base_rate(self.base_yield, self.level) * global_multiplier
    }

    /// Raise the level by one and book `cost` as invested. Affordability is
    /// the caller's concern.
    pub fn level_up(&mut self, cost: f64) {
        self.level = self.level.saturating_add(1);
        self.invested_value += cost;
    }
}

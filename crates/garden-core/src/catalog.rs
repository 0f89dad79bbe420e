//! Static content catalog: producer, upgrade and achievement templates.
//!
//! The catalog is immutable reference data keyed by id. Upgrade and capacity
//! upgrade lists are ordered: each entry requires its predecessor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{
    AchievementId, CapacityUpgradeId, GrowthCurve, ProducerId, UpgradeId, ValidationError,
};

/// Cosmetic tier derived from player level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Biome {
    Farm,
    Desert,
    Jungle,
}

impl Biome {
    /// Level 11+ is Jungle, 6+ is Desert, anything below is Farm.
    pub fn for_level(level: u32) -> Self {
        if level >= 11 {
            Biome::Jungle
        } else if level >= 6 {
            Biome::Desert
        } else {
            Biome::Farm
        }
    }
}

/// A purchasable producer kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProducerTemplate {
    pub id: ProducerId,
    pub name: String,
    pub kind: GrowthCurve,
    /// Currency per second at level 1 before multipliers (linear) or the
    /// factor in front of `1.5^level` (exponential).
    pub base_yield: f64,
    /// Price of the first unit.
    pub base_cost: f64,
    /// Player level at which the shop offers this producer.
    pub unlock_level: u32,
    #[serde(default)]
    pub description: String,
}

/// A global yield multiplier, part of a prerequisite chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTemplate {
    pub id: UpgradeId,
    pub name: String,
    pub cost: f64,
    pub multiplier: f64,
    #[serde(default)]
    pub description: String,
}

/// A garden capacity expansion, part of its own prerequisite chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityUpgradeTemplate {
    pub id: CapacityUpgradeId,
    pub name: String,
    pub cost: f64,
    pub capacity_increase: u32,
    #[serde(default)]
    pub description: String,
}

/// Values an achievement condition is evaluated against. Taken once per
/// evaluation pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub currency: f64,
    pub level: u32,
    pub entity_count: usize,
    pub yield_rate: f64,
}

/// Unlock predicate of an achievement.
///
/// Stored as `{ kind: currency_at_least, threshold: 1000 }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "snake_case")]
pub enum AchievementCondition {
    CurrencyAtLeast(f64),
    LevelAtLeast(u32),
    EntityCountAtLeast(usize),
    YieldRateAtLeast(f64),
}

impl AchievementCondition {
    pub fn is_met(&self, p: &Progress) -> bool {
        match *self {
            AchievementCondition::CurrencyAtLeast(min) => p.currency >= min,
            AchievementCondition::LevelAtLeast(min) => p.level >= min,
            AchievementCondition::EntityCountAtLeast(min) => p.entity_count >= min,
            AchievementCondition::YieldRateAtLeast(min) => p.yield_rate >= min,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AchievementTemplate {
    pub id: AchievementId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub condition: AchievementCondition,
}

/// All static content of a game. Achievements are evaluated in list order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub producers: Vec<ProducerTemplate>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeTemplate>,
    #[serde(default)]
    pub capacity_upgrades: Vec<CapacityUpgradeTemplate>,
    #[serde(default)]
    pub achievements: Vec<AchievementTemplate>,
}

impl Catalog {
    pub fn producer(&self, id: &ProducerId) -> Option<&ProducerTemplate> {
        self.producers.iter().find(|p| &p.id == id)
    }

    pub fn upgrade(&self, id: &UpgradeId) -> Option<&UpgradeTemplate> {
        self.upgrades.iter().find(|u| &u.id == id)
    }

    pub fn capacity_upgrade(&self, id: &CapacityUpgradeId) -> Option<&CapacityUpgradeTemplate> {
        self.capacity_upgrades.iter().find(|u| &u.id == id)
    }

    /// Upgrade ids in prerequisite order.
    pub fn upgrade_chain(&self) -> impl Iterator<Item = &UpgradeId> + '_ {
        self.upgrades.iter().map(|u| &u.id)
    }

    /// Capacity upgrade ids in prerequisite order.
    pub fn capacity_chain(&self) -> impl Iterator<Item = &CapacityUpgradeId> + '_ {
        self.capacity_upgrades.iter().map(|u| &u.id)
    }

    /// The content shipped with the game.
    pub fn builtin() -> Self {
        use GrowthCurve::{Exponential as Tree, Linear as Crop};

        let producers = [
            // Farm
            ("p1", "Pixel Wheat", Crop, 1.0, 10.0, 1, "Basic sustenance."),
            ("p2", "Bit Carrot", Crop, 3.0, 50.0, 2, "Orange and crunchy."),
            ("p3", "Data Corn", Crop, 8.0, 150.0, 3, "It listens."),
            ("p4", "Logic Potato", Crop, 15.0, 400.0, 4, "Powered by chips."),
            ("p5", "Apple Tree", Tree, 5.0, 1_000.0, 5, "Gravity defying."),
            // Desert
            ("p6", "Sand Cactus", Crop, 40.0, 2_500.0, 6, "Spiky business."),
            ("p7", "Aloe Vera", Crop, 75.0, 6_000.0, 7, "Healing pixels."),
            ("p8", "Dry Bush", Crop, 120.0, 15_000.0, 8, "Tumbleweed starter."),
            ("p9", "Date Palm", Tree, 30.0, 35_000.0, 9, "Sweet oasis fruit."),
            ("p10", "Joshua Tree", Tree, 50.0, 80_000.0, 10, "Desert guardian."),
            // Jungle
            ("p11", "Wild Fern", Crop, 300.0, 200_000.0, 11, "Ancient flora."),
            ("p12", "Creep Vine", Crop, 500.0, 500_000.0, 12, "It grows fast."),
            ("p13", "Cocoa Plant", Crop, 800.0, 1_200_000.0, 13, "Sweet beans."),
            ("p14", "Banana Tree", Tree, 200.0, 3_000_000.0, 14, "Potassium rich."),
            ("p15", "Rubber Tree", Tree, 450.0, 8_000_000.0, 15, "Elastic profits."),
        ]
        .into_iter()
        .map(
            |(id, name, kind, base_yield, base_cost, unlock_level, desc)| ProducerTemplate {
                id: ProducerId::from(id),
                name: name.to_string(),
                kind,
                base_yield,
                base_cost,
                unlock_level,
                description: desc.to_string(),
            },
        )
        .collect();

        let upgrades = [
            ("u1", "Rusty Hoe", 100.0, 1.1, "Better than hands."),
            ("u2", "Water Can", 500.0, 1.2, "Hydration is key."),
            ("u3", "Fertilizer", 2_000.0, 1.25, "Smells bad, works good."),
            ("u4", "Scarecrow", 5_000.0, 1.3, "Frightens bugs."),
            ("u5", "Sprinkler", 12_000.0, 1.4, "Auto-watering."),
            ("u6", "Greenhouse", 30_000.0, 1.5, "Controlled climate."),
            ("u7", "Grafting Tool", 75_000.0, 1.6, "Mix plants."),
            ("u8", "Drone", 200_000.0, 1.7, "Aerial survey."),
            ("u9", "Hydroponics", 500_000.0, 1.8, "No soil needed."),
            ("u10", "Solar Lamp", 1_500_000.0, 2.0, "24/7 Sunlight."),
            ("u11", "AI Manager", 5_000_000.0, 2.2, "Automated farming."),
            ("u12", "Genetics Lab", 15_000_000.0, 2.5, "Modify DNA."),
            ("u13", "Weather Ctrl", 50_000_000.0, 3.0, "Rain on demand."),
            ("u14", "Time Warp", 150_000_000.0, 4.0, "Faster growth."),
            ("u15", "Gaia Link", 500_000_000.0, 5.0, "One with nature."),
        ]
        .into_iter()
        .map(|(id, name, cost, multiplier, desc)| UpgradeTemplate {
            id: UpgradeId::from(id),
            name: name.to_string(),
            cost,
            multiplier,
            description: desc.to_string(),
        })
        .collect();

        let capacity_upgrades = [
            ("g1", "Plot Expansion I", 1_000.0, 2, "Clear some weeds."),
            ("g2", "Plot Expansion II", 5_000.0, 3, "Buy neighbor's land."),
            ("g3", "Plot Expansion III", 20_000.0, 5, "Deforest the area."),
            ("g4", "Plot Expansion IV", 100_000.0, 5, "Terraforming."),
            ("g5", "Plot Expansion V", 500_000.0, 10, "Pocket Dimension."),
        ]
        .into_iter()
        .map(
            |(id, name, cost, capacity_increase, desc)| CapacityUpgradeTemplate {
                id: CapacityUpgradeId::from(id),
                name: name.to_string(),
                cost,
                capacity_increase,
                description: desc.to_string(),
            },
        )
        .collect();

        use AchievementCondition as C;
        let achievements = [
            ("a1", "First Sprout", "Own 1 plant.", C::EntityCountAtLeast(1)),
            ("a2", "Pocket Money", "Reach 1,000 gold.", C::CurrencyAtLeast(1_000.0)),
            ("a3", "Full House", "Have 6 plants.", C::EntityCountAtLeast(6)),
            ("a4", "Desert Storm", "Reach level 6.", C::LevelAtLeast(6)),
            ("a5", "Tycoon", "Reach 10,000 GPS.", C::YieldRateAtLeast(10_000.0)),
            ("a6", "Millionaire", "Reach 1,000,000 gold.", C::CurrencyAtLeast(1_000_000.0)),
        ]
        .into_iter()
        .map(|(id, name, desc, condition)| AchievementTemplate {
            id: AchievementId::from(id),
            name: name.to_string(),
            description: desc.to_string(),
            condition,
        })
        .collect();

        Catalog {
            producers,
            upgrades,
            capacity_upgrades,
            achievements,
        }
    }
}

fn check_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

fn check_positive(
    value: f64,
    id: &str,
    err: fn(String) -> ValidationError,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite(id.to_string()));
    }
    if value <= 0.0 {
        return Err(err(id.to_string()));
    }
    Ok(())
}

/// Validate a catalog, including id uniqueness within each table.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    check_unique(catalog.producers.iter().map(|p| p.id.as_str()))?;
    check_unique(catalog.upgrades.iter().map(|u| u.id.as_str()))?;
    check_unique(catalog.capacity_upgrades.iter().map(|u| u.id.as_str()))?;
    check_unique(catalog.achievements.iter().map(|a| a.id.as_str()))?;

    for p in &catalog.producers {
        check_positive(p.base_cost, p.id.as_str(), ValidationError::NonPositiveCost)?;
        check_positive(p.base_yield, p.id.as_str(), ValidationError::NonPositiveYield)?;
        if p.unlock_level == 0 {
            return Err(ValidationError::ZeroUnlockLevel(p.id.0.clone()));
        }
    }
    for u in &catalog.upgrades {
        check_positive(u.cost, u.id.as_str(), ValidationError::NonPositiveCost)?;
        check_positive(
            u.multiplier,
            u.id.as_str(),
            ValidationError::NonPositiveMultiplier,
        )?;
    }
    for u in &catalog.capacity_upgrades {
        check_positive(u.cost, u.id.as_str(), ValidationError::NonPositiveCost)?;
        if u.capacity_increase == 0 {
            return Err(ValidationError::ZeroCapacityIncrease(u.id.0.clone()));
        }
    }
    for a in &catalog.achievements {
        match a.condition {
            AchievementCondition::CurrencyAtLeast(v) | AchievementCondition::YieldRateAtLeast(v)
                if !v.is_finite() =>
            {
                return Err(ValidationError::NonFinite(a.id.0.clone()));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        let c = Catalog::builtin();
        validate_catalog(&c).unwrap();
        assert_eq!(c.producers.len(), 15);
        assert_eq!(c.upgrades.len(), 15);
        assert_eq!(c.capacity_upgrades.len(), 5);
        assert_eq!(c.achievements.len(), 6);
        assert_eq!(c.upgrade_chain().next().map(|id| id.as_str()), Some("u1"));
        assert_eq!(c.capacity_chain().count(), 5);
    }

    #[test]
    fn biome_thresholds() {
        assert_eq!(Biome::for_level(1), Biome::Farm);
        assert_eq!(Biome::for_level(5), Biome::Farm);
        assert_eq!(Biome::for_level(6), Biome::Desert);
        assert_eq!(Biome::for_level(10), Biome::Desert);
        assert_eq!(Biome::for_level(11), Biome::Jungle);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut c = Catalog::builtin();
        let dup = c.upgrades[0].clone();
        c.upgrades.push(dup);
        assert_eq!(
            validate_catalog(&c),
            Err(ValidationError::DuplicateId("u1".into()))
        );
    }

    #[test]
    fn zero_multiplier_rejected() {
        let mut c = Catalog::builtin();
        c.upgrades[3].multiplier = 0.0;
        assert!(matches!(
            validate_catalog(&c),
            Err(ValidationError::NonPositiveMultiplier(_))
        ));
    }

    #[test]
    fn conditions_evaluate_against_progress() {
        let p = Progress {
            currency: 1_500.0,
            level: 3,
            entity_count: 6,
            yield_rate: 12.0,
        };
        assert!(AchievementCondition::CurrencyAtLeast(1_000.0).is_met(&p));
        assert!(!AchievementCondition::LevelAtLeast(6).is_met(&p));
        assert!(AchievementCondition::EntityCountAtLeast(6).is_met(&p));
        assert!(!AchievementCondition::YieldRateAtLeast(10_000.0).is_met(&p));
    }

    #[test]
    fn condition_layout() {
        let c: AchievementCondition =
            serde_json::from_str(r#"{"kind": "level_at_least", "threshold": 6}"#).unwrap();
        assert_eq!(c, AchievementCondition::LevelAtLeast(6));
    }

    #[test]
    fn catalog_serde_roundtrip() {
        let c = Catalog::builtin();
        let s = serde_json::to_string(&c).unwrap();
        let back: Catalog = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
    }
}

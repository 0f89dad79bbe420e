//! The persisted snapshot of a session.
//!
//! Fields added after the first save format are optional on read so older
//! saves keep loading; the engine fills the documented defaults.

use serde::{Deserialize, Serialize};

use crate::{AchievementId, CapacityUpgradeId, InstanceId, ProducerId, UpgradeId};

/// One owned producer as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub instance_id: InstanceId,
    pub level: u32,
    pub template_id: ProducerId,
    /// Absent in early saves; estimated as `base_cost * level` on restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invested_value: Option<f64>,
}

/// Full game state as written through a save store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub currency: f64,
    pub level: u32,
    /// Absent in early saves; defaults to the configured starting capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub purchased_upgrade_ids: Vec<UpgradeId>,
    #[serde(default)]
    pub purchased_capacity_upgrade_ids: Vec<CapacityUpgradeId>,
    #[serde(default)]
    pub unlocked_achievement_ids: Vec<AchievementId>,
}

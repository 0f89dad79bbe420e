use std::collections::BTreeSet;
use std::sync::Arc;

use garden_core::{
    validate_catalog, validate_config, AchievementId, AchievementTemplate, Biome,
    CapacityUpgradeId, Catalog, EntityRecord, GameConfig, Garden, GrowableEntity, InstanceId,
    ProducerId, Progress, SaveRecord, UpgradeId, ValidationError,
};
use garden_econ::{
    chain_status, purchase_cost, ratchet_level, sell_value, stacked_multiplier, upgrade_cost,
    ChainStatus,
};
use persistence::{PersistenceError, SaveStore};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

use crate::{GameSnapshot, PurchaseBlock, SessionStart};

type Listener = Box<dyn FnMut()>;
type AchievementListener = Box<dyn FnMut(&AchievementTemplate)>;

/// Owns and mutates all state of one game session.
pub struct GameEngine<S> {
    store: S,
    catalog: Arc<Catalog>,
    config: GameConfig,
    garden: Garden,
    currency: f64,
    level: u32,
    capacity: u32,
    purchased_upgrades: BTreeSet<UpgradeId>,
    purchased_capacity_upgrades: BTreeSet<CapacityUpgradeId>,
    unlocked_achievements: BTreeSet<AchievementId>,
    rng: ChaCha8Rng,
    on_change: Option<Listener>,
    on_achievement: Option<AchievementListener>,
    on_reload: Option<Listener>,
}

impl<S: SaveStore> GameEngine<S> {
    /// Build an engine over `store` after validating catalog and config.
    ///
    /// The engine starts in fresh state; call [`GameEngine::initialize`] to
    /// restore a save.
    pub fn new(store: S, catalog: Catalog, config: GameConfig) -> Result<Self, ValidationError> {
        validate_catalog(&catalog)?;
        validate_config(&config)?;
        Ok(Self {
            store,
            catalog: Arc::new(catalog),
            currency: config.starting_currency,
            level: 1,
            capacity: config.default_capacity,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            config,
            garden: Garden::new(),
            purchased_upgrades: BTreeSet::new(),
            purchased_capacity_upgrades: BTreeSet::new(),
            unlocked_achievements: BTreeSet::new(),
            on_change: None,
            on_achievement: None,
            on_reload: None,
        })
    }

    /// Register the state-changed callback.
    pub fn set_listener(&mut self, listener: impl FnMut() + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    /// Register the achievement-unlocked callback.
    pub fn set_achievement_listener(
        &mut self,
        listener: impl FnMut(&AchievementTemplate) + 'static,
    ) {
        self.on_achievement = Some(Box::new(listener));
    }

    /// Register the hook [`GameEngine::reset_game`] runs after clearing saves.
    pub fn set_reload_hook(&mut self, hook: impl FnMut() + 'static) {
        self.on_reload = Some(Box::new(hook));
    }

    fn notify(&mut self) {
        if let Some(cb) = self.on_change.as_mut() {
            cb();
        }
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Load the saved session, or start fresh when there is none.
    ///
    /// A load failure on every storage tier is logged and the session starts
    /// fresh in memory. Listeners are always notified.
    pub fn initialize(&mut self) -> SessionStart {
        let start = match self.store.load() {
            Ok(Some(record)) => {
                self.restore(record);
                SessionStart::Restored
            }
            Ok(None) => {
                self.reset_state();
                SessionStart::Fresh
            }
            Err(e) => {
                error!(error = %e, "could not load save, starting fresh");
                self.reset_state();
                SessionStart::LoadFailed
            }
        };
        info!(
            ?start,
            currency = self.currency,
            level = self.level,
            entities = self.garden.len(),
            "session initialized"
        );
        self.notify();
        start
    }

    fn reset_state(&mut self) {
        self.currency = self.config.starting_currency;
        self.level = 1;
        self.capacity = self.config.default_capacity;
        self.garden.clear();
        self.purchased_upgrades.clear();
        self.purchased_capacity_upgrades.clear();
        self.unlocked_achievements.clear();
    }

    fn restore(&mut self, record: SaveRecord) {
        self.currency = record.currency;
        self.level = record.level.max(1);
        self.capacity = record.capacity.unwrap_or(self.config.default_capacity);
        self.purchased_upgrades = record.purchased_upgrade_ids.into_iter().collect();
        self.purchased_capacity_upgrades =
            record.purchased_capacity_upgrade_ids.into_iter().collect();
        self.unlocked_achievements = record.unlocked_achievement_ids.into_iter().collect();

        self.garden.clear();
        let catalog = Arc::clone(&self.catalog);
        for rec in record.entities {
            let Some(template) = catalog.producer(&rec.template_id) else {
                warn!(template = %rec.template_id, "skipping saved producer with unknown template");
                continue;
            };
            if self.garden.contains(&rec.instance_id) {
                warn!(instance = %rec.instance_id, "skipping duplicate saved producer");
                continue;
            }
            let level = rec.level.max(1);
            let invested = rec
                .invested_value
                .unwrap_or(template.base_cost * f64::from(level));
            self.garden.add(GrowableEntity::new(
                rec.instance_id,
                template.id.clone(),
                template.name.clone(),
                template.kind,
                level,
                template.base_yield,
                invested,
            ));
        }
    }

    /// Serialize the full session state.
    pub fn to_record(&self) -> SaveRecord {
        SaveRecord {
            currency: self.currency,
            level: self.level,
            capacity: Some(self.capacity),
            entities: self
                .garden
                .iter()
                .map(|e| EntityRecord {
                    instance_id: e.id().clone(),
                    level: e.level(),
                    template_id: e.template_id().clone(),
                    invested_value: Some(e.invested_value()),
                })
                .collect(),
            purchased_upgrade_ids: self.purchased_upgrades.iter().cloned().collect(),
            purchased_capacity_upgrade_ids: self
                .purchased_capacity_upgrades
                .iter()
                .cloned()
                .collect(),
            unlocked_achievement_ids: self.unlocked_achievements.iter().cloned().collect(),
        }
    }

    /// Write the session through the store. `false` when every tier failed.
    pub fn save_game(&self) -> bool {
        match self.store.save(&self.to_record()) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "save failed on all storage tiers");
                false
            }
        }
    }

    /// Best-effort save after a mutation; failures are logged and dropped.
    fn persist(&self) {
        if let Err(e) = self.store.save(&self.to_record()) {
            warn!(error = %e, "autosave failed");
        }
    }

    /// Clear every storage tier, then run the reload hook.
    pub fn reset_game(&mut self) -> Result<(), PersistenceError> {
        self.store.clear()?;
        info!("save cleared");
        if let Some(hook) = self.on_reload.as_mut() {
            hook();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Accrue `yield_rate * dt_seconds`, evaluate achievements, notify.
    pub fn tick(&mut self, dt_seconds: f64) {
        if !dt_seconds.is_finite() || dt_seconds < 0.0 {
            debug!(dt_seconds, "ignoring invalid tick duration");
            return;
        }
        self.currency += self.yield_rate() * dt_seconds;
        self.check_achievements();
        self.notify();
    }

    /// Unlock every achievement whose condition holds for the current state.
    ///
    /// Conditions are evaluated against one [`Progress`] taken at the start
    /// of the pass, in catalog order.
    pub fn check_achievements(&mut self) {
        let progress = self.progress();
        let catalog = Arc::clone(&self.catalog);
        for ach in &catalog.achievements {
            if self.unlocked_achievements.contains(&ach.id) || !ach.condition.is_met(&progress) {
                continue;
            }
            self.unlocked_achievements.insert(ach.id.clone());
            info!(achievement = %ach.id, name = %ach.name, "achievement unlocked");
            if let Some(cb) = self.on_achievement.as_mut() {
                cb(ach);
            }
            self.persist();
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            currency: self.currency,
            level: self.level,
            entity_count: self.garden.len(),
            yield_rate: self.yield_rate(),
        }
    }

    // ------------------------------------------------------------------
    // Producers
    // ------------------------------------------------------------------

    /// Whether one more producer of `template_id` fits the garden.
    pub fn can_purchase_entity(&self, template_id: &str) -> Result<(), PurchaseBlock> {
        if self.garden.len() >= self.capacity_as_len() {
            return Err(PurchaseBlock::CapacityFull);
        }
        if self.garden.count_of(&ProducerId::from(template_id)) >= self.config.per_type_limit {
            return Err(PurchaseBlock::TypeLimit);
        }
        Ok(())
    }

    fn capacity_as_len(&self) -> usize {
        usize::try_from(self.capacity).unwrap_or(usize::MAX)
    }

    /// Price of the next unit of `template_id`, given how many are owned.
    pub fn entity_purchase_cost(&self, template_id: &str) -> Option<f64> {
        let id = ProducerId::from(template_id);
        let template = self.catalog.producer(&id)?;
        purchase_cost(template.base_cost, self.garden.count_of(&id)).ok()
    }

    /// Buy one producer. No-op when blocked, unknown or unaffordable.
    pub fn purchase_entity(&mut self, template_id: &str) {
        if let Err(reason) = self.can_purchase_entity(template_id) {
            debug!(template = template_id, %reason, "purchase rejected");
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let id = ProducerId::from(template_id);
        let Some(template) = catalog.producer(&id) else {
            debug!(template = template_id, "unknown producer");
            return;
        };
        let cost = match purchase_cost(template.base_cost, self.garden.count_of(&id)) {
            Ok(c) => c,
            Err(e) => {
                warn!(template = template_id, error = %e, "cannot price producer");
                return;
            }
        };
        if self.currency < cost {
            debug!(template = template_id, cost, currency = self.currency, "insufficient funds");
            return;
        }

        self.currency -= cost;
        let instance = self.next_instance_id();
        info!(template = template_id, instance = %instance, cost, "producer purchased");
        self.garden.add(GrowableEntity::new(
            instance,
            id,
            template.name.clone(),
            template.kind,
            1,
            template.base_yield,
            cost,
        ));
        self.level = ratchet_level(self.level, self.garden.len());

        self.persist();
        self.notify();
    }

    fn next_instance_id(&mut self) -> InstanceId {
        loop {
            let id = InstanceId(format!("{:016x}", self.rng.gen::<u64>()));
            if !self.garden.contains(&id) {
                return id;
            }
        }
    }

    /// Price of raising `instance_id` by one level.
    pub fn entity_upgrade_cost(&self, instance_id: &str) -> Option<f64> {
        let entity = self.garden.find_by_id(&InstanceId::from(instance_id))?;
        let template = self.catalog.producer(entity.template_id())?;
        upgrade_cost(template.base_cost, entity.level()).ok()
    }

    /// Level a producer up by one. No-op when absent or unaffordable.
    pub fn level_up_entity(&mut self, instance_id: &str) {
        let Some(cost) = self.entity_upgrade_cost(instance_id) else {
            debug!(instance = instance_id, "level up rejected: unknown producer");
            return;
        };
        if self.currency < cost {
            debug!(instance = instance_id, cost, "insufficient funds");
            return;
        }
        let Some(entity) = self.garden.find_by_id_mut(&InstanceId::from(instance_id)) else {
            return;
        };
        entity.level_up(cost);
        let level = entity.level();
        self.currency -= cost;
        info!(instance = instance_id, level, cost, "producer levelled up");

        self.persist();
        self.notify();
    }

    /// Refund for selling `instance_id`.
    pub fn sell_value(&self, instance_id: &str) -> Option<f64> {
        self.garden
            .find_by_id(&InstanceId::from(instance_id))
            .map(|e| sell_value(e.invested_value()))
    }

    /// Sell a producer for its salvage value. Player level is kept.
    pub fn sell_entity(&mut self, instance_id: &str) {
        let Some(entity) = self.garden.remove_by_id(&InstanceId::from(instance_id)) else {
            debug!(instance = instance_id, "sell rejected: unknown producer");
            return;
        };
        let refund = sell_value(entity.invested_value());
        self.currency += refund;
        info!(instance = instance_id, refund, "producer sold");

        self.persist();
        self.notify();
    }

    // ------------------------------------------------------------------
    // Upgrades
    // ------------------------------------------------------------------

    /// Product of all purchased upgrade multipliers.
    pub fn global_multiplier(&self) -> f64 {
        stacked_multiplier(
            self.purchased_upgrades
                .iter()
                .filter_map(|id| self.catalog.upgrade(id))
                .map(|u| u.multiplier),
        )
    }

    pub fn upgrade_status(&self, upgrade_id: &str) -> Option<ChainStatus> {
        chain_status(
            self.catalog.upgrade_chain(),
            &self.purchased_upgrades,
            &UpgradeId::from(upgrade_id),
        )
    }

    pub fn capacity_upgrade_status(&self, upgrade_id: &str) -> Option<ChainStatus> {
        chain_status(
            self.catalog.capacity_chain(),
            &self.purchased_capacity_upgrades,
            &CapacityUpgradeId::from(upgrade_id),
        )
    }

    /// Buy the next global multiplier in the chain.
    pub fn purchase_global_upgrade(&mut self, upgrade_id: &str) {
        let status = self.upgrade_status(upgrade_id);
        if status != Some(ChainStatus::Available) {
            debug!(upgrade = upgrade_id, ?status, "upgrade not purchasable");
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let id = UpgradeId::from(upgrade_id);
        let Some(template) = catalog.upgrade(&id) else {
            return;
        };
        if self.currency < template.cost {
            debug!(upgrade = upgrade_id, cost = template.cost, "insufficient funds");
            return;
        }
        self.currency -= template.cost;
        self.purchased_upgrades.insert(id);
        info!(upgrade = upgrade_id, multiplier = self.global_multiplier(), "upgrade purchased");

        self.persist();
        self.notify();
    }

    /// Buy the next capacity expansion in the chain.
    pub fn purchase_capacity_upgrade(&mut self, upgrade_id: &str) {
        let status = self.capacity_upgrade_status(upgrade_id);
        if status != Some(ChainStatus::Available) {
            debug!(upgrade = upgrade_id, ?status, "capacity upgrade not purchasable");
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let id = CapacityUpgradeId::from(upgrade_id);
        let Some(template) = catalog.capacity_upgrade(&id) else {
            return;
        };
        if self.currency < template.cost {
            debug!(upgrade = upgrade_id, cost = template.cost, "insufficient funds");
            return;
        }
        self.currency -= template.cost;
        self.purchased_capacity_upgrades.insert(id);
        self.capacity = self.capacity.saturating_add(template.capacity_increase);
        info!(upgrade = upgrade_id, capacity = self.capacity, "capacity upgrade purchased");

        self.persist();
        self.notify();
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn currency(&self) -> f64 {
        self.currency
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Aggregate currency per second.
    pub fn yield_rate(&self) -> f64 {
        self.garden.total_yield(self.global_multiplier())
    }

    pub fn biome(&self) -> Biome {
        Biome::for_level(self.level)
    }

    /// Whether the player level reaches the producer's unlock level.
    pub fn is_producer_unlocked(&self, template_id: &str) -> bool {
        self.catalog
            .producer(&ProducerId::from(template_id))
            .is_some_and(|p| self.level >= p.unlock_level)
    }

    /// Copy of the owned producers in insertion order.
    pub fn entities(&self) -> Vec<GrowableEntity> {
        self.garden.snapshot()
    }

    pub fn purchased_upgrades(&self) -> &BTreeSet<UpgradeId> {
        &self.purchased_upgrades
    }

    pub fn purchased_capacity_upgrades(&self) -> &BTreeSet<CapacityUpgradeId> {
        &self.purchased_capacity_upgrades
    }

    pub fn unlocked_achievements(&self) -> &BTreeSet<AchievementId> {
        &self.unlocked_achievements
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            currency: self.currency,
            level: self.level,
            capacity: self.capacity,
            entities: self.garden.snapshot(),
            yield_rate: self.yield_rate(),
            multiplier: self.global_multiplier(),
            biome: self.biome(),
        }
    }
}

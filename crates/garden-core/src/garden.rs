//! The garden: an insertion-ordered collection of producers.

use crate::{GrowableEntity, InstanceId, ProducerId};

/// Owns every producer of a session. Insertion order is kept stable so list
/// views keep their identity between refreshes.
#[derive(Clone, Debug, Default)]
pub struct Garden {
    entities: Vec<GrowableEntity>,
}

impl Garden {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a producer. Capacity and id uniqueness are enforced by the engine.
    pub fn add(&mut self, entity: GrowableEntity) {
        self.entities.push(entity);
    }

    /// Remove and return the first producer with `id`, if any.
    pub fn remove_by_id(&mut self, id: &InstanceId) -> Option<GrowableEntity> {
        let pos = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(pos))
    }

    pub fn find_by_id(&self, id: &InstanceId) -> Option<&GrowableEntity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &InstanceId) -> Option<&mut GrowableEntity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Number of owned producers built from `template`.
    pub fn count_of(&self, template: &ProducerId) -> usize {
        self.entities
            .iter()
            .filter(|e| e.template_id() == template)
            .count()
    }

    /// Sum of member yields under one shared multiplier.
    pub fn total_yield(&self, global_multiplier: f64) -> f64 {
        self.entities
            .iter()
            .map(|e| e.yield_rate(global_multiplier))
            .sum()
    }

    /// Defensive copy of the members in insertion order.
    pub fn snapshot(&self) -> Vec<GrowableEntity> {
        self.entities.clone()
    }

    /// Borrowing iterator for read-only passes inside the workspace.
    pub fn iter(&self) -> impl Iterator<Item = &GrowableEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GrowthCurve;
    use proptest::prelude::*;

    fn crop(id: &str, base: f64) -> GrowableEntity {
        GrowableEntity::new(
            InstanceId::from(id),
            ProducerId::from("wheat"),
            "Wheat",
            GrowthCurve::Linear,
            1,
            base,
            base,
        )
    }

    fn tree(id: &str, base: f64) -> GrowableEntity {
        GrowableEntity::new(
            InstanceId::from(id),
            ProducerId::from("apple"),
            "Apple",
            GrowthCurve::Exponential,
            1,
            base,
            base,
        )
    }

    #[test]
    fn total_yield_mixed_curves() {
        let mut g = Garden::new();
        g.add(crop("1", 10.0));
        g.add(tree("2", 20.0));
        assert_eq!(g.total_yield(1.0), 40.0);
    }

    #[test]
    fn multiplier_applies_once() {
        let mut g = Garden::new();
        g.add(crop("1", 10.0));
        assert_eq!(g.total_yield(2.0), 20.0);
    }

    #[test]
    fn remove_by_id_and_missing_is_noop() {
        let mut g = Garden::new();
        g.add(crop("1", 10.0));
        assert_eq!(g.len(), 1);
        assert!(g.remove_by_id(&InstanceId::from("nope")).is_none());
        assert_eq!(g.len(), 1);
        let removed = g.remove_by_id(&InstanceId::from("1")).unwrap();
        assert_eq!(removed.id().as_str(), "1");
        assert!(g.is_empty());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut g = Garden::new();
        g.add(crop("1", 10.0));
        let mut snap = g.snapshot();
        snap[0].level_up(100.0);
        snap.clear();
        assert_eq!(g.len(), 1);
        assert_eq!(g.find_by_id(&InstanceId::from("1")).unwrap().level(), 1);
    }

    #[test]
    fn keeps_insertion_order() {
        let mut g = Garden::new();
        for id in ["c", "a", "b"] {
            g.add(crop(id, 1.0));
        }
        g.remove_by_id(&InstanceId::from("a"));
        let ids: Vec<_> = g.iter().map(|e| e.id().as_str().to_string()).collect();
        assert_eq!(ids, ["c", "b"]);
    }

    #[test]
    fn counts_per_template() {
        let mut g = Garden::new();
        g.add(crop("1", 1.0));
        g.add(crop("2", 1.0));
        g.add(tree("3", 1.0));
        assert_eq!(g.count_of(&ProducerId::from("wheat")), 2);
        assert_eq!(g.count_of(&ProducerId::from("apple")), 1);
    }

    proptest! {
        #[test]
        fn total_is_exact_sum(bases in proptest::collection::vec(0.5f64..500.0, 0..12), mult in 0.5f64..20.0) {
            let mut g = Garden::new();
            for (i, b) in bases.iter().enumerate() {
                if i % 2 == 0 {
                    g.add(crop(&i.to_string(), *b));
                } else {
                    g.add(tree(&i.to_string(), *b));
                }
            }
            let expected: f64 = g.iter().map(|e| e.yield_rate(mult)).sum();
            prop_assert_eq!(g.total_yield(mult), expected);
        }
    }
}

use std::collections::HashMap;

use crate::error::CapacityError;
use crate::map::CapacityMap;
use crate::table::CapacityTable;
use crate::variety::Variety;

/// Which market an instance was bought in. Set at creation, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Market {
    OnDemand,
    Spot,
}

/// An instance as observed from the cloud on this tick. Discarded and
/// rebuilt on the next `list_working_instances` call — instances are
/// owned by the cloud, never mutated by the engine.
#[derive(Debug, Clone)]
pub struct Instance {
    /// Empty for an instance not yet assigned an id by the cloud (should
    /// not normally appear in an observed list, but kept nullable so
    /// construction doesn't need a placeholder id).
    pub id: String,
    pub variety: Variety,
    pub capacity: f64,
    pub market: Market,
    pub tags: HashMap<String, String>,
}

impl Instance {
    pub fn new(id: impl Into<String>, variety: Variety, capacity: f64, market: Market) -> Self {
        Self {
            id: id.into(),
            variety,
            capacity,
            market,
            tags: HashMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Construct from a cloud-reported instance type, looking the
    /// per-unit capacity up in `table`. Mirrors `Instances.Capacity()` in
    /// the original, which derives capacity per-instance before summing.
    pub fn from_observed(
        id: impl Into<String>,
        variety: Variety,
        market: Market,
        table: &CapacityTable,
    ) -> Result<Self, CapacityError> {
        let capacity = table.capacity_of(&variety.instance_type)?;
        Ok(Self::new(id, variety, capacity, market))
    }

    pub fn is_managed_by(&self, owner_tag_value: &str) -> bool {
        self.tags
            .get("ManagedBy")
            .is_some_and(|v| v == owner_tag_value)
    }
}

/// Reduce a set of instances into a [`CapacityMap`], grouped by variety.
/// Mirrors the original's `Instances.Capacity()`.
pub fn capacity_map_of<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> CapacityMap {
    let mut map = CapacityMap::empty();
    for instance in instances {
        map.add(instance.variety.clone(), instance.capacity);
    }
    map
}

/// Filter to only instances bought in `market`.
pub fn filter_market(instances: &[Instance], market: Market) -> Vec<Instance> {
    instances
        .iter()
        .filter(|i| i.market == market)
        .cloned()
        .collect()
}

/// Filter to instances carrying the autoscaler's `ManagedBy` owner tag.
/// Only these are eligible for termination; everything else is observed
/// for capacity accounting but never touched (§9 "Managed filter").
pub fn filter_managed<'a>(instances: &'a [Instance], owner_tag_value: &str) -> Vec<&'a Instance> {
    instances
        .iter()
        .filter(|i| i.is_managed_by(owner_tag_value))
        .collect()
}

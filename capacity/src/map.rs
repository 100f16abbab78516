use std::collections::HashMap;

use crate::error::CapacityError;
use crate::table::CapacityTable;
use crate::variety::{Variety, compare_by_capacity_then_identity};

/// `variety -> cumulative capacity` for that variety. Treated as an
/// immutable value: every mutating method returns a new map rather than
/// mutating in place, so no tick aliases another tick's map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapacityMap {
    by_variety: HashMap<Variety, f64>,
}

impl CapacityMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(by_variety: HashMap<Variety, f64>) -> Self {
        Self { by_variety }
    }

    pub fn get(&self, variety: &Variety) -> f64 {
        self.by_variety.get(variety).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variety, &f64)> {
        self.by_variety.iter()
    }

    pub fn len(&self) -> usize {
        self.by_variety.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_variety.is_empty()
    }

    /// Add `amount` of capacity to `variety`, accumulating into any
    /// existing entry. Used when reducing a set of observed instances.
    pub(crate) fn add(&mut self, variety: Variety, amount: f64) {
        *self.by_variety.entry(variety).or_insert(0.0) += amount;
    }

    /// Sum of all values, whatever the variety (§4.1 `Total`).
    pub fn total(&self) -> f64 {
        self.by_variety.values().sum()
    }

    /// The capacity surviving the simultaneous loss of the `k`
    /// largest-variety buckets (§4.1 `TotalInWorstCase`): sort ascending,
    /// drop the top `k`, sum what remains. `k >= len` collapses to 0.
    pub fn total_in_worst_case(&self, k: usize) -> f64 {
        if k >= self.by_variety.len() {
            return 0.0;
        }
        let mut values: Vec<f64> = self.by_variety.values().copied().collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values[..values.len() - k].iter().sum()
    }

    /// Add one unit (one instance's worth of capacity, per `table`) to
    /// the variety in `allowed` with the smallest current value in this
    /// map, breaking ties by `(unit capacity asc, subnet id, instance
    /// type)`. Returns the new map and the variety that was grown.
    ///
    /// Determinism of the desired-capacity search depends on this
    /// tie-break being a total order; a genuine tie (identical variety
    /// registered twice) is a configuration bug, not handled here.
    pub fn increment(
        &self,
        allowed: &[Variety],
        table: &CapacityTable,
    ) -> Result<(Self, Variety), CapacityError> {
        if allowed.is_empty() {
            return Err(CapacityError::NoAllowedVariety);
        }

        let mut candidates = Vec::with_capacity(allowed.len());
        for v in allowed {
            let unit = table.capacity_of(&v.instance_type)?;
            candidates.push((v, self.get(v), unit));
        }

        let chosen = candidates
            .into_iter()
            .min_by(|a, b| compare_by_capacity_then_identity(*a, *b))
            .map(|(v, _current, unit)| (v.clone(), unit))
            .expect("allowed is non-empty");

        let (variety, unit) = chosen;

        let mut next = self.clone();
        next.add(variety.clone(), unit);

        Ok((next, variety))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variety::Subnet;

    fn v(ty: &str, subnet: &str) -> Variety {
        Variety::new(
            ty,
            Subnet {
                subnet_id: subnet.into(),
                availability_zone: "az-a".into(),
            },
        )
    }

    fn table() -> CapacityTable {
        CapacityTable::new(HashMap::from([
            ("c4.large".to_string(), 10.0),
            ("m4.large".to_string(), 10.0),
            ("r3.large".to_string(), 10.0),
        ]))
        .unwrap()
    }

    fn mixed_capacity_table() -> CapacityTable {
        CapacityTable::new(HashMap::from([
            ("c4.large".to_string(), 20.0),
            ("m4.large".to_string(), 5.0),
        ]))
        .unwrap()
    }

    #[test]
    fn total_in_worst_case_drops_top_k() {
        let map = CapacityMap::from_map(HashMap::from([
            (v("c4.large", "s"), 10.0),
            (v("m4.large", "s"), 20.0),
            (v("r3.large", "s"), 30.0),
        ]));

        assert_eq!(map.total_in_worst_case(0), 60.0);
        assert_eq!(map.total_in_worst_case(1), 30.0);
        assert_eq!(map.total_in_worst_case(2), 10.0);
        assert_eq!(map.total_in_worst_case(3), 0.0);
        assert_eq!(map.total_in_worst_case(5), 0.0);
    }

    #[test]
    fn increment_grows_the_smallest_variety() {
        let map = CapacityMap::from_map(HashMap::from([
            (v("c4.large", "s"), 10.0),
            (v("m4.large", "s"), 0.0),
        ]));
        let allowed = vec![v("c4.large", "s"), v("m4.large", "s")];

        let (next, chosen) = map.increment(&allowed, &table()).unwrap();

        assert_eq!(chosen, v("m4.large", "s"));
        assert_eq!(next.get(&v("m4.large", "s")), 10.0);
        assert!(next.total() > map.total());
    }

    #[test]
    fn increment_breaks_ties_by_subnet_then_instance_type() {
        let map = CapacityMap::empty();
        let allowed = vec![v("m4.large", "s2"), v("c4.large", "s1")];

        let (_next, chosen) = map.increment(&allowed, &table()).unwrap();

        // both start at 0.0 capacity; subnet "s1" sorts before "s2"
        assert_eq!(chosen, v("c4.large", "s1"));
    }

    #[test]
    fn increment_ties_break_on_unit_capacity_before_subnet() {
        // Both start at 0.0 current value, so the tie-break decides.
        // "c4.large" sorts before "m4.large" by subnet id (s1 < s2), but
        // its unit capacity (20.0) is larger than m4.large's (5.0), so
        // the unit-capacity-ascending key must pick m4.large/s2 first.
        let map = CapacityMap::empty();
        let allowed = vec![v("c4.large", "s1"), v("m4.large", "s2")];

        let (_next, chosen) = map.increment(&allowed, &mixed_capacity_table()).unwrap();

        assert_eq!(chosen, v("m4.large", "s2"));
    }

    #[test]
    fn increment_fails_with_no_allowed_varieties() {
        let map = CapacityMap::empty();
        let err = map.increment(&[], &table()).unwrap_err();
        assert!(matches!(err, CapacityError::NoAllowedVariety));
    }

    #[test]
    fn increment_fails_for_unknown_variety() {
        let map = CapacityMap::empty();
        let allowed = vec![v("z9.huge", "s1")];
        let err = map.increment(&allowed, &table()).unwrap_err();
        assert!(matches!(err, CapacityError::UnknownVariety(_)));
    }
}

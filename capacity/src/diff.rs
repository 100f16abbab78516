use std::collections::HashMap;

use crate::error::CapacityError;
use crate::map::CapacityMap;
use crate::table::CapacityTable;
use crate::variety::Variety;

/// The per-variety integer reconciliation between two [`CapacityMap`]s.
/// Positive means launch that many, negative means terminate that many.
/// Zero-count varieties are omitted. Ephemeral — produced fresh each
/// tick, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    by_variety: HashMap<Variety, i64>,
}

impl Delta {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, variety: &Variety) -> i64 {
        self.by_variety.get(variety).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variety, i64)> {
        self.by_variety.iter().map(|(v, c)| (v, *c))
    }

    pub fn is_empty(&self) -> bool {
        self.by_variety.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_variety.len()
    }

    /// Drop every negative entry. Used when a schedule is active
    /// (schedules never terminate) or when `ProhibitToScaleIn` is set.
    pub fn strip_negatives(&self) -> Self {
        Self {
            by_variety: self
                .by_variety
                .iter()
                .filter(|(_, c)| **c > 0)
                .map(|(v, c)| (v.clone(), *c))
                .collect(),
        }
    }
}

/// Produce the [`Delta`] that reconciles `from` into `to` (§4.1 `Diff`).
///
/// For varieties growing (`to > from`), the launch count is
/// `ceil((to - from) / unit)`. For varieties shrinking, the free budget
/// `remain := Total(from) - Total(to)` is fixed once up front and each
/// shrinking variety independently takes `diff := min(remain, from - to)`,
/// terminating `floor(diff / unit)` — exactly §4.1's formula. `remain` is
/// not decremented as varieties are visited, so the result does not
/// depend on iteration order over `from`'s varieties (determinism, §8).
pub fn diff(from: &CapacityMap, to: &CapacityMap, table: &CapacityTable) -> Result<Delta, CapacityError> {
    let mut change: HashMap<Variety, i64> = HashMap::new();

    for (variety, to_cap) in to.iter() {
        let from_cap = from.get(variety);
        let delta = to_cap - from_cap;
        if delta > 0.0 {
            let unit = table.capacity_of(&variety.instance_type)?;
            let count = (delta / unit).ceil() as i64;
            if count != 0 {
                change.insert(variety.clone(), count);
            }
        }
    }

    let remaining = (from.total() - to.total()).max(0.0);
    for (variety, from_cap) in from.iter() {
        let to_cap = to.get(variety);
        let deficit = from_cap - to_cap;
        if deficit > 0.0 {
            let unit = table.capacity_of(&variety.instance_type)?;
            let usable = remaining.min(deficit);
            let count = (usable / unit).floor() as i64;
            if count > 0 {
                change.insert(variety.clone(), -count);
            }
        }
    }

    change.retain(|_, c| *c != 0);
    Ok(Delta { by_variety: change })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variety::Subnet;

    fn v(ty: &str) -> Variety {
        Variety::new(ty, Subnet { subnet_id: "subnet-a".into(), availability_zone: "az-a".into() })
    }

    fn table() -> CapacityTable {
        CapacityTable::new(HashMap::from([
            ("t1".to_string(), 10.0),
            ("t2".to_string(), 10.0),
            ("t3".to_string(), 10.0),
        ]))
        .unwrap()
    }

    #[test]
    fn diff_launches_and_terminates() {
        let from = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0), (v("t2"), 30.0)]));
        let to = CapacityMap::from_map(HashMap::from([(v("t1"), 20.0), (v("t2"), 10.0)]));

        let d = diff(&from, &to, &table()).unwrap();

        assert_eq!(d.get(&v("t1")), 1);
        assert_eq!(d.get(&v("t2")), -1);
    }

    #[test]
    fn diff_handles_disjoint_varieties() {
        let from = CapacityMap::from_map(HashMap::from([(v("t1"), 20.0)]));
        let to = CapacityMap::from_map(HashMap::from([(v("t2"), 10.0)]));

        let d = diff(&from, &to, &table()).unwrap();

        assert_eq!(d.get(&v("t1")), -1);
        assert_eq!(d.get(&v("t2")), 1);
    }

    #[test]
    fn diff_omits_zero_entries() {
        let from = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0)]));
        let to = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0)]));

        let d = diff(&from, &to, &table()).unwrap();

        assert!(d.is_empty());
    }

    #[test]
    fn diff_never_terminates_more_than_the_free_budget() {
        // from.total() = 30, to.total() = 10, so the free budget is 20,
        // matching t2's full deficit exactly (unit 10 => -2).
        let from = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0), (v("t2"), 20.0)]));
        let to = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0), (v("t2"), 0.0)]));

        let d = diff(&from, &to, &table()).unwrap();

        assert_eq!(d.get(&v("t2")), -2);
    }

    #[test]
    fn diff_applies_the_fixed_budget_independently_per_shrinking_variety() {
        // from=50 (t1:10, t2:20, t3:20), to=20 (t1:20) => remain = 30.
        // §4.1 gives each shrinking variety `min(remain, deficit)` against
        // the *same* fixed remain, not a running balance: t2 and t3 each
        // have a 20 deficit, so each independently takes min(30, 20) = 20,
        // terminating floor(20/10) = 2 apiece — not capped to a combined
        // 30 as a running-balance implementation would produce.
        let from = CapacityMap::from_map(HashMap::from([(v("t1"), 10.0), (v("t2"), 20.0), (v("t3"), 20.0)]));
        let to = CapacityMap::from_map(HashMap::from([(v("t1"), 20.0)]));

        let d = diff(&from, &to, &table()).unwrap();

        assert_eq!(d.get(&v("t1")), 1);
        assert_eq!(d.get(&v("t2")), -2);
        assert_eq!(d.get(&v("t3")), -2);
    }

    #[test]
    fn strip_negatives_drops_only_terminations() {
        let d = Delta {
            by_variety: HashMap::from([(v("t1"), 2), (v("t2"), -1)]),
        };
        let stripped = d.strip_negatives();
        assert_eq!(stripped.get(&v("t1")), 2);
        assert_eq!(stripped.get(&v("t2")), 0);
    }
}

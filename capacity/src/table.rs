use std::collections::HashMap;

use crate::error::CapacityError;

/// `instance type -> capacity units` lookup, closed over the configured
/// types. Queries for a type outside this table fail loudly rather than
/// defaulting to zero, matching the original's `CapacityFromInstanceType`
/// (a missing entry is a configuration bug, not a runtime zero).
#[derive(Debug, Clone, Default)]
pub struct CapacityTable {
    by_instance_type: HashMap<String, f64>,
}

impl CapacityTable {
    pub fn new(by_instance_type: HashMap<String, f64>) -> Result<Self, CapacityError> {
        for (ty, cap) in &by_instance_type {
            if *cap <= 0.0 {
                return Err(CapacityError::NonPositiveCapacity {
                    instance_type: ty.clone(),
                    capacity: *cap,
                });
            }
        }
        Ok(Self { by_instance_type })
    }

    pub fn capacity_of(&self, instance_type: &str) -> Result<f64, CapacityError> {
        self.by_instance_type
            .get(instance_type)
            .copied()
            .ok_or_else(|| CapacityError::UnknownVariety(instance_type.to_string()))
    }

    pub fn contains(&self, instance_type: &str) -> bool {
        self.by_instance_type.contains_key(instance_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_instance_type_fails_loudly() {
        let table = CapacityTable::new(HashMap::from([("c4.large".to_string(), 10.0)])).unwrap();
        let err = table.capacity_of("m4.large").unwrap_err();
        assert!(matches!(err, CapacityError::UnknownVariety(t) if t == "m4.large"));
    }

    #[test]
    fn rejects_non_positive_capacity_at_construction() {
        let err = CapacityTable::new(HashMap::from([("c4.large".to_string(), 0.0)])).unwrap_err();
        assert!(matches!(err, CapacityError::NonPositiveCapacity { .. }));
    }
}

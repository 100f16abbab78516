//! §4.4 step 10: global capacity defence. Rejects rather than clamps —
//! an out-of-bounds desired total is a configuration-defence error, not
//! a correction to silently apply.
use capacity::CapacityMap;

use crate::error::EngineError;

pub fn enforce(desired: &CapacityMap, min_capacity: Option<f64>, max_capacity: Option<f64>) -> Result<(), EngineError> {
    let total = desired.total();

    if let Some(max) = max_capacity {
        if total > max {
            return Err(EngineError::Invariant(format!(
                "desired total {total} exceeds MaxCapacity {max}"
            )));
        }
    }

    if let Some(min) = min_capacity {
        if total <= min {
            return Err(EngineError::Invariant(format!(
                "desired total {total} is at or below MinCapacity {min}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capacity::{Subnet, Variety};
    use std::collections::HashMap;

    fn map(total: f64) -> CapacityMap {
        CapacityMap::from_map(HashMap::from([(
            Variety::new("c4.large", Subnet { subnet_id: "s".into(), availability_zone: "az-a".into() }),
            total,
        )]))
    }

    #[test]
    fn rejects_above_max() {
        let err = enforce(&map(60.0), None, Some(50.0)).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }

    #[test]
    fn rejects_at_or_below_min() {
        let err = enforce(&map(5.0), Some(5.0), None).unwrap_err();
        assert!(matches!(err, EngineError::Invariant(_)));
    }

    #[test]
    fn passes_within_bounds() {
        assert!(enforce(&map(30.0), Some(5.0), Some(50.0)).is_ok());
    }

    #[test]
    fn unset_caps_never_reject() {
        assert!(enforce(&map(1_000_000.0), None, None).is_ok());
    }
}

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// The subnet/AZ pairing a [`Variety`] launches into.
///
/// Kept as its own type (rather than two loose strings on `Variety`)
/// because both fields travel together through config, cloud API
/// responses, and the status store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subnet {
    pub subnet_id: String,
    pub availability_zone: String,
}

/// A distinct `(instance type, availability zone [, subnet])` class whose
/// spot reclaims are assumed correlated.
///
/// Value-equal and hashable so it can key a [`crate::CapacityMap`] or
/// [`crate::Delta`]. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variety {
    pub instance_type: String,
    pub subnet: Subnet,
    /// Optional launch-method tag (e.g. distinguishing spot fleet vs.
    /// direct RunInstances launches of the same type/AZ).
    pub launch_method: Option<String>,
}

impl Variety {
    pub fn new(instance_type: impl Into<String>, subnet: Subnet) -> Self {
        Self {
            instance_type: instance_type.into(),
            subnet,
            launch_method: None,
        }
    }

    pub fn with_launch_method(mut self, method: impl Into<String>) -> Self {
        self.launch_method = Some(method.into());
        self
    }
}

/// Total order used to break ties in [`crate::Increment`]: current value
/// ascending (the "smallest current value" selection itself), then — to
/// break ties among varieties already equal on that key — unit capacity
/// ascending, then subnet id, then instance type (§4.1, §9). The unit
/// capacity is the variety's per-instance capacity from the
/// `CapacityTable`, not its current accumulated value; using the current
/// value again here would make the tie-break vacuous, since candidates
/// only reach this comparison once their current values already match.
/// Two varieties that compare equal under the full order are a
/// configuration bug (same instance type and subnet id registered twice).
pub(crate) fn compare_by_capacity_then_identity(
    a: (&Variety, f64, f64),
    b: (&Variety, f64, f64),
) -> Ordering {
    let (av, acur, aunit) = a;
    let (bv, bcur, bunit) = b;
    acur.partial_cmp(&bcur)
        .unwrap_or(Ordering::Equal)
        .then_with(|| aunit.partial_cmp(&bunit).unwrap_or(Ordering::Equal))
        .then_with(|| av.subnet.subnet_id.cmp(&bv.subnet.subnet_id))
        .then_with(|| av.instance_type.cmp(&bv.instance_type))
}

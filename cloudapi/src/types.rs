use std::collections::HashMap;

use capacity::{Instance, Variety};

/// A launched instance's unique identifier at the cloud backend.
pub type InstanceId = String;

/// Event payload handed to a hook's stdin as `{event, message, detail}`
/// (§4.7).
#[derive(Debug, Clone, serde::Serialize)]
pub struct HookEvent {
    pub event: String,
    pub message: String,
    pub detail: serde_json::Value,
}

/// The full set of instances observed this tick, already split by
/// market, exactly as `cloud.list_working()` returns them (§4.4 step 4).
#[derive(Debug, Clone, Default)]
pub struct ObservedInstances {
    pub instances: Vec<Instance>,
}

impl ObservedInstances {
    pub fn spot(&self) -> Vec<Instance> {
        capacity::filter_market(&self.instances, capacity::Market::Spot)
    }

    pub fn on_demand(&self) -> Vec<Instance> {
        capacity::filter_market(&self.instances, capacity::Market::OnDemand)
    }

    /// `owner_id` identifies this autoscaler instance; only instances
    /// tagged `ManagedBy=owner_id` are returned (§9 "Managed filter").
    pub fn managed(&self, owner_id: &str) -> Vec<Instance> {
        capacity::filter_managed(&self.instances, owner_id)
            .into_iter()
            .cloned()
            .collect()
    }
}

/// Per-variety current spot price, as returned by
/// `current_spot_prices` (§6).
pub type SpotPrices = HashMap<Variety, f64>;

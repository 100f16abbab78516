//! §4.6 Observability Snapshot: built every tick regardless of what
//! follows, published to the status store before the cooldown gate.
use store::{
    MetricsSnapshot, METRIC_AVAILABLE_VARIETIES, METRIC_CPU_UTIL, METRIC_CPU_UTIL_TO_SCALE_IN,
    METRIC_CPU_UTIL_TO_SCALE_OUT, METRIC_ONDEMAND_CAPACITY, METRIC_SPOT_CAPACITY,
    METRIC_SPOT_CAPACITY_IN_WORST_CASE, METRIC_UNAVAILABLE_VARIETIES,
};

use crate::thresholds::ScaleThresholds;

#[allow(clippy::too_many_arguments)]
pub fn snapshot(
    on_demand_total: f64,
    spot_total: f64,
    available_varieties: usize,
    unavailable_varieties: usize,
    spot_worst_case: f64,
    thresholds: &ScaleThresholds,
    cpu_util: f64,
) -> MetricsSnapshot {
    MetricsSnapshot::from([
        (METRIC_ONDEMAND_CAPACITY.to_string(), on_demand_total),
        (METRIC_SPOT_CAPACITY.to_string(), spot_total),
        (METRIC_AVAILABLE_VARIETIES.to_string(), available_varieties as f64),
        (METRIC_UNAVAILABLE_VARIETIES.to_string(), unavailable_varieties as f64),
        (METRIC_SPOT_CAPACITY_IN_WORST_CASE.to_string(), spot_worst_case),
        (METRIC_CPU_UTIL_TO_SCALE_OUT.to_string(), thresholds.scale_out),
        (METRIC_CPU_UTIL_TO_SCALE_IN.to_string(), thresholds.scale_in),
        (METRIC_CPU_UTIL.to_string(), cpu_util),
    ])
}

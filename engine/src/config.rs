use std::collections::HashMap;
use std::time::Duration;

use capacity::{CapacityTable, Variety};
use cloudapi::SubprocessCommand;

/// Tick-relevant tuning knobs the engine reads every tick (§6). Owned by
/// the binary's top-level config and handed to the engine at
/// construction; the engine never re-reads configuration mid-tick.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub owner_id: String,
    pub cooldown: Duration,
    pub capacity_table: CapacityTable,
    pub bidding_price_by_type: std::collections::HashMap<String, f64>,
    pub configured_varieties: Vec<Variety>,
    /// `Umax`: the CPU utilisation the worst-case-surviving on-demand +
    /// spot capacity is sized to absorb.
    pub max_cpu_util: f64,
    /// `δ`: hysteresis gap between scale-out and scale-in thresholds.
    pub scale_in_threshold: f64,
    /// `k`: number of largest-variety buckets assumed lost simultaneously.
    pub max_terminated_varieties: usize,
    pub min_capacity: Option<f64>,
    pub max_capacity: Option<f64>,
    pub prohibit_scale_in: bool,
    /// Named deferred-event commands (§4.7), keyed by timer name.
    pub timers: HashMap<String, SubprocessCommand>,
}

impl EngineConfig {
    /// Configuration-kind checks that must hold before the first tick
    /// (§7 "Configuration" errors fail at startup).
    pub fn validate(&self) -> Result<(), crate::error::EngineError> {
        if self.scale_in_threshold >= self.max_cpu_util {
            return Err(crate::error::EngineError::Configuration(format!(
                "scale_in_threshold ({}) must be less than max_cpu_util ({})",
                self.scale_in_threshold, self.max_cpu_util
            )));
        }
        if self.configured_varieties.is_empty() {
            return Err(crate::error::EngineError::Configuration(
                "configured_varieties must be non-empty".into(),
            ));
        }
        if self.max_terminated_varieties == 0 {
            return Err(crate::error::EngineError::Configuration(
                "max_terminated_varieties (k) must be positive".into(),
            ));
        }
        for variety in &self.configured_varieties {
            if !self.bidding_price_by_type.contains_key(&variety.instance_type) {
                return Err(crate::error::EngineError::Configuration(format!(
                    "missing bid price for instance type {}",
                    variety.instance_type
                )));
            }
            if !self.capacity_table.contains(&variety.instance_type) {
                return Err(crate::error::EngineError::Configuration(format!(
                    "unknown instance type referenced by variety: {}",
                    variety.instance_type
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min_capacity, self.max_capacity) {
            if min >= max {
                return Err(crate::error::EngineError::Configuration(format!(
                    "min_capacity ({min}) must be less than max_capacity ({max})"
                )));
            }
        }
        Ok(())
    }
}

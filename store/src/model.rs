use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An operator-declared time interval forcing a minimum total capacity.
/// Keys are opaque and unique; overlapping schedules are tolerated (the
/// engine resolves overlaps, see `engine::resolve_active_schedule`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub key: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub capacity: f64,
}

impl Schedule {
    /// A fresh schedule with a timestamp-derived key, mirroring the
    /// original's `NewSchedule()` (original_source `lib/schedule.go`).
    pub fn new(start_at: DateTime<Utc>, end_at: DateTime<Utc>, capacity: f64) -> Self {
        Self {
            key: Utc::now().to_rfc3339(),
            start_at,
            end_at,
            capacity,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now < self.end_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.end_at < now
    }
}

/// A named deferred event: fires once at or after `fire_at`, then is
/// deleted. Names are unique within one autoscaler's status store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub name: String,
    pub fire_at: DateTime<Utc>,
}

/// The observability snapshot published every tick (§4.6). Exposed
/// verbatim by the admin surface's `/metrics` endpoint.
pub type MetricsSnapshot = HashMap<String, f64>;

pub const METRIC_ONDEMAND_CAPACITY: &str = "ondemand_capacity";
pub const METRIC_SPOT_CAPACITY: &str = "spot_capacity";
pub const METRIC_AVAILABLE_VARIETIES: &str = "available_varieties";
pub const METRIC_UNAVAILABLE_VARIETIES: &str = "unavailable_varieties";
pub const METRIC_SPOT_CAPACITY_IN_WORST_CASE: &str = "spot_capacity_in_worst_case";
pub const METRIC_CPU_UTIL_TO_SCALE_OUT: &str = "cpu_util_to_scale_out";
pub const METRIC_CPU_UTIL_TO_SCALE_IN: &str = "cpu_util_to_scale_in";
pub const METRIC_CPU_UTIL: &str = "cpu_util";

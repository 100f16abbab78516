//! YAML configuration (§6 "Configuration"), generalizing the original's
//! `config.Config` / `config.Validate` (original_source `lib/config.go`)
//! from Go struct tags to `serde` plus a hand-written validation pass —
//! the pack carries no Rust validator-crate analogue in the teacher, so
//! validation is explicit code, as `backend::config::AppConfig` is too.
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use capacity::{CapacityTable, Subnet, Variety};
use cloudapi::SubprocessCommand;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubnetConfig {
    pub subnet_id: String,
    pub availability_zone: String,
}

/// One entry of the `Timers` config map: the command to run when it
/// fires, the event name that arms it, and how far into the future it
/// fires once armed (original_source `config/timer.go`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimerConfig {
    pub command: SubprocessCommand,
    pub after: String,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

/// Deserializes the YAML keys enumerated in spec.md §6, keeping the
/// original's `PascalCase` key names (`LoopInterval`, `Cooldown`, ...)
/// exactly rather than re-casing them to idiomatic Rust field names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Namespaces the status store's key prefix (§6 "Persisted layout")
    /// and the cloud backend's owner tag (§9 "Managed filter").
    pub id: String,
    /// Disables the admin surface entirely when absent, matching the
    /// original's `if r.config.APIAddr != ""` gate (`lib/runner.go`).
    pub http_addr: Option<String>,
    #[serde(with = "humantime_serde")]
    pub loop_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    pub instance_capacity_by_type: HashMap<String, f64>,
    pub bidding_price_by_type: HashMap<String, f64>,
    pub instance_types: Vec<String>,
    pub subnets: Vec<SubnetConfig>,
    pub max_cpu_util: f64,
    pub scale_in_threshold: f64,
    pub max_terminated_varieties: usize,
    pub min_capacity: Option<f64>,
    pub max_capacity: Option<f64>,
    #[serde(default)]
    pub prohibit_to_scale_in: bool,
    #[serde(default)]
    pub timers: HashMap<String, TimerConfig>,
    #[serde(default)]
    pub hook_commands: Vec<SubprocessCommand>,
    pub ami_command: SubprocessCommand,
    pub cpu_util_command: SubprocessCommand,
    pub database_path: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, AppError> {
        let data = std::fs::read_to_string(path).map_err(|e| AppError::Configuration(format!("reading {path}: {e}")))?;
        let config: Config = serde_yaml::from_str(&data).map_err(|e| AppError::Configuration(format!("parsing {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// The cross product of configured instance types and subnets
    /// (original_source `lib/config.go`'s `InstanceVarieties()`).
    pub fn instance_varieties(&self) -> Vec<Variety> {
        let mut out = Vec::with_capacity(self.instance_types.len() * self.subnets.len());
        for ty in &self.instance_types {
            for subnet in &self.subnets {
                out.push(Variety::new(
                    ty.clone(),
                    Subnet {
                        subnet_id: subnet.subnet_id.clone(),
                        availability_zone: subnet.availability_zone.clone(),
                    },
                ));
            }
        }
        out
    }

    pub fn capacity_table(&self) -> Result<CapacityTable, AppError> {
        CapacityTable::new(self.instance_capacity_by_type.clone())
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// Configuration-kind checks that must hold before the first tick
    /// (§7: fail at startup).
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id.is_empty() {
            return Err(AppError::Configuration("id must not be empty".to_string()));
        }
        if self.instance_types.is_empty() {
            return Err(AppError::Configuration("instance_types must be non-empty".to_string()));
        }
        if self.subnets.is_empty() {
            return Err(AppError::Configuration("subnets must be non-empty".to_string()));
        }
        if self.scale_in_threshold >= self.max_cpu_util {
            return Err(AppError::Configuration(format!(
                "scale_in_threshold ({}) must be less than max_cpu_util ({})",
                self.scale_in_threshold, self.max_cpu_util
            )));
        }
        if self.max_terminated_varieties == 0 {
            return Err(AppError::Configuration("max_terminated_varieties must be positive".to_string()));
        }
        for ty in &self.instance_types {
            if !self.instance_capacity_by_type.contains_key(ty) {
                return Err(AppError::Configuration(format!(
                    "instance type {ty} has no configured capacity"
                )));
            }
            if !self.bidding_price_by_type.contains_key(ty) {
                return Err(AppError::Configuration(format!(
                    "instance type {ty} has no configured bidding price"
                )));
            }
        }
        for (name, timer) in &self.timers {
            if timer.after.is_empty() {
                return Err(AppError::Configuration(format!("timer {name} is missing 'after'")));
            }
        }
        if let (Some(min), Some(max)) = (self.min_capacity, self.max_capacity) {
            if min >= max {
                return Err(AppError::Configuration(format!(
                    "min_capacity ({min}) must be less than max_capacity ({max})"
                )));
            }
        }
        Ok(())
    }
}

/// Parses durations like `"5m"`/`"30s"` the way the original parses
/// `time.ParseDuration` strings, rather than requiring raw seconds.
mod humantime_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(d: &Duration, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        serde_yaml::from_str(
            r#"
Id: my-asg
HttpAddr: "127.0.0.1:8080"
LoopInterval: 30s
Cooldown: 5m
InstanceCapacityByType:
  c4.large: 10.0
  m4.large: 10.0
BiddingPriceByType:
  c4.large: 0.10
  m4.large: 0.10
InstanceTypes: [c4.large, m4.large]
Subnets:
  - SubnetId: subnet-a
    AvailabilityZone: az-a
MaxCpuUtil: 80.0
ScaleInThreshold: 20.0
MaxTerminatedVarieties: 1
AmiCommand:
  Path: /bin/echo
  Args: ["ami-123"]
CpuUtilCommand:
  Path: /bin/echo
  Args: ["50.0"]
DatabasePath: "sqlite::memory:"
"#,
        )
        .unwrap()
    }

    #[test]
    fn valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_delta_at_or_above_umax() {
        let mut c = sample();
        c.scale_in_threshold = c.max_cpu_util;
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_missing_bid() {
        let mut c = sample();
        c.bidding_price_by_type.remove("m4.large");
        assert!(c.validate().is_err());
    }

    #[test]
    fn instance_varieties_is_cross_product() {
        let c = sample();
        assert_eq!(c.instance_varieties().len(), 2);
    }
}

//! Capability interfaces for the autoscaler's external collaborators
//! (§6, §9): the cloud backend, the CPU-util metric source, the AMI
//! resolver, and hook/timer subprocess invocation. Each is a narrow
//! `async_trait`, mirroring `executor::types`'s per-collaborator traits,
//! so a binary target can choose native-SDK, subprocess, or in-memory
//! implementations independently.

pub mod error;
pub mod memory;
pub mod subprocess;
pub mod traits;
pub mod types;

pub use error::CloudError;
pub use memory::{FixedAmiResolver, FixedMetricSource, InMemoryCloudClient};
pub use subprocess::{OrderedHookRunner, SubprocessCommand};
pub use traits::{AmiResolver, CloudClient, HookRunner, MetricSource};
pub use types::{HookEvent, InstanceId, ObservedInstances, SpotPrices};

use async_trait::async_trait;
use capacity::{Instance, Variety};

use crate::error::CloudError;
use crate::types::{HookEvent, SpotPrices};

/// The cloud backend capability interface (§6, §9 "Polymorphism over
/// external collaborators"). Grounded in `executor::types::TonClient` /
/// `SwapBuilder`: a small `async_trait` per external collaborator rather
/// than one monolithic client.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Filtered to the configured working filter set and the "running"
    /// state; paginates transparently.
    async fn list_working_instances(&self) -> Result<Vec<Instance>, CloudError>;

    /// The most recent price per requested variety. A variety present in
    /// `varieties` but absent from the result is treated by the price
    /// filter as unknown, not zero.
    async fn current_spot_prices(&self, varieties: &[Variety]) -> Result<SpotPrices, CloudError>;

    /// Creates `count` spot instances of `variety` with the configured
    /// launch spec, AMI, and owner tag.
    async fn launch(&self, variety: &Variety, count: u32, ami: &str) -> Result<(), CloudError>;

    /// Picks `count` instances matching `variety` from `managed_instances`
    /// and marks them for termination.
    async fn terminate_by_count(
        &self,
        managed_instances: &[Instance],
        variety: &Variety,
        count: u32,
    ) -> Result<(), CloudError>;
}

/// A single external scalar reading, e.g. aggregate CPU utilisation
/// (§6 "Metric source"). Failure aborts the tick.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn read(&self) -> Result<f64, CloudError>;
}

/// Resolves the AMI to launch with (§4.4 step 13). An empty string
/// aborts the tick with a warning, so the trait returns the string
/// directly rather than an `Option`.
#[async_trait]
pub trait AmiResolver: Send + Sync {
    async fn resolve(&self) -> Result<String, CloudError>;
}

/// Runs configured hook commands in order, each fed `event` on stdin
/// (§4.7). A non-zero exit from any command is a hook failure.
#[async_trait]
pub trait HookRunner: Send + Sync {
    async fn run(&self, event: &HookEvent) -> Result<(), CloudError>;
}

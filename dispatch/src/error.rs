use thiserror::Error;

/// Errors raised while applying a `ScalingPlan` (§4.4 step 16). These are
/// always the "transient external" kind of §7 — the decision itself
/// already succeeded and the cooldown is already armed by the time
/// `Dispatcher::apply` runs, so a failure here does not retry inside the
/// tick; the next tick observes the partially-applied fleet and decides
/// again.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("cloud API error while dispatching: {0}")]
    Cloud(#[from] cloudapi::CloudError),

    #[error("status store error while arming a timer: {0}")]
    Store(#[from] store::StoreError),

    #[error("invalid timer duration for {name}: {source}")]
    InvalidDuration {
        name: String,
        #[source]
        source: chrono::OutOfRangeError,
    },
}

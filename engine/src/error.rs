use thiserror::Error;

/// The error taxonomy of §7: each variant carries its own tick-abort
/// policy, applied by `Tick::run` — never retried inside a tick, the
/// reconciler loop is the retry mechanism.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Cloud API throttling, hook timeout, store unreachable. Logged,
    /// aborts this tick, the loop continues.
    #[error("transient external error: {0}")]
    Transient(String),

    /// Unknown instance type, missing bid, `δ ≥ Umax`, schedule with
    /// `start ≥ end`. Fails at startup; surfaced and aborts the tick if
    /// it somehow only manifests at runtime.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Desired total outside `[MinCapacity, MaxCapacity]`. Aborts the
    /// tick; never silently clamped.
    #[error("invariant violation: {0}")]
    Invariant(String),

    /// Non-zero exit of a configured hook command. Aborts the tick after
    /// recording; cooldown is already armed by this point.
    #[error("hook failure: {0}")]
    HookFailure(String),

    /// A `Diff` producing an unrealisable delta, a capacity-table lookup
    /// failing mid-tick. Propagated to the caller.
    #[error("fatal programming error: {0}")]
    Fatal(String),
}

impl From<capacity::CapacityError> for EngineError {
    fn from(err: capacity::CapacityError) -> Self {
        EngineError::Fatal(err.to_string())
    }
}

impl From<cloudapi::CloudError> for EngineError {
    fn from(err: cloudapi::CloudError) -> Self {
        EngineError::Transient(err.to_string())
    }
}

impl From<store::StoreError> for EngineError {
    fn from(err: store::StoreError) -> Self {
        EngineError::Transient(err.to_string())
    }
}

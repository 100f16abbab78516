use thiserror::Error;

/// The binary-level error taxonomy (§7), one variant per policy kind.
/// `engine::EngineError`/`dispatch::DispatchError` already carry the same
/// taxonomy inside a tick; this enum is the surface `main` matches on for
/// startup and reconciler-loop decisions, mirroring `backend::error::AppError`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("transient external error: {0}")]
    Transient(String),

    #[error("invariant violation: {0}")]
    CapExceeded(String),

    #[error("hook failure: {0}")]
    HookFailed(String),

    #[error("internal error: {0}")]
    Other(String),
}

impl From<engine::EngineError> for AppError {
    fn from(err: engine::EngineError) -> Self {
        match err {
            engine::EngineError::Configuration(msg) => AppError::Configuration(msg),
            engine::EngineError::Transient(msg) => AppError::Transient(msg),
            engine::EngineError::Invariant(msg) => AppError::CapExceeded(msg),
            engine::EngineError::HookFailure(msg) => AppError::HookFailed(msg),
            engine::EngineError::Fatal(msg) => AppError::Other(msg),
        }
    }
}

impl From<dispatch::DispatchError> for AppError {
    fn from(err: dispatch::DispatchError) -> Self {
        AppError::Transient(err.to_string())
    }
}

impl From<store::StoreError> for AppError {
    fn from(err: store::StoreError) -> Self {
        AppError::Transient(err.to_string())
    }
}

impl From<cloudapi::CloudError> for AppError {
    fn from(err: cloudapi::CloudError) -> Self {
        AppError::Transient(err.to_string())
    }
}

impl From<capacity::CapacityError> for AppError {
    fn from(err: capacity::CapacityError) -> Self {
        AppError::Other(err.to_string())
    }
}

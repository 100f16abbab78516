use thiserror::Error;

/// Errors from the external collaborators (§7: "Transient external").
/// Distinct from `capacity::CapacityError`, which signals configuration
/// or programming defects instead.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("cloud API error: {0}")]
    Api(String),

    #[error("spot price unavailable for variety: {0}")]
    MissingPrice(String),

    #[error("metric source error: {0}")]
    Metric(String),

    #[error("hook {command} failed with exit status {status}: {stderr}")]
    HookFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("subprocess failed to start: {0}")]
    SubprocessSpawn(String),

    #[error("subprocess {path} produced unparseable output {raw:?}: {source}")]
    SubprocessOutput {
        path: String,
        raw: String,
        #[source]
        source: std::num::ParseFloatError,
    },
}

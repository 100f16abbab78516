use thiserror::Error;

/// Errors raised by the pure capacity model. These are configuration or
/// fatal-programming errors per the error policy table (§7): they
/// propagate to the caller rather than being swallowed.
#[derive(Debug, Error, PartialEq)]
pub enum CapacityError {
    #[error("capacity of instance type {0} is unknown")]
    UnknownVariety(String),

    #[error("instance type {instance_type} has non-positive capacity {capacity}")]
    NonPositiveCapacity { instance_type: String, capacity: f64 },

    #[error("no variety is allowed to grow")]
    NoAllowedVariety,
}

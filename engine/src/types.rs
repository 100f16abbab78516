use capacity::{Delta, Instance};

/// What a tick decided to do, returned to the caller so dispatch (a
/// separate concern, performed by the `dispatch` crate) can act on it
/// without the engine needing write access to the cloud backend's
/// launch/terminate operations.
#[derive(Debug, Clone)]
pub enum TickReport {
    /// Nothing to do this tick, and why.
    NoOp(NoOpReason),
    /// A non-empty delta was computed and the cooldown has been armed;
    /// the caller must dispatch it.
    Scale(ScalingPlan),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    CooldownActive,
    NoScalingSignal,
    EmptyDelta,
}

#[derive(Debug, Clone)]
pub struct ScalingPlan {
    pub delta: Delta,
    pub ami: String,
    /// The instances observed at step 4 of this same tick, carried
    /// forward so the `dispatch` crate can derive the managed-instance
    /// filter (§9 "Managed filter") without a second, possibly
    /// inconsistent, `list_working_instances` call.
    pub instances: Vec<Instance>,
}

//! The reconciler core (§4): pure decision modules (`search`,
//! `price_filter`, `thresholds`, `caps`, `eligibility`) composed by
//! `tick::Engine` into the sixteen-step tick. No module here performs
//! cloud-level writes — `Engine::tick` returns a `TickReport` for the
//! `dispatch` crate to act on.

pub mod caps;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod metrics;
pub mod price_filter;
pub mod search;
pub mod thresholds;
pub mod tick;
pub mod types;

pub use config::EngineConfig;
pub use error::EngineError;
pub use tick::Engine;
pub use types::{NoOpReason, ScalingPlan, TickReport};

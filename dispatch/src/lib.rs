//! Applies the decisions `engine::Engine::tick` produces (§4.4 step 16):
//! resolves which instances are eligible for termination, dispatches
//! launch/terminate calls through a `CloudClient`, and arms deferred
//! timers on launch events. Never decides *what* to scale, only *how*
//! to carry out a decision already made.

mod dispatcher;
mod error;
mod timer_rule;

pub use dispatcher::{DispatchConfig, Dispatcher, LAUNCHING_INSTANCES_EVENT};
pub use error::DispatchError;
pub use timer_rule::TimerRule;

pub mod init;
pub mod macros;
pub mod timing;
pub mod trace_id;

pub use init::init_logger;
pub use macros::{child_span, root_span};
pub use timing::warn_if_slow;
pub use trace_id::TraceId;

pub mod error;
pub mod memory;
pub mod model;
pub mod sqlite;
pub mod traits;

pub use error::StoreError;
pub use memory::InMemoryStatusStore;
pub use model::{
    MetricsSnapshot, Schedule, Timer, METRIC_AVAILABLE_VARIETIES, METRIC_CPU_UTIL,
    METRIC_CPU_UTIL_TO_SCALE_IN, METRIC_CPU_UTIL_TO_SCALE_OUT, METRIC_ONDEMAND_CAPACITY,
    METRIC_SPOT_CAPACITY, METRIC_SPOT_CAPACITY_IN_WORST_CASE, METRIC_UNAVAILABLE_VARIETIES,
};
pub use sqlite::SqliteStatusStore;
pub use traits::StatusStore;

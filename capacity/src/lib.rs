//! Pure capacity model (§4.1): no I/O, no async. `Variety`, `CapacityTable`,
//! `Instance`, `CapacityMap`, and `Delta` are value types; every mutation
//! returns a new value rather than aliasing the old one across ticks.

mod diff;
mod error;
mod instance;
mod map;
mod table;
mod variety;

pub use diff::{Delta, diff};
pub use error::CapacityError;
pub use instance::{Instance, Market, capacity_map_of, filter_managed, filter_market};
pub use map::CapacityMap;
pub use table::CapacityTable;
pub use variety::{Subnet, Variety};

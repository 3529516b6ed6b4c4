//! Store Module
//!
//! The expiring record store shared by the rate limiter and the cache.

mod fifo;
mod record;
#[allow(clippy::module_inception)]
mod store;


// Re-export public types
pub use fifo::InsertionOrder;
pub use record::{current_timestamp_ms, Record};
pub use store::{lock_store, RecordStore, SharedStore};

// == Public Constants ==
/// Default interval between background sweeps, in seconds
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

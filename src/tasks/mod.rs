//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: removes expired records from one store at a fixed interval

mod sweep;

pub use sweep::spawn_sweep_task;

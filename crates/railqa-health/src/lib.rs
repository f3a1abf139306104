//! Backend liveness monitoring.
//!
//! `HealthMonitor` probes the backend, its inference runtime and its vector
//! store, and publishes a `HealthState` through a watch channel. Polling runs
//! as a background task owned by a `PollHandle`.

pub mod monitor;
pub mod status;

pub use monitor::{HealthMonitor, PollHandle};
pub use status::{HealthState, ServiceStatus};

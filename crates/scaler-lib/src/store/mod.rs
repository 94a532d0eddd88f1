//! Durable keyed storage
//!
//! Both stores are keyed by service id with no cross-service coupling:
//! per-service sample logs (raw metric history) and per-service control
//! state records (the hysteresis machine's memory).

mod samples;
mod state;

pub use samples::SampleLog;
pub use state::ControlStateStore;

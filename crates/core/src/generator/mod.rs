//! Config generation cycle and its periodic refresh.

mod scheduler;
mod service;
mod types;

pub use scheduler::RefreshScheduler;
pub use service::ConfigGenerator;
pub use types::*;

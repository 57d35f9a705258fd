//! Route configuration engine for `netroute`.
//!
//! [`orchestrator::ConfigurationOrchestrator`] runs the work, the other modules are the
//! system-backed implementations of the ports declared in `netroute-common`.

pub mod network;
pub mod orchestrator;
pub mod resolver;
pub mod route;
pub mod system;

//! Shared models and ports for `netroute`.
//!
//! * [`settings`]: the persisted target lists and selected interface.
//! * [`network`]: interface descriptors and route targets.
//! * [`system`], [`resolving`], [`routing`], [`events`]: traits the orchestrator drives,
//!   implemented in `netroute-core` or by the caller.

pub mod config;
pub mod error;
pub mod events;
pub mod network;
pub mod resolving;
pub mod routing;
pub mod settings;
pub mod system;

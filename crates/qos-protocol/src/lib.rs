//! QoS Protocol - API names and payload definitions
//!
//! Shared vocabulary of the QoS testbed dashboard: the fixed set of log
//! targets, the traffic generator kinds, and the JSON bodies exchanged
//! between the dashboard backend and its clients.

pub mod constants;
pub mod error;
pub mod messages;
pub mod types;

pub use constants::*;
pub use error::*;
pub use messages::*;
pub use types::*;

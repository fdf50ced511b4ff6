//! # Assetronics Common
//!
//! Shared vocabulary for the agent workspace: the wire models uploaded to the
//! inventory service, CIDR expansion, the error taxonomy, configuration, and
//! the capability traits the engine is written against.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod reporting;
pub mod scanning;
pub mod system;
pub mod utils;

#[doc(hidden)]
pub use tracing;

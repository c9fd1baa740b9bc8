//! Integration test infrastructure for the FlowSpace Firewall proxy
//!
//! Provides:
//! - Recording switch and controller transports
//! - The standard five-port test slice
//! - Ethernet frame builders for packet-in and packet-out payloads
//! - Verification helpers over recorded messages

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;

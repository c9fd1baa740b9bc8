//! Slice policy engine for the FlowSpace Firewall.
//!
//! A slice is a tenant's share of a physical OpenFlow switch: a set of switch
//! ports and, per port, the VLAN tags the tenant may use. This crate decides
//! which controller messages stay inside a slice:
//!
//! - [`VlanRange`]: per-port VLAN membership table
//! - [`PortConfig`]: a slice port, configured by name and later bound to a
//!   switch port number
//! - [`RateTracker`]: sliding-window message budget
//! - [`Slicer`]: the policy contract used by proxy sessions, implemented by
//!   [`VlanSlicer`]
//! - [`ofp`]: the structured OpenFlow 1.0 messages the policy inspects
//!
//! # Example
//!
//! ```
//! use fsfw_slicer::ofp::{Action, FlowMod, Match, SwitchPort};
//! use fsfw_slicer::{ControllerAddress, PortConfig, Slicer, VlanSlicer};
//!
//! let slicer = VlanSlicer::new("tenant-a", ControllerAddress::new("localhost", 6633))
//!     .with_port(PortConfig::new("eth1", [100].into_iter().collect()))
//!     .with_port(PortConfig::new("eth2", [100].into_iter().collect()));
//! slicer.attach_switch(&[SwitchPort::new(1, "eth1"), SwitchPort::new(2, "eth2")]);
//!
//! let flow = FlowMod::new(
//!     Match::default().with_in_port(1).with_vlan(100),
//!     vec![Action::output(2)],
//! );
//! assert_eq!(slicer.allowed_flows(&flow).len(), 1);
//! ```

pub mod address;
pub mod error;
pub mod frame;
pub mod ofp;
pub mod port;
pub mod rate;
pub mod slicer;
pub mod vlan_range;
pub mod vlan_slicer;

pub use address::ControllerAddress;
pub use error::{SlicerError, SlicerResult};
pub use frame::frame_vlan;
pub use port::PortConfig;
pub use rate::RateTracker;
pub use slicer::Slicer;
pub use vlan_range::{VlanRange, VLAN_MAX, VLAN_MIN};
pub use vlan_slicer::{VlanSlicer, DEFAULT_MAX_FLOWS};

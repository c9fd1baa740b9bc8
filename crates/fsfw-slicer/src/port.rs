//! Port configuration for a slice.
//!
//! A port starts in the *configured* phase, known only by name and its VLAN
//! table. When a switch attaches, the slicer produces a *bound* copy carrying
//! the switch's port number. Wire messages refer to ports by number, so an
//! unbound port can never be matched.

use std::fmt;

use crate::vlan_range::VlanRange;

/// Configuration of one port in a slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    name: String,
    port_id: Option<u16>,
    vlans: VlanRange,
}

impl PortConfig {
    /// Creates an unbound port configuration.
    pub fn new(name: impl Into<String>, vlans: VlanRange) -> Self {
        Self {
            name: name.into(),
            port_id: None,
            vlans,
        }
    }

    /// Returns the port name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the switch port number, or `None` before the switch attached.
    pub fn port_id(&self) -> Option<u16> {
        self.port_id
    }

    /// Returns true once a switch port number has been assigned.
    pub fn is_bound(&self) -> bool {
        self.port_id.is_some()
    }

    /// Returns the VLAN membership table.
    pub fn vlans(&self) -> &VlanRange {
        &self.vlans
    }

    /// Returns true if `tag` may be used on this port.
    pub fn is_tag_allowed(&self, tag: u16) -> bool {
        self.vlans.is_allowed(tag)
    }

    /// Returns a copy of this configuration bound to `port_id`.
    pub fn bound_to(&self, port_id: u16) -> Self {
        Self {
            port_id: Some(port_id),
            ..self.clone()
        }
    }
}

impl fmt::Display for PortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port_id {
            Some(id) => write!(f, "{}({})", self.name, id),
            None => write!(f, "{}(unbound)", self.name),
        }
    }
}

//! The slicing contract used by proxy sessions.

use std::fmt;
use std::sync::Arc;

use crate::address::ControllerAddress;
use crate::error::SlicerResult;
use crate::ofp::{FlowMod, PacketOut, SwitchPort};
use crate::port::PortConfig;

/// A tenant's view of a shared switch.
///
/// A proxy session only talks to its slice through this trait, so slicing
/// dimensions other than port/VLAN can be added without touching the proxy.
///
/// # Lifecycle
///
/// 1. Construction: ports are known by name only.
/// 2. [`attach_switch`](Slicer::attach_switch): names are resolved against the
///    switch's port list. Lookups by port number fail before this step.
/// 3. Decisions: [`allowed_flows`](Slicer::allowed_flows) and
///    [`is_packet_out_allowed`](Slicer::is_packet_out_allowed) answer for each
///    controller message.
///
/// # Thread Safety
///
/// Implementations are shared between the controller-side and switch-side
/// execution contexts of a session and must be `Send + Sync`.
pub trait Slicer: Send + Sync + fmt::Debug {
    /// Returns the slice name.
    fn name(&self) -> &str;

    /// Resolves the slice's port names against the switch's reported ports.
    ///
    /// Replaces any previous binding as a whole.
    fn attach_switch(&self, ports: &[SwitchPort]);

    /// Returns true once a switch has been attached.
    fn is_attached(&self) -> bool;

    /// Returns the slice's configuration for switch port `port_no`.
    fn port_by_id(&self, port_no: u16) -> SlicerResult<Option<Arc<PortConfig>>>;

    /// Returns the slice's configuration for the port named `name`.
    fn port_by_name(&self, name: &str) -> SlicerResult<Option<Arc<PortConfig>>>;

    /// Returns true if a port named `name` is configured in the slice.
    fn is_port_name_in_slice(&self, name: &str) -> bool;

    /// Returns true if switch port `port_no` belongs to the slice.
    fn is_port_in_slice(&self, port_no: u16) -> SlicerResult<bool>;

    /// Returns true if traffic tagged `tag` on switch port `port_no` belongs
    /// to the slice.
    fn is_tag_visible(&self, port_no: u16, tag: u16) -> bool;

    /// Returns true if the slice owns every switch port and `tag` is allowed
    /// on all of them.
    ///
    /// This is the condition under which a port-wildcarded flow install is
    /// passed to the switch unexpanded.
    fn covers_switch_at(&self, tag: u16) -> bool;

    /// Decides whether a packet-out may be sent to the switch.
    fn is_packet_out_allowed(&self, packet_out: &PacketOut) -> bool;

    /// Returns the flow-mods that may be sent for `flow_mod`.
    ///
    /// An empty result means the request is denied.
    fn allowed_flows(&self, flow_mod: &FlowMod) -> Vec<FlowMod>;

    /// Consumes one unit of the slice's message budget if available.
    fn admit_by_rate(&self) -> bool;

    /// Measured recent message rate, in messages per second.
    fn current_rate(&self) -> f64;

    /// Changes the target message rate.
    fn set_rate(&self, rate: u32);

    /// Returns the maximum number of flows the slice may install.
    fn max_flows(&self) -> usize;

    /// Changes the maximum number of flows.
    fn set_max_flows(&self, max_flows: usize);

    /// Returns the tenant controller's address.
    fn controller_address(&self) -> ControllerAddress;

    /// Changes the tenant controller's address.
    fn set_controller_address(&self, address: ControllerAddress);
}

//! Port/VLAN slice policy.
//!
//! A [`VlanSlicer`] owns the ports of one slice together with the VLAN tags
//! permitted on each. Controller messages are checked against those tables:
//! a flow install must match a concrete VLAN on one of the slice's ports and
//! every output it performs must carry a tag the target port allows.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::address::ControllerAddress;
use crate::error::{SlicerError, SlicerResult};
use crate::frame::frame_vlan;
use crate::ofp::{Action, FlowMod, PacketOut, PseudoPort, SwitchPort};
use crate::port::PortConfig;
use crate::rate::RateTracker;
use crate::slicer::Slicer;

/// Default maximum number of flows per slice.
pub const DEFAULT_MAX_FLOWS: usize = 1000;

/// How a strip-vlan action is treated while walking an action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StripVlan {
    /// The tag becomes 0 and the walk continues.
    Reset,
    /// The message is denied.
    Deny,
}

/// Port bindings produced by attaching a switch.
#[derive(Debug)]
struct Binding {
    /// Slice ports present on the switch, by switch port number.
    by_id: BTreeMap<u16, Arc<PortConfig>>,
    /// Every configured port, bound or not, by name.
    by_name: HashMap<String, Arc<PortConfig>>,
    /// Number of ports the switch reported.
    switch_ports: usize,
}

/// Slice policy keyed by switch port and VLAN tag.
pub struct VlanSlicer {
    name: String,
    ports: HashMap<String, PortConfig>,
    binding: RwLock<Option<Arc<Binding>>>,
    controller: RwLock<ControllerAddress>,
    max_flows: AtomicUsize,
    rate: RateTracker,
}

impl VlanSlicer {
    /// Creates an empty slice with default limits.
    pub fn new(name: impl Into<String>, controller: ControllerAddress) -> Self {
        Self {
            name: name.into(),
            ports: HashMap::new(),
            binding: RwLock::new(None),
            controller: RwLock::new(controller),
            max_flows: AtomicUsize::new(DEFAULT_MAX_FLOWS),
            rate: RateTracker::default(),
        }
    }

    /// Adds a port to the slice. A port with the same name is replaced.
    pub fn with_port(mut self, port: PortConfig) -> Self {
        self.ports.insert(port.name().to_string(), port);
        self
    }

    /// Sets the flow ceiling.
    pub fn with_max_flows(self, max_flows: usize) -> Self {
        self.max_flows.store(max_flows, Ordering::Release);
        self
    }

    /// Replaces the rate tracker.
    pub fn with_rate_tracker(mut self, rate: RateTracker) -> Self {
        self.rate = rate;
        self
    }

    /// Returns the configured ports in name order.
    pub fn ports(&self) -> Vec<&PortConfig> {
        let mut ports: Vec<_> = self.ports.values().collect();
        ports.sort_by(|a, b| a.name().cmp(b.name()));
        ports
    }

    /// Returns the rate tracker.
    pub fn rate_tracker(&self) -> &RateTracker {
        &self.rate
    }

    fn binding(&self) -> Option<Arc<Binding>> {
        self.binding.read().clone()
    }

    fn require_binding(&self) -> SlicerResult<Arc<Binding>> {
        self.binding()
            .ok_or_else(|| SlicerError::not_attached(&self.name))
    }

    /// Walks `actions` starting from `tag`, tracking the tag the packet
    /// carries at each output.
    fn actions_allowed(
        &self,
        binding: &Binding,
        actions: &[Action],
        tag: u16,
        in_port: Option<u16>,
        strip: StripVlan,
    ) -> bool {
        let mut current = tag;

        for action in actions {
            match *action {
                Action::SetVlanVid(vid) => current = vid,
                Action::StripVlan => match strip {
                    StripVlan::Reset => current = 0,
                    StripVlan::Deny => {
                        info!(
                            "Slice {}: strip vlan is not allowed in flow installs",
                            self.name
                        );
                        return false;
                    }
                },
                Action::Output { port, .. } => {
                    let target = match port {
                        PseudoPort::Controller => continue,
                        PseudoPort::Physical(p) => p,
                        PseudoPort::InPort => match in_port {
                            Some(p) => p,
                            None => {
                                debug!(
                                    "Slice {}: output to IN_PORT without an input port",
                                    self.name
                                );
                                return false;
                            }
                        },
                        other => {
                            debug!("Slice {}: output to {} is not in the slice", self.name, other);
                            return false;
                        }
                    };

                    let Some(port) = binding.by_id.get(&target) else {
                        debug!("Slice {}: output port {} is not in the slice", self.name, target);
                        return false;
                    };
                    if !port.is_tag_allowed(current) {
                        debug!(
                            "Slice {}: vlan {} is not allowed on output port {}",
                            self.name, current, port
                        );
                        return false;
                    }
                }
                _ => {}
            }
        }

        true
    }

    /// Checks one flow install with a concrete input port and VLAN.
    fn flow_allowed(&self, binding: &Binding, flow_mod: &FlowMod) -> bool {
        let m = &flow_mod.r#match;
        let (Some(in_port), Some(vlan)) = (m.input_port(), m.vlan()) else {
            debug!("Slice {}: flow install with wildcarded port or vlan", self.name);
            return false;
        };

        let Some(port) = binding.by_id.get(&in_port) else {
            debug!("Slice {}: input port {} is not in the slice", self.name, in_port);
            return false;
        };
        if !port.is_tag_allowed(vlan) {
            debug!("Slice {}: policy for port {} vlan {} said no", self.name, port, vlan);
            return false;
        }

        if flow_mod.actions.is_empty() {
            return true;
        }
        self.actions_allowed(binding, &flow_mod.actions, vlan, Some(in_port), StripVlan::Deny)
    }

    /// Builds one flow install per slice port from a port-wildcarded one.
    fn expand(&self, binding: &Binding, flow_mod: &FlowMod) -> Vec<FlowMod> {
        let mut expanded = Vec::with_capacity(binding.by_id.len());

        for port_id in binding.by_id.keys() {
            let candidate = flow_mod.expanded_to(*port_id);
            if !self.flow_allowed(binding, &candidate) {
                warn!(
                    "Slice {}: wildcarded flow install denied on port {}, dropping all expansions",
                    self.name, port_id
                );
                return Vec::new();
            }
            expanded.push(candidate);
        }

        if !expanded.is_empty() && expanded.len() == binding.switch_ports {
            debug!(
                "Slice {}: slice covers every switch port, keeping wildcarded flow install",
                self.name
            );
            return vec![flow_mod.clone()];
        }

        debug!("Slice {}: expanded flow install to {} ports", self.name, expanded.len());
        expanded
    }
}

impl Slicer for VlanSlicer {
    fn name(&self) -> &str {
        &self.name
    }

    fn attach_switch(&self, ports: &[SwitchPort]) {
        let mut by_id = BTreeMap::new();
        let mut by_name = HashMap::with_capacity(self.ports.len());

        for switch_port in ports {
            match self.ports.get(&switch_port.name) {
                Some(config) => {
                    let bound = Arc::new(config.bound_to(switch_port.port_no));
                    debug!("Slice {}: bound port {}", self.name, bound);
                    by_id.insert(switch_port.port_no, Arc::clone(&bound));
                    by_name.insert(switch_port.name.clone(), bound);
                }
                None => debug!(
                    "Slice {}: switch port {} is not configured",
                    self.name, switch_port.name
                ),
            }
        }

        for (name, config) in &self.ports {
            if !by_name.contains_key(name) {
                warn!("Slice {}: port {} not found on switch", self.name, name);
                by_name.insert(name.clone(), Arc::new(config.clone()));
            }
        }

        info!(
            "Slice {}: attached to switch with {} ports, {} in slice",
            self.name,
            ports.len(),
            by_id.len()
        );
        *self.binding.write() = Some(Arc::new(Binding {
            by_id,
            by_name,
            switch_ports: ports.len(),
        }));
    }

    fn is_attached(&self) -> bool {
        self.binding.read().is_some()
    }

    fn port_by_id(&self, port_no: u16) -> SlicerResult<Option<Arc<PortConfig>>> {
        let binding = self.require_binding()?;
        Ok(binding.by_id.get(&port_no).cloned())
    }

    fn port_by_name(&self, name: &str) -> SlicerResult<Option<Arc<PortConfig>>> {
        let binding = self.require_binding()?;
        Ok(binding.by_name.get(name).cloned())
    }

    fn is_port_name_in_slice(&self, name: &str) -> bool {
        self.ports.contains_key(name)
    }

    fn is_port_in_slice(&self, port_no: u16) -> SlicerResult<bool> {
        let binding = self.require_binding()?;
        Ok(binding.by_id.contains_key(&port_no))
    }

    fn is_tag_visible(&self, port_no: u16, tag: u16) -> bool {
        self.binding()
            .and_then(|b| b.by_id.get(&port_no).map(|p| p.is_tag_allowed(tag)))
            .unwrap_or(false)
    }

    fn covers_switch_at(&self, tag: u16) -> bool {
        self.binding()
            .map(|b| {
                !b.by_id.is_empty()
                    && b.by_id.len() == b.switch_ports
                    && b.by_id.values().all(|p| p.is_tag_allowed(tag))
            })
            .unwrap_or(false)
    }

    fn is_packet_out_allowed(&self, packet_out: &PacketOut) -> bool {
        let Some(binding) = self.binding() else {
            error!("Slice {}: packet out before a switch was attached", self.name);
            return false;
        };

        let tag = match frame_vlan(&packet_out.data) {
            Ok(tag) => tag,
            Err(e) => {
                error!("Slice {}: unable to load packet out frame: {}", self.name, e);
                return false;
            }
        };

        let in_port = match packet_out.in_port {
            PseudoPort::Physical(p) => Some(p),
            _ => None,
        };

        let allowed =
            self.actions_allowed(&binding, &packet_out.actions, tag, in_port, StripVlan::Reset);
        if !allowed {
            info!("Slice {}: packet out is not allowed", self.name);
        }
        allowed
    }

    fn allowed_flows(&self, flow_mod: &FlowMod) -> Vec<FlowMod> {
        if flow_mod.r#match.vlan().is_none() {
            warn!("Slice {}: flow install with wildcarded vlan is not allowed", self.name);
            return Vec::new();
        }

        let Some(binding) = self.binding() else {
            warn!("Slice {}: flow install before a switch was attached", self.name);
            return Vec::new();
        };

        if flow_mod.r#match.input_port().is_some() {
            if self.flow_allowed(&binding, flow_mod) {
                return vec![flow_mod.clone()];
            }
            warn!(
                "Slice {}: flow install not allowed for port {:?} vlan {:?}",
                self.name, flow_mod.r#match.in_port, flow_mod.r#match.dl_vlan
            );
            return Vec::new();
        }

        self.expand(&binding, flow_mod)
    }

    fn admit_by_rate(&self) -> bool {
        self.rate.admit()
    }

    fn current_rate(&self) -> f64 {
        self.rate.current_rate()
    }

    fn set_rate(&self, rate: u32) {
        self.rate.set_rate(rate);
    }

    fn max_flows(&self) -> usize {
        self.max_flows.load(Ordering::Acquire)
    }

    fn set_max_flows(&self, max_flows: usize) {
        self.max_flows.store(max_flows, Ordering::Release);
    }

    fn controller_address(&self) -> ControllerAddress {
        self.controller.read().clone()
    }

    fn set_controller_address(&self, address: ControllerAddress) {
        *self.controller.write() = address;
    }
}

impl fmt::Debug for VlanSlicer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VlanSlicer")
            .field("name", &self.name)
            .field("ports", &self.ports())
            .field("attached", &self.is_attached())
            .field("max_flows", &self.max_flows())
            .field("rate", &self.rate.rate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ofp::Match;
    use crate::vlan_range::VlanRange;
    use etherparse::{EtherType, Ethernet2Header, SingleVlanHeader, VlanId, VlanPcp};
    use pretty_assertions::assert_eq;

    fn vlans(tags: &[u16]) -> VlanRange {
        tags.iter().copied().collect()
    }

    fn switch_ports() -> Vec<SwitchPort> {
        vec![
            SwitchPort::new(1, "foo"),
            SwitchPort::new(2, "foo2"),
            SwitchPort::new(3, "foo3"),
            SwitchPort::new(4, "foo4"),
            SwitchPort::new(5, "foo5"),
            SwitchPort::new(59590, "foo6"),
        ]
    }

    fn test_slicer() -> VlanSlicer {
        VlanSlicer::new("Slice1", ControllerAddress::new("localhost", 6633))
            .with_port(PortConfig::new("foo", vlans(&[100, 1000])))
            .with_port(PortConfig::new("foo2", vlans(&[102, 1000])))
            .with_port(PortConfig::new("foo3", vlans(&[103, 1000])))
            .with_port(PortConfig::new("foo5", vlans(&[105, 1000])))
            .with_port(PortConfig::new("foo6", vlans(&[105, 1000])))
    }

    fn attached_slicer() -> VlanSlicer {
        let slicer = test_slicer();
        slicer.attach_switch(&switch_ports());
        slicer
    }

    fn flow(in_port: Option<u16>, vlan: Option<u16>, actions: Vec<Action>) -> FlowMod {
        let m = Match {
            in_port,
            dl_vlan: vlan,
            ..Match::default()
        };
        FlowMod::new(m, actions)
    }

    fn tagged_frame(vid: u16) -> Vec<u8> {
        let eth = Ethernet2Header {
            source: [0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa],
            destination: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
            ether_type: EtherType::VLAN_TAGGED_FRAME,
        };
        let vlan = SingleVlanHeader {
            pcp: VlanPcp::ZERO,
            drop_eligible_indicator: false,
            vlan_id: VlanId::try_new(vid).unwrap(),
            ether_type: EtherType(0x88cc),
        };
        let mut frame = eth.to_bytes().to_vec();
        frame.extend_from_slice(&vlan.to_bytes());
        frame
    }

    #[test]
    fn test_lookups_before_attach() {
        let slicer = test_slicer();
        assert!(!slicer.is_attached());
        assert_eq!(
            slicer.port_by_id(1),
            Err(SlicerError::not_attached("Slice1"))
        );
        assert!(slicer.port_by_name("foo").is_err());
        assert!(slicer.is_port_in_slice(1).is_err());
        assert!(slicer.is_port_name_in_slice("foo"));
        assert!(!slicer.is_tag_visible(1, 100));
    }

    #[test]
    fn test_attach_binds_ports() {
        let slicer = attached_slicer();
        assert!(slicer.is_attached());

        let foo6 = slicer.port_by_id(59590).unwrap().unwrap();
        assert_eq!(foo6.name(), "foo6");
        assert_eq!(foo6.port_id(), Some(59590));

        let foo = slicer.port_by_name("foo").unwrap().unwrap();
        assert_eq!(foo.port_id(), Some(1));

        assert_eq!(slicer.port_by_id(4).unwrap(), None);
        assert!(!slicer.is_port_in_slice(4).unwrap());
        assert!(slicer.is_port_in_slice(5).unwrap());
        assert!(!slicer.is_port_name_in_slice("foo4"));
    }

    #[test]
    fn test_unresolved_port_stays_unbound() {
        let slicer = test_slicer().with_port(PortConfig::new("missing", vlans(&[7])));
        slicer.attach_switch(&switch_ports());

        let missing = slicer.port_by_name("missing").unwrap().unwrap();
        assert_eq!(missing.port_id(), None);
        assert_eq!(slicer.port_by_name("nope").unwrap(), None);
    }

    #[test]
    fn test_reattach_replaces_binding() {
        let slicer = attached_slicer();
        slicer.attach_switch(&[SwitchPort::new(9, "foo")]);

        assert_eq!(slicer.port_by_id(1).unwrap(), None);
        assert_eq!(slicer.port_by_name("foo").unwrap().unwrap().port_id(), Some(9));
    }

    #[test]
    fn test_is_tag_visible() {
        let slicer = attached_slicer();
        assert!(slicer.is_tag_visible(1, 100));
        assert!(slicer.is_tag_visible(2, 1000));
        assert!(!slicer.is_tag_visible(2, 100));
        assert!(!slicer.is_tag_visible(4, 1000));
    }

    #[test]
    fn test_wildcarded_vlan_is_denied() {
        let slicer = attached_slicer();
        let flows = slicer.allowed_flows(&flow(Some(1), None, vec![Action::output(2)]));
        assert!(flows.is_empty());

        let flows = slicer.allowed_flows(&flow(None, Some(0), vec![]));
        assert!(flows.is_empty());
    }

    #[test]
    fn test_flow_install_before_attach_is_denied() {
        let slicer = test_slicer();
        assert!(slicer.allowed_flows(&flow(Some(1), Some(100), vec![])).is_empty());
    }

    #[test]
    fn test_set_vlan_then_output_is_allowed() {
        let slicer = attached_slicer();
        let fm = flow(
            Some(1),
            Some(100),
            vec![Action::SetVlanVid(102), Action::output(2)],
        );

        let flows = slicer.allowed_flows(&fm);
        assert_eq!(flows, vec![fm]);
    }

    #[test]
    fn test_output_with_wrong_tag_is_denied() {
        let slicer = attached_slicer();
        let fm = flow(Some(1), Some(100), vec![Action::output(2)]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_output_outside_slice_is_denied() {
        let slicer = attached_slicer();
        let fm = flow(Some(1), Some(1000), vec![Action::output(4)]);
        assert!(slicer.allowed_flows(&fm).is_empty());

        let fm = flow(Some(1), Some(1000), vec![Action::output(77)]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_input_port_outside_slice_is_denied() {
        let slicer = attached_slicer();
        let fm = flow(Some(4), Some(1000), vec![]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_no_actions_is_allowed() {
        let slicer = attached_slicer();
        let fm = flow(Some(3), Some(103), vec![]);
        assert_eq!(slicer.allowed_flows(&fm).len(), 1);
    }

    #[test]
    fn test_same_flow_twice_yields_two_copies() {
        let slicer = attached_slicer();
        let fm = flow(Some(1), Some(1000), vec![Action::output(2)]);

        let mut forwarded = slicer.allowed_flows(&fm);
        forwarded.extend(slicer.allowed_flows(&fm));
        assert_eq!(forwarded, vec![fm.clone(), fm]);
    }

    #[test]
    fn test_controller_output_is_allowed() {
        let slicer = attached_slicer();
        let fm = flow(
            Some(1),
            Some(100),
            vec![Action::SetVlanVid(4000), Action::to_controller(128)],
        );
        assert_eq!(slicer.allowed_flows(&fm).len(), 1);
    }

    #[test]
    fn test_reserved_outputs_are_denied() {
        let slicer = attached_slicer();
        for port in [
            PseudoPort::Flood,
            PseudoPort::All,
            PseudoPort::Normal,
            PseudoPort::Local,
            PseudoPort::Table,
            PseudoPort::None,
        ] {
            let fm = flow(
                Some(1),
                Some(1000),
                vec![Action::Output { port, max_len: 0 }],
            );
            assert!(slicer.allowed_flows(&fm).is_empty(), "{} allowed", port);
        }
    }

    #[test]
    fn test_in_port_output_uses_match_port() {
        let slicer = attached_slicer();
        let out = Action::Output {
            port: PseudoPort::InPort,
            max_len: 0,
        };

        let fm = flow(Some(1), Some(100), vec![out]);
        assert_eq!(slicer.allowed_flows(&fm).len(), 1);

        let fm = flow(Some(1), Some(100), vec![Action::SetVlanVid(102), out]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_strip_vlan_denies_flow_install() {
        let slicer = attached_slicer();
        let fm = flow(Some(1), Some(1000), vec![Action::StripVlan, Action::output(2)]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_wildcard_expansion() {
        let slicer = attached_slicer();
        let template = flow(None, Some(1000), vec![Action::to_controller(0)]);

        let flows = slicer.allowed_flows(&template);
        let ports: Vec<_> = flows.iter().map(|f| f.r#match.in_port).collect();
        assert_eq!(
            ports,
            vec![Some(1), Some(2), Some(3), Some(5), Some(59590)]
        );
        assert!(flows.iter().all(|f| f.actions == template.actions));
        assert_eq!(template.r#match.in_port, None);
    }

    #[test]
    fn test_wildcard_expansion_is_all_or_nothing() {
        let slicer = attached_slicer();
        let fm = flow(None, Some(100), vec![]);
        assert!(slicer.allowed_flows(&fm).is_empty());
    }

    #[test]
    fn test_full_coverage_keeps_wildcard_flow() {
        let slicer = VlanSlicer::new("Whole", ControllerAddress::new("localhost", 6633))
            .with_port(PortConfig::new("a", vlans(&[10])))
            .with_port(PortConfig::new("b", vlans(&[10])));
        slicer.attach_switch(&[SwitchPort::new(1, "a"), SwitchPort::new(2, "b")]);

        let fm = flow(None, Some(10), vec![Action::output(2)]);
        assert_eq!(slicer.allowed_flows(&fm), vec![fm]);
    }

    #[test]
    fn test_empty_slice_never_collapses() {
        let slicer = VlanSlicer::new("Empty", ControllerAddress::new("localhost", 6633));
        slicer.attach_switch(&[]);
        assert!(slicer.allowed_flows(&flow(None, Some(10), vec![])).is_empty());
    }

    #[test]
    fn test_covers_switch_at() {
        let slicer = VlanSlicer::new("Whole", ControllerAddress::new("localhost", 6633))
            .with_port(PortConfig::new("a", vlans(&[10, 20])))
            .with_port(PortConfig::new("b", vlans(&[10])));
        assert!(!slicer.covers_switch_at(10));

        slicer.attach_switch(&[SwitchPort::new(1, "a"), SwitchPort::new(2, "b")]);
        assert!(slicer.covers_switch_at(10));
        assert!(!slicer.covers_switch_at(20));

        slicer.attach_switch(&[
            SwitchPort::new(1, "a"),
            SwitchPort::new(2, "b"),
            SwitchPort::new(3, "c"),
        ]);
        assert!(!slicer.covers_switch_at(10));
        assert_eq!(
            slicer.allowed_flows(&flow(None, Some(10), vec![])).len(),
            2
        );

        assert!(!attached_slicer().covers_switch_at(1000));
    }

    #[test]
    fn test_packet_out_allowed_tag() {
        let slicer = attached_slicer();
        let po = PacketOut::new(vec![Action::output(1)], tagged_frame(1000));
        assert!(slicer.is_packet_out_allowed(&po));
    }

    #[test]
    fn test_packet_out_denied_tag() {
        let slicer = attached_slicer();
        let po = PacketOut::new(vec![Action::output(1)], tagged_frame(3000));
        assert!(!slicer.is_packet_out_allowed(&po));
    }

    #[test]
    fn test_packet_out_set_vlan_and_strip() {
        let slicer = attached_slicer();
        let po = PacketOut::new(
            vec![
                Action::output(1),
                Action::SetVlanVid(102),
                Action::output(2),
                Action::StripVlan,
                Action::to_controller(0),
            ],
            tagged_frame(1000),
        );
        assert!(slicer.is_packet_out_allowed(&po));

        let po = PacketOut::new(
            vec![Action::StripVlan, Action::output(1)],
            tagged_frame(1000),
        );
        assert!(!slicer.is_packet_out_allowed(&po));
    }

    #[test]
    fn test_packet_out_malformed_frame() {
        let slicer = attached_slicer();
        let po = PacketOut::new(vec![Action::output(1)], vec![0u8; 4]);
        assert!(!slicer.is_packet_out_allowed(&po));
    }

    #[test]
    fn test_packet_out_in_port() {
        let slicer = attached_slicer();
        let mut po = PacketOut::new(
            vec![Action::Output {
                port: PseudoPort::InPort,
                max_len: 0,
            }],
            tagged_frame(102),
        );
        assert!(!slicer.is_packet_out_allowed(&po));

        po.in_port = PseudoPort::Physical(2);
        assert!(slicer.is_packet_out_allowed(&po));
    }

    #[test]
    fn test_limits_and_address() {
        let slicer = attached_slicer();
        assert_eq!(slicer.max_flows(), DEFAULT_MAX_FLOWS);
        slicer.set_max_flows(4);
        assert_eq!(slicer.max_flows(), 4);

        slicer.set_rate(1);
        assert!(slicer.admit_by_rate());
        assert!(!slicer.admit_by_rate());
        assert!(slicer.current_rate() > 0.0);

        let addr = ControllerAddress::new("10.0.0.1", 6653);
        slicer.set_controller_address(addr.clone());
        assert_eq!(slicer.controller_address(), addr);
        assert_eq!(slicer.name(), "Slice1");
    }
}

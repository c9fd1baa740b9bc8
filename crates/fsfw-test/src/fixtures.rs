//! Test fixtures for proxy sessions
//!
//! The standard test switch has six ports. The standard test slice
//! (`Slice1`) holds five of them:
//!
//! | port | number | slice VLANs |
//! |------|--------|-------------|
//! | foo  | 1      | 100, 1000   |
//! | foo2 | 2      | 102, 1000   |
//! | foo3 | 3      | 103, 1000   |
//! | foo4 | 4      | not in slice |
//! | foo5 | 5      | 105, 1000   |
//! | foo6 | 59590  | 105, 1000   |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use etherparse::{EtherType, Ethernet2Header, SingleVlanHeader, VlanId, VlanPcp};
use fsfw_proxyd::{ControllerChannel, Proxy, SwitchConnection, TransportError, TransportResult};
use fsfw_slicer::ofp::{
    Action, FlowMod, FlowRemoved, FlowRemovedReason, Match, OfMessage, OfpType, PacketIn,
    PacketInReason, PacketOut, PortStatus, PortStatusReason, SwitchPort,
};
use fsfw_slicer::{ControllerAddress, PortConfig, VlanRange, VlanSlicer};
use parking_lot::{Mutex, RwLock};

/// Datapath id of the standard test switch.
pub const TEST_DPID: u64 = 0x0000_0000_0000_00aa;

/// Name of the standard test slice.
pub const TEST_SLICE: &str = "Slice1";

/// Ports reported by the standard test switch.
pub fn test_switch_ports() -> Vec<SwitchPort> {
    vec![
        SwitchPort::new(1, "foo"),
        SwitchPort::new(2, "foo2"),
        SwitchPort::new(3, "foo3"),
        SwitchPort::new(4, "foo4"),
        SwitchPort::new(5, "foo5"),
        SwitchPort::new(59590, "foo6"),
    ]
}

/// Builds a VLAN table from a list of tags.
pub fn vlans(tags: &[u16]) -> VlanRange {
    tags.iter().copied().collect()
}

/// The standard five-port test slice, not yet attached to a switch.
pub fn test_slicer() -> VlanSlicer {
    VlanSlicer::new(TEST_SLICE, ControllerAddress::new("localhost", 6633))
        .with_port(PortConfig::new("foo", vlans(&[100, 1000])))
        .with_port(PortConfig::new("foo2", vlans(&[102, 1000])))
        .with_port(PortConfig::new("foo3", vlans(&[103, 1000])))
        .with_port(PortConfig::new("foo5", vlans(&[105, 1000])))
        .with_port(PortConfig::new("foo6", vlans(&[105, 1000])))
}

/// Switch transport that records every message written to it.
#[derive(Debug)]
pub struct RecordingSwitch {
    datapath_id: u64,
    ports: RwLock<Vec<SwitchPort>>,
    written: Mutex<Vec<OfMessage>>,
    fail_writes: AtomicBool,
}

impl RecordingSwitch {
    /// Creates a switch reporting `ports`.
    pub fn new(datapath_id: u64, ports: Vec<SwitchPort>) -> Self {
        Self {
            datapath_id,
            ports: RwLock::new(ports),
            written: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// The standard six-port test switch.
    pub fn standard() -> Arc<Self> {
        Arc::new(Self::new(TEST_DPID, test_switch_ports()))
    }

    /// Returns a copy of the messages written so far.
    pub fn written(&self) -> Vec<OfMessage> {
        self.written.lock().clone()
    }

    /// Returns the number of messages written so far.
    pub fn written_count(&self) -> usize {
        self.written.lock().len()
    }

    /// Makes subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Adds a port to the reported port list.
    pub fn add_port(&self, port: SwitchPort) {
        self.ports.write().push(port);
    }

    /// Removes a port from the reported port list.
    pub fn remove_port(&self, name: &str) {
        self.ports.write().retain(|p| p.name != name);
    }
}

#[async_trait]
impl SwitchConnection for RecordingSwitch {
    fn datapath_id(&self) -> u64 {
        self.datapath_id
    }

    fn ports(&self) -> Vec<SwitchPort> {
        self.ports.read().clone()
    }

    async fn write(&self, message: OfMessage) -> TransportResult<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(TransportError::write("switch", "simulated write failure"));
        }
        self.written.lock().push(message);
        Ok(())
    }
}

/// Controller transport that records every message sent to it.
#[derive(Debug, Default)]
pub struct RecordingController {
    received: Mutex<Vec<OfMessage>>,
    closed: AtomicBool,
}

impl RecordingController {
    /// Creates an open controller channel.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns a copy of the messages received so far.
    pub fn received(&self) -> Vec<OfMessage> {
        self.received.lock().clone()
    }

    /// Returns the number of messages received so far.
    pub fn received_count(&self) -> usize {
        self.received.lock().len()
    }

    /// Returns true once the proxy closed the channel.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ControllerChannel for RecordingController {
    fn is_connected(&self) -> bool {
        !self.is_closed()
    }

    async fn send(&self, message: OfMessage) -> TransportResult<()> {
        if self.is_closed() {
            return Err(TransportError::closed("controller"));
        }
        self.received.lock().push(message);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// A proxy session wired to recording transports.
#[derive(Debug)]
pub struct TestSession {
    pub switch: Arc<RecordingSwitch>,
    pub controller: Arc<RecordingController>,
    pub proxy: Arc<Proxy>,
}

impl TestSession {
    /// Creates a connected session for `slicer` on the standard test switch.
    pub fn connected(slicer: VlanSlicer) -> Self {
        let switch = RecordingSwitch::standard();
        let controller = RecordingController::new();
        let proxy = Arc::new(Proxy::new(Arc::new(slicer), switch.clone()));
        proxy
            .connect(controller.clone())
            .expect("new session accepts a controller");

        Self {
            switch,
            controller,
            proxy,
        }
    }

    /// A connected session for the standard test slice.
    pub fn standard() -> Self {
        Self::connected(test_slicer())
    }
}

/// An 802.1Q tagged Ethernet frame carrying `vid`.
pub fn tagged_frame(vid: u16) -> Vec<u8> {
    let eth = Ethernet2Header {
        source: [0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa],
        destination: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
        ether_type: EtherType::VLAN_TAGGED_FRAME,
    };
    let vlan = SingleVlanHeader {
        pcp: VlanPcp::ZERO,
        drop_eligible_indicator: false,
        vlan_id: VlanId::try_new(vid).expect("vid fits in 12 bits"),
        ether_type: EtherType(0x88cc),
    };

    let mut frame = eth.to_bytes().to_vec();
    frame.extend_from_slice(&vlan.to_bytes());
    frame
}

/// An untagged IPv4 Ethernet header.
pub fn untagged_frame() -> Vec<u8> {
    let eth = Ethernet2Header {
        source: [0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa],
        destination: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
        ether_type: EtherType::IPV4,
    };
    eth.to_bytes().to_vec()
}

/// A flow install matching `in_port` and `vlan` (`None` wildcards).
pub fn flow_mod(in_port: Option<u16>, vlan: Option<u16>, actions: Vec<Action>) -> OfMessage {
    let m = Match {
        in_port,
        dl_vlan: vlan,
        ..Match::default()
    };
    FlowMod::new(m, actions).into()
}

/// A packet-out whose frame is tagged `vid`.
pub fn packet_out(actions: Vec<Action>, vid: u16) -> OfMessage {
    PacketOut::new(actions, tagged_frame(vid)).into()
}

/// A packet-in from `in_port` carrying `frame`.
pub fn packet_in(in_port: u16, frame: Vec<u8>) -> OfMessage {
    PacketIn {
        xid: 0,
        buffer_id: None,
        total_len: u16::try_from(frame.len()).unwrap_or(u16::MAX),
        in_port,
        reason: PacketInReason::NoMatch,
        data: frame,
    }
    .into()
}

/// A flow-removed notification for a flow on `in_port` (`None` for a
/// port-wildcarded flow) and `vlan`.
pub fn flow_removed(in_port: Option<u16>, vlan: u16) -> OfMessage {
    let r#match = Match {
        in_port,
        ..Match::default()
    };
    FlowRemoved {
        xid: 0,
        r#match: r#match.with_vlan(vlan),
        cookie: 0,
        priority: 0x8000,
        reason: FlowRemovedReason::IdleTimeout,
        duration_sec: 10,
        duration_nsec: 0,
        idle_timeout: 10,
        packet_count: 0,
        byte_count: 0,
    }
    .into()
}

/// A port-status event.
pub fn port_status(reason: PortStatusReason, port: SwitchPort) -> OfMessage {
    PortStatus {
        xid: 0,
        reason,
        desc: port,
    }
    .into()
}

/// A barrier request, passed through unchanged by the proxy.
pub fn barrier(xid: u32) -> OfMessage {
    OfMessage::Other {
        msg_type: OfpType::BarrierRequest,
        xid,
        body: vec![],
    }
}

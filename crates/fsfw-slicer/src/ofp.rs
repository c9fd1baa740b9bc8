//! Structured OpenFlow 1.0 message model.
//!
//! These are the decoded messages a wire codec hands to the proxy. Only the
//! fields the slicing engine inspects carry semantics here (input port, VLAN
//! tag, the action list and the packet-out frame); the rest are carried so a
//! forwarded message is reproduced unchanged.

use std::fmt;
use std::net::Ipv4Addr;

/// Highest port number usable for a physical port (`OFPP_MAX`).
pub const OFPP_MAX: u16 = 0xff00;

/// Flow-mod flag asking the switch to send a flow-removed message.
pub const OFPFF_SEND_FLOW_REM: u16 = 1 << 0;

/// Output target of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoPort {
    /// A physical port on the switch.
    Physical(u16),
    /// Send back out the input port.
    InPort,
    /// Submit to the flow table (packet-out only).
    Table,
    /// Process with the switch's normal L2/L3 pipeline.
    Normal,
    /// Flood along the spanning tree.
    Flood,
    /// All physical ports except the input port.
    All,
    /// Send to the controller.
    Controller,
    /// The switch's local networking stack.
    Local,
    /// Not associated with any port.
    None,
    /// Reserved value without a defined meaning.
    Reserved(u16),
}

impl PseudoPort {
    /// Decodes a raw 16-bit port value.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            0xfff8 => Self::InPort,
            0xfff9 => Self::Table,
            0xfffa => Self::Normal,
            0xfffb => Self::Flood,
            0xfffc => Self::All,
            0xfffd => Self::Controller,
            0xfffe => Self::Local,
            0xffff => Self::None,
            p if p <= OFPP_MAX => Self::Physical(p),
            p => Self::Reserved(p),
        }
    }

    /// Encodes the port as its raw 16-bit value.
    pub fn raw(self) -> u16 {
        match self {
            Self::Physical(p) | Self::Reserved(p) => p,
            Self::InPort => 0xfff8,
            Self::Table => 0xfff9,
            Self::Normal => 0xfffa,
            Self::Flood => 0xfffb,
            Self::All => 0xfffc,
            Self::Controller => 0xfffd,
            Self::Local => 0xfffe,
            Self::None => 0xffff,
        }
    }
}

impl fmt::Display for PseudoPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical(p) => write!(f, "{}", p),
            Self::InPort => write!(f, "IN_PORT"),
            Self::Table => write!(f, "TABLE"),
            Self::Normal => write!(f, "NORMAL"),
            Self::Flood => write!(f, "FLOOD"),
            Self::All => write!(f, "ALL"),
            Self::Controller => write!(f, "CONTROLLER"),
            Self::Local => write!(f, "LOCAL"),
            Self::None => write!(f, "NONE"),
            Self::Reserved(p) => write!(f, "RESERVED({:#06x})", p),
        }
    }
}

/// Fields to match against flows. `None` means the field is wildcarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub in_port: Option<u16>,
    pub dl_vlan: Option<u16>,
    pub dl_vlan_pcp: Option<u8>,
    pub dl_src: Option<[u8; 6]>,
    pub dl_dst: Option<[u8; 6]>,
    pub dl_type: Option<u16>,
    pub nw_tos: Option<u8>,
    pub nw_proto: Option<u8>,
    pub nw_src: Option<Ipv4Addr>,
    pub nw_dst: Option<Ipv4Addr>,
    pub tp_src: Option<u16>,
    pub tp_dst: Option<u16>,
}

impl Match {
    /// Sets the input port.
    pub fn with_in_port(mut self, port: u16) -> Self {
        self.in_port = Some(port);
        self
    }

    /// Sets the VLAN id.
    pub fn with_vlan(mut self, vlan: u16) -> Self {
        self.dl_vlan = Some(vlan);
        self
    }

    /// Returns the concrete input port, or `None` when wildcarded.
    ///
    /// Port 0 is not a valid OpenFlow port and counts as a wildcard.
    pub fn input_port(&self) -> Option<u16> {
        self.in_port.filter(|p| *p != 0)
    }

    /// Returns the concrete VLAN id, or `None` when wildcarded.
    ///
    /// VLAN 0 is the untagged/wildcard value and never a concrete tag.
    pub fn vlan(&self) -> Option<u16> {
        self.dl_vlan.filter(|v| *v != 0)
    }
}

/// Actions associated with flows and packet-outs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Output { port: PseudoPort, max_len: u16 },
    SetVlanVid(u16),
    SetVlanPcp(u8),
    StripVlan,
    SetDlSrc([u8; 6]),
    SetDlDst([u8; 6]),
    SetNwSrc(Ipv4Addr),
    SetNwDst(Ipv4Addr),
    SetNwTos(u8),
    SetTpSrc(u16),
    SetTpDst(u16),
    Enqueue { port: PseudoPort, queue_id: u32 },
    Vendor(u32),
}

impl Action {
    /// Output to a physical port.
    pub fn output(port: u16) -> Self {
        Self::Output {
            port: PseudoPort::from_raw(port),
            max_len: 0,
        }
    }

    /// Output to the controller.
    pub fn to_controller(max_len: u16) -> Self {
        Self::Output {
            port: PseudoPort::Controller,
            max_len,
        }
    }
}

/// Type of modification to perform on a flow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowModCommand {
    #[default]
    Add,
    Modify,
    ModifyStrict,
    Delete,
    DeleteStrict,
}

/// Flow-table modification sent by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub xid: u32,
    pub command: FlowModCommand,
    pub r#match: Match,
    pub cookie: u64,
    pub priority: u16,
    /// Idle timeout in seconds, 0 for permanent.
    pub idle_timeout: u16,
    /// Hard timeout in seconds, 0 for permanent.
    pub hard_timeout: u16,
    pub buffer_id: Option<u32>,
    pub out_port: Option<PseudoPort>,
    pub flags: u16,
    pub actions: Vec<Action>,
}

impl FlowMod {
    /// Creates an add flow-mod with default priority and no timeouts.
    pub fn new(r#match: Match, actions: Vec<Action>) -> Self {
        Self {
            xid: 0,
            command: FlowModCommand::Add,
            r#match,
            cookie: 0,
            priority: 0x8000,
            idle_timeout: 0,
            hard_timeout: 0,
            buffer_id: None,
            out_port: None,
            flags: 0,
            actions,
        }
    }

    /// Sets the transaction id.
    pub fn with_xid(mut self, xid: u32) -> Self {
        self.xid = xid;
        self
    }

    /// Builds a new flow-mod from this one with a concrete input port.
    ///
    /// The receiver is left untouched so one template can produce a rule per
    /// port.
    pub fn expanded_to(&self, in_port: u16) -> Self {
        Self {
            r#match: Match {
                in_port: Some(in_port),
                ..self.r#match.clone()
            },
            ..self.clone()
        }
    }
}

/// Packet injected by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketOut {
    pub xid: u32,
    pub buffer_id: Option<u32>,
    pub in_port: PseudoPort,
    pub actions: Vec<Action>,
    /// The Ethernet frame to send (empty when a buffered packet is used).
    pub data: Vec<u8>,
}

impl PacketOut {
    /// Creates an unbuffered packet-out carrying `data`.
    pub fn new(actions: Vec<Action>, data: Vec<u8>) -> Self {
        Self {
            xid: 0,
            buffer_id: None,
            in_port: PseudoPort::None,
            actions,
            data,
        }
    }
}

/// Why a packet was sent to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketInReason {
    NoMatch,
    Action,
}

/// Packet received by the switch and sent to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketIn {
    pub xid: u32,
    pub buffer_id: Option<u32>,
    pub total_len: u16,
    pub in_port: u16,
    pub reason: PacketInReason,
    pub data: Vec<u8>,
}

/// A port as reported by the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchPort {
    pub port_no: u16,
    pub name: String,
    pub hw_addr: [u8; 6],
}

impl SwitchPort {
    /// Creates a port description with a zero hardware address.
    pub fn new(port_no: u16, name: impl Into<String>) -> Self {
        Self {
            port_no,
            name: name.into(),
            hw_addr: [0; 6],
        }
    }
}

/// What changed about a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatusReason {
    Add,
    Delete,
    Modify,
}

/// Port added, removed or modified on the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    pub xid: u32,
    pub reason: PortStatusReason,
    pub desc: SwitchPort,
}

/// Why a flow was removed from the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowRemovedReason {
    IdleTimeout,
    HardTimeout,
    Delete,
}

/// Flow removed notification sent by the switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRemoved {
    pub xid: u32,
    pub r#match: Match,
    pub cookie: u64,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
}

/// OpenFlow 1.0 message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OfpType {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    Vendor = 4,
    FeaturesRequest = 5,
    FeaturesReply = 6,
    GetConfigRequest = 7,
    GetConfigReply = 8,
    SetConfig = 9,
    PacketIn = 10,
    FlowRemoved = 11,
    PortStatus = 12,
    PacketOut = 13,
    FlowMod = 14,
    PortMod = 15,
    StatsRequest = 16,
    StatsReply = 17,
    BarrierRequest = 18,
    BarrierReply = 19,
    QueueGetConfigRequest = 20,
    QueueGetConfigReply = 21,
}

/// A decoded OpenFlow message.
///
/// Message types the proxy does not inspect are carried as [`OfMessage::Other`]
/// with their undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfMessage {
    FlowMod(FlowMod),
    PacketOut(PacketOut),
    PacketIn(PacketIn),
    PortStatus(PortStatus),
    FlowRemoved(FlowRemoved),
    Other {
        msg_type: OfpType,
        xid: u32,
        body: Vec<u8>,
    },
}

impl OfMessage {
    /// Returns the message type.
    pub fn msg_type(&self) -> OfpType {
        match self {
            Self::FlowMod(_) => OfpType::FlowMod,
            Self::PacketOut(_) => OfpType::PacketOut,
            Self::PacketIn(_) => OfpType::PacketIn,
            Self::PortStatus(_) => OfpType::PortStatus,
            Self::FlowRemoved(_) => OfpType::FlowRemoved,
            Self::Other { msg_type, .. } => *msg_type,
        }
    }

    /// Returns the transaction id.
    pub fn xid(&self) -> u32 {
        match self {
            Self::FlowMod(m) => m.xid,
            Self::PacketOut(m) => m.xid,
            Self::PacketIn(m) => m.xid,
            Self::PortStatus(m) => m.xid,
            Self::FlowRemoved(m) => m.xid,
            Self::Other { xid, .. } => *xid,
        }
    }
}

impl From<FlowMod> for OfMessage {
    fn from(msg: FlowMod) -> Self {
        Self::FlowMod(msg)
    }
}

impl From<PacketOut> for OfMessage {
    fn from(msg: PacketOut) -> Self {
        Self::PacketOut(msg)
    }
}

impl From<PacketIn> for OfMessage {
    fn from(msg: PacketIn) -> Self {
        Self::PacketIn(msg)
    }
}

impl From<PortStatus> for OfMessage {
    fn from(msg: PortStatus) -> Self {
        Self::PortStatus(msg)
    }
}

impl From<FlowRemoved> for OfMessage {
    fn from(msg: FlowRemoved) -> Self {
        Self::FlowRemoved(msg)
    }
}

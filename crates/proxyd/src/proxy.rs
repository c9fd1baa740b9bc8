//! Per-slice proxy session.
//!
//! A [`Proxy`] sits between one tenant controller and the shared switch.
//! Controller messages enter through [`Proxy::to_switch`] and are checked
//! against the session's slice before anything reaches the switch.
//! Switch events are handed to [`Proxy::to_controller`] by
//! [`SwitchProxies`](crate::SwitchProxies) once it decided the slice may see
//! them.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use fsfw_slicer::ofp::{FlowMod, OfMessage, PacketOut};
use fsfw_slicer::Slicer;
use parking_lot::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::channel::{ControllerChannel, SwitchConnection};
use crate::error::{ProxyError, ProxyResult};

/// Lifecycle of a proxy session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, never connected.
    Idle,
    /// A controller channel is bound.
    Connected,
    /// Disconnected. A new session is needed to reconnect.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connected => write!(f, "connected"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug)]
struct ControllerSide {
    state: SessionState,
    channel: Option<Arc<dyn ControllerChannel>>,
}

/// Policy-enforcing proxy between one controller and the switch.
pub struct Proxy {
    slicer: Arc<dyn Slicer>,
    switch: Arc<dyn SwitchConnection>,
    controller: Mutex<ControllerSide>,
    flow_count: AtomicUsize,
}

impl Proxy {
    /// Creates a session and binds the slice to the switch's ports.
    pub fn new(slicer: Arc<dyn Slicer>, switch: Arc<dyn SwitchConnection>) -> Self {
        slicer.attach_switch(&switch.ports());
        info!(
            "Created session for slice {} on switch {:#018x}",
            slicer.name(),
            switch.datapath_id()
        );

        Self {
            slicer,
            switch,
            controller: Mutex::new(ControllerSide {
                state: SessionState::Idle,
                channel: None,
            }),
            flow_count: AtomicUsize::new(0),
        }
    }

    /// Returns the slice name.
    pub fn name(&self) -> &str {
        self.slicer.name()
    }

    /// Returns the slice policy.
    pub fn slicer(&self) -> &Arc<dyn Slicer> {
        &self.slicer
    }

    /// Returns the switch's datapath id.
    pub fn datapath_id(&self) -> u64 {
        self.switch.datapath_id()
    }

    /// Returns the number of flows this session has installed.
    pub fn flow_count(&self) -> usize {
        self.flow_count.load(Ordering::Acquire)
    }

    /// Returns the session state.
    pub fn state(&self) -> SessionState {
        self.controller.lock().state
    }

    /// Returns true while a controller is bound.
    pub fn connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Binds the controller transport.
    ///
    /// A previously bound channel is closed and replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::SessionClosed`] if the session was disconnected.
    pub fn connect(&self, channel: Arc<dyn ControllerChannel>) -> ProxyResult<()> {
        let mut side = self.controller.lock();
        if side.state == SessionState::Closed {
            return Err(ProxyError::session_closed(self.name()));
        }

        if let Some(old) = side.channel.replace(channel) {
            old.close();
        }
        side.state = SessionState::Connected;
        info!("Slice {}: controller connected", self.name());
        Ok(())
    }

    /// Releases the controller transport. The session cannot be reused.
    pub fn disconnect(&self) {
        let mut side = self.controller.lock();
        if let Some(channel) = side.channel.take() {
            channel.close();
        }
        if side.state != SessionState::Closed {
            info!("Slice {}: controller disconnected", self.name());
        }
        side.state = SessionState::Closed;
    }

    /// Re-reads the switch's port list into the slice binding.
    pub fn rebind(&self) {
        self.slicer.attach_switch(&self.switch.ports());
    }

    /// Returns one unit of flow budget after a flow of this slice was removed.
    pub fn release_flow(&self) {
        let _ = self
            .flow_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_sub(1));
    }

    /// Reserves one unit of flow budget, never going past `max_flows`.
    fn reserve_flow(&self, max_flows: usize) -> bool {
        self.flow_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
                (c < max_flows).then_some(c + 1)
            })
            .is_ok()
    }

    /// Handles one message from the controller.
    ///
    /// Returns the number of messages written to the switch. A denied message
    /// is dropped and yields `Ok(0)`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::SessionClosed`] after [`disconnect`](Self::disconnect)
    /// and [`ProxyError::Transport`] when a switch write fails.
    #[instrument(skip(self, message), fields(slice = %self.name(), xid = message.xid()))]
    pub async fn to_switch(&self, message: OfMessage) -> ProxyResult<usize> {
        if self.state() == SessionState::Closed {
            return Err(ProxyError::session_closed(self.name()));
        }

        match message {
            OfMessage::FlowMod(flow_mod) => self.forward_flow_mod(flow_mod).await,
            OfMessage::PacketOut(packet_out) => self.forward_packet_out(packet_out).await,
            other => {
                self.switch.write(other).await?;
                Ok(1)
            }
        }
    }

    async fn forward_flow_mod(&self, flow_mod: FlowMod) -> ProxyResult<usize> {
        let max_flows = self.slicer.max_flows();
        if self.flow_count() >= max_flows {
            warn!(
                "Slice {}: flow ceiling {} reached, rejecting flow install",
                self.name(),
                max_flows
            );
            return Ok(0);
        }

        let flows = self.slicer.allowed_flows(&flow_mod);
        if flows.is_empty() {
            debug!("Slice {}: flow install denied", self.name());
            return Ok(0);
        }

        let mut written = 0;
        for flow in flows {
            if !self.reserve_flow(max_flows) {
                warn!(
                    "Slice {}: flow ceiling {} reached after {} installs",
                    self.name(),
                    max_flows,
                    written
                );
                break;
            }
            if let Err(e) = self.switch.write(flow.into()).await {
                self.release_flow();
                error!("Slice {}: failed to write flow install: {}", self.name(), e);
                return Err(e.into());
            }
            written += 1;
        }

        debug!(
            "Slice {}: forwarded {} flow installs, {} of {} in use",
            self.name(),
            written,
            self.flow_count(),
            max_flows
        );
        Ok(written)
    }

    async fn forward_packet_out(&self, packet_out: PacketOut) -> ProxyResult<usize> {
        if !self.slicer.admit_by_rate() {
            info!(
                "Slice {}: packet out rate exceeded ({:.1}/s), dropping",
                self.name(),
                self.slicer.current_rate()
            );
            return Ok(0);
        }
        if !self.slicer.is_packet_out_allowed(&packet_out) {
            return Ok(0);
        }

        self.switch.write(packet_out.into()).await?;
        Ok(1)
    }

    /// Sends a switch-originated message to the controller.
    ///
    /// Returns `Ok(false)` when no controller is connected.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Transport`] when the send fails.
    #[instrument(skip(self, message), fields(slice = %self.name(), xid = message.xid()))]
    pub async fn to_controller(&self, message: OfMessage) -> ProxyResult<bool> {
        let channel = {
            let side = self.controller.lock();
            match (side.state, &side.channel) {
                (SessionState::Connected, Some(channel)) => Some(Arc::clone(channel)),
                _ => None,
            }
        };

        let Some(channel) = channel else {
            debug!(
                "Slice {}: no controller, dropping {:?}",
                self.name(),
                message.msg_type()
            );
            return Ok(false);
        };

        channel.send(message).await?;
        Ok(true)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("slice", &self.name())
            .field("state", &self.state())
            .field("flow_count", &self.flow_count())
            .field("max_flows", &self.slicer.max_flows())
            .finish()
    }
}

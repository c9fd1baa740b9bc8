//! Sessions sharing one switch and the demultiplexing of its events.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use fsfw_slicer::ofp::{OfMessage, PortStatusReason};
use fsfw_slicer::{frame_vlan, Slicer};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::channel::SwitchConnection;
use crate::proxy::Proxy;

/// All proxy sessions attached to one switch, keyed by slice name.
pub struct SwitchProxies {
    switch: Arc<dyn SwitchConnection>,
    sessions: RwLock<BTreeMap<String, Arc<Proxy>>>,
}

impl SwitchProxies {
    /// Creates an empty session set for `switch`.
    pub fn new(switch: Arc<dyn SwitchConnection>) -> Self {
        Self {
            switch,
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the switch.
    pub fn switch(&self) -> &Arc<dyn SwitchConnection> {
        &self.switch
    }

    /// Creates a session for `slicer` on this switch and registers it.
    ///
    /// A session already registered under the slice name is disconnected and
    /// replaced.
    pub fn attach(&self, slicer: Arc<dyn Slicer>) -> Arc<Proxy> {
        let proxy = Arc::new(Proxy::new(slicer, Arc::clone(&self.switch)));
        let previous = self
            .sessions
            .write()
            .insert(proxy.name().to_string(), Arc::clone(&proxy));

        if let Some(previous) = previous {
            warn!("Replacing existing session for slice {}", previous.name());
            previous.disconnect();
        }
        proxy
    }

    /// Returns the session for slice `name`.
    pub fn session(&self, name: &str) -> Option<Arc<Proxy>> {
        self.sessions.read().get(name).cloned()
    }

    /// Returns every session in slice name order.
    pub fn sessions(&self) -> Vec<Arc<Proxy>> {
        self.sessions.read().values().cloned().collect()
    }

    /// Removes and disconnects the session for slice `name`.
    pub fn detach(&self, name: &str) -> Option<Arc<Proxy>> {
        let proxy = self.sessions.write().remove(name)?;
        proxy.disconnect();
        info!("Detached slice {}", name);
        Some(proxy)
    }

    /// Delivers a switch-originated message to the sessions allowed to see it.
    ///
    /// Flow-removed events release one unit of flow budget on each recipient.
    /// Slices are assumed not to share a port/VLAN pair, which
    /// [`FsfwConfig::validate`](crate::FsfwConfig::validate) enforces.
    ///
    /// Returns the number of sessions the message was sent to.
    #[instrument(skip(self, message), fields(msg_type = ?message.msg_type(), xid = message.xid()))]
    pub async fn dispatch_from_switch(&self, message: OfMessage) -> usize {
        let recipients: Vec<Arc<Proxy>> = match &message {
            OfMessage::PacketIn(packet_in) => {
                let vlan = match frame_vlan(&packet_in.data) {
                    Ok(vlan) => vlan,
                    Err(e) => {
                        debug!("Dropping packet in on port {}: {}", packet_in.in_port, e);
                        return 0;
                    }
                };
                self.sessions()
                    .into_iter()
                    .filter(|p| p.slicer().is_tag_visible(packet_in.in_port, vlan))
                    .collect()
            }
            OfMessage::FlowRemoved(removed) => {
                let Some(vlan) = removed.r#match.vlan() else {
                    debug!("Flow removed with a wildcarded vlan, not delivered");
                    return 0;
                };
                let owners: Vec<_> = match removed.r#match.input_port() {
                    Some(in_port) => self
                        .sessions()
                        .into_iter()
                        .filter(|p| p.slicer().is_tag_visible(in_port, vlan))
                        .collect(),
                    // A port-wildcarded flow can only be a collapsed install.
                    None => self
                        .sessions()
                        .into_iter()
                        .filter(|p| p.slicer().covers_switch_at(vlan))
                        .collect(),
                };
                for owner in &owners {
                    owner.release_flow();
                }
                owners
            }
            OfMessage::PortStatus(status) => {
                let sessions = self.sessions();
                if status.reason != PortStatusReason::Modify {
                    for proxy in &sessions {
                        proxy.rebind();
                    }
                }
                sessions
                    .into_iter()
                    .filter(|p| p.slicer().is_port_name_in_slice(&status.desc.name))
                    .collect()
            }
            _ => self.sessions().into_iter().filter(|p| p.connected()).collect(),
        };

        let mut delivered = 0;
        for proxy in recipients {
            match proxy.to_controller(message.clone()).await {
                Ok(true) => delivered += 1,
                Ok(false) => {}
                Err(e) => warn!("Slice {}: failed to deliver switch event: {}", proxy.name(), e),
            }
        }
        delivered
    }
}

impl fmt::Debug for SwitchProxies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchProxies")
            .field("datapath_id", &self.switch.datapath_id())
            .field("sessions", &self.sessions.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

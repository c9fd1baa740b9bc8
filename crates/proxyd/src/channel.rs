//! Transport seams between a proxy session and its peers.
//!
//! The proxy never touches sockets. It writes decoded messages through
//! [`SwitchConnection`] and [`ControllerChannel`], so the wire codec and the
//! connection handling live outside the policy path.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fsfw_slicer::ofp::{OfMessage, SwitchPort};
use tokio::sync::mpsc;

use crate::error::{TransportError, TransportResult};

/// The physical switch a set of sessions shares.
#[async_trait]
pub trait SwitchConnection: Send + Sync + fmt::Debug {
    /// Returns the switch's datapath id.
    fn datapath_id(&self) -> u64;

    /// Returns the ports the switch reported.
    fn ports(&self) -> Vec<SwitchPort>;

    /// Writes one message to the switch.
    async fn write(&self, message: OfMessage) -> TransportResult<()>;
}

/// The connection to one tenant controller.
#[async_trait]
pub trait ControllerChannel: Send + Sync + fmt::Debug {
    /// Returns true while messages can be sent.
    fn is_connected(&self) -> bool;

    /// Sends one message to the controller.
    async fn send(&self, message: OfMessage) -> TransportResult<()>;

    /// Closes the channel. Later sends fail.
    fn close(&self);
}

/// Controller channel backed by a tokio mpsc sender.
///
/// The receiving half is owned by whatever encodes messages onto the
/// controller's TCP stream.
#[derive(Debug)]
pub struct MpscControllerChannel {
    tx: mpsc::Sender<OfMessage>,
    closed: AtomicBool,
}

impl MpscControllerChannel {
    /// Wraps an existing sender.
    pub fn new(tx: mpsc::Sender<OfMessage>) -> Self {
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates a channel and the receiver for its messages.
    pub fn pair(capacity: usize) -> (Self, mpsc::Receiver<OfMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl ControllerChannel for MpscControllerChannel {
    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    async fn send(&self, message: OfMessage) -> TransportResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::closed("controller"));
        }
        self.tx
            .send(message)
            .await
            .map_err(|_| TransportError::closed("controller"))
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

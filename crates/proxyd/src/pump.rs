//! Message loops driving proxy sessions.
//!
//! Each controller connection gets its own [`pump_controller`] task and each
//! switch one [`pump_switch`] task. Messages on one stream are handled in
//! arrival order.

use std::sync::Arc;

use fsfw_slicer::ofp::OfMessage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ProxyError;
use crate::proxy::Proxy;
use crate::switch_proxies::SwitchProxies;

/// Feeds controller messages into `proxy` until the stream ends.
///
/// The session is disconnected when the stream ends. Returns the number of
/// messages written to the switch.
pub async fn pump_controller(proxy: Arc<Proxy>, mut rx: mpsc::Receiver<OfMessage>) -> usize {
    let mut forwarded = 0;

    while let Some(message) = rx.recv().await {
        match proxy.to_switch(message).await {
            Ok(written) => forwarded += written,
            Err(ProxyError::SessionClosed { .. }) => {
                debug!("Slice {}: session closed, stopping", proxy.name());
                break;
            }
            Err(e) => warn!("Slice {}: {}", proxy.name(), e),
        }
    }

    info!(
        "Slice {}: controller stream ended after {} forwarded messages",
        proxy.name(),
        forwarded
    );
    proxy.disconnect();
    forwarded
}

/// Feeds switch events into `proxies` until the stream ends.
///
/// Returns the total number of deliveries made.
pub async fn pump_switch(proxies: Arc<SwitchProxies>, mut rx: mpsc::Receiver<OfMessage>) -> usize {
    let mut delivered = 0;

    while let Some(message) = rx.recv().await {
        delivered += proxies.dispatch_from_switch(message).await;
    }

    info!(
        "Switch {:#018x}: event stream ended after {} deliveries",
        proxies.switch().datapath_id(),
        delivered
    );
    delivered
}

//! FlowSpace Firewall proxy.
//!
//! Several tenant controllers share one OpenFlow switch. Each tenant gets a
//! [`Proxy`] session that checks its controller's messages against the
//! tenant's slice before they reach the switch. Events from the switch are
//! demultiplexed by [`SwitchProxies`] to the sessions whose slice they
//! concern.
//!
//! - [`channel`]: transport traits for the switch and controller sides
//! - [`proxy`]: the per-slice session
//! - [`switch_proxies`]: sessions sharing a switch and event delivery
//! - [`pump`]: message loops feeding sessions from mpsc streams
//! - [`config`]: TOML slice configuration

pub mod channel;
pub mod config;
pub mod error;
pub mod proxy;
pub mod pump;
pub mod switch_proxies;

pub use channel::{ControllerChannel, MpscControllerChannel, SwitchConnection};
pub use config::{FsfwConfig, PortEntry, SliceEntry, VlanSpec};
pub use error::{
    ConfigError, ConfigResult, ProxyError, ProxyResult, TransportError, TransportResult,
};
pub use proxy::{Proxy, SessionState};
pub use pump::{pump_controller, pump_switch};
pub use switch_proxies::SwitchProxies;

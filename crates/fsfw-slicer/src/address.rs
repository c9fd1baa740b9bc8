//! Controller endpoint address.

use std::fmt;
use std::str::FromStr;

use crate::error::SlicerError;

/// Host and TCP port of a tenant controller.
///
/// The host may be a DNS name or an IP literal; IPv6 literals are written in
/// brackets (`[2001:db8::1]:6633`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControllerAddress {
    host: String,
    port: u16,
}

impl ControllerAddress {
    /// Creates an address from its parts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Returns the host part.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for ControllerAddress {
    type Err = SlicerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| SlicerError::InvalidAddress {
            address: s.to_string(),
            message: message.to_string(),
        };

        let (host, port) = s.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        if host.contains(':') && !s.starts_with('[') {
            return Err(invalid("IPv6 hosts must be bracketed"));
        }
        let port = port.parse::<u16>().map_err(|_| invalid("invalid port"))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for ControllerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

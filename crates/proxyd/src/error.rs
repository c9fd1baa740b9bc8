//! Error types for proxy sessions and daemon configuration.

use std::path::PathBuf;

use fsfw_slicer::SlicerError;
use thiserror::Error;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type alias for proxy session operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A message could not be handed to the switch or controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer is gone.
    #[error("{peer} connection closed")]
    Closed {
        /// Which side of the session.
        peer: String,
    },

    /// The write failed.
    #[error("Failed to write to {peer}: {message}")]
    Write {
        /// Which side of the session.
        peer: String,
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Creates a closed-connection error.
    pub fn closed(peer: impl Into<String>) -> Self {
        Self::Closed { peer: peer.into() }
    }

    /// Creates a write error.
    pub fn write(peer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            peer: peer.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by a proxy session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// Writing to the switch or controller failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The session was disconnected and cannot be reused.
    #[error("Session for slice '{slice}' is closed")]
    SessionClosed {
        /// The slice name.
        slice: String,
    },

    /// A slice policy lookup failed.
    #[error("Slicer error: {0}")]
    Slicer(#[from] SlicerError),
}

impl ProxyError {
    /// Creates a session-closed error.
    pub fn session_closed(slice: impl Into<String>) -> Self {
        Self::SessionClosed {
            slice: slice.into(),
        }
    }
}

/// Errors raised while loading or validating the daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML for the expected schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A VLAN tag or range is out of bounds or malformed.
    #[error("Slice '{slice}' port '{port}': invalid vlan '{value}'")]
    InvalidVlan {
        /// The slice name.
        slice: String,
        /// The port name.
        port: String,
        /// The offending value.
        value: String,
    },

    /// Two slices share a name.
    #[error("Duplicate slice '{0}'")]
    DuplicateSlice(String),

    /// A port is listed twice in one slice.
    #[error("Slice '{slice}': duplicate port '{port}'")]
    DuplicatePort {
        /// The slice name.
        slice: String,
        /// The port name.
        port: String,
    },

    /// Two slices allow the same VLAN on the same port.
    #[error("Slices '{first}' and '{second}' both claim vlan {vlan} on port '{port}'")]
    OverlappingSlices {
        /// The slice declared first.
        first: String,
        /// The slice declared second.
        second: String,
        /// The shared port name.
        port: String,
        /// The lowest shared VLAN.
        vlan: u16,
    },

    /// A controller address could not be parsed.
    #[error("Slice '{slice}': {source}")]
    InvalidController {
        /// The slice name.
        slice: String,
        /// The parse error.
        #[source]
        source: SlicerError,
    },

    /// Any other semantic problem.
    #[error("Slice '{slice}': {message}")]
    Invalid {
        /// The slice name.
        slice: String,
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a generic validation error.
    pub fn invalid(slice: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            slice: slice.into(),
            message: message.into(),
        }
    }
}

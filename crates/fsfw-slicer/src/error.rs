//! Error types for slice policy operations.
//!
//! Policy denials are not errors: the decision functions answer allow/deny
//! directly. The variants here describe sequencing faults and payloads the
//! engine could not interpret.

use thiserror::Error;

/// Result type alias for slicer operations.
pub type SlicerResult<T> = Result<T, SlicerError>;

/// Errors raised by the slice policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlicerError {
    /// A port lookup was made before any switch was attached to the slice.
    #[error("Slice '{slice}' is not attached to a switch, port ids are unknown")]
    NotAttached {
        /// The slice name.
        slice: String,
    },

    /// The frame embedded in a packet-out could not be decoded.
    #[error("Malformed frame: {message}")]
    MalformedFrame {
        /// Error message.
        message: String,
    },

    /// A controller address could not be parsed.
    #[error("Invalid controller address '{address}': {message}")]
    InvalidAddress {
        /// The address as given.
        address: String,
        /// Error message.
        message: String,
    },
}

impl SlicerError {
    /// Creates a not-attached error.
    pub fn not_attached(slice: impl Into<String>) -> Self {
        Self::NotAttached {
            slice: slice.into(),
        }
    }

    /// Creates a malformed frame error.
    pub fn malformed_frame(message: impl Into<String>) -> Self {
        Self::MalformedFrame {
            message: message.into(),
        }
    }
}

//! Verification helpers for recorded proxy traffic
//!
//! Provides assertion helpers over the messages a recording switch or
//! controller received.

use fsfw_slicer::ofp::{FlowMod, OfMessage, OfpType};
use thiserror::Error;

use crate::fixtures::{RecordingController, RecordingSwitch};

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Expected {expected} messages at the {side}, found {actual}")]
    CountMismatch {
        side: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Message {index} at the {side} is {actual:?}, expected {expected:?}")]
    TypeMismatch {
        side: &'static str,
        index: usize,
        expected: OfpType,
        actual: OfpType,
    },

    #[error("Expected flow installs on ports {expected:?} at the {side}, found {actual:?}")]
    PortMismatch {
        side: &'static str,
        expected: Vec<u16>,
        actual: Vec<Option<u16>>,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Recorded messages of one side of a session
#[derive(Debug)]
pub struct MessageVerifier {
    side: &'static str,
    messages: Vec<OfMessage>,
}

impl MessageVerifier {
    /// Snapshot of what the switch received
    pub fn switch(switch: &RecordingSwitch) -> Self {
        Self {
            side: "switch",
            messages: switch.written(),
        }
    }

    /// Snapshot of what the controller received
    pub fn controller(controller: &RecordingController) -> Self {
        Self {
            side: "controller",
            messages: controller.received(),
        }
    }

    /// Returns the recorded messages
    pub fn messages(&self) -> &[OfMessage] {
        &self.messages
    }

    /// Returns the recorded flow installs
    pub fn flow_mods(&self) -> Vec<&FlowMod> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                OfMessage::FlowMod(fm) => Some(fm),
                _ => None,
            })
            .collect()
    }

    /// Verify the number of recorded messages
    pub fn assert_count(&self, expected: usize) -> VerifyResult<()> {
        if self.messages.len() != expected {
            return Err(VerificationError::CountMismatch {
                side: self.side,
                expected,
                actual: self.messages.len(),
            });
        }
        Ok(())
    }

    /// Verify the recorded message types, in order
    pub fn assert_types(&self, expected: &[OfpType]) -> VerifyResult<()> {
        self.assert_count(expected.len())?;
        for (index, (message, expected)) in self.messages.iter().zip(expected).enumerate() {
            if message.msg_type() != *expected {
                return Err(VerificationError::TypeMismatch {
                    side: self.side,
                    index,
                    expected: *expected,
                    actual: message.msg_type(),
                });
            }
        }
        Ok(())
    }

    /// Verify the input ports of the recorded flow installs, in order
    pub fn assert_flow_ports(&self, expected: &[u16]) -> VerifyResult<()> {
        let actual: Vec<Option<u16>> = self
            .flow_mods()
            .iter()
            .map(|fm| fm.r#match.in_port)
            .collect();
        let matches = actual.len() == expected.len()
            && actual.iter().zip(expected).all(|(a, e)| *a == Some(*e));

        if !matches {
            return Err(VerificationError::PortMismatch {
                side: self.side,
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(())
    }
}

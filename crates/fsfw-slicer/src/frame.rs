//! VLAN extraction from raw Ethernet frames.
//!
//! Packet-out and packet-in messages carry a full frame; the slicer only
//! needs the outermost 802.1Q tag to seed its VLAN tracking.

use etherparse::{EtherType, Ethernet2Header, SingleVlanHeader};

use crate::error::{SlicerError, SlicerResult};

/// Returns the outermost VLAN id of an Ethernet frame, or 0 when untagged.
///
/// # Errors
///
/// Returns [`SlicerError::MalformedFrame`] when the Ethernet header or the
/// VLAN header it announces is truncated.
pub fn frame_vlan(data: &[u8]) -> SlicerResult<u16> {
    let (eth, rest) = Ethernet2Header::from_slice(data)
        .map_err(|e| SlicerError::malformed_frame(format!("ethernet header: {}", e)))?;

    match eth.ether_type {
        EtherType::VLAN_TAGGED_FRAME
        | EtherType::PROVIDER_BRIDGING
        | EtherType::VLAN_DOUBLE_TAGGED_FRAME => {
            let (vlan, _) = SingleVlanHeader::from_slice(rest)
                .map_err(|e| SlicerError::malformed_frame(format!("vlan header: {}", e)))?;
            Ok(vlan.vlan_id.value())
        }
        _ => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etherparse::{VlanId, VlanPcp};

    fn tagged_frame(vid: u16) -> Vec<u8> {
        let eth = Ethernet2Header {
            source: [0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa],
            destination: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
            ether_type: EtherType::VLAN_TAGGED_FRAME,
        };
        let vlan = SingleVlanHeader {
            pcp: VlanPcp::ZERO,
            drop_eligible_indicator: false,
            vlan_id: VlanId::try_new(vid).unwrap(),
            ether_type: EtherType(0x88cc),
        };
        let mut frame = eth.to_bytes().to_vec();
        frame.extend_from_slice(&vlan.to_bytes());
        frame
    }

    #[test]
    fn test_tagged_frame() {
        assert_eq!(frame_vlan(&tagged_frame(1000)).unwrap(), 1000);
        assert_eq!(frame_vlan(&tagged_frame(3000)).unwrap(), 3000);
    }

    #[test]
    fn test_untagged_frame() {
        let eth = Ethernet2Header {
            source: [1; 6],
            destination: [2; 6],
            ether_type: EtherType::IPV4,
        };
        assert_eq!(frame_vlan(&eth.to_bytes()).unwrap(), 0);
    }

    #[test]
    fn test_truncated_frames() {
        assert!(matches!(
            frame_vlan(&[0u8; 6]),
            Err(SlicerError::MalformedFrame { .. })
        ));

        let frame = tagged_frame(100);
        assert!(frame_vlan(&frame[..15]).is_err());
        assert!(frame_vlan(&[]).is_err());
    }
}

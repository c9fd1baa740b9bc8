//! Per-port VLAN membership table.

use std::fmt;

/// Lowest legal VLAN id.
pub const VLAN_MIN: u16 = 1;

/// Highest legal VLAN id (4095 is reserved).
pub const VLAN_MAX: u16 = 4094;

const WORDS: usize = 4096 / 64;

/// Set of VLAN ids permitted on a port.
///
/// Tag 0 means "untagged" and is never a member. Tags above [`VLAN_MAX`]
/// are outside the domain and are treated as not allowed.
#[derive(Clone, PartialEq, Eq)]
pub struct VlanRange {
    bits: [u64; WORDS],
}

impl VlanRange {
    /// Creates an empty table: every tag is denied.
    pub fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    /// Marks `tag` as permitted or denied.
    ///
    /// Tags outside `1..=4094` are ignored.
    pub fn set_availability(&mut self, tag: u16, allowed: bool) {
        if !(VLAN_MIN..=VLAN_MAX).contains(&tag) {
            return;
        }
        let (word, bit) = Self::slot(tag);
        if allowed {
            self.bits[word] |= bit;
        } else {
            self.bits[word] &= !bit;
        }
    }

    /// Marks every tag in `start..=end` as permitted, clamped to the legal domain.
    pub fn allow_range(&mut self, start: u16, end: u16) {
        for tag in start.max(VLAN_MIN)..=end.min(VLAN_MAX) {
            self.set_availability(tag, true);
        }
    }

    /// Returns true if `tag` was explicitly marked as permitted.
    pub fn is_allowed(&self, tag: u16) -> bool {
        if !(VLAN_MIN..=VLAN_MAX).contains(&tag) {
            return false;
        }
        let (word, bit) = Self::slot(tag);
        self.bits[word] & bit != 0
    }

    /// Number of permitted tags.
    pub fn allowed_count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the permitted tags in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (VLAN_MIN..=VLAN_MAX).filter(move |tag| self.is_allowed(*tag))
    }

    fn slot(tag: u16) -> (usize, u64) {
        let tag = usize::from(tag);
        (tag / 64, 1u64 << (tag % 64))
    }
}

impl Default for VlanRange {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<u16> for VlanRange {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut range = Self::new();
        for tag in iter {
            range.set_availability(tag, true);
        }
        range
    }
}

impl fmt::Debug for VlanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_denies_everything() {
        let range = VlanRange::new();
        assert!(!range.is_allowed(0));
        assert!(!range.is_allowed(1));
        assert!(!range.is_allowed(100));
        assert!(!range.is_allowed(4094));
        assert_eq!(range.allowed_count(), 0);
    }

    #[test]
    fn test_set_availability() {
        let mut range = VlanRange::new();
        range.set_availability(100, true);
        range.set_availability(1000, true);
        assert!(range.is_allowed(100));
        assert!(range.is_allowed(1000));
        assert!(!range.is_allowed(101));

        range.set_availability(100, false);
        assert!(!range.is_allowed(100));
        assert!(range.is_allowed(1000));
    }

    #[test]
    fn test_zero_is_never_allowed() {
        let mut range = VlanRange::new();
        range.set_availability(0, true);
        range.allow_range(0, 10);
        assert!(!range.is_allowed(0));
        assert!(range.is_allowed(1));
        assert!(range.is_allowed(10));
    }

    #[test]
    fn test_out_of_domain_tags() {
        let mut range = VlanRange::new();
        range.set_availability(4095, true);
        range.set_availability(u16::MAX, true);
        assert!(!range.is_allowed(4095));
        assert!(!range.is_allowed(u16::MAX));
        assert_eq!(range.allowed_count(), 0);

        range.allow_range(4090, 5000);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![4090, 4091, 4092, 4093, 4094]);
    }

    #[test]
    fn test_from_iterator() {
        let range: VlanRange = [102, 1000, 0].into_iter().collect();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![102, 1000]);
        assert_eq!(format!("{:?}", range), "{102, 1000}");
    }
}

//! Slice configuration file.
//!
//! Slices are described in TOML:
//!
//! ```toml
//! [[slice]]
//! name = "tenant-a"
//! controller = "ctl.example.net:6633"
//! max_flows = 1000
//! flow_rate = 100
//! rate_window_ms = 1000
//!
//! [[slice.port]]
//! name = "eth1"
//! vlans = [100, "200-210"]
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fsfw_slicer::{
    ControllerAddress, PortConfig, RateTracker, VlanRange, VlanSlicer, VLAN_MAX, VLAN_MIN,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ConfigError, ConfigResult};

/// One entry of a port's `vlans` list: a tag or an inclusive `"start-end"` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VlanSpec {
    Tag(i64),
    Range(String),
}

impl VlanSpec {
    /// Returns the inclusive tag range, or `None` if it is malformed or out of
    /// bounds.
    fn bounds(&self) -> Option<(u16, u16)> {
        let (start, end) = match self {
            Self::Tag(tag) => {
                let tag = u16::try_from(*tag).ok()?;
                (tag, tag)
            }
            Self::Range(range) => match range.split_once('-') {
                Some((start, end)) => (start.trim().parse().ok()?, end.trim().parse().ok()?),
                None => {
                    let tag = range.trim().parse().ok()?;
                    (tag, tag)
                }
            },
        };

        let valid = |tag: u16| (VLAN_MIN..=VLAN_MAX).contains(&tag);
        (valid(start) && valid(end) && start <= end).then_some((start, end))
    }
}

impl std::fmt::Display for VlanSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "{}", tag),
            Self::Range(range) => write!(f, "{}", range),
        }
    }
}

/// A port of a slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    /// Switch port name.
    pub name: String,

    /// VLAN tags the slice may use on this port.
    #[serde(default)]
    pub vlans: Vec<VlanSpec>,
}

impl PortEntry {
    fn vlan_range(&self, slice: &str) -> ConfigResult<VlanRange> {
        let mut range = VlanRange::new();
        for spec in &self.vlans {
            let (start, end) = spec.bounds().ok_or_else(|| ConfigError::InvalidVlan {
                slice: slice.to_string(),
                port: self.name.clone(),
                value: spec.to_string(),
            })?;
            range.allow_range(start, end);
        }
        Ok(range)
    }
}

/// One slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceEntry {
    /// Slice name, unique per file.
    pub name: String,

    /// Tenant controller address, `host:port`.
    pub controller: String,

    /// Maximum number of flows the slice may install.
    #[serde(default = "default_max_flows")]
    pub max_flows: usize,

    /// Packet-out budget in messages per second.
    #[serde(default = "default_flow_rate")]
    pub flow_rate: u32,

    /// Width of the rate window in milliseconds.
    #[serde(default = "default_rate_window_ms")]
    pub rate_window_ms: u64,

    /// Ports of the slice.
    #[serde(default, rename = "port")]
    pub ports: Vec<PortEntry>,
}

/// Complete daemon configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsfwConfig {
    /// Configured slices.
    #[serde(default, rename = "slice")]
    pub slices: Vec<SliceEntry>,
}

fn default_max_flows() -> usize {
    fsfw_slicer::DEFAULT_MAX_FLOWS
}

fn default_flow_rate() -> u32 {
    fsfw_slicer::rate::DEFAULT_RATE
}

fn default_rate_window_ms() -> u64 {
    1000
}

impl FsfwConfig {
    /// Loads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config file {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Checks the configuration for semantic errors.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut slice_names = HashSet::new();

        for slice in &self.slices {
            if !slice_names.insert(slice.name.as_str()) {
                return Err(ConfigError::DuplicateSlice(slice.name.clone()));
            }

            slice
                .controller
                .parse::<ControllerAddress>()
                .map_err(|source| ConfigError::InvalidController {
                    slice: slice.name.clone(),
                    source,
                })?;

            if slice.flow_rate == 0 {
                return Err(ConfigError::invalid(&slice.name, "flow_rate must be > 0"));
            }
            if slice.rate_window_ms == 0 {
                return Err(ConfigError::invalid(&slice.name, "rate_window_ms must be > 0"));
            }

            let mut port_names = HashSet::new();
            for port in &slice.ports {
                if !port_names.insert(port.name.as_str()) {
                    return Err(ConfigError::DuplicatePort {
                        slice: slice.name.clone(),
                        port: port.name.clone(),
                    });
                }
                port.vlan_range(&slice.name)?;
            }

            if slice.ports.is_empty() {
                warn!("Slice {} has no ports", slice.name);
            }
        }

        self.check_overlaps()
    }

    /// Rejects two slices allowing the same VLAN on the same port name.
    fn check_overlaps(&self) -> ConfigResult<()> {
        let mut claimed: HashMap<&str, Vec<(&str, VlanRange)>> = HashMap::new();

        for slice in &self.slices {
            for port in &slice.ports {
                let range = port.vlan_range(&slice.name)?;
                let owners = claimed.entry(port.name.as_str()).or_default();
                for (owner, other) in owners.iter() {
                    if let Some(vlan) = range.iter().find(|tag| other.is_allowed(*tag)) {
                        return Err(ConfigError::OverlappingSlices {
                            first: owner.to_string(),
                            second: slice.name.clone(),
                            port: port.name.clone(),
                            vlan,
                        });
                    }
                }
                owners.push((slice.name.as_str(), range));
            }
        }
        Ok(())
    }

    /// Validates the configuration and builds one policy per slice.
    pub fn build_slicers(&self) -> ConfigResult<Vec<Arc<VlanSlicer>>> {
        self.validate()?;

        self.slices
            .iter()
            .map(|slice| {
                let controller = slice.controller.parse::<ControllerAddress>().map_err(|source| {
                    ConfigError::InvalidController {
                        slice: slice.name.clone(),
                        source,
                    }
                })?;
                let rate = RateTracker::new(
                    slice.flow_rate,
                    Duration::from_millis(slice.rate_window_ms),
                );

                let mut slicer = VlanSlicer::new(&slice.name, controller)
                    .with_max_flows(slice.max_flows)
                    .with_rate_tracker(rate);
                for port in &slice.ports {
                    slicer = slicer.with_port(PortConfig::new(&port.name, port.vlan_range(&slice.name)?));
                }
                Ok(Arc::new(slicer))
            })
            .collect()
    }
}

//! Scenario snapshot: the tree of domains, zones, network locations,
//! physical locations and processes, with the characteristics
//! configured at every level.
//!
//! Scenarios are usually loaded from JSON documents where measures are
//! written the way they are displayed (`"5ms"`, `"100mbps"`, `"1%"`):
//!
//! ```
//! # use netchar_core::topology::Scenario;
//! let scenario = Scenario::from_json_str(r#"{
//!     "name": "demo",
//!     "deployment": {
//!         "interDomain": { "latency": "50ms", "throughputUl": "1gbps" },
//!         "domains": [{
//!             "name": "operator1",
//!             "zones": [{
//!                 "name": "zone1",
//!                 "networkLocations": [{
//!                     "name": "poa1",
//!                     "type": "POA-4G",
//!                     "terminalLink": { "latency": "1ms", "packetLoss": "1%" },
//!                     "physicalLocations": [{
//!                         "name": "ue1",
//!                         "type": "UE",
//!                         "processes": [{ "name": "ue1-app", "type": "UE-APP" }]
//!                     }]
//!                 }]
//!             }]
//!         }]
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(scenario.deployment.domains[0].zones[0].name, "zone1");
//! ```

mod kind;

pub use self::kind::{NetworkLocationKind, PhysicalLocationKind, ProcessKind, RequiredParent};
use crate::{
    measure::{Latency, PacketLoss, Throughput},
    path::Direction,
};
use anyhow::{Context as _, Result};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::path::Path;

/// Characteristics configured on one level of the topology.
///
/// Every field is optional in the scenario document. An unset
/// throughput means the level does not constrain the traffic.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Characteristics {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub latency: Latency,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub latency_variation: Latency,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub throughput_ul: Option<Throughput>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub throughput_dl: Option<Throughput>,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default)]
    pub packet_loss: PacketLoss,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub deployment: Deployment,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// traffic between domains
    #[serde(default)]
    pub inter_domain: Characteristics,
    #[serde(default)]
    pub domains: Vec<Domain>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    #[serde(default)]
    pub name: String,
    /// traffic between the zones of this domain
    #[serde(default)]
    pub inter_zone: Characteristics,
    #[serde(default)]
    pub zones: Vec<Zone>,
    /// locations attached directly to the domain (data centers, cloud)
    #[serde(default)]
    pub physical_locations: Vec<PhysicalLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default)]
    pub name: String,
    /// traffic between the network locations of this zone
    #[serde(default)]
    pub intra_zone: Characteristics,
    #[serde(default)]
    pub network_locations: Vec<NetworkLocation>,
    /// locations wired straight into the zone (edge, fog)
    #[serde(default)]
    pub physical_locations: Vec<PhysicalLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLocation {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: NetworkLocationKind,
    /// link between the point of attachment and each of its terminals
    #[serde(default)]
    pub terminal_link: Characteristics,
    #[serde(default)]
    pub physical_locations: Vec<PhysicalLocation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalLocation {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: PhysicalLocationKind,
    #[serde(default)]
    pub link: Characteristics,
    /// disconnected locations do not take part in any flow
    #[serde(default = "default_connected")]
    pub connected: bool,
    #[serde(default)]
    pub processes: Vec<Process>,
}

fn default_connected() -> bool {
    true
}

impl Default for PhysicalLocation {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: PhysicalLocationKind::default(),
            link: Characteristics::default(),
            connected: default_connected(),
            processes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProcessKind,
    /// name of the service this process exposes
    #[serde(default)]
    pub service: Option<String>,
    /// services this process talks to
    #[serde(default)]
    pub egress_service_map: Vec<EgressServiceMap>,
}

/// Declares that a process talks to every instance of `service`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressServiceMap {
    pub service: String,
    /// throughput the process asks for, greedy when unset
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub max_throughput: Option<Throughput>,
}

impl Characteristics {
    /// configured throughput for traffic travelling in `direction`
    pub fn throughput(&self, direction: Direction) -> Option<Throughput> {
        match direction {
            Direction::Uplink => self.throughput_ul,
            Direction::Downlink => self.throughput_dl,
        }
    }

    /// same throughput in both directions
    pub fn symmetric(throughput: Throughput) -> Self {
        Self {
            throughput_ul: Some(throughput),
            throughput_dl: Some(throughput),
            ..Self::default()
        }
    }
}

impl Scenario {
    /// An empty scenario: no elements, hence no flows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse scenario document")
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid scenario file {}", path.display()))
    }
}

use crate::topology::{
    Characteristics, Domain, NetworkLocation, PhysicalLocation, PhysicalLocationKind, Process,
    ProcessKind, RequiredParent, Scenario, Zone,
};
use std::collections::HashSet;
use thiserror::Error;

/// Inconsistent scenario. A pass that meets one is aborted as a whole:
/// a partial set of flows would silently under-allocate bandwidth.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("{element} without a name")]
    MissingField { element: &'static str },
    #[error("element name `{0}` is used more than once")]
    DuplicateName(String),
    #[error("physical location `{location}` ({kind}) is not attached to a {parent}")]
    MissingParent {
        location: String,
        kind: PhysicalLocationKind,
        parent: RequiredParent,
    },
}

/// Characteristics of every level enclosing a [`NetElem`], bottom-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelChars {
    /// link of the physical location itself
    pub location: Characteristics,
    /// terminal link of the point of attachment, if any
    pub terminal: Option<Characteristics>,
    /// between the network locations of the zone, if any
    pub intra_zone: Option<Characteristics>,
    /// between the zones of the domain
    pub inter_zone: Characteristics,
    /// between the domains of the deployment
    pub inter_domain: Characteristics,
}

/// Logical endpoint of a flow: one process of the scenario, with the
/// names and characteristics of everything enclosing it.
#[derive(Debug, Clone, PartialEq)]
pub struct NetElem {
    pub name: String,
    pub kind: ProcessKind,
    pub location: String,
    pub location_kind: PhysicalLocationKind,
    pub connected: bool,
    pub poa: Option<String>,
    pub zone: Option<String>,
    pub domain: String,
    pub chars: LevelChars,
}

impl NetElem {
    /// All the processes of the scenario, in document order.
    pub fn collect(scenario: &Scenario) -> Result<Vec<NetElem>, TopologyError> {
        Ok(walk(scenario)?.into_iter().map(|e| e.elem).collect())
    }
}

/// A [`NetElem`] and the process it was built from.
pub(crate) struct Endpoint<'a> {
    pub(crate) elem: NetElem,
    pub(crate) process: &'a Process,
}

pub(crate) fn walk(scenario: &Scenario) -> Result<Vec<Endpoint<'_>>, TopologyError> {
    let mut walker = Walker {
        inter_domain: &scenario.deployment.inter_domain,
        names: HashSet::new(),
        endpoints: Vec::new(),
    };

    for domain in &scenario.deployment.domains {
        walker.domain(domain)?;
    }

    Ok(walker.endpoints)
}

#[derive(Clone, Copy)]
struct Parents<'a> {
    domain: &'a Domain,
    zone: Option<&'a Zone>,
    poa: Option<&'a NetworkLocation>,
}

struct Walker<'a> {
    inter_domain: &'a Characteristics,
    names: HashSet<&'a str>,
    endpoints: Vec<Endpoint<'a>>,
}

impl<'a> Walker<'a> {
    fn name(&mut self, element: &'static str, name: &'a str) -> Result<(), TopologyError> {
        if name.is_empty() {
            return Err(TopologyError::MissingField { element });
        }
        if !self.names.insert(name) {
            return Err(TopologyError::DuplicateName(name.to_owned()));
        }
        Ok(())
    }

    fn domain(&mut self, domain: &'a Domain) -> Result<(), TopologyError> {
        self.name("domain", &domain.name)?;

        let parents = Parents {
            domain,
            zone: None,
            poa: None,
        };

        for zone in &domain.zones {
            self.zone(zone, parents)?;
        }
        for location in &domain.physical_locations {
            self.location(location, parents)?;
        }

        Ok(())
    }

    fn zone(&mut self, zone: &'a Zone, parents: Parents<'a>) -> Result<(), TopologyError> {
        self.name("zone", &zone.name)?;

        let parents = Parents {
            zone: Some(zone),
            ..parents
        };

        for network_location in &zone.network_locations {
            self.name("network location", &network_location.name)?;

            let parents = Parents {
                poa: network_location.kind.is_poa().then_some(network_location),
                ..parents
            };
            for location in &network_location.physical_locations {
                self.location(location, parents)?;
            }
        }
        for location in &zone.physical_locations {
            self.location(location, parents)?;
        }

        Ok(())
    }

    fn location(
        &mut self,
        location: &'a PhysicalLocation,
        parents: Parents<'a>,
    ) -> Result<(), TopologyError> {
        self.name("physical location", &location.name)?;

        if let Some(parent) = location.kind.required_parent() {
            let attached = match parent {
                RequiredParent::Poa => parents.poa.is_some(),
                RequiredParent::Zone => parents.zone.is_some(),
            };
            if !attached {
                return Err(TopologyError::MissingParent {
                    location: location.name.clone(),
                    kind: location.kind,
                    parent,
                });
            }
        }

        let chars = LevelChars {
            location: location.link.clone(),
            terminal: parents.poa.map(|poa| poa.terminal_link.clone()),
            intra_zone: parents.zone.map(|zone| zone.intra_zone.clone()),
            inter_zone: parents.domain.inter_zone.clone(),
            inter_domain: self.inter_domain.clone(),
        };

        for process in &location.processes {
            self.name("process", &process.name)?;

            self.endpoints.push(Endpoint {
                elem: NetElem {
                    name: process.name.clone(),
                    kind: process.kind,
                    location: location.name.clone(),
                    location_kind: location.kind,
                    connected: location.connected,
                    poa: parents.poa.map(|poa| poa.name.clone()),
                    zone: parents.zone.map(|zone| zone.name.clone()),
                    domain: parents.domain.name.clone(),
                    chars: chars.clone(),
                },
                process,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NetworkLocationKind, PhysicalLocation};

    fn location(name: &str, kind: PhysicalLocationKind, process: &str) -> PhysicalLocation {
        PhysicalLocation {
            name: name.to_owned(),
            kind,
            processes: vec![Process {
                name: process.to_owned(),
                ..Process::default()
            }],
            ..PhysicalLocation::default()
        }
    }

    fn scenario(domain: Domain) -> Scenario {
        let mut scenario = Scenario::empty();
        scenario.deployment.domains.push(domain);
        scenario
    }

    #[test]
    fn empty_scenario_has_no_elements() {
        assert!(NetElem::collect(&Scenario::empty()).unwrap().is_empty());
    }

    #[test]
    fn enclosing_names() {
        let scenario = scenario(Domain {
            name: "d1".to_owned(),
            zones: vec![Zone {
                name: "z1".to_owned(),
                network_locations: vec![
                    NetworkLocation {
                        name: "poa1".to_owned(),
                        physical_locations: vec![location(
                            "ue1",
                            PhysicalLocationKind::Ue,
                            "ue1-app",
                        )],
                        ..NetworkLocation::default()
                    },
                    NetworkLocation {
                        name: "z1-default".to_owned(),
                        kind: NetworkLocationKind::Default,
                        physical_locations: vec![location(
                            "edge1",
                            PhysicalLocationKind::Edge,
                            "edge1-app",
                        )],
                        ..NetworkLocation::default()
                    },
                ],
                ..Zone::default()
            }],
            physical_locations: vec![location("dc1", PhysicalLocationKind::Dc, "dc1-app")],
            ..Domain::default()
        });

        let elems = NetElem::collect(&scenario).unwrap();
        assert_eq!(elems.len(), 3);

        let ue = &elems[0];
        assert_eq!(ue.name, "ue1-app");
        assert_eq!(ue.location, "ue1");
        assert_eq!(ue.poa.as_deref(), Some("poa1"));
        assert_eq!(ue.zone.as_deref(), Some("z1"));
        assert_eq!(ue.domain, "d1");
        assert!(ue.chars.terminal.is_some());

        let edge = &elems[1];
        assert_eq!(edge.poa, None);
        assert_eq!(edge.zone.as_deref(), Some("z1"));
        assert!(edge.chars.terminal.is_none());

        let dc = &elems[2];
        assert_eq!(dc.poa, None);
        assert_eq!(dc.zone, None);
        assert_eq!(dc.domain, "d1");
        assert!(dc.chars.intra_zone.is_none());
    }

    #[test]
    fn missing_name() {
        let scenario = scenario(Domain::default());

        assert_eq!(
            NetElem::collect(&scenario).unwrap_err(),
            TopologyError::MissingField { element: "domain" }
        );
    }

    #[test]
    fn duplicate_name() {
        let scenario = scenario(Domain {
            name: "d1".to_owned(),
            physical_locations: vec![
                location("dc1", PhysicalLocationKind::Dc, "app"),
                location("dc2", PhysicalLocationKind::Dc, "app"),
            ],
            ..Domain::default()
        });

        assert_eq!(
            NetElem::collect(&scenario).unwrap_err(),
            TopologyError::DuplicateName("app".to_owned())
        );
    }

    #[test]
    fn ue_outside_of_a_poa() {
        let scenario = scenario(Domain {
            name: "d1".to_owned(),
            zones: vec![Zone {
                name: "z1".to_owned(),
                physical_locations: vec![location("ue1", PhysicalLocationKind::Ue, "ue1-app")],
                ..Zone::default()
            }],
            ..Domain::default()
        });

        let error = NetElem::collect(&scenario).unwrap_err();
        assert_eq!(
            error,
            TopologyError::MissingParent {
                location: "ue1".to_owned(),
                kind: PhysicalLocationKind::Ue,
                parent: RequiredParent::Poa,
            }
        );
        assert_eq!(
            error.to_string(),
            "physical location `ue1` (UE) is not attached to a point of attachment"
        );
    }

    #[test]
    fn fog_outside_of_a_zone() {
        let scenario = scenario(Domain {
            name: "d1".to_owned(),
            physical_locations: vec![location("fog1", PhysicalLocationKind::Fog, "fog1-app")],
            ..Domain::default()
        });

        assert!(matches!(
            NetElem::collect(&scenario),
            Err(TopologyError::MissingParent {
                parent: RequiredParent::Zone,
                ..
            })
        ));
    }
}

//! Hierarchical path between two [`NetElem`]s.
//!
//! The topology is a tree, so there is exactly one way between two
//! elements: up from the source to the lowest level both elements
//! have in common, then down to the destination. Every link crossed on
//! the way up is an [`Direction::Uplink`] hop, every link crossed on
//! the way down a [`Direction::Downlink`] one.
//!
//! ```text
//!                     inter-domain
//!            ┌────────────┴────────────┐
//!         domain1                   domain2
//!      ┌─────┴─────┐  inter-zone
//!    zone1       zone2
//!   ┌──┴──┐  intra-zone (backhaul)
//!  poa1  poa2
//!   │     │  terminal link
//!  ue1   ue2
//! ```

use crate::{
    elem::NetElem,
    measure::{Latency, PacketLoss, Throughput},
    topology::Characteristics,
};
use std::fmt;
use thiserror::Error;

/// Which way a flow crosses a link.
///
/// Each link of the topology is modelled as two independent segments,
/// one per direction, so traffic in one direction does not consume
/// capacity in the other. The direction also selects which of the
/// configured uplink and downlink throughput applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// toward the core of the network
    Uplink,
    /// toward the destination leaf
    Downlink,
}

/// The lowest level of the topology two elements have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Poa,
    Zone,
    Domain,
    /// nothing in common but the deployment
    Root,
}

/// The tier of the link a hop crosses, bottom-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HopKind {
    /// physical location to its point of attachment (or straight into
    /// its zone or domain when it has none)
    Terminal,
    /// point of attachment to its zone
    Backhaul,
    /// zone to its domain
    Zone,
    /// domain to the rest of the deployment
    InterDomain,
}

/// A link of the topology, named after the levels it joins.
///
/// Names are only unique within a tier, so the tier is part of the
/// identity: a location named `z-p` and the backhaul of PoA `p` in zone
/// `z` are different links.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkKey {
    Terminal { location: String },
    Backhaul { zone: String, poa: String },
    Zone { domain: String, zone: String },
    InterDomain { domain: String },
}

/// Identity of a segment: a link, crossed in one direction.
///
/// Displayed as `<location>-<dir>`, `<zone>-<poa>-<dir>`,
/// `<domain>-<zone>-<dir>` or `<domain>-interDomain-<dir>`. The display
/// is for humans; two keys are equal only if their parts are.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentKey {
    pub link: LinkKey,
    pub direction: Direction,
}

/// Link characteristics as seen by a flow crossing a hop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HopLink {
    /// `None` when no level of the ancestry configures a throughput
    pub capacity: Option<Throughput>,
    pub latency: Latency,
    pub jitter: Latency,
    pub packet_loss: PacketLoss,
}

/// One link crossed by a flow, in a given direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PathHop {
    /// key of the segment, identical for every flow crossing the same
    /// link in the same direction
    pub key: SegmentKey,
    pub kind: HopKind,
    pub direction: Direction,
    pub link: HopLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("cannot build a path from `{0}` to itself")]
    SameElement(String),
    #[error("`{src}` and `{dst}` are both on `{location}`, no link to cross")]
    SameLocation {
        src: String,
        dst: String,
        location: String,
    },
}

impl Direction {
    #[must_use = "function does not modify the current value"]
    pub fn reverse(self) -> Self {
        match self {
            Self::Uplink => Self::Downlink,
            Self::Downlink => Self::Uplink,
        }
    }
}

impl LinkKey {
    pub fn kind(&self) -> HopKind {
        match self {
            Self::Terminal { .. } => HopKind::Terminal,
            Self::Backhaul { .. } => HopKind::Backhaul,
            Self::Zone { .. } => HopKind::Zone,
            Self::InterDomain { .. } => HopKind::InterDomain,
        }
    }
}

impl SegmentKey {
    pub fn new(link: LinkKey, direction: Direction) -> Self {
        Self { link, direction }
    }

    pub fn terminal(location: impl Into<String>, direction: Direction) -> Self {
        Self::new(
            LinkKey::Terminal {
                location: location.into(),
            },
            direction,
        )
    }

    pub fn backhaul(zone: impl Into<String>, poa: impl Into<String>, direction: Direction) -> Self {
        Self::new(
            LinkKey::Backhaul {
                zone: zone.into(),
                poa: poa.into(),
            },
            direction,
        )
    }

    pub fn zone(domain: impl Into<String>, zone: impl Into<String>, direction: Direction) -> Self {
        Self::new(
            LinkKey::Zone {
                domain: domain.into(),
                zone: zone.into(),
            },
            direction,
        )
    }

    pub fn inter_domain(domain: impl Into<String>, direction: Direction) -> Self {
        Self::new(
            LinkKey::InterDomain {
                domain: domain.into(),
            },
            direction,
        )
    }

    pub fn kind(&self) -> HopKind {
        self.link.kind()
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = self.direction;
        let key = match &self.link {
            LinkKey::Terminal { location } => format!("{location}-{direction}"),
            LinkKey::Backhaul { zone, poa } => format!("{zone}-{poa}-{direction}"),
            LinkKey::Zone { domain, zone } => format!("{domain}-{zone}-{direction}"),
            LinkKey::InterDomain { domain } => format!("{domain}-interDomain-{direction}"),
        };
        f.pad(&key)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uplink => f.write_str("uplink"),
            Self::Downlink => f.write_str("downlink"),
        }
    }
}

/// The lowest level of the topology `src` and `dst` have in common.
pub fn common_level(src: &NetElem, dst: &NetElem) -> Level {
    if src.poa.is_some() && src.poa == dst.poa {
        Level::Poa
    } else if src.zone.is_some() && src.zone == dst.zone {
        Level::Zone
    } else if src.domain == dst.domain {
        Level::Domain
    } else {
        Level::Root
    }
}

/// Build the ordered hops a flow from `src` to `dst` traverses.
///
/// The source's uplinks come first, bottom-up, followed by the
/// destination's downlinks, top-down. Levels an element does not have
/// (no point of attachment, no zone) are skipped.
///
/// This only reads the two elements; building the same path twice
/// gives the same result.
pub fn build_path(src: &NetElem, dst: &NetElem) -> Result<Vec<PathHop>, PathError> {
    if src.name == dst.name {
        return Err(PathError::SameElement(src.name.clone()));
    }
    if src.location == dst.location {
        return Err(PathError::SameLocation {
            src: src.name.clone(),
            dst: dst.name.clone(),
            location: src.location.clone(),
        });
    }

    let level = common_level(src, dst);

    let mut path = hops(src, level, Direction::Uplink);
    let mut down = hops(dst, level, Direction::Downlink);
    down.reverse();
    path.append(&mut down);

    Ok(path)
}

/// the hops between `elem` and `level`, bottom-up
fn hops(elem: &NetElem, level: Level, direction: Direction) -> Vec<PathHop> {
    let mut hops = Vec::with_capacity(4);

    hops.push(terminal_hop(elem, direction));

    if level > Level::Poa
        && let (Some(poa), Some(zone)) = (&elem.poa, &elem.zone)
    {
        let intra_zone = elem.chars.intra_zone.as_ref();
        hops.push(PathHop {
            key: SegmentKey::backhaul(zone, poa, direction),
            kind: HopKind::Backhaul,
            direction,
            link: level_link(
                intra_zone,
                &[Some(&elem.chars.inter_zone), Some(&elem.chars.inter_domain)],
                direction,
            ),
        });
    }

    if level > Level::Zone
        && let Some(zone) = &elem.zone
    {
        hops.push(PathHop {
            key: SegmentKey::zone(&elem.domain, zone, direction),
            kind: HopKind::Zone,
            direction,
            link: level_link(
                Some(&elem.chars.inter_zone),
                &[Some(&elem.chars.inter_domain)],
                direction,
            ),
        });
    }

    if level == Level::Root {
        hops.push(PathHop {
            key: SegmentKey::inter_domain(&elem.domain, direction),
            kind: HopKind::InterDomain,
            direction,
            link: level_link(Some(&elem.chars.inter_domain), &[], direction),
        });
    }

    hops
}

/// The terminal hop combines the location's own link with the terminal
/// link of its point of attachment: latencies add up, losses compound
/// and the smaller throughput wins.
fn terminal_hop(elem: &NetElem, direction: Direction) -> PathHop {
    let location = &elem.chars.location;
    let terminal = elem.chars.terminal.as_ref();

    let own = Throughput::min_of(
        location.throughput(direction),
        terminal.and_then(|t| t.throughput(direction)),
    );
    let capacity = own.or_else(|| {
        ceiling(
            &[
                elem.chars.intra_zone.as_ref(),
                Some(&elem.chars.inter_zone),
                Some(&elem.chars.inter_domain),
            ],
            direction,
        )
    });

    let link = match terminal {
        Some(terminal) => HopLink {
            capacity,
            latency: location.latency + terminal.latency,
            jitter: location.latency_variation + terminal.latency_variation,
            packet_loss: location.packet_loss.compound(terminal.packet_loss),
        },
        None => HopLink {
            capacity,
            latency: location.latency,
            jitter: location.latency_variation,
            packet_loss: location.packet_loss,
        },
    };

    PathHop {
        key: SegmentKey::terminal(&elem.location, direction),
        kind: HopKind::Terminal,
        direction,
        link,
    }
}

/// Link of a shared level: its own characteristics, with the capacity
/// falling back to the nearest configured ceiling of the `ancestry`.
fn level_link(
    own: Option<&Characteristics>,
    ancestry: &[Option<&Characteristics>],
    direction: Direction,
) -> HopLink {
    let capacity = own
        .and_then(|chars| chars.throughput(direction))
        .or_else(|| ceiling(ancestry, direction));

    match own {
        Some(chars) => HopLink {
            capacity,
            latency: chars.latency,
            jitter: chars.latency_variation,
            packet_loss: chars.packet_loss,
        },
        None => HopLink {
            capacity,
            ..HopLink::default()
        },
    }
}

fn ceiling(ancestry: &[Option<&Characteristics>], direction: Direction) -> Option<Throughput> {
    ancestry
        .iter()
        .flatten()
        .find_map(|chars| chars.throughput(direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        elem::LevelChars,
        topology::{PhysicalLocationKind, ProcessKind},
    };

    fn elem(name: &str, poa: Option<&str>, zone: Option<&str>, domain: &str) -> NetElem {
        NetElem {
            name: format!("{name}-app"),
            kind: ProcessKind::UeApp,
            location: name.to_owned(),
            location_kind: PhysicalLocationKind::Ue,
            connected: true,
            poa: poa.map(str::to_owned),
            zone: zone.map(str::to_owned),
            domain: domain.to_owned(),
            chars: LevelChars {
                terminal: poa.map(|_| Characteristics::default()),
                intra_zone: zone.map(|_| Characteristics::default()),
                ..LevelChars::default()
            },
        }
    }

    fn keys(path: &[PathHop]) -> Vec<String> {
        path.iter().map(|hop| hop.key.to_string()).collect()
    }

    #[test]
    fn same_poa() {
        let a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let b = elem("ue2", Some("poa1"), Some("z1"), "d1");

        let path = build_path(&a, &b).unwrap();

        assert_eq!(keys(&path), ["ue1-uplink", "ue2-downlink"]);
    }

    #[test]
    fn same_zone() {
        let a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let b = elem("ue2", Some("poa2"), Some("z1"), "d1");

        let path = build_path(&a, &b).unwrap();

        assert_eq!(
            keys(&path),
            [
                "ue1-uplink",
                "z1-poa1-uplink",
                "z1-poa2-downlink",
                "ue2-downlink"
            ]
        );
    }

    #[test]
    fn same_domain() {
        let a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let b = elem("ue2", Some("poa2"), Some("z2"), "d1");

        let path = build_path(&a, &b).unwrap();

        assert_eq!(
            keys(&path),
            [
                "ue1-uplink",
                "z1-poa1-uplink",
                "d1-z1-uplink",
                "d1-z2-downlink",
                "z2-poa2-downlink",
                "ue2-downlink"
            ]
        );
    }

    #[test]
    fn cross_domain() {
        let a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let b = elem("ue2", Some("poa2"), Some("z2"), "d2");

        let path = build_path(&a, &b).unwrap();

        assert_eq!(
            keys(&path),
            [
                "ue1-uplink",
                "z1-poa1-uplink",
                "d1-z1-uplink",
                "d1-interDomain-uplink",
                "d2-interDomain-downlink",
                "d2-z2-downlink",
                "z2-poa2-downlink",
                "ue2-downlink"
            ]
        );
        assert_eq!(
            path.iter().map(|hop| hop.kind).collect::<Vec<_>>(),
            [
                HopKind::Terminal,
                HopKind::Backhaul,
                HopKind::Zone,
                HopKind::InterDomain,
                HopKind::InterDomain,
                HopKind::Zone,
                HopKind::Backhaul,
                HopKind::Terminal,
            ]
        );
    }

    #[test]
    fn no_poa_enters_at_the_upper_level() {
        let ue = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let edge = elem("edge1", None, Some("z1"), "d1");
        let cloud = elem("cloud1", None, None, "d2");

        assert_eq!(
            keys(&build_path(&ue, &edge).unwrap()),
            ["ue1-uplink", "z1-poa1-uplink", "edge1-downlink"]
        );
        assert_eq!(
            keys(&build_path(&edge, &cloud).unwrap()),
            [
                "edge1-uplink",
                "d1-z1-uplink",
                "d1-interDomain-uplink",
                "d2-interDomain-downlink",
                "cloud1-downlink"
            ]
        );
    }

    #[test]
    fn path_symmetry() {
        let elems = [
            elem("ue1", Some("poa1"), Some("z1"), "d1"),
            elem("ue2", Some("poa1"), Some("z1"), "d1"),
            elem("ue3", Some("poa2"), Some("z1"), "d1"),
            elem("edge1", None, Some("z2"), "d1"),
            elem("cloud1", None, None, "d2"),
        ];

        for a in &elems {
            for b in elems.iter().filter(|b| b.name != a.name) {
                let forward = build_path(a, b).unwrap();
                let mut backward = build_path(b, a).unwrap();
                backward.reverse();

                assert_eq!(forward.len(), backward.len());
                for (f, b) in forward.iter().zip(&backward) {
                    assert_eq!(f.kind, b.kind);
                    assert_eq!(f.direction, b.direction.reverse());
                }
            }
        }
    }

    #[test]
    fn rejects_same_element_and_location() {
        let a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        let mut b = a.clone();
        b.name = "ue1-other-app".to_owned();

        assert_eq!(
            build_path(&a, &a),
            Err(PathError::SameElement("ue1-app".to_owned()))
        );
        assert!(matches!(
            build_path(&a, &b),
            Err(PathError::SameLocation { .. })
        ));
    }

    #[test]
    fn asymmetric_throughput() {
        let mut a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        a.chars.location.throughput_ul = Some(Throughput::from_mbps(10.0));
        a.chars.location.throughput_dl = Some(Throughput::from_mbps(100.0));
        let b = elem("ue2", Some("poa1"), Some("z1"), "d1");

        let up = build_path(&a, &b).unwrap();
        let down = build_path(&b, &a).unwrap();

        assert_eq!(up[0].link.capacity, Some(Throughput::from_mbps(10.0)));
        assert_eq!(down[1].link.capacity, Some(Throughput::from_mbps(100.0)));
    }

    #[test]
    fn terminal_combines_location_and_poa() {
        let mut a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        a.chars.location = Characteristics {
            latency: Latency::from_millis(1),
            packet_loss: PacketLoss::rate(0.01).unwrap(),
            ..Characteristics::symmetric(Throughput::from_mbps(1_000.0))
        };
        a.chars.terminal = Some(Characteristics {
            latency: Latency::from_millis(4),
            latency_variation: Latency::from_millis(2),
            packet_loss: PacketLoss::rate(0.02).unwrap(),
            ..Characteristics::symmetric(Throughput::from_mbps(50.0))
        });

        let hop = terminal_hop(&a, Direction::Uplink);

        assert_eq!(hop.link.capacity, Some(Throughput::from_mbps(50.0)));
        assert_eq!(hop.link.latency, Latency::from_millis(5));
        assert_eq!(hop.link.jitter, Latency::from_millis(2));
        assert!((hop.link.packet_loss.as_percent() - 2.98).abs() < 1e-9);
    }

    #[test]
    fn capacity_falls_back_to_the_ancestry() {
        let mut a = elem("ue1", Some("poa1"), Some("z1"), "d1");
        a.chars.inter_zone = Characteristics::symmetric(Throughput::from_mbps(300.0));
        a.chars.inter_domain = Characteristics::symmetric(Throughput::from_mbps(900.0));

        assert_eq!(
            terminal_hop(&a, Direction::Uplink).link.capacity,
            Some(Throughput::from_mbps(300.0))
        );

        let cloud = elem("cloud1", None, None, "d2");
        let path = build_path(&a, &cloud).unwrap();
        let inter_domain = path
            .iter()
            .find(|hop| hop.kind == HopKind::InterDomain)
            .unwrap();
        assert_eq!(inter_domain.link.capacity, Some(Throughput::from_mbps(900.0)));

        // nothing configured anywhere for the cloud element
        assert_eq!(path.last().unwrap().link.capacity, None);
    }

    #[test]
    fn hyphenated_names_do_not_merge_links() {
        // location `z-p` displays like the backhaul of `p` in `z`
        let a = elem("z-p", Some("p"), Some("z"), "d");
        let b = elem("ue2", Some("q"), Some("z"), "d");

        let path = build_path(&a, &b).unwrap();

        assert_eq!(path[0].key.to_string(), path[1].key.to_string());
        assert_ne!(path[0].key, path[1].key);
        assert_eq!(path[0].key, SegmentKey::terminal("z-p", Direction::Uplink));
        assert_eq!(path[1].key, SegmentKey::backhaul("z", "p", Direction::Uplink));

        // domain `a` + zone `b-c` against zone `a-b` + PoA `c`
        assert_ne!(
            SegmentKey::zone("a", "b-c", Direction::Uplink),
            SegmentKey::backhaul("a-b", "c", Direction::Uplink)
        );
    }

    #[test]
    fn segment_key_display() {
        assert_eq!(
            SegmentKey::inter_domain("d1", Direction::Downlink).to_string(),
            "d1-interDomain-downlink"
        );
        assert_eq!(
            format!("{:<12}|", SegmentKey::terminal("ue1", Direction::Uplink)),
            "ue1-uplink  |"
        );
        assert_eq!(
            SegmentKey::zone("d1", "z1", Direction::Uplink).kind(),
            HopKind::Zone
        );
    }
}

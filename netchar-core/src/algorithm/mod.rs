mod fair_share;

use self::fair_share::max_min_share;
use crate::{
    elem::TopologyError,
    flow::{extract_flows, Flow, FlowId, FlowKey, FlowMap, FlowSet, Hop},
    measure::{Latency, NetChar, PacketLoss, Throughput},
    path::build_path,
    segment::SegmentMap,
    stats::{AlgorithmStats, FlowStats, SegmentStats},
    topology::Scenario,
};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Network characteristics of one flow, as published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct NetCharUpdate {
    pub src: String,
    pub dst: String,
    pub net_char: NetChar,
}

/// Updates computed by [`SegmentAlgorithm::prepare_net_char`] and not
/// yet published.
#[derive(Debug, Default)]
#[must_use = "nothing is published until the updates are committed"]
pub struct PendingUpdates {
    updates: Vec<NetCharUpdate>,
    current: HashMap<FlowKey, NetChar>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unprocessed,
    Processed,
}

/// Segmentation and bandwidth sharing of the flows of a scenario.
///
/// Use [`SegmentAlgorithm::process_scenario`] to (re)build the flows
/// and segments of a scenario, then
/// [`SegmentAlgorithm::calculate_net_char`] to allocate the bandwidth
/// and collect the characteristics that changed since the previous
/// call.
///
/// ```
/// # use netchar_core::{SegmentAlgorithm, Scenario};
/// let mut algorithm = SegmentAlgorithm::new();
/// assert!(algorithm.calculate_net_char().is_empty());
///
/// algorithm.process_scenario(&Scenario::empty()).unwrap();
/// assert!(algorithm.flow_map().is_empty());
/// ```
#[derive(Debug)]
pub struct SegmentAlgorithm {
    state: State,
    flows: FlowMap,
    segments: SegmentMap,
    /// last characteristics published, per flow
    published: HashMap<FlowKey, NetChar>,
}

impl PendingUpdates {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}

impl SegmentAlgorithm {
    pub fn new() -> Self {
        Self {
            state: State::Unprocessed,
            flows: FlowMap::new(),
            segments: SegmentMap::new(),
            published: HashMap::new(),
        }
    }

    /// `true` once a scenario went through [`Self::process_scenario`]
    pub fn is_processed(&self) -> bool {
        self.state == State::Processed
    }

    pub fn flow_map(&self) -> &FlowMap {
        &self.flows
    }

    pub fn segment_map(&self) -> &SegmentMap {
        &self.segments
    }

    /// Rebuild the flows and segments from a scenario snapshot.
    ///
    /// On error nothing changes: the flows and segments of the previous
    /// scenario stay in place.
    pub fn process_scenario(&mut self, scenario: &Scenario) -> Result<(), TopologyError> {
        debug!(scenario = %scenario.name, "processing scenario");

        let set = extract_flows(scenario)?;
        let (flows, segments) = aggregate(&set);

        debug!(
            scenario = %scenario.name,
            elements = set.elems.len(),
            flows = flows.len(),
            segments = segments.len(),
            "scenario processed"
        );

        self.flows = flows;
        self.segments = segments;
        self.state = State::Processed;

        Ok(())
    }

    /// Allocate the bandwidth and return the characteristics of every
    /// flow whose values changed since the previous call.
    ///
    /// Before any scenario was processed there is nothing to compute
    /// and the list is empty.
    pub fn calculate_net_char(&mut self) -> Vec<NetCharUpdate> {
        let pending = self.prepare_net_char();
        self.commit(pending)
    }

    /// Allocate the bandwidth without publishing anything: until the
    /// result is given to [`Self::commit`], the next call computes the
    /// changes against the same previous publication.
    pub fn prepare_net_char(&mut self) -> PendingUpdates {
        if self.state == State::Unprocessed {
            return PendingUpdates::default();
        }

        let shares = max_min_share(&self.flows, &self.segments);

        let mut pending = PendingUpdates {
            updates: Vec::new(),
            current: HashMap::with_capacity(self.flows.len()),
        };

        let ids: Vec<_> = self.flows.iter().map(|(id, _)| id).collect();
        for (id, throughput) in ids.into_iter().zip(shares) {
            let mut net_char = path_char(&self.segments, self.flows_path(id));
            net_char.throughput = throughput;

            let Some(flow) = self.flows.get_mut(id) else {
                continue;
            };
            flow.result = Some(net_char);

            if self.published.get(&flow.key) != Some(&net_char) {
                pending.updates.push(NetCharUpdate {
                    src: flow.src.clone(),
                    dst: flow.dst.clone(),
                    net_char,
                });
            }
            pending.current.insert(flow.key.clone(), net_char);
        }

        debug!(
            flows = self.flows.len(),
            updates = pending.updates.len(),
            "bandwidth allocated"
        );

        pending
    }

    /// Record `pending` as published and hand out its updates. Flows
    /// absent from `pending` are forgotten.
    pub fn commit(&mut self, pending: PendingUpdates) -> Vec<NetCharUpdate> {
        self.published = pending.current;
        pending.updates
    }

    /// snapshot of the segments and flows of the last pass
    pub fn stats(&self) -> AlgorithmStats {
        let segments = self
            .segments
            .iter()
            .map(|(_, segment)| SegmentStats {
                key: segment.key().clone(),
                kind: segment.kind(),
                direction: segment.direction(),
                capacity: segment.capacity(),
                allocated: Throughput::from_mbps(
                    segment
                        .flows()
                        .iter()
                        .filter_map(|id| self.flows.get(*id))
                        .filter_map(|flow| flow.result().and_then(|r| r.throughput))
                        .map(Throughput::as_mbps)
                        .sum(),
                ),
                flows: segment.flows().len(),
            })
            .collect();

        let flows = self
            .flows
            .iter()
            .map(|(_, flow)| FlowStats {
                key: flow.key().clone(),
                src: flow.src().to_owned(),
                dst: flow.dst().to_owned(),
                demand: flow.demand(),
                path: flow
                    .path()
                    .iter()
                    .filter_map(|hop| self.segments.get(hop.segment))
                    .map(|segment| segment.key().clone())
                    .collect(),
                net_char: flow.result().copied(),
            })
            .collect();

        AlgorithmStats { segments, flows }
    }

    fn flows_path(&self, id: FlowId) -> &[Hop] {
        self.flows.get(id).map(Flow::path).unwrap_or_default()
    }
}

impl Default for SegmentAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the flows of `set` along with the segments their paths cross.
fn aggregate(set: &FlowSet) -> (FlowMap, SegmentMap) {
    let mut flows = FlowMap::new();
    let mut segments = SegmentMap::new();

    for spec in &set.flows {
        let src = &set.elems[spec.src];
        let dst = &set.elems[spec.dst];

        let path = match build_path(src, dst) {
            Ok(path) => path,
            Err(error) => {
                warn!(flow = %spec.key, %error, "flow excluded, no path");
                continue;
            }
        };

        let hops: Vec<Hop> = path
            .iter()
            .map(|hop| Hop {
                segment: segments.get_or_insert(hop),
                direction: hop.direction,
            })
            .collect();

        let id = flows.insert(Flow {
            key: spec.key.clone(),
            src: src.name.clone(),
            dst: dst.name.clone(),
            demand: spec.demand,
            path: hops.clone(),
            result: None,
        });
        for hop in hops {
            segments.attach(hop.segment, id);
        }
    }

    (flows, segments)
}

/// Latency, jitter and loss accumulated along `path`. Every hop adds
/// its full latency and jitter, losses compound.
fn path_char(segments: &SegmentMap, path: &[Hop]) -> NetChar {
    path.iter()
        .filter_map(|hop| segments.get(hop.segment))
        .fold(
            NetChar {
                latency: Latency::ZERO,
                jitter: Latency::ZERO,
                throughput: None,
                packet_loss: PacketLoss::None,
            },
            |acc, segment| NetChar {
                latency: acc.latency + segment.latency(),
                jitter: acc.jitter + segment.jitter(),
                throughput: None,
                packet_loss: acc.packet_loss.compound(segment.packet_loss()),
            },
        )
}

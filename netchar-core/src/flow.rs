//! Flows: directed traffic streams between two processes, derived from
//! the services processes expose and the services they talk to.

use crate::{
    elem::{walk, NetElem, TopologyError},
    measure::{NetChar, Throughput},
    path::Direction,
    segment::SegmentId,
    topology::Scenario,
};
use std::{collections::HashMap, fmt};

/// Unique key of a flow: its source and destination process, displayed
/// as `"<src>-><dst>"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey {
    src: String,
    dst: String,
}

/// Index of a [`Flow`] in its [`FlowMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowId(usize);

/// A flow as declared by the scenario, before any path is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSpec {
    pub key: FlowKey,
    /// index of the source in [`FlowSet::elems`]
    pub src: usize,
    /// index of the destination in [`FlowSet::elems`]
    pub dst: usize,
    /// `None` for a greedy flow, taking whatever it is given
    pub demand: Option<Throughput>,
}

/// Everything the flow extractor derives from one scenario snapshot.
#[derive(Debug, Clone, Default)]
pub struct FlowSet {
    pub elems: Vec<NetElem>,
    pub flows: Vec<FlowSpec>,
}

/// One segment crossed by a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hop {
    pub segment: SegmentId,
    pub direction: Direction,
}

/// A flow with its path resolved to segments, and the characteristics
/// computed for it by the last allocation.
#[derive(Debug, Clone)]
pub struct Flow {
    pub(crate) key: FlowKey,
    pub(crate) src: String,
    pub(crate) dst: String,
    pub(crate) demand: Option<Throughput>,
    pub(crate) path: Vec<Hop>,
    pub(crate) result: Option<NetChar>,
}

/// All the flows of a pass, addressed by [`FlowId`] or by [`FlowKey`].
#[derive(Debug, Clone, Default)]
pub struct FlowMap {
    flows: Vec<Flow>,
    index: HashMap<FlowKey, FlowId>,
}

impl FlowKey {
    pub fn new(src: &str, dst: &str) -> Self {
        Self {
            src: src.to_owned(),
            dst: dst.to_owned(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.src, self.dst)
    }
}

impl FlowId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Flow {
    pub fn key(&self) -> &FlowKey {
        &self.key
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn dst(&self) -> &str {
        &self.dst
    }

    pub fn demand(&self) -> Option<Throughput> {
        self.demand
    }

    /// the segments crossed, in traversal order; never empty
    pub fn path(&self) -> &[Hop] {
        &self.path
    }

    /// `None` until the flow went through an allocation
    pub fn result(&self) -> Option<&NetChar> {
        self.result.as_ref()
    }
}

impl FlowMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, flow: Flow) -> FlowId {
        let id = FlowId(self.flows.len());
        self.index.insert(flow.key.clone(), id);
        self.flows.push(flow);
        id
    }

    pub fn get(&self, id: FlowId) -> Option<&Flow> {
        self.flows.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: FlowId) -> Option<&mut Flow> {
        self.flows.get_mut(id.0)
    }

    /// the flow from `key.src()` to `key.dst()`, if the pass has one
    pub fn by_key(&self, key: &FlowKey) -> Option<&Flow> {
        self.index.get(key).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlowId, &Flow)> {
        self.flows
            .iter()
            .enumerate()
            .map(|(index, flow)| (FlowId(index), flow))
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Derive every flow implied by the scenario's service maps.
///
/// A process naming service `S` in its egress service map talks to
/// every process exposing `S`: this produces one flow each way, the
/// responses travelling back to the requester. Processes of
/// disconnected locations and pairs sharing a physical location are
/// left out. When the same pair is declared more than once, a greedy
/// declaration wins over any bounded one, otherwise the largest demand
/// is kept.
///
/// Any inconsistency of the scenario aborts the extraction.
pub fn extract_flows(scenario: &Scenario) -> Result<FlowSet, TopologyError> {
    let endpoints = walk(scenario)?;

    let mut providers: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, endpoint) in endpoints.iter().enumerate() {
        if let Some(service) = endpoint.process.service.as_deref() {
            providers.entry(service).or_default().push(index);
        }
    }

    let mut flows: Vec<FlowSpec> = Vec::new();
    let mut pairs: HashMap<(usize, usize), usize> = HashMap::new();

    let mut declare = |src: usize, dst: usize, demand: Option<Throughput>| {
        if let Some(&existing) = pairs.get(&(src, dst)) {
            let flow: &mut FlowSpec = &mut flows[existing];
            flow.demand = merge_demand(flow.demand, demand);
            return;
        }
        pairs.insert((src, dst), flows.len());
        flows.push(FlowSpec {
            key: FlowKey::new(&endpoints[src].elem.name, &endpoints[dst].elem.name),
            src,
            dst,
            demand,
        });
    };

    for (consumer, endpoint) in endpoints.iter().enumerate() {
        if !endpoint.elem.connected {
            continue;
        }

        for egress in &endpoint.process.egress_service_map {
            let Some(instances) = providers.get(egress.service.as_str()) else {
                tracing::debug!(
                    process = %endpoint.elem.name,
                    service = %egress.service,
                    "no instance of the service in the scenario"
                );
                continue;
            };

            for &provider in instances {
                let other = &endpoints[provider].elem;
                if !other.connected || other.location == endpoint.elem.location {
                    continue;
                }

                declare(consumer, provider, egress.max_throughput);
                declare(provider, consumer, egress.max_throughput);
            }
        }
    }

    Ok(FlowSet {
        elems: endpoints.into_iter().map(|endpoint| endpoint.elem).collect(),
        flows,
    })
}

fn merge_demand(a: Option<Throughput>, b: Option<Throughput>) -> Option<Throughput> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if a >= b { a } else { b }),
        _ => None,
    }
}

use crate::{
    flow::FlowId,
    measure::{Latency, PacketLoss, Throughput},
    path::{Direction, HopKind, HopLink, PathHop, SegmentKey},
};
use std::collections::HashMap;

/// Index of a [`Segment`] in its [`SegmentMap`].
///
/// Identifiers are only meaningful for the map that issued them: every
/// pass rebuilds the map and the identifiers with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(usize);

/// A link of the topology, in one direction, and the flows sharing it.
#[derive(Debug, Clone)]
pub struct Segment {
    key: SegmentKey,
    kind: HopKind,
    direction: Direction,
    link: HopLink,
    flows: Vec<FlowId>,
}

/// Arena of the segments of a pass, addressed by [`SegmentId`] or by key.
#[derive(Debug, Clone, Default)]
pub struct SegmentMap {
    segments: Vec<Segment>,
    index: HashMap<SegmentKey, SegmentId>,
}

impl SegmentId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Segment {
    fn new(hop: &PathHop) -> Self {
        Self {
            key: hop.key.clone(),
            kind: hop.kind,
            direction: hop.direction,
            link: hop.link,
            flows: Vec::new(),
        }
    }

    pub fn key(&self) -> &SegmentKey {
        &self.key
    }

    pub fn kind(&self) -> HopKind {
        self.kind
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// `None` when the segment does not constrain its flows
    pub fn capacity(&self) -> Option<Throughput> {
        self.link.capacity
    }

    pub fn latency(&self) -> Latency {
        self.link.latency
    }

    pub fn jitter(&self) -> Latency {
        self.link.jitter
    }

    pub fn packet_loss(&self) -> PacketLoss {
        self.link.packet_loss
    }

    /// the flows crossing this segment, in registration order
    pub fn flows(&self) -> &[FlowId] {
        &self.flows
    }
}

impl SegmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the segment `hop` crosses, creating the segment on
    /// first reference. Later references to the same key reuse it; the
    /// link characteristics of the first reference are kept.
    pub(crate) fn get_or_insert(&mut self, hop: &PathHop) -> SegmentId {
        if let Some(id) = self.index.get(&hop.key) {
            return *id;
        }

        let id = SegmentId(self.segments.len());
        self.segments.push(Segment::new(hop));
        self.index.insert(hop.key.clone(), id);
        id
    }

    /// record that `flow` crosses the segment `id`
    pub(crate) fn attach(&mut self, id: SegmentId, flow: FlowId) {
        if let Some(segment) = self.segments.get_mut(id.0)
            && !segment.flows.contains(&flow)
        {
            segment.flows.push(flow);
        }
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0)
    }

    pub fn by_key(&self, key: &SegmentKey) -> Option<&Segment> {
        self.index.get(key).and_then(|id| self.get(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.segments
            .iter()
            .enumerate()
            .map(|(index, segment)| (SegmentId(index), segment))
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

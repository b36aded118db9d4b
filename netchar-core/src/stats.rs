//! Segment and flow statistics.
//!
//! [`AlgorithmStats`] is a point-in-time snapshot of the last pass.
//! Obtain one via [`SegmentAlgorithm::stats`](crate::SegmentAlgorithm::stats).

use crate::{
    flow::FlowKey,
    measure::{NetChar, Throughput},
    path::{Direction, HopKind, SegmentKey},
};

/// Snapshot of statistics for a single segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentStats {
    /// The segment key, displayed e.g. as `zone1-poa1-uplink`.
    pub key: SegmentKey,
    /// The tier of the link.
    pub kind: HopKind,
    pub direction: Direction,
    /// Configured capacity, `None` when unconstrained.
    pub capacity: Option<Throughput>,
    /// Sum of the throughput allocated to the flows crossing the segment.
    pub allocated: Throughput,
    /// Number of flows crossing the segment.
    pub flows: usize,
}

/// Snapshot of statistics for a single flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowStats {
    pub key: FlowKey,
    pub src: String,
    pub dst: String,
    /// Throughput asked for, `None` for a greedy flow.
    pub demand: Option<Throughput>,
    /// Keys of the segments crossed, in traversal order.
    pub path: Vec<SegmentKey>,
    /// Characteristics of the last allocation, if any.
    pub net_char: Option<NetChar>,
}

/// Point-in-time snapshot of the segmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlgorithmStats {
    /// Per-segment statistics.
    pub segments: Vec<SegmentStats>,
    /// Per-flow statistics.
    pub flows: Vec<FlowStats>,
}

impl AlgorithmStats {
    pub fn segment(&self, key: &SegmentKey) -> Option<&SegmentStats> {
        self.segments.iter().find(|segment| &segment.key == key)
    }

    pub fn flow(&self, src: &str, dst: &str) -> Option<&FlowStats> {
        self.flows
            .iter()
            .find(|flow| flow.src == src && flow.dst == dst)
    }
}

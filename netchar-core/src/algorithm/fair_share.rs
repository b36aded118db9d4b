//! Max-min fair throughput allocation by progressive filling.
//!
//! Every flow starts at zero and all the flows not yet frozen are
//! raised together, at the same water level. A flow freezes when it
//! reaches its demand or when one of the segments it crosses is
//! saturated. Frozen flows keep their allocation, the others keep
//! rising and share whatever capacity the frozen ones left.

use crate::{
    flow::FlowMap,
    measure::Throughput,
    segment::SegmentMap,
};

/// relative tolerance when comparing an allocation to a capacity or a
/// demand
const EPSILON: f64 = 1e-9;

#[inline]
fn reached(value: f64, target: f64) -> bool {
    value >= target - EPSILON * target.abs().max(1.0)
}

struct Filling {
    /// allocation of each flow, indexed like the flow map
    rate: Vec<f64>,
    frozen: Vec<bool>,
    /// allocation of the frozen flows, per segment
    frozen_sum: Vec<f64>,
    /// number of unfrozen flows, per segment
    active: Vec<usize>,
}

impl Filling {
    fn new(flows: &FlowMap, segments: &SegmentMap) -> Self {
        Self {
            rate: vec![0.0; flows.len()],
            frozen: vec![false; flows.len()],
            frozen_sum: vec![0.0; segments.len()],
            active: segments
                .iter()
                .map(|(_, segment)| segment.flows().len())
                .collect(),
        }
    }

    /// the level at which the next flow freezes, `None` when nothing
    /// bounds the unfrozen flows anymore
    fn next_level(&self, flows: &FlowMap, segments: &SegmentMap) -> Option<f64> {
        let saturation = segments.iter().filter_map(|(id, segment)| {
            let capacity = segment.capacity()?.as_mbps();
            let active = self.active[id.index()];
            if active == 0 {
                return None;
            }
            let left = (capacity - self.frozen_sum[id.index()]).max(0.0);
            Some(left / active as f64)
        });
        let demands = flows
            .iter()
            .filter(|(id, _)| !self.frozen[id.index()])
            .filter_map(|(_, flow)| flow.demand().map(Throughput::as_mbps));

        saturation.chain(demands).reduce(f64::min)
    }

    /// raise every unfrozen flow to `level` and freeze the ones that
    /// cannot go any further. Returns how many flows froze.
    fn raise(&mut self, level: f64, flows: &FlowMap, segments: &SegmentMap) -> usize {
        let mut freeze = vec![false; self.rate.len()];

        for (id, flow) in flows.iter() {
            if self.frozen[id.index()] {
                continue;
            }
            self.rate[id.index()] = level;

            if let Some(demand) = flow.demand()
                && reached(level, demand.as_mbps())
            {
                freeze[id.index()] = true;
            }
        }

        for (id, segment) in segments.iter() {
            let Some(capacity) = segment.capacity() else {
                continue;
            };
            let active = self.active[id.index()];
            if active == 0 {
                continue;
            }
            let allocated = self.frozen_sum[id.index()] + level * active as f64;
            if reached(allocated, capacity.as_mbps()) {
                for flow in segment.flows() {
                    freeze[flow.index()] = true;
                }
            }
        }

        let mut count = 0;
        for (frozen, freeze) in self.frozen.iter_mut().zip(freeze.iter_mut()) {
            if *frozen {
                *freeze = false;
            } else if *freeze {
                *frozen = true;
                count += 1;
            }
        }

        // a segment lists each of its flows once, whatever the paths
        for (id, segment) in segments.iter() {
            for flow in segment.flows() {
                if freeze[flow.index()] {
                    self.frozen_sum[id.index()] += self.rate[flow.index()];
                    self.active[id.index()] -= 1;
                }
            }
        }
        count
    }
}

/// Allocate a throughput to every flow of `flows`, indexed like the
/// flow map. `None` marks a flow nothing constrains: no capacity on its
/// path and no demand of its own.
pub(crate) fn max_min_share(flows: &FlowMap, segments: &SegmentMap) -> Vec<Option<Throughput>> {
    let mut filling = Filling::new(flows, segments);

    // each round freezes at least one flow
    for _ in 0..flows.len() {
        let Some(level) = filling.next_level(flows, segments) else {
            break;
        };
        if filling.raise(level, flows, segments) == 0 {
            tracing::warn!(level, "progressive filling stalled");
            break;
        }
    }

    filling
        .frozen
        .iter()
        .zip(&filling.rate)
        .map(|(frozen, rate)| frozen.then(|| Throughput::from_mbps(*rate)))
        .collect()
}

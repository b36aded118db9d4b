/*!
# Network characteristics

Segmentation and bandwidth sharing of the traffic flows of an
edge-computing scenario.

A [`Scenario`] is a tree of domains, zones, points of attachment,
physical locations and processes. The processes declare the services
they expose and the services they talk to; every such pair is a
[`Flow`](flow::Flow). Each flow crosses the links of the tree between
its two ends, and the flows crossing the same link in the same
direction share it: that is a [`Segment`](segment::Segment).

[`SegmentAlgorithm`] allocates the capacity of the segments to their
flows (max-min fairness) and accumulates the latency, jitter and loss
along every path. It only reports what changed since the previous
allocation.

```
# use netchar_core::{SegmentAlgorithm, Scenario};
let scenario = Scenario::from_json_file("../netchar/examples/scenario.json")?;

let mut algorithm = SegmentAlgorithm::new();
algorithm.process_scenario(&scenario)?;

for update in algorithm.calculate_net_char() {
    println!("{} -> {}: {}", update.src, update.dst, update.net_char);
}
# Ok::<(), anyhow::Error>(())
```
*/

pub mod algorithm;
pub mod defaults;
pub mod elem;
pub mod flow;
pub mod measure;
pub mod path;
pub mod segment;
pub mod stats;
mod time;
pub mod topology;

pub use self::{
    algorithm::{NetCharUpdate, PendingUpdates, SegmentAlgorithm},
    elem::{NetElem, TopologyError},
    flow::{extract_flows, FlowKey},
    measure::{Latency, NetChar, PacketLoss, Throughput},
    path::{build_path, Direction, LinkKey, PathError, SegmentKey},
    stats::AlgorithmStats,
    topology::Scenario,
};

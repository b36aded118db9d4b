/*!
# NetChar engine

Keeps the network characteristics (throughput, latency, jitter and
packet loss) of every flow of a topology up to date, in a background
thread, and tells registered observers what changed.

```
use netchar::{Model, NetChar, NetCharConfig, NetCharEvent, Scenario};
# use std::time::Duration;

let model = Model::new();
let mut engine = NetChar::new(&model, NetCharConfig::default())?;
let events = engine.subscribe();
engine.start()?;

model.activate(Scenario::from_json_file("examples/scenario.json")?)?;

while let NetCharEvent::Updated(updates) = events.recv_timeout(Duration::from_secs(5))? {
    for update in updates {
        println!("{} -> {}: {}", update.src, update.dst, update.net_char);
    }
}

engine.stop()?;
# Ok::<(), anyhow::Error>(())
```
*/

mod engine;
mod model;

// convenient re-export of `netchar_core` core objects
pub use netchar_core::{
    defaults, measure, stats::AlgorithmStats, topology, Direction, Latency, NetCharUpdate,
    PacketLoss, Scenario, SegmentAlgorithm, SegmentKey, Throughput, TopologyError,
};

pub use self::{
    engine::{EngineError, NetChar, NetCharConfig, NetCharEvent},
    model::{Model, ModelError, ModelEvent},
};

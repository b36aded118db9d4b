use super::{Latency, PacketLoss, Throughput};
use std::fmt;

/// Network characteristics experienced end to end by a flow.
///
/// `throughput` is `None` when nothing along the path constrains the
/// flow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NetChar {
    pub latency: Latency,
    pub jitter: Latency,
    pub throughput: Option<Throughput>,
    pub packet_loss: PacketLoss,
}

impl NetChar {
    /// latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_millis_f64()
    }

    /// latency variation in milliseconds
    pub fn jitter_ms(&self) -> f64 {
        self.jitter.as_millis_f64()
    }

    /// throughput in megabits per second, `None` when unconstrained
    pub fn throughput_mbps(&self) -> Option<f64> {
        self.throughput.map(Throughput::as_mbps)
    }

    /// packet loss in percent
    pub fn packet_loss_percent(&self) -> f64 {
        self.packet_loss.as_percent()
    }
}

impl fmt::Display for NetChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "latency={} jitter={} throughput=",
            self.latency, self.jitter
        )?;
        match self.throughput {
            Some(throughput) => write!(f, "{throughput}")?,
            None => write!(f, "unconstrained")?,
        }
        write!(f, " loss={}", self.packet_loss)
    }
}

mod latency;
mod net_char;
mod packet_loss;
mod throughput;

pub use self::{
    latency::Latency,
    net_char::NetChar,
    packet_loss::{PacketLoss, PacketLossParseError, PacketLossRate, PacketLossRateError},
    throughput::Throughput,
};

mod tcp;
mod udp;

pub(super) use tcp::TcpScan;
pub(super) use udp::UdpScan;

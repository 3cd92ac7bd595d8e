use std::{
    net::SocketAddrV4,
    time::{Duration, Instant},
};

use crate::{error::ScanError, port::PortRange, resolver};

use super::{Executor, PortState};

/// Outcome of scanning one host.
#[derive(Debug)]
pub struct HostResult {
    pub host: String,
    /// Open ports, ascending.
    pub open: Vec<u16>,
    /// Probes (or the host resolution) that failed at transport level.
    pub failures: Vec<ScanError>,
    pub elapsed: Duration,
}

impl HostResult {
    fn new(host: &str) -> Self {
        Self {
            host: host.to_owned(),
            open: Vec::new(),
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    pub(super) fn failed(host: &str, error: ScanError) -> Self {
        let mut result = Self::new(host);
        result.failures.push(error);
        result
    }

    /// Whether every probe got a classification.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Probes every port of `ports` against `host`, one at a time and in
/// ascending order.
///
/// Transport failures are recorded and never stop the remaining ports.
pub fn run_scan(
    host: &str,
    ports: PortRange,
    executor: &dyn Executor,
    timeout: Duration,
) -> HostResult {
    let now = Instant::now();
    let mut result = HostResult::new(host);

    let ip = match resolver::lookup(host) {
        Ok(ip) => ip,
        Err(e) => {
            log::warn!("Skipping `{}`: {}", host, e);

            result.failures.push(e);
            return result;
        }
    };

    log::debug!("Scanning `{}` ({}) over ports {}", host, ip, ports);

    for port in ports {
        let addr = SocketAddrV4::new(ip, port);
        match executor.scan(&addr, timeout) {
            Ok(PortState::Open) => {
                log::debug!("Port {} is open on `{}`", port, host);

                result.open.push(port);
            }
            Ok(PortState::Closed) => {}
            Err(e) => {
                log::warn!("{}", e);

                result.failures.push(e);
            }
        }
    }

    result.elapsed = now.elapsed();

    result
}

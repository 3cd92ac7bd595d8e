use std::time::Duration;

use crate::{error::ConfigError, port::PortRange, scan::ScanType};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Validated input of a dispatch.
///
/// Every constructor and setter checks its invariants, so a `ScanConfig`
/// that exists is always safe to hand to [`crate::scan::Scanner`].
#[derive(Debug, Clone)]
pub struct ScanConfig {
    hosts: Vec<String>,
    ports: PortRange,
    kind: ScanType,
    workers: usize,
    timeout: Duration,
}

impl ScanConfig {
    /// Duplicate hosts are collapsed, keeping the first occurrence.
    pub fn new<I, S>(kind: ScanType, hosts: I, ports: PortRange) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for host in hosts {
            let host = host.into();
            if !unique.contains(&host) {
                unique.push(host);
            }
        }

        if unique.is_empty() {
            return Err(ConfigError::EmptyHostList);
        }

        Ok(Self {
            hosts: unique,
            ports,
            kind,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidWorkerCount(workers));
        }
        self.workers = workers;

        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.timeout = timeout;

        Ok(self)
    }

    /// Same targets scanned with another technique.
    pub fn with_kind(mut self, kind: ScanType) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    #[inline]
    pub fn ports(&self) -> PortRange {
        self.ports
    }

    #[inline]
    pub fn kind(&self) -> ScanType {
        self.kind
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

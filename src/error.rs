use std::net::SocketAddrV4;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one target is required")]
    EmptyHostList,
    #[error("port `{0}` is invalid")]
    InvalidPort(String),
    #[error("port range `{low}-{high}` is invalid (lower bound is greater than upper bound)")]
    InvalidPortRange { low: u16, high: u16 },
    #[error("worker count `{0}` is invalid (must be greater than zero)")]
    InvalidWorkerCount(usize),
    #[error("probe timeout must be greater than zero")]
    InvalidTimeout,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("failed to check target kind (ensure it's a domain or IPv4)")]
    HostParseFailed(#[source] url::ParseError),
    #[error("failed to resolve the given target: {0}")]
    ResolverFailed(#[source] std::io::Error),
    #[error("resolver didn't find any IPv4 address mapped by `{0}`")]
    DomainLookupFailed(String),
    #[error("only supports IPv4 addresses or domains that map addresses with this IP version")]
    OnlyIpv4TargetSupported,
    #[error("failed to probe `{addr}`: {source}")]
    ConnectionFailure {
        addr: SocketAddrV4,
        #[source]
        source: std::io::Error,
    },
    #[error("worker panicked while scanning `{0}`")]
    WorkerPanicked(String),
    #[error("failed to start worker pool: {0}")]
    WorkerPoolFailed(#[source] rayon::ThreadPoolBuildError),
}

impl ScanError {
    #[inline]
    pub(crate) fn connection(addr: SocketAddrV4, source: std::io::Error) -> Self {
        Self::ConnectionFailure { addr, source }
    }

    /// Port of the probe that failed, if the error is tied to one.
    pub fn port(&self) -> Option<u16> {
        match self {
            Self::ConnectionFailure { addr, .. } => Some(addr.port()),
            _ => None,
        }
    }
}

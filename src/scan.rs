use std::{
    collections::BTreeMap,
    fmt::{Debug, Display},
    net::SocketAddrV4,
    panic::{self, AssertUnwindSafe},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, Sender};

use crate::{config::ScanConfig, error::ScanError};

use self::method::{TcpScan, UdpScan};

pub use self::{
    host::{run_scan, HostResult},
    queue::{Task, WorkQueue},
};

mod host;
mod method;
mod queue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Open,
    /// Closed, or nothing answered before the timeout.
    Closed,
}

impl Display for PortState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PortState::Open => "open",
                PortState::Closed => "closed",
            }
        )
    }
}

/// Probes a single port.
///
/// Implementations open at most one socket per call and release it before
/// returning, whatever the outcome. A timeout is a [`PortState::Closed`]
/// answer, not an error.
pub trait Executor: Debug + Sync {
    fn scan(&self, addr: &SocketAddrV4, timeout: Duration) -> Result<PortState, ScanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScanType {
    Tcp,
    Udp,
}

impl ScanType {
    pub fn executor(self) -> &'static dyn Executor {
        match self {
            ScanType::Tcp => &TcpScan,
            ScanType::Udp => &UdpScan,
        }
    }

    pub fn from_id(raw: &str) -> Option<Self> {
        match raw {
            "tcp" => Some(ScanType::Tcp),
            "udp" => Some(ScanType::Udp),
            _ => None,
        }
    }
}

impl Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ScanType::Tcp => "TCP",
                ScanType::Udp => "UDP",
            }
        )
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub kind: ScanType,
    pub elapsed: Duration,
    pub hosts: BTreeMap<String, HostResult>,
}

impl ScanReport {
    #[inline]
    fn new(kind: ScanType, elapsed: Duration, hosts: BTreeMap<String, HostResult>) -> Self {
        Self {
            kind,
            elapsed,
            hosts,
        }
    }

    #[inline]
    pub fn get(&self, host: &str) -> Option<&HostResult> {
        self.hosts.get(host)
    }

    /// Results in host order.
    pub fn iter(&self) -> impl Iterator<Item = &HostResult> {
        self.hosts.values()
    }

    pub fn open_count(&self) -> usize {
        self.iter().map(|r| r.open.len()).sum()
    }
}

/// Scans every configured host on a bounded pool of workers.
pub struct Scanner {
    config: ScanConfig,
    executor: &'static dyn Executor,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let executor = config.kind().executor();

        Self { config, executor }
    }

    /// Replaces the probe picked from the configured [`ScanType`].
    pub fn with_executor(mut self, executor: &'static dyn Executor) -> Self {
        self.executor = executor;
        self
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn scan_host(&self, host: &str) -> HostResult {
        let config = &self.config;

        panic::catch_unwind(AssertUnwindSafe(|| {
            run_scan(host, config.ports(), self.executor, config.timeout())
        }))
        .unwrap_or_else(|_| {
            log::warn!("Worker panicked while scanning `{}`", host);

            HostResult::failed(host, ScanError::WorkerPanicked(host.to_owned()))
        })
    }

    fn work(&self, id: usize, queue: &WorkQueue<String>, results: &Sender<HostResult>) {
        log::debug!("Worker {} started", id);

        while let Some(task) = queue.take() {
            let result = self.scan_host(task.item());

            log::debug!(
                "Worker {} finished `{}` in {:.4}s",
                id,
                result.host,
                result.elapsed.as_secs_f32()
            );

            // Receiver lives until every task is done.
            let _ = results.send(result);
        }

        log::debug!("Worker {} stopped", id);
    }

    /// Blocks until every host has been scanned.
    ///
    /// Each host is scanned exactly once, by a single worker. The returned
    /// report always holds one entry per configured host; per-port failures
    /// are kept inside the matching [`HostResult`].
    pub fn start(&self) -> Result<ScanReport, ScanError> {
        let hosts = self.config.hosts();
        let workers = self.config.workers().min(hosts.len());

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pscan-worker-{}", i))
            .build()
            .map_err(ScanError::WorkerPoolFailed)?;

        let queue: WorkQueue<String> = hosts.iter().cloned().collect();
        let (tx, rx) = channel::unbounded();

        log::debug!(
            "Starting {} scan of {} host(s) with {} worker(s)",
            self.config.kind(),
            hosts.len(),
            workers
        );

        let now = Instant::now();
        pool.in_place_scope(|s| {
            for id in 0..workers {
                let (queue, tx) = (&queue, &tx);
                s.spawn(move |_| self.work(id, queue, tx));
            }

            queue.join();
        });
        let elapsed = now.elapsed();

        drop(tx);
        let results = rx
            .into_iter()
            .map(|result| (result.host.clone(), result))
            .collect();

        Ok(ScanReport::new(self.config.kind(), elapsed, results))
    }
}

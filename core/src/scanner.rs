//! # Network Sweep Engine
//!
//! Expands a CIDR range into candidate hosts and runs one probe pipeline per
//! host: reachability, then hostname, then port fingerprint. Pipelines run
//! concurrently but never more than `max_concurrency` at a time.
//!
//! A pipeline only holds its concurrency slot while it runs. The launch loop
//! waits for a free slot *before* spawning, so a `/16` never materializes
//! tens of thousands of idle tasks. Devices flow back through a channel and
//! are assembled once every pipeline has finished (or the sweep deadline,
//! when configured, has run out).

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use assetronics_common::config::ScanConfig;
use assetronics_common::error::ScanError;
use assetronics_common::network::device::{Device, ScanResult};
use assetronics_common::network::range::{HostRange, Ipv4Range};
use assetronics_common::scanning::{HostProber, RangeScanner};

mod aggregator;
mod probe;

pub mod ports;
pub mod reachability;
pub mod resolver;

pub use probe::NetworkProber;

use aggregator::Aggregator;

/// Called after each finished pipeline with `(completed, total)`.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

pub struct NetworkScanner<P: HostProber + 'static> {
    prober: Arc<P>,
    max_concurrency: usize,
    deadline: Option<Duration>,
    progress: Option<ProgressFn>,
}

impl NetworkScanner<NetworkProber> {
    /// A scanner wired to the real network.
    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(NetworkProber::from_config(cfg), cfg)
    }
}

impl<P: HostProber + 'static> NetworkScanner<P> {
    pub fn new(prober: P, cfg: &ScanConfig) -> Self {
        Self {
            prober: Arc::new(prober),
            max_concurrency: cfg.max_concurrency.max(1),
            deadline: cfg.scan_deadline,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sweeps `cidr` and returns every host found reachable.
    ///
    /// Only a malformed range is an error. Device order follows pipeline
    /// completion and is not sorted.
    pub async fn scan(&self, cidr: &str) -> Result<ScanResult, ScanError> {
        let range = HostRange::parse(cidr)?;
        let candidates = range.candidates();
        let total = candidates.len();

        info!(
            "Scanning {} ({} hosts, {} at a time)",
            range.cidr(),
            total,
            self.max_concurrency
        );

        let mut aggregator = Aggregator::new(range.cidr());
        let completed = Arc::new(AtomicU64::new(0));
        let (tx, mut rx) = mpsc::unbounded_channel::<Device>();

        let sweep = self.sweep(candidates, tx, Arc::clone(&completed));
        let collect = async {
            while let Some(device) = rx.recv().await {
                aggregator.push(device);
            }
        };

        match self.deadline {
            Some(limit) => {
                if timeout(limit, async { tokio::join!(sweep, collect) })
                    .await
                    .is_err()
                {
                    warn!(
                        "Scan of {} hit its {:?} deadline after {} of {} hosts, reporting partial result",
                        range.cidr(),
                        limit,
                        completed.load(Ordering::Relaxed),
                        total
                    );
                }
            }
            None => {
                tokio::join!(sweep, collect);
            }
        }

        // Devices sent right before a deadline may still sit in the channel.
        while let Ok(device) = rx.try_recv() {
            aggregator.push(device);
        }

        debug!(
            "Sweep of {} finished with {} device(s)",
            range.cidr(),
            aggregator.len()
        );
        Ok(aggregator.finish())
    }

    async fn sweep(
        &self,
        candidates: Ipv4Range,
        tx: mpsc::UnboundedSender<Device>,
        completed: Arc<AtomicU64>,
    ) {
        let total = candidates.len();
        let slots = Arc::new(Semaphore::new(self.max_concurrency));
        let mut pipelines = JoinSet::new();

        for addr in candidates.iter() {
            let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                break;
            };

            let prober = Arc::clone(&self.prober);
            let tx = tx.clone();
            let completed = Arc::clone(&completed);
            let progress = self.progress.clone();

            pipelines.spawn(async move {
                let _permit = permit;
                if let Some(device) = probe_host(prober.as_ref(), addr).await {
                    // The receiver only disappears once the sweep is abandoned.
                    let _ = tx.send(device);
                }
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = progress {
                    progress(done, total);
                }
            });

            while let Some(finished) = pipelines.try_join_next() {
                reap(finished);
            }
        }

        drop(tx);
        while let Some(finished) = pipelines.join_next().await {
            reap(finished);
        }
    }
}

/// One host pipeline. `None` when the host is absent.
async fn probe_host<P: HostProber + ?Sized>(prober: &P, addr: Ipv4Addr) -> Option<Device> {
    if !prober.is_reachable(addr).await {
        trace!("{addr} is not reachable");
        return None;
    }

    let hostname = prober.resolve_hostname(addr).await;
    let ports = prober.open_ports(addr).await;
    debug!("{addr} is up (hostname: {hostname:?}, open ports: {ports:?})");

    Some(Device::online(addr).with_hostname(hostname).with_ports(ports))
}

fn reap(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        if e.is_panic() {
            warn!("A probe pipeline panicked: {e}");
        }
    }
}

#[async_trait]
impl<P: HostProber + 'static> RangeScanner for NetworkScanner<P> {
    async fn scan(&self, cidr: &str) -> Result<ScanResult, ScanError> {
        NetworkScanner::scan(self, cidr).await
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

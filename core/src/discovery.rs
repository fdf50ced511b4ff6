//! # Network Discovery Service
//!
//! Implements the "scanner mode" use case: sweep one range, then hand the
//! result to the inventory service.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use assetronics_common::network::device::ScanResult;
use assetronics_common::reporting::InventoryApi;
use assetronics_common::scanning::RangeScanner;
use assetronics_common::success;

/// Application service for network discovery.
///
/// Orchestrates the run by:
/// 1. delegating the sweep to the [`RangeScanner`] seam.
/// 2. uploading the result through [`InventoryApi`].
pub struct DiscoveryService {
    scanner: Box<dyn RangeScanner>,
    api: Arc<dyn InventoryApi>,
}

impl DiscoveryService {
    pub fn new(scanner: Box<dyn RangeScanner>, api: Arc<dyn InventoryApi>) -> Self {
        Self { scanner, api }
    }

    /// Sweeps `cidr`. Fails only when the range is malformed.
    pub async fn perform_discovery(&self, cidr: &str) -> anyhow::Result<ScanResult> {
        let result = self.scanner.scan(cidr).await?;
        info!("Found {} device(s) in {}", result.devices.len(), result.range);
        Ok(result)
    }

    pub async fn report(&self, result: &ScanResult) -> anyhow::Result<()> {
        self.api
            .send_scan_results(result)
            .await
            .with_context(|| format!("uploading scan of {}", result.range))?;
        success!("Uploaded {} device(s) from {}", result.devices.len(), result.range);
        Ok(())
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

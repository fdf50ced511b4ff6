use async_trait::async_trait;

use crate::error::UploadError;
use crate::network::device::ScanResult;
use crate::system::SystemInfo;

/// Delivery of agent payloads to the central inventory service.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Reports the facts of the machine the agent runs on.
    async fn check_in(&self, info: &SystemInfo) -> Result<(), UploadError>;

    /// Uploads one completed sweep.
    async fn send_scan_results(&self, result: &ScanResult) -> Result<(), UploadError>;
}

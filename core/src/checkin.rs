//! Endpoint-mode use case: collect the facts of this machine and report them.

use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use assetronics_common::error::CollectionError;
use assetronics_common::reporting::InventoryApi;
use assetronics_common::success;
use assetronics_common::system::{HostCollector, SystemInfo};

pub struct CheckInService {
    collector: Arc<dyn HostCollector>,
    api: Arc<dyn InventoryApi>,
}

impl CheckInService {
    pub fn new(collector: Arc<dyn HostCollector>, api: Arc<dyn InventoryApi>) -> Self {
        Self { collector, api }
    }

    /// Runs the blocking collector off the async workers.
    pub async fn collect(&self) -> anyhow::Result<SystemInfo> {
        let collector = Arc::clone(&self.collector);
        let info = tokio::task::spawn_blocking(move || collector.collect())
            .await
            .map_err(|e| CollectionError::Interrupted(e.to_string()))??;
        debug!("Collected system info for {}", info.hostname);
        Ok(info)
    }

    pub async fn check_in(&self) -> anyhow::Result<SystemInfo> {
        let info = self.collect().await?;
        self.api
            .check_in(&info)
            .await
            .context("sending check-in")?;
        success!("Check-in successful for {}", info.hostname);
        Ok(info)
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use assetronics_common::error::UploadError;
    use assetronics_common::network::device::ScanResult;

    struct StaticHost(Option<&'static str>);

    impl HostCollector for StaticHost {
        fn collect(&self) -> Result<SystemInfo, CollectionError> {
            let hostname = self.0.ok_or(CollectionError::Hostname)?;
            Ok(SystemInfo {
                hostname: hostname.to_string(),
                cpu_cores: 4,
                ..SystemInfo::default()
            })
        }
    }

    #[derive(Default)]
    struct RecordingApi {
        check_ins: Mutex<Vec<SystemInfo>>,
    }

    #[async_trait]
    impl InventoryApi for RecordingApi {
        async fn check_in(&self, info: &SystemInfo) -> Result<(), UploadError> {
            self.check_ins.lock().unwrap().push(info.clone());
            Ok(())
        }

        async fn send_scan_results(&self, _result: &ScanResult) -> Result<(), UploadError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn check_in_uploads_collected_facts() {
        let api = Arc::new(RecordingApi::default());
        let service = CheckInService::new(Arc::new(StaticHost(Some("ws-01"))), api.clone());

        let info = service.check_in().await.unwrap();
        assert_eq!(info.hostname, "ws-01");
        assert_eq!(api.check_ins.lock().unwrap()[0].cpu_cores, 4);
    }

    #[tokio::test]
    async fn collection_failure_skips_upload() {
        let api = Arc::new(RecordingApi::default());
        let service = CheckInService::new(Arc::new(StaticHost(None)), api.clone());

        let err = service.check_in().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CollectionError>(),
            Some(CollectionError::Hostname)
        ));
        assert!(api.check_ins.lock().unwrap().is_empty());
    }
}

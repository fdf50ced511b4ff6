//! # Inventory Service Client
//!
//! JSON over HTTP to the central inventory service.
//!
//! Endpoints used:
//! - `POST {api_url}/agent/checkin` - host facts of this machine
//! - `POST {api_url}/agent/scan`    - one completed network sweep

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::debug;

use assetronics_common::config::ApiConfig;
use assetronics_common::error::UploadError;
use assetronics_common::network::device::ScanResult;
use assetronics_common::reporting::InventoryApi;
use assetronics_common::system::SystemInfo;

const TENANT_HEADER: &str = "X-Tenant-ID";

pub struct InventoryClient {
    base_url: String,
    api_key: Option<String>,
    tenant_id: Option<String>,
    http: Client,
}

impl InventoryClient {
    pub fn new(cfg: &ApiConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(cfg.request_timeout)
            .user_agent(format!("assetronics-agent/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone().filter(|key| !key.is_empty()),
            tenant_id: cfg.tenant_id.clone().filter(|tenant| !tenant.is_empty()),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        what: &'static str,
        payload: &T,
    ) -> Result<(), UploadError> {
        let body = serde_json::to_vec(payload).map_err(|e| UploadError::Encode {
            what,
            source: Box::new(e),
        })?;
        let url = self.endpoint(path);

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(tenant) = &self.tenant_id {
            request = request.header(TENANT_HEADER, tenant);
        }
        if let Some(key) = &self.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let res = request.send().await.map_err(|e| UploadError::Transport {
            url: url.clone(),
            source: Box::new(e),
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                url,
                status: status.as_u16(),
            });
        }

        debug!("{what} accepted by {url} ({status})");
        Ok(())
    }
}

#[async_trait]
impl InventoryApi for InventoryClient {
    async fn check_in(&self, info: &SystemInfo) -> Result<(), UploadError> {
        self.post("/agent/checkin", "system info", info).await
    }

    async fn send_scan_results(&self, result: &ScanResult) -> Result<(), UploadError> {
        self.post("/agent/scan", "scan result", result).await
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

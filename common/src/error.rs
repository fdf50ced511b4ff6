//! Error taxonomy of the agent.
//!
//! Only configuration-level problems surface as errors. Network uncertainty
//! during a scan is resolved into "present" or "absent" and never reaches
//! these types.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of the scan entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The supplied CIDR could not be parsed. No partial result exists.
    #[error("invalid range '{range}': {reason}")]
    InvalidRange { range: String, reason: String },
}

/// Failure of the host-facts collector.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("failed to get hostname")]
    Hostname,
    #[error("system information collection was interrupted: {0}")]
    Interrupted(String),
}

/// Failure to deliver a payload to the inventory service.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("failed to send request to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
}

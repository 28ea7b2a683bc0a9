//! Object store configuration.

use crate::error::{CloudError, CloudResult};
use serde::{Deserialize, Serialize};

/// Where envelopes are stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// S3 bucket name.
    pub bucket: String,

    /// AWS region of the bucket.
    pub region: String,

    /// Optional S3 endpoint override (for MinIO and other S3-compatible stores).
    #[serde(default)]
    pub endpoint_override: Option<String>,
}

impl StoreConfig {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint_override: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    /// Checks that the bucket and region are set.
    pub fn validate(&self) -> CloudResult<()> {
        if self.bucket.trim().is_empty() {
            return Err(CloudError::Config("bucket is required".into()));
        }
        if self.region.trim().is_empty() {
            return Err(CloudError::Config("region is required".into()));
        }
        if let Some(endpoint) = &self.endpoint_override {
            if endpoint.trim().is_empty() {
                return Err(CloudError::Config("endpoint override is empty".into()));
            }
        }
        Ok(())
    }

    /// Config for a local MinIO, as used by the integration tests.
    pub fn minio() -> Self {
        Self::new("s3bin-test", "us-east-1").with_endpoint("http://localhost:9000")
    }
}

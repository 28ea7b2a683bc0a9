//! S3-backed object store.
//!
//! Credentials come from the default AWS provider chain (environment,
//! shared config, instance metadata). The SDK is async; each request is
//! driven to completion on a private current-thread runtime so callers
//! see a blocking [`ObjectStore`].

use crate::config::StoreConfig;
use crate::error::CloudResult;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use s3bin_core::{ObjectStore, StoreError};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Object store over a single S3 bucket.
pub struct S3Store {
    client: S3Client,
    bucket: String,
    runtime: Runtime,
}

impl S3Store {
    /// Builds a client for `config.bucket` in `config.region`.
    pub fn connect(config: &StoreConfig) -> CloudResult<Self> {
        config.validate()?;

        let runtime = Builder::new_current_thread().enable_all().build()?;

        let sdk_config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(aws_types::region::Region::new(config.region.clone()))
                .load(),
        );

        let mut config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(ref endpoint) = config.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        debug!(
            "using s3://{} in {}{}",
            config.bucket,
            config.region,
            config
                .endpoint_override
                .as_deref()
                .map(|e| format!(" via {e}"))
                .unwrap_or_default()
        );

        Ok(Self {
            client: S3Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
            runtime,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), StoreError> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                StoreError::Backend(format!(
                    "upload to s3://{}/{key} failed: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("uploaded {size} bytes to s3://{}/{key}", self.bucket);
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    StoreError::NotFound
                } else {
                    StoreError::Backend(format!(
                        "download of s3://{}/{key} failed: {}",
                        self.bucket,
                        DisplayErrorContext(&service_err)
                    ))
                }
            })?;

        let body = resp.body.collect().await.map_err(|e| {
            StoreError::Backend(format!(
                "failed to read body of s3://{}/{key}: {e}",
                self.bucket
            ))
        })?;

        let bytes = body.into_bytes().to_vec();
        debug!(
            "downloaded {} bytes from s3://{}/{key}",
            bytes.len(),
            self.bucket
        );
        Ok(bytes)
    }
}

impl ObjectStore for S3Store {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
        self.runtime.block_on(self.upload(key, body))
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.runtime.block_on(self.download(key))
    }
}

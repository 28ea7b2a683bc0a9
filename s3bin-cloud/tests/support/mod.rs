//! Shared helpers for integration tests against a local MinIO.
#![allow(dead_code)]

use s3bin_cloud::{S3Store, StoreConfig};
use std::time::{SystemTime, UNIX_EPOCH};

/// S3Store pointing at local MinIO (`docker run -p 9000:9000 minio/minio server /data`).
///
/// The `s3bin-test` bucket must already exist and credentials must be
/// available through the usual AWS environment variables.
pub fn test_store() -> S3Store {
    S3Store::connect(&StoreConfig::minio()).expect("MinIO config must be valid")
}

/// Content that no other test run has uploaded.
pub fn unique_content(label: &str) -> Vec<u8> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos();
    format!("{label}-{nanos}-{}", std::process::id()).into_bytes()
}

//! S3 backend for s3bin.
//!
//! Implements [`s3bin_core::ObjectStore`] over an S3 bucket so the sync
//! engine can upload envelopes and resolve pointers against it.

pub mod config;
pub mod error;
pub mod s3_store;

pub use config::StoreConfig;
pub use error::{CloudError, CloudResult};
pub use s3_store::S3Store;

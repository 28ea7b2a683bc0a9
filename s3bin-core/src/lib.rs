//! Content-addressed binary storage for s3bin.
//!
//! Provides:
//! - SHA-1 digests of file content and the object key layout derived from them
//! - Envelope framing (versioned header + payload with file mode, tar.gz)
//! - `.sha1` pointer files that stand in for large binaries in a source tree
//! - A sync engine for put/get against any [`ObjectStore`], plus directory batch get

pub mod batch;
pub mod digest;
pub mod envelope;
pub mod error;
pub mod key;
pub mod pointer;
pub mod store;
pub mod sync_engine;

pub use batch::BatchSummary;
pub use digest::{Digest, HashingReader, digest_file, digest_reader};
pub use envelope::{Header, SUPPORTED_VERSION, Unpacked, pack, pack_bytes, unpack};
pub use error::{BinError, BinResult, ErrorKind, ResultExt};
pub use key::{StorageKey, derive_key};
pub use pointer::{POINTER_SUFFIX, pointer_path, read_pointer, target_path, write_pointer};
pub use store::{MemoryStore, ObjectStore, StoreError};
pub use sync_engine::{GetOutcome, SyncEngine};

//! Put and get of single files against an object store.
//!
//! `put` hashes a file, uploads it inside an envelope under its
//! content-derived key and leaves a `.sha1` pointer beside it. `get` turns a
//! pointer back into the file, skipping the download entirely when the local
//! copy already has the right content.

use crate::digest::{Digest, HashingReader, digest_file};
use crate::envelope::{self, Header};
use crate::error::{BinError, BinResult, ResultExt};
use crate::key::StorageKey;
use crate::pointer::{pointer_path, read_pointer, target_path, write_pointer};
use crate::store::ObjectStore;
use std::fs::{File, Metadata};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// What `get` had to do to bring a file up to date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GetOutcome {
    /// Local content already matched the pointer; the store was not contacted.
    UpToDate,
    /// Local content differed and was overwritten.
    Updated,
    /// The file did not exist and was created.
    Downloaded,
}

/// Syncs files and their pointers with an object store.
pub struct SyncEngine<S> {
    store: S,
}

impl<S: ObjectStore> SyncEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Uploads `path` and writes `<path>.sha1` next to it.
    ///
    /// Repeating a put of unchanged content uploads identical bytes to the
    /// same key and rewrites an identical pointer.
    pub fn put(&self, path: &Path) -> BinResult<Digest> {
        self.put_file(path)
            .with_context(|| format!("put {}", path.display()))
    }

    /// Materializes the file a pointer refers to.
    ///
    /// Fails with a naming error before touching the filesystem if `pointer`
    /// does not end in `.sha1`. If writing succeeds but restoring the mode
    /// fails, the file is left with default permissions.
    pub fn get(&self, pointer: &Path) -> BinResult<GetOutcome> {
        self.get_file(pointer)
            .with_context(|| format!("get {}", pointer.display()))
    }

    fn put_file(&self, path: &Path) -> BinResult<Digest> {
        let read_err = |source| BinError::Read {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(read_err)?;
        let meta = file.metadata().map_err(read_err)?;
        let mode = file_mode(&meta);

        // the key comes from the exact bytes that went into the envelope
        let mut reader = HashingReader::new(file);
        let blob =
            envelope::pack(&Header::current(), &mut reader, meta.len(), mode).map_err(read_err)?;
        let digest = reader.finish();

        let key = StorageKey::from(&digest);
        let size = blob.len();
        self.store
            .put(key.as_str(), blob)
            .map_err(|source| BinError::Store {
                op: "put",
                key: key.to_string(),
                source,
            })?;
        debug!("stored {size} byte envelope at {key}");

        write_pointer(&pointer_path(path), &digest)?;
        info!("uploaded {} ({digest})", path.display());
        Ok(digest)
    }

    fn get_file(&self, pointer: &Path) -> BinResult<GetOutcome> {
        let target = target_path(pointer)?;
        let expected = read_pointer(pointer)?;

        let outcome = match digest_file(&target) {
            Ok(actual) if actual == expected => {
                info!("{} exists and is up-to-date", target.display());
                return Ok(GetOutcome::UpToDate);
            }
            Ok(_) => {
                info!("updating {}", target.display());
                GetOutcome::Updated
            }
            Err(e) if e.is_not_found() => {
                info!("downloading {}", target.display());
                GetOutcome::Downloaded
            }
            Err(e) => return Err(e),
        };

        let key = StorageKey::from(&expected);
        let blob = self
            .store
            .get(key.as_str())
            .map_err(|source| BinError::Store {
                op: "get",
                key: key.to_string(),
                source,
            })?;
        debug!("fetched {} byte envelope from {key}", blob.len());

        let unpacked = envelope::unpack(&blob).with_context(|| format!("object {key}"))?;

        let actual = Digest::of(&unpacked.payload);
        if actual != expected {
            return Err(BinError::Integrity {
                key: key.to_string(),
                expected: expected.to_hex(),
                actual: actual.to_hex(),
            });
        }

        restore(&target, &unpacked.payload, unpacked.mode)?;
        Ok(outcome)
    }
}

fn restore(target: &Path, payload: &[u8], mode: u32) -> BinResult<()> {
    let write_err = |source| BinError::Write {
        path: target.to_path_buf(),
        source,
    };
    let mut file = File::create(target).map_err(write_err)?;
    file.write_all(payload).map_err(write_err)?;
    set_mode(&file, mode).map_err(write_err)
}

#[cfg(unix)]
fn file_mode(meta: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(meta: &Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

//! Shared helpers for s3bin-core integration tests.
#![allow(dead_code)]

use flate2::Compression;
use flate2::write::GzEncoder;
use s3bin_core::{MemoryStore, SyncEngine};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine over a fresh in-memory store.
pub fn memory_engine() -> SyncEngine<MemoryStore> {
    SyncEngine::new(MemoryStore::new())
}

/// Writes `content` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[cfg(unix)]
pub fn set_mode(path: &Path, mode: u32) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).unwrap().permissions().mode() & 0o7777
}

/// Builds a tar.gz with arbitrary `(name, content, mode)` entries, for
/// producing envelopes the codec itself would never write.
pub fn raw_envelope(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content, mode) in entries {
        let mut header = tar::Header::new_ustar();
        header.set_size(content.len() as u64);
        header.set_mode(*mode);
        builder.append_data(&mut header, name, *content).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

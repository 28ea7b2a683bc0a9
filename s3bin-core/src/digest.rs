//! SHA-1 content digests.

use crate::error::{BinError, BinResult};
use serde::{Deserialize, Serialize};
use sha1::{Digest as _, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Length of a digest rendered as hex text.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// SHA-1 of a file's raw bytes.
///
/// Always rendered as 40 lowercase hex characters. Parsing accepts either
/// case, so two digests compare equal regardless of how they were written.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Digest of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha1::digest(data).into())
    }
}

impl FromStr for Digest {
    type Err = BinError;

    fn from_str(s: &str) -> BinResult<Self> {
        let s = s.trim();
        if s.len() != DIGEST_HEX_LEN {
            return Err(BinError::format(
                "digest",
                format!("expected {DIGEST_HEX_LEN} hex characters, got {}", s.len()),
            ));
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| BinError::format("digest", e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Digest {
    type Error = BinError;

    fn try_from(s: String) -> BinResult<Self> {
        s.parse()
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.to_hex()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

/// Hashes everything the reader yields.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<Digest> {
    let mut hasher = Sha1::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(Digest(hasher.finalize().into()))
}

/// Reader adapter that hashes every byte passing through it.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha1,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
        }
    }

    /// Digest of the bytes read so far.
    pub fn finish(self) -> Digest {
        Digest(self.hasher.finalize().into())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// Hashes the file at `path`.
///
/// The returned `BinError::Read` keeps the underlying `io::ErrorKind`, so a
/// missing file can be told apart with [`BinError::is_not_found`].
pub fn digest_file(path: &Path) -> BinResult<Digest> {
    let read_err = |source| BinError::Read {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    digest_reader(file).map_err(read_err)
}

//! Envelope framing for stored objects.
//!
//! An envelope is a gzip-compressed tar holding exactly two entries, in
//! this order:
//! - `header`: JSON `{"version": N}`
//! - `data`: the raw file bytes, with the file's permission bits as the
//!   entry mode and its exact length as the entry size
//!
//! Readers reject an unknown header version before looking at `data`.

use crate::error::{BinError, BinResult};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use tar::{Archive, Builder, EntryType};

/// The only envelope version this build reads or writes.
pub const SUPPORTED_VERSION: u32 = 1;

pub const HEADER_ENTRY: &str = "header";
pub const DATA_ENTRY: &str = "data";

const HEADER_ENTRY_MODE: u32 = 0o600;
const PERMISSION_MASK: u32 = 0o7777;

/// Schema header stored as the first envelope entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
}

impl Header {
    pub fn current() -> Self {
        Self {
            version: SUPPORTED_VERSION,
        }
    }
}

/// Header as read off the wire. A missing version reads as 0.
#[derive(Deserialize)]
struct RawHeader {
    #[serde(default)]
    version: i64,
}

/// Decoded envelope contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unpacked {
    pub header: Header,
    pub payload: Vec<u8>,
    pub mode: u32,
}

/// Packs `payload_len` bytes read from `payload` into an envelope.
///
/// The payload is streamed into the archive. A reader that yields fewer
/// than `payload_len` bytes fails with `UnexpectedEof`; extra bytes are
/// never read.
pub fn pack<R: Read>(
    header: &Header,
    payload: R,
    payload_len: u64,
    mode: u32,
) -> io::Result<Vec<u8>> {
    let header_bytes = serde_json::to_vec(header).map_err(io::Error::other)?;

    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut entry = entry_header(header_bytes.len() as u64, HEADER_ENTRY_MODE);
    builder.append_data(&mut entry, HEADER_ENTRY, header_bytes.as_slice())?;

    let mut entry = entry_header(payload_len, mode & PERMISSION_MASK);
    builder.append_data(&mut entry, DATA_ENTRY, ExactReader::new(payload, payload_len))?;

    builder.into_inner()?.finish()
}

/// Packs an in-memory payload.
pub fn pack_bytes(header: &Header, payload: &[u8], mode: u32) -> io::Result<Vec<u8>> {
    pack(header, payload, payload.len() as u64, mode)
}

/// Decodes an envelope, validating entry order and header version.
pub fn unpack(blob: &[u8]) -> BinResult<Unpacked> {
    let mut archive = Archive::new(GzDecoder::new(blob));
    let mut entries = archive.entries().map_err(corrupt)?;

    let mut entry = match entries.next() {
        Some(entry) => entry.map_err(corrupt)?,
        None => return Err(missing(HEADER_ENTRY)),
    };
    expect_name(&entry, HEADER_ENTRY)?;

    let mut header_json = Vec::new();
    entry.read_to_end(&mut header_json).map_err(corrupt)?;
    let raw: RawHeader = serde_json::from_slice(&header_json)
        .map_err(|e| BinError::format("envelope header", e.to_string()))?;
    if raw.version != i64::from(SUPPORTED_VERSION) {
        return Err(BinError::UnsupportedVersion {
            found: raw.version,
            supported: SUPPORTED_VERSION,
        });
    }
    let header = Header::current();

    let mut entry = match entries.next() {
        Some(entry) => entry.map_err(corrupt)?,
        None => return Err(missing(DATA_ENTRY)),
    };
    expect_name(&entry, DATA_ENTRY)?;

    let mode = entry.header().mode().map_err(corrupt)? & PERMISSION_MASK;
    let size = entry.header().size().map_err(corrupt)?;

    let mut payload = Vec::new();
    entry.read_to_end(&mut payload).map_err(corrupt)?;
    if payload.len() as u64 != size {
        return Err(BinError::format(
            "envelope",
            format!("data entry holds {} bytes, header says {size}", payload.len()),
        ));
    }

    Ok(Unpacked {
        header,
        payload,
        mode,
    })
}

fn entry_header(size: u64, mode: u32) -> tar::Header {
    let mut header = tar::Header::new_ustar();
    header.set_entry_type(EntryType::Regular);
    header.set_size(size);
    header.set_mode(mode);
    header.set_mtime(0);
    header
}

fn expect_name<R: Read>(entry: &tar::Entry<'_, R>, name: &str) -> BinResult<()> {
    let found = entry.path_bytes();
    if found.as_ref() == name.as_bytes() {
        return Ok(());
    }
    Err(BinError::format(
        "envelope",
        format!(
            "expected entry {name:?}, found {:?}",
            String::from_utf8_lossy(&found)
        ),
    ))
}

fn missing(name: &str) -> BinError {
    BinError::format("envelope", format!("missing {name:?} entry"))
}

fn corrupt(e: io::Error) -> BinError {
    BinError::format("envelope", e.to_string())
}

/// Reads exactly `len` bytes from the inner reader.
struct ExactReader<R> {
    inner: io::Take<R>,
}

impl<R: Read> ExactReader<R> {
    fn new(inner: R, len: u64) -> Self {
        Self {
            inner: inner.take(len),
        }
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if n == 0 && self.inner.limit() > 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("payload ended {} bytes short", self.inner.limit()),
            ));
        }
        Ok(n)
    }
}

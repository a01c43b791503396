//! Minimal PSARC reader.
//!
//! Layout (all integers big-endian):
//!
//! ```text
//! header (32 bytes)
//!   magic "PSAR" | version u32 | compression [4] | toc_length u32
//!   toc_entry_size u32 | toc_entries u32 | block_size u32 | flags u32
//! toc entries (toc_entry_size bytes each)
//!   name md5 [16] | first block u32 | length u40 | offset u40
//! block length table (width = bytes needed to index block_size)
//! data
//! ```
//!
//! Entry 0 is a newline separated list naming entries 1..n. Each entry is
//! split into `block_size` blocks; a table length of zero means a full
//! uncompressed block, a zlib-headed block is inflated, anything else is
//! stored as-is.
//!
//! When flag 4 is set, everything between the header and `toc_length` is
//! AES-256-CFB encrypted with the well-known PSARC key.

use super::ArchiveError;
use crate::constants::ARCHIVE_MAGIC;
use aes::Aes256;
use cfb_mode::Decryptor;
use cfb_mode::cipher::{AsyncStreamCipher, KeyIvInit};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Component, Path, PathBuf};

const HEADER_SIZE: u32 = 32;
const MIN_ENTRY_SIZE: u32 = 30;
const FLAG_ENCRYPTED_TOC: u32 = 4;
/// AES-256 key shared by every PSARC archive with an encrypted table of
/// contents. The table is AES-CFB (128-bit feedback) with a zero IV.
const TOC_KEY: [u8; 32] = [
    0xC5, 0x3D, 0xB2, 0x38, 0x70, 0xA1, 0xA2, 0xF7, 0x1C, 0xAE, 0x64, 0x06, 0x1F, 0xDD, 0x0E, 0x11,
    0x57, 0x30, 0x9D, 0xC8, 0x52, 0x04, 0xD4, 0xC5, 0xBF, 0xDF, 0x25, 0x09, 0x0D, 0xF2, 0x57, 0x2C,
];
const TOC_IV: [u8; 16] = [0; 16];
// Upper bound for the initial allocation of an entry buffer.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u32,
    pub compression: [u8; 4],
    pub toc_length: u32,
    pub toc_entry_size: u32,
    pub toc_entries: u32,
    pub block_size: u32,
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub name_digest: [u8; 16],
    pub first_block: u32,
    pub length: u64,
    pub offset: u64,
}

pub struct PsarcReader<R> {
    reader: R,
    header: Header,
    entries: Vec<TocEntry>,
    block_lengths: Vec<u32>,
    names: Vec<String>,
}

impl PsarcReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> PsarcReader<R> {
    pub fn new(mut reader: R) -> Result<Self, ArchiveError> {
        let header = read_header(&mut reader)?;

        if &header.compression != b"zlib" {
            return Err(ArchiveError::Unsupported(format!(
                "compression `{}`",
                String::from_utf8_lossy(&header.compression)
            )));
        }
        if header.toc_entry_size < MIN_ENTRY_SIZE || header.toc_entries == 0 || header.block_size == 0 {
            return Err(ArchiveError::Corrupt("invalid table of contents header".into()));
        }

        let entries_len = u64::from(header.toc_entries) * u64::from(header.toc_entry_size);
        let toc_len = u64::from(header.toc_length)
            .checked_sub(u64::from(HEADER_SIZE))
            .filter(|len| *len >= entries_len)
            .ok_or_else(|| ArchiveError::Corrupt("table of contents length too small".into()))?;

        let mut toc = vec![0u8; toc_len as usize];
        reader.read_exact(&mut toc)?;
        if header.flags & FLAG_ENCRYPTED_TOC != 0 {
            decrypt_toc(&mut toc);
        }

        let (raw_entries, table) = toc.split_at(entries_len as usize);
        let entries = raw_entries
            .chunks_exact(header.toc_entry_size as usize)
            .map(parse_entry)
            .collect();

        let width = block_length_width(header.block_size);
        let block_lengths = table.chunks_exact(width).map(read_uint_be).map(|v| v as u32).collect();

        let mut archive = Self {
            reader,
            header,
            entries,
            block_lengths,
            names: Vec::new(),
        };

        let listing = archive.read_entry_data(0)?;
        archive.names = String::from_utf8_lossy(&listing)
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .filter(|line| !line.is_empty())
            .collect();

        if archive.names.len() + 1 != archive.entries.len() {
            log::warn!(
                "PSARC listing names {} files but the table holds {}",
                archive.names.len(),
                archive.entries.len() - 1
            );
        }

        Ok(archive)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Entry names in table order, excluding the listing itself.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Read a named file (index into [`names`](Self::names)).
    pub fn read_file(&mut self, index: usize) -> Result<Vec<u8>, ArchiveError> {
        let name = self
            .names
            .get(index)
            .ok_or_else(|| ArchiveError::Corrupt(format!("no file at index {index}")))?;

        let entry = self
            .entries
            .get(index + 1)
            .ok_or_else(|| ArchiveError::Corrupt(format!("no table entry for `{name}`")))?;
        if md5::compute(name.as_bytes()).0 != entry.name_digest {
            log::warn!("Name digest mismatch for PSARC entry `{name}`");
        }

        self.read_entry_data(index + 1)
    }

    fn read_entry_data(&mut self, entry_index: usize) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .entries
            .get(entry_index)
            .cloned()
            .ok_or_else(|| ArchiveError::Corrupt(format!("no table entry {entry_index}")))?;

        let length = usize::try_from(entry.length)
            .map_err(|_| ArchiveError::Corrupt("entry too large".into()))?;
        let block_size = self.header.block_size as usize;
        let mut data = Vec::with_capacity(length.min(MAX_PREALLOC));
        let mut block = entry.first_block as usize;

        self.reader.seek(SeekFrom::Start(entry.offset))?;

        while data.len() < length {
            let stored = *self
                .block_lengths
                .get(block)
                .ok_or_else(|| ArchiveError::Corrupt(format!("block {block} out of range")))?
                as usize;

            if stored == 0 {
                let raw_len = block_size.min(length - data.len());
                let start = data.len();
                data.resize(start + raw_len, 0);
                self.reader.read_exact(&mut data[start..])?;
            } else {
                let mut chunk = vec![0u8; stored];
                self.reader.read_exact(&mut chunk)?;
                if is_zlib_header(&chunk) {
                    ZlibDecoder::new(chunk.as_slice()).read_to_end(&mut data)?;
                } else {
                    data.extend_from_slice(&chunk);
                }
            }
            block += 1;
        }

        data.truncate(length);
        Ok(data)
    }
}

fn read_u32_be(reader: &mut impl Read) -> Result<u32, ArchiveError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_header(reader: &mut impl Read) -> Result<Header, ArchiveError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != ARCHIVE_MAGIC {
        return Err(ArchiveError::NotAnArchive);
    }

    let version = read_u32_be(reader)?;
    let mut compression = [0u8; 4];
    reader.read_exact(&mut compression)?;

    Ok(Header {
        version,
        compression,
        toc_length: read_u32_be(reader)?,
        toc_entry_size: read_u32_be(reader)?,
        toc_entries: read_u32_be(reader)?,
        block_size: read_u32_be(reader)?,
        flags: read_u32_be(reader)?,
    })
}

fn decrypt_toc(toc: &mut [u8]) {
    Decryptor::<Aes256>::new(&TOC_KEY.into(), &TOC_IV.into()).decrypt(toc);
}

fn parse_entry(raw: &[u8]) -> TocEntry {
    let mut name_digest = [0u8; 16];
    name_digest.copy_from_slice(&raw[0..16]);
    TocEntry {
        name_digest,
        first_block: read_uint_be(&raw[16..20]) as u32,
        length: read_uint_be(&raw[20..25]),
        offset: read_uint_be(&raw[25..30]),
    }
}

fn read_uint_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// Bytes per block-length table slot: enough to hold `block_size - 1`.
pub fn block_length_width(block_size: u32) -> usize {
    let mut width = 1;
    let mut limit: u64 = 256;
    while limit < u64::from(block_size) {
        limit *= 256;
        width += 1;
    }
    width
}

fn is_zlib_header(chunk: &[u8]) -> bool {
    matches!(chunk, [0x78, 0x01 | 0x5e | 0x9c | 0xda, ..])
}

/// Convert an entry name into a relative path that cannot escape the
/// extraction root. Returns `None` for names that would.
pub fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let mut components = Vec::new();
    for component in Path::new(name.trim_start_matches(['/', '\\'])).components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if components.is_empty() {
        None
    } else {
        Some(components.into_iter().collect())
    }
}

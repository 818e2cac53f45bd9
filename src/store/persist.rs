//! Binary persistence for the FAQ collection.
//!
//! File format: faqs.bin
//!
//! Header (47 bytes):
//! - version: u8 (1)
//! - model fingerprint: [u8; 32] (SHA256 hash of the embedding model name)
//! - dimensions: u16 (little-endian)
//! - entry_count: u64 (little-endian)
//! - checksum: u32 (CRC32 of header fields before checksum)
//!
//! Entries (repeated):
//! - id: i64 (little-endian)
//! - question: u32 byte length + UTF-8 bytes
//! - answer: u32 byte length + UTF-8 bytes
//! - embedding: [f32; dimensions] (little-endian)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::store::{FaqIndex, IndexedEntry};

/// Current file format version
const FORMAT_VERSION: u8 = 1;

/// Header size in bytes: version(1) + fingerprint(32) + dimensions(2) + entry_count(8) + checksum(4)
const HEADER_SIZE: usize = 47;

/// Upper bound on a stored question/answer. Save refuses longer texts,
/// so load can reject any length prefix above this before allocating
const MAX_TEXT_LEN: u32 = 1 << 20;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: file version {0}, supported version {1}")]
    VersionMismatch(u8, u8),

    #[error("Model mismatch: collection was built with a different embedding model")]
    ModelMismatch,

    #[error("Checksum mismatch: file may be corrupted")]
    ChecksumMismatch,
}

/// The on-disk collection file.
pub struct CollectionFile {
    path: PathBuf,
}

impl CollectionFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the collection into an index.
    ///
    /// Validates the format version, the header checksum, and that the
    /// file was written for `expected_fingerprint`'s embedding model.
    pub fn load(&self, expected_fingerprint: &[u8; 32]) -> Result<FaqIndex, PersistError> {
        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        let header = read_header(&mut reader)?;
        if header.fingerprint != *expected_fingerprint {
            return Err(PersistError::ModelMismatch);
        }
        if header.dimensions == 0 && header.entry_count > 0 {
            return Err(PersistError::InvalidFormat(
                "zero dimensions with nonzero entry count".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(header.entry_count as usize);
        for _ in 0..header.entry_count {
            entries.push(read_entry(&mut reader, header.dimensions as usize)?);
        }

        let mut index = FaqIndex::new();
        index
            .bulk_load(entries)
            .map_err(|err| PersistError::InvalidFormat(err.to_string()))?;

        Ok(index)
    }

    /// Save the index to disk.
    ///
    /// Uses atomic write: temp file -> fsync -> rename
    pub fn save(&self, index: &FaqIndex, fingerprint: &[u8; 32]) -> Result<(), PersistError> {
        let temp_path = self.path.with_extension("tmp");

        let result = write_to_file(&temp_path, index, fingerprint);
        if result.is_err() {
            let _ = std::fs::remove_file(&temp_path);
            return result;
        }

        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Delete the collection file if it exists.
    pub fn delete(&self) -> Result<(), PersistError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

fn write_to_file(
    path: &Path,
    index: &FaqIndex,
    fingerprint: &[u8; 32],
) -> Result<(), PersistError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let header = Header {
        version: FORMAT_VERSION,
        fingerprint: *fingerprint,
        dimensions: index.dimensions().unwrap_or(0) as u16,
        entry_count: index.len() as u64,
    };
    write_header(&mut writer, &header)?;

    for entry in index.iter() {
        write_entry(&mut writer, entry)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    Ok(())
}

fn read_header(reader: &mut BufReader<File>) -> Result<Header, PersistError> {
    let mut header_bytes = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header_bytes)?;

    let version = header_bytes[0];
    if version > FORMAT_VERSION {
        return Err(PersistError::VersionMismatch(version, FORMAT_VERSION));
    }

    let mut fingerprint = [0u8; 32];
    fingerprint.copy_from_slice(&header_bytes[1..33]);

    let dimensions = u16::from_le_bytes([header_bytes[33], header_bytes[34]]);
    let entry_count = u64::from_le_bytes([
        header_bytes[35],
        header_bytes[36],
        header_bytes[37],
        header_bytes[38],
        header_bytes[39],
        header_bytes[40],
        header_bytes[41],
        header_bytes[42],
    ]);
    let stored_checksum = u32::from_le_bytes([
        header_bytes[43],
        header_bytes[44],
        header_bytes[45],
        header_bytes[46],
    ]);

    // Checksum covers the header without the checksum field itself
    let computed_checksum = crc32fast::hash(&header_bytes[0..43]);
    if stored_checksum != computed_checksum {
        return Err(PersistError::ChecksumMismatch);
    }

    Ok(Header {
        version,
        fingerprint,
        dimensions,
        entry_count,
    })
}

fn write_header(writer: &mut BufWriter<File>, header: &Header) -> Result<(), PersistError> {
    let mut header_bytes = [0u8; HEADER_SIZE];

    header_bytes[0] = header.version;
    header_bytes[1..33].copy_from_slice(&header.fingerprint);
    header_bytes[33..35].copy_from_slice(&header.dimensions.to_le_bytes());
    header_bytes[35..43].copy_from_slice(&header.entry_count.to_le_bytes());

    let checksum = crc32fast::hash(&header_bytes[0..43]);
    header_bytes[43..47].copy_from_slice(&checksum.to_le_bytes());

    writer.write_all(&header_bytes)?;
    Ok(())
}

fn read_entry(
    reader: &mut BufReader<File>,
    dimensions: usize,
) -> Result<IndexedEntry, PersistError> {
    let mut id_bytes = [0u8; 8];
    reader.read_exact(&mut id_bytes)?;
    let id = i64::from_le_bytes(id_bytes);

    let question = read_text(reader)?;
    let answer = read_text(reader)?;

    let mut embedding = Vec::with_capacity(dimensions);
    for _ in 0..dimensions {
        let mut float_bytes = [0u8; 4];
        reader.read_exact(&mut float_bytes)?;
        embedding.push(f32::from_le_bytes(float_bytes));
    }

    Ok(IndexedEntry {
        id,
        question,
        answer,
        embedding,
    })
}

fn write_entry(writer: &mut BufWriter<File>, entry: &IndexedEntry) -> Result<(), PersistError> {
    writer.write_all(&entry.id.to_le_bytes())?;

    write_text(writer, &entry.question)?;
    write_text(writer, &entry.answer)?;

    for &value in &entry.embedding {
        writer.write_all(&value.to_le_bytes())?;
    }

    Ok(())
}

fn read_text(reader: &mut BufReader<File>) -> Result<String, PersistError> {
    let mut len_bytes = [0u8; 4];
    reader.read_exact(&mut len_bytes)?;
    let len = u32::from_le_bytes(len_bytes);
    if len > MAX_TEXT_LEN {
        return Err(PersistError::InvalidFormat(format!(
            "text length {len} exceeds maximum {MAX_TEXT_LEN}"
        )));
    }

    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| PersistError::InvalidFormat(e.to_string()))
}

fn write_text(writer: &mut BufWriter<File>, text: &str) -> Result<(), PersistError> {
    if text.len() > MAX_TEXT_LEN as usize {
        return Err(PersistError::InvalidFormat(format!(
            "text length {} exceeds maximum {MAX_TEXT_LEN}",
            text.len()
        )));
    }

    writer.write_all(&(text.len() as u32).to_le_bytes())?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// File header structure.
#[derive(Debug)]
struct Header {
    version: u8,
    fingerprint: [u8; 32],
    dimensions: u16,
    entry_count: u64,
}

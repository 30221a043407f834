use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{DbError, Result};
use crate::storage::codec::{ByteReader, ByteWriter};

pub const BLOCK_SIZE: usize = 400;
pub const NAME_WIDTH: usize = 128;
pub const PATH_WIDTH: usize = 256;
pub const KIND_USER_DATABASE: u8 = 0;

/// One database descriptor of the catalog file.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: u8,
    pub path: String,
    /// Seconds since the Unix epoch.
    pub created: i64,
}

/// Fixed 400-byte blocks: name, kind, 3 reserved bytes, path, creation
/// time, 4 bytes of padding.
pub fn encode_catalog(entries: &[CatalogEntry]) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    for entry in entries {
        writer.put_fixed_string(&entry.name, NAME_WIDTH)?;
        writer.put_u8(entry.kind);
        writer.put_bytes(&[0; 3]);
        writer.put_fixed_string(&entry.path, PATH_WIDTH)?;
        writer.put_i64(entry.created);
        writer.put_bytes(&[0; 4]);
    }
    Ok(writer.into_bytes())
}

pub fn decode_catalog(bytes: &[u8]) -> Result<Vec<CatalogEntry>> {
    if bytes.len() % BLOCK_SIZE != 0 {
        return Err(DbError::malformed(format!(
            "catalog size {} is not a multiple of {}",
            bytes.len(),
            BLOCK_SIZE
        )));
    }
    let mut reader = ByteReader::new(bytes);
    let mut entries = vec![];
    while !reader.is_at_end() {
        let name = reader.read_fixed_string(NAME_WIDTH)?;
        let kind = reader.read_u8()?;
        reader.take(3)?;
        let path = reader.read_fixed_string(PATH_WIDTH)?;
        let created = reader.read_i64()?;
        reader.take(4)?;
        entries.push(CatalogEntry {
            name,
            kind,
            path,
            created,
        });
    }
    Ok(entries)
}

/// A missing catalog reads as empty.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    match fs::read(path) {
        Ok(bytes) => decode_catalog(&bytes),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(vec![]),
        Err(error) => Err(error.into()),
    }
}

pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encode_catalog(entries)?)?;
    Ok(())
}

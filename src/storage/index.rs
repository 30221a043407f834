use crate::db::index::Index;
use crate::error::{DbError, Result};
use crate::storage::codec::{ByteReader, ByteWriter};

/// `.tid` layout: index count, then per index its name, unique flag and columns.
pub fn encode_indexes(indexes: &[&Index]) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    writer.put_count(indexes.len())?;
    for index in indexes {
        writer.put_string(&index.name)?;
        writer.put_u8(u8::from(index.unique));
        writer.put_count(index.columns.len())?;
        for column in &index.columns {
            writer.put_string(column)?;
        }
    }
    Ok(writer.into_bytes())
}

pub fn decode_indexes(table: &str, bytes: &[u8]) -> Result<Vec<Index>> {
    // Files written before any index existed may be empty.
    if bytes.is_empty() {
        return Ok(vec![]);
    }
    let mut reader = ByteReader::new(bytes);
    let mut indexes = vec![];
    for _ in 0..reader.read_count()? {
        let name = reader.read_string()?;
        let unique = match reader.read_u8()? {
            0 => false,
            1 => true,
            flag => return Err(DbError::malformed(format!("bad unique flag {} for index `{}`", flag, name))),
        };
        let mut columns = vec![];
        for _ in 0..reader.read_count()? {
            columns.push(reader.read_string()?);
        }
        indexes.push(Index {
            name,
            table: table.to_string(),
            columns,
            unique,
        });
    }
    if !reader.is_at_end() {
        return Err(DbError::malformed("trailing bytes after index list"));
    }
    Ok(indexes)
}

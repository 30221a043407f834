//! On-disk layout: `<root>/data/<database>/<table>.{tdf,trd,tic,tid}` plus
//! `<root>/data/catalog.dbc`.

pub mod catalog;
pub mod codec;
pub mod definition;
pub mod index;
pub mod records;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::db::index::Index;
use crate::db::table::core::field::MAX_NAME_BYTES;
use crate::db::table::core::table::Table;
use crate::error::{DbError, Result};

pub const DEFINITION_EXTENSION: &str = "tdf";
pub const RECORDS_EXTENSION: &str = "trd";
pub const INTEGRITY_EXTENSION: &str = "tic";
pub const INDEX_EXTENSION: &str = "tid";

const EXTENSIONS: [&str; 4] = [
    DEFINITION_EXTENSION,
    RECORDS_EXTENSION,
    INTEGRITY_EXTENSION,
    INDEX_EXTENSION,
];

/// Database and table names become directory and file names, so they are
/// limited to `[A-Za-z0-9_-]` and at most 127 bytes.
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_BYTES
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(DbError::schema(format!("Invalid {} name `{}`", kind, name)));
    }
    Ok(())
}

pub fn table_file(directory: &Path, table: &str, extension: &str) -> PathBuf {
    directory.join(format!("{}.{}", table, extension))
}

/// Writes all four files of `table`. Records are the committed ones.
pub fn save_table(directory: &Path, table: &Table, indexes: &[&Index]) -> Result<()> {
    fs::create_dir_all(directory)?;
    fs::write(
        table_file(directory, &table.name, DEFINITION_EXTENSION),
        definition::encode_definition(table)?,
    )?;
    fs::write(
        table_file(directory, &table.name, RECORDS_EXTENSION),
        records::encode_records(&table.fields, table.committed_records())?,
    )?;
    fs::write(table_file(directory, &table.name, INTEGRITY_EXTENSION), [])?;
    fs::write(
        table_file(directory, &table.name, INDEX_EXTENSION),
        index::encode_indexes(indexes)?,
    )?;
    debug!(table = %table.name, directory = %directory.display(), "saved table");
    Ok(())
}

/// Reads a table and the indexes stored with it. Missing `.trd` or `.tid`
/// files read as empty; a missing or bad `.tdf` is an error.
pub fn load_table(directory: &Path, name: &str, database: &str) -> Result<(Table, Vec<Index>)> {
    let definition_bytes = fs::read(table_file(directory, name, DEFINITION_EXTENSION))?;
    let definition = definition::decode_definition(&definition_bytes)?;
    let mut table = Table::from_definition(name, database, definition)?;

    let record_bytes = read_optional(&table_file(directory, name, RECORDS_EXTENSION))?;
    table.set_records(records::decode_records(&table.fields, &record_bytes)?);

    let index_bytes = read_optional(&table_file(directory, name, INDEX_EXTENSION))?;
    let indexes = index::decode_indexes(name, &index_bytes)?;
    debug!(table = name, records = table.len(), "loaded table");
    Ok((table, indexes))
}

pub fn delete_table_files(directory: &Path, name: &str) -> Result<()> {
    for extension in EXTENSIONS {
        match fs::remove_file(table_file(directory, name, extension)) {
            Err(error) if error.kind() != ErrorKind::NotFound => return Err(error.into()),
            _ => {}
        }
    }
    Ok(())
}

/// Names of the tables stored in `directory`, sorted.
pub fn table_names(directory: &Path) -> Result<Vec<String>> {
    let mut names = vec![];
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some(DEFINITION_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn read_optional(path: &Path) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(vec![]),
        Err(error) => Err(error.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::test_utils::default_table;

    #[test]
    fn table_round_trips_through_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let table = default_table();
        let index = Index {
            name: "idx_age".to_string(),
            table: "users".to_string(),
            columns: vec!["age".to_string()],
            unique: false,
        };
        save_table(dir.path(), &table, &[&index]).unwrap();
        for extension in EXTENSIONS {
            assert!(table_file(dir.path(), "users", extension).exists());
        }
        assert_eq!(table_names(dir.path()).unwrap(), vec!["users".to_string()]);

        let (loaded, indexes) = load_table(dir.path(), "users", "test_db").unwrap();
        assert_eq!(loaded.field_names(), table.field_names());
        assert_eq!(loaded.primary_key, table.primary_key);
        assert_eq!(loaded.records(), table.records());
        assert_eq!(indexes, vec![index]);

        delete_table_files(dir.path(), "users").unwrap();
        assert!(table_names(dir.path()).unwrap().is_empty());
        delete_table_files(dir.path(), "users").unwrap();
    }

    #[test]
    fn names_must_be_plain_file_names() {
        assert!(validate_name("table", "order_items-2").is_ok());
        let too_long = "x".repeat(128);
        for name in ["", "../escaped", "a/b", "a.b", "sp ace", too_long.as_str()] {
            assert!(matches!(validate_name("table", name), Err(DbError::Schema(_))), "{:?}", name);
        }
    }

    #[test]
    fn uncommitted_records_are_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = default_table();
        table.begin_transaction();
        table.records_mut().clear();
        save_table(dir.path(), &table, &[]).unwrap();
        let (loaded, _) = load_table(dir.path(), "users", "test_db").unwrap();
        assert_eq!(loaded.len(), 4);
    }
}

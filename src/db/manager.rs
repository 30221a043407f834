use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::db::database::Database;
use crate::db::index::Index;
use crate::db::table::core::condition::Condition;
use crate::db::table::core::table::TableDefinition;
use crate::db::table::operations::alter_table::AlterTableAction;
use crate::db::table::operations::select::{ResultSet, SelectQuery};
use crate::db::table::operations::update::{Assignment, UpdateOutcome};
use crate::error::{DbError, Result};
use crate::storage;
use crate::storage::catalog::{self, CatalogEntry, KIND_USER_DATABASE};

/// Owns every database and is the only component that touches disk.
///
/// Outside a transaction each change is written through immediately. Inside
/// one, files are written at COMMIT; table files to delete wait in
/// `pending_deletes` and are forgotten on ROLLBACK.
#[derive(Debug)]
pub struct Manager {
    config: EngineConfig,
    databases: Vec<Database>,
    current: Option<String>,
    transaction_database: Option<String>,
    pending_deletes: Vec<String>,
    catalog: Vec<CatalogEntry>,
}

impl Manager {
    pub fn open(config: EngineConfig) -> Result<Self> {
        let data_dir = config.data_dir();
        if !data_dir.is_dir() {
            if !config.create_if_missing {
                return Err(DbError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("storage directory {} does not exist", data_dir.display()),
                )));
            }
            fs::create_dir_all(&data_dir)?;
        }
        let mut manager = Self {
            config,
            databases: vec![],
            current: None,
            transaction_database: None,
            pending_deletes: vec![],
            catalog: vec![],
        };
        manager.load_databases_from_files()?;
        Ok(manager)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuilds every database from disk. A table whose files cannot be read
    /// is skipped with a warning; the rest still load.
    pub fn load_databases_from_files(&mut self) -> Result<()> {
        let data_dir = self.config.data_dir();
        let mut entries = catalog::read_catalog(&self.config.catalog_path())?;
        let mut directories = vec![];
        for entry in fs::read_dir(&data_dir)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                directories.push(name.to_string());
            }
        }
        directories.sort();

        let before = entries.len();
        entries.retain(|entry| {
            let present = directories.contains(&entry.name);
            if !present {
                warn!(database = %entry.name, "catalog entry without a directory, dropping it");
            }
            present
        });
        let mut changed = entries.len() != before;
        for name in &directories {
            if !entries.iter().any(|entry| &entry.name == name) {
                warn!(database = %name, "directory missing from catalog, adopting it");
                entries.push(self.catalog_entry(name));
                changed = true;
            }
        }
        self.catalog = entries;
        if changed {
            catalog::write_catalog(&self.config.catalog_path(), &self.catalog)?;
        }

        self.databases.clear();
        for entry in &self.catalog {
            let directory = self.config.database_dir(&entry.name);
            let mut tables = vec![];
            let mut indexes = vec![];
            for table_name in storage::table_names(&directory)? {
                match storage::load_table(&directory, &table_name, &entry.name) {
                    Ok((table, table_indexes)) => {
                        tables.push(table);
                        indexes.extend(table_indexes);
                    }
                    Err(error) => {
                        warn!(database = %entry.name, table = %table_name, %error, "skipping unreadable table");
                    }
                }
            }
            info!(database = %entry.name, tables = tables.len(), "loaded database");
            self.databases
                .push(Database::from_parts(entry.name.clone(), tables, indexes));
        }
        Ok(())
    }

    fn catalog_entry(&self, name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            kind: KIND_USER_DATABASE,
            path: self.config.database_dir(name).display().to_string(),
            created: Utc::now().timestamp(),
        }
    }

    pub fn database_names(&self) -> Vec<&str> {
        self.databases
            .iter()
            .map(|database| database.name.as_str())
            .collect()
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.databases.iter().any(|database| database.matches_name(name))
    }

    pub fn database(&self, name: &str) -> Result<&Database> {
        self.databases
            .iter()
            .find(|database| database.matches_name(name))
            .ok_or_else(|| DbError::schema(format!("Database `{}` does not exist", name)))
    }

    pub fn current_database_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_database(&self) -> Result<&Database> {
        match &self.current {
            Some(name) => self.database(name),
            None => Err(no_database_selected()),
        }
    }

    fn current_database_mut(&mut self) -> Result<&mut Database> {
        let name = self.current.clone().ok_or_else(no_database_selected)?;
        self.databases
            .iter_mut()
            .find(|database| database.matches_name(&name))
            .ok_or_else(|| DbError::schema(format!("Database `{}` does not exist", name)))
    }

    fn current_directory(&self) -> Result<PathBuf> {
        Ok(self.config.database_dir(&self.current_database()?.name))
    }

    /// Returns false when the database existed and `if_not_exists` was set.
    pub fn create_database(&mut self, name: &str, if_not_exists: bool) -> Result<bool> {
        if self.has_database(name) {
            if if_not_exists {
                return Ok(false);
            }
            return Err(DbError::schema(format!("Database `{}` already exists", name)));
        }
        storage::validate_name("database", name)?;
        fs::create_dir_all(self.config.database_dir(name))?;
        self.databases.push(Database::new(name));
        let entry = self.catalog_entry(name);
        self.catalog.push(entry);
        catalog::write_catalog(&self.config.catalog_path(), &self.catalog)?;
        info!(database = name, "created database");
        Ok(true)
    }

    pub fn drop_database(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        let position = match self
            .databases
            .iter()
            .position(|database| database.matches_name(name))
        {
            Some(position) => position,
            None if if_exists => return Ok(false),
            None => return Err(DbError::schema(format!("Database `{}` does not exist", name))),
        };
        if self
            .transaction_database
            .as_deref()
            .is_some_and(|active| active.eq_ignore_ascii_case(name))
        {
            return Err(DbError::transaction(format!(
                "Cannot drop database `{}` while it has an active transaction",
                name
            )));
        }
        let database = self.databases.remove(position);
        let directory = self.config.database_dir(&database.name);
        if directory.exists() {
            fs::remove_dir_all(&directory)?;
        }
        self.catalog.retain(|entry| entry.name != database.name);
        catalog::write_catalog(&self.config.catalog_path(), &self.catalog)?;
        if self
            .current
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(&database.name))
        {
            self.current = None;
        }
        info!(database = %database.name, "dropped database");
        Ok(true)
    }

    pub fn use_database(&mut self, name: &str) -> Result<()> {
        let canonical = self.database(name)?.name.clone();
        if let Some(active) = &self.transaction_database {
            if !active.eq_ignore_ascii_case(&canonical) {
                return Err(DbError::transaction(format!(
                    "Cannot switch database while a transaction is active on `{}`",
                    active
                )));
            }
        }
        self.current = Some(canonical);
        Ok(())
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_database.is_some()
    }

    pub fn begin_transaction(&mut self) -> Result<()> {
        if let Some(active) = &self.transaction_database {
            return Err(DbError::transaction(format!(
                "A transaction is already active on `{}`",
                active
            )));
        }
        let database = self.current_database_mut()?;
        database.begin_transaction()?;
        let name = database.name.clone();
        info!(database = %name, "transaction started");
        self.transaction_database = Some(name);
        Ok(())
    }

    /// Commits in memory, then writes the database back. If writing fails the
    /// in-memory state stays committed and the error is returned; files may
    /// lag behind until the next successful save.
    pub fn commit_transaction(&mut self) -> Result<()> {
        let name = self
            .transaction_database
            .take()
            .ok_or_else(|| DbError::transaction("No active transaction to commit"))?;
        let pending = std::mem::take(&mut self.pending_deletes);
        let directory = self.config.database_dir(&name);
        let database = self
            .databases
            .iter_mut()
            .find(|database| database.matches_name(&name))
            .ok_or_else(|| DbError::schema(format!("Database `{}` does not exist", name)))?;
        database.commit_transaction()?;

        for table in &pending {
            if !database.has_table(table) {
                storage::delete_table_files(&directory, table)?;
            }
        }
        for table in database.tables() {
            storage::save_table(&directory, table, &database.indexes_for(&table.name))?;
        }
        info!(database = %name, "transaction committed");
        Ok(())
    }

    pub fn rollback_transaction(&mut self) -> Result<()> {
        let name = self
            .transaction_database
            .take()
            .ok_or_else(|| DbError::transaction("No active transaction to roll back"))?;
        self.pending_deletes.clear();
        if let Some(database) = self
            .databases
            .iter_mut()
            .find(|database| database.matches_name(&name))
        {
            database.rollback_transaction()?;
        }
        info!(database = %name, "transaction rolled back");
        Ok(())
    }

    fn save_table(&self, table: &str) -> Result<()> {
        let database = self.current_database()?;
        let table = database.table(table)?;
        storage::save_table(
            &self.config.database_dir(&database.name),
            table,
            &database.indexes_for(&table.name),
        )
    }

    fn remove_table_files(&mut self, table: &str) -> Result<()> {
        if self.in_transaction() {
            self.pending_deletes.push(table.to_string());
            return Ok(());
        }
        storage::delete_table_files(&self.current_directory()?, table)
    }

    fn persist(&self, table: &str) -> Result<()> {
        if self.in_transaction() {
            return Ok(());
        }
        self.save_table(table)
    }

    pub fn create_table(
        &mut self,
        name: &str,
        definition: TableDefinition,
        if_not_exists: bool,
    ) -> Result<bool> {
        let database = self.current_database_mut()?;
        if if_not_exists && database.has_table(name) {
            return Ok(false);
        }
        database.create_table(name, definition)?;
        self.persist(name)?;
        Ok(true)
    }

    pub fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        let database = self.current_database_mut()?;
        if if_exists && !database.has_table(name) {
            return Ok(false);
        }
        let table = database.drop_table(name)?;
        self.remove_table_files(&table.name)?;
        Ok(true)
    }

    pub fn alter_table(&mut self, name: &str, action: &AlterTableAction) -> Result<()> {
        let database = self.current_database_mut()?;
        let old_name = database.table(name)?.name.clone();
        database.alter_table(&old_name, action)?;
        let new_name = match action {
            AlterTableAction::RenameTable { new_name } => {
                if !new_name.eq_ignore_ascii_case(&old_name) {
                    self.remove_table_files(&old_name)?;
                }
                new_name.clone()
            }
            _ => old_name,
        };
        self.persist(&new_name)
    }

    pub fn create_index(
        &mut self,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> Result<()> {
        self.current_database_mut()?
            .create_index(name, table, columns, unique)?;
        self.persist(table)
    }

    pub fn drop_index(&mut self, name: &str) -> Result<Index> {
        let index = self.current_database_mut()?.drop_index(name)?;
        self.persist(&index.table)?;
        Ok(index)
    }

    pub fn insert_data(&mut self, table: &str, values: &[(String, Option<String>)]) -> Result<()> {
        self.current_database_mut()?.insert_data(table, values)?;
        self.persist(table)
    }

    pub fn update_data(
        &mut self,
        table: &str,
        assignments: &[Assignment],
        condition: &Condition,
    ) -> Result<UpdateOutcome> {
        let outcome = self
            .current_database_mut()?
            .update_data(table, assignments, condition)?;
        self.persist(table)?;
        Ok(outcome)
    }

    pub fn delete_data(&mut self, table: &str, condition: &Condition) -> Result<usize> {
        let deleted = self.current_database_mut()?.delete_data(table, condition)?;
        self.persist(table)?;
        Ok(deleted)
    }

    pub fn select(&self, query: &SelectQuery) -> Result<ResultSet> {
        self.current_database()?.select(query)
    }

    pub fn explain(&self, query: &SelectQuery) -> Result<ResultSet> {
        self.current_database()?.explain(query)
    }

    /// One row per field: `Field, Type, Null, Key, Default`.
    pub fn describe(&self, table: &str) -> Result<ResultSet> {
        let table = self.current_database()?.table(table)?;
        let rows = table
            .fields
            .iter()
            .map(|field| {
                let single_unique = table
                    .unique_constraints
                    .iter()
                    .any(|unique| unique.columns.len() == 1 && unique.columns[0] == field.name);
                let key = if field.is_primary_key() {
                    "PRI"
                } else if field.is_unique() || single_unique {
                    "UNI"
                } else {
                    ""
                };
                let nullable = if field.is_not_null() || field.is_primary_key() {
                    "NO"
                } else {
                    "YES"
                };
                vec![
                    Some(field.name.clone()),
                    Some(field.typestring()),
                    Some(nullable.to_string()),
                    Some(key.to_string()),
                    table.defaults.get(&field.name).cloned(),
                ]
            })
            .collect();
        Ok(ResultSet {
            columns: ["Field", "Type", "Null", "Key", "Default"]
                .iter()
                .map(|column| column.to_string())
                .collect(),
            rows,
        })
    }

    pub fn show_databases(&self) -> ResultSet {
        ResultSet {
            columns: vec!["Database".to_string()],
            rows: self
                .databases
                .iter()
                .map(|database| vec![Some(database.name.clone())])
                .collect(),
        }
    }

    pub fn show_tables(&self) -> Result<ResultSet> {
        let database = self.current_database()?;
        Ok(ResultSet {
            columns: vec![format!("Tables_in_{}", database.name)],
            rows: database
                .tables()
                .iter()
                .map(|table| vec![Some(table.name.clone())])
                .collect(),
        })
    }

    pub fn show_indexes(&self, table: Option<&str>) -> Result<ResultSet> {
        let database = self.current_database()?;
        if let Some(table) = table {
            database.table(table)?;
        }
        let rows = database
            .indexes()
            .iter()
            .filter(|index| table.is_none_or(|table| index.belongs_to(table)))
            .map(|index| {
                vec![
                    Some(index.table.clone()),
                    Some(index.name.clone()),
                    Some(index.columns.join(", ")),
                    Some(if index.unique { "YES" } else { "NO" }.to_string()),
                ]
            })
            .collect();
        Ok(ResultSet {
            columns: ["Table", "Index", "Columns", "Unique"]
                .iter()
                .map(|column| column.to_string())
                .collect(),
            rows,
        })
    }
}

fn no_database_selected() -> DbError {
    DbError::schema("No database selected")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::core::field::{Constraint, DataType, Field};

    fn open(dir: &tempfile::TempDir) -> Manager {
        Manager::open(EngineConfig::new(dir.path())).unwrap()
    }

    fn users() -> TableDefinition {
        TableDefinition {
            fields: vec![
                Field::new("id", DataType::Int).with_constraint(Constraint::PrimaryKey),
                Field::new("name", DataType::Text),
            ],
            ..TableDefinition::default()
        }
    }

    fn row(id: &str) -> Vec<(String, Option<String>)> {
        vec![("id".to_string(), Some(id.to_string()))]
    }

    #[test]
    fn databases_are_recorded_in_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        assert!(manager.create_database("shop", false).unwrap());
        assert!(!manager.create_database("SHOP", true).unwrap());
        assert!(manager.create_database("shop", false).is_err());
        assert!(manager.create_database("../evil", false).is_err());

        let reopened = open(&dir);
        assert_eq!(reopened.database_names(), vec!["shop"]);
        assert_eq!(catalog::read_catalog(&reopened.config().catalog_path()).unwrap().len(), 1);
    }

    #[test]
    fn dml_outside_a_transaction_is_written_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        manager.create_table("users", users(), false).unwrap();
        manager.insert_data("users", &row("1")).unwrap();

        let mut reopened = open(&dir);
        reopened.use_database("shop").unwrap();
        assert_eq!(reopened.current_database().unwrap().table("users").unwrap().len(), 1);
    }

    #[test]
    fn transaction_defers_files_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        manager.create_table("users", users(), false).unwrap();

        manager.begin_transaction().unwrap();
        assert!(manager.begin_transaction().is_err());
        assert!(manager.use_database("other").is_err());
        manager.insert_data("users", &row("1")).unwrap();
        manager.create_table("orders", users(), false).unwrap();
        {
            let reopened = open(&dir);
            let shop = reopened.database("shop").unwrap();
            assert!(!shop.has_table("orders"));
            assert_eq!(shop.table("users").unwrap().len(), 0);
        }
        manager.commit_transaction().unwrap();

        let reopened = open(&dir);
        let shop = reopened.database("shop").unwrap();
        assert!(shop.has_table("orders"));
        assert_eq!(shop.table("users").unwrap().len(), 1);
    }

    #[test]
    fn rollback_discards_pending_drops() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        manager.create_table("users", users(), false).unwrap();
        manager.insert_data("users", &row("1")).unwrap();

        manager.begin_transaction().unwrap();
        manager.drop_table("users", false).unwrap();
        assert!(manager.drop_database("shop", false).is_err());
        manager.rollback_transaction().unwrap();
        assert!(manager.rollback_transaction().is_err());

        let reopened = open(&dir);
        assert_eq!(reopened.database("shop").unwrap().table("users").unwrap().len(), 1);
        assert_eq!(manager.current_database().unwrap().table("users").unwrap().len(), 1);
    }

    #[test]
    fn rename_moves_table_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        manager.create_table("users", users(), false).unwrap();
        manager
            .alter_table(
                "users",
                &AlterTableAction::RenameTable {
                    new_name: "people".to_string(),
                },
            )
            .unwrap();
        let directory = manager.config().database_dir("shop");
        assert_eq!(storage::table_names(&directory).unwrap(), vec!["people".to_string()]);
    }

    #[test]
    fn malformed_tables_are_skipped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        manager.create_table("users", users(), false).unwrap();
        manager.create_table("broken", users(), false).unwrap();
        let directory = manager.config().database_dir("shop");
        fs::write(storage::table_file(&directory, "broken", "tdf"), [1, 2, 3]).unwrap();

        let reopened = open(&dir);
        let shop = reopened.database("shop").unwrap();
        assert!(shop.has_table("users"));
        assert!(!shop.has_table("broken"));
    }

    #[test]
    fn stray_directories_are_adopted() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data").join("legacy")).unwrap();
        let manager = open(&dir);
        assert_eq!(manager.database_names(), vec!["legacy"]);
        assert_eq!(catalog::read_catalog(&manager.config().catalog_path()).unwrap().len(), 1);
    }

    #[test]
    fn statements_need_a_current_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        assert!(manager.create_table("users", users(), false).is_err());
        assert!(manager.begin_transaction().is_err());
        assert!(manager.show_tables().is_err());
    }

    #[test]
    fn describe_reports_keys_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = open(&dir);
        manager.create_database("shop", false).unwrap();
        manager.use_database("shop").unwrap();
        let mut definition = users();
        definition.defaults.insert("name".to_string(), "'anon'".to_string());
        manager.create_table("users", definition, false).unwrap();
        let described = manager.describe("users").unwrap();
        assert_eq!(described.columns, vec!["Field", "Type", "Null", "Key", "Default"]);
        assert_eq!(
            described.rows[0],
            vec![
                Some("id".to_string()),
                Some("INT".to_string()),
                Some("NO".to_string()),
                Some("PRI".to_string()),
                None
            ]
        );
        assert_eq!(described.rows[1][4], Some("'anon'".to_string()));
    }
}

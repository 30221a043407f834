use std::env;
use std::path::PathBuf;

pub const ROOT_ENV_VAR: &str = "MOLLYSTORE_ROOT";
pub const DATA_DIR: &str = "data";
pub const CATALOG_FILE: &str = "catalog.dbc";

/// Engine configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Directory holding `data/` and the catalog file.
    pub root: PathBuf,
    /// Create the root directory tree when it is missing.
    pub create_if_missing: bool,
}

impl EngineConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            create_if_missing: true,
        }
    }

    pub fn from_env() -> Self {
        match env::var_os(ROOT_ENV_VAR) {
            Some(root) => Self::new(root),
            None => Self::default(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn database_dir(&self, database: &str) -> PathBuf {
        self.data_dir().join(database)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir().join(CATALOG_FILE)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("./mollystore_data")
    }
}

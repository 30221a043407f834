use mollystore::interpreter::executor::Session;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tempfile::TempDir;

use super::{first_column, query, run_ok, shop_session};

/// Loads the same rows into a mollystore session and an in-memory SQLite
/// connection so predicates can be checked against both.
pub struct ParityManager {
    _root: TempDir,
    session: Session,
    sqlite_conn: Connection,
}

impl ParityManager {
    pub fn new(setup: &[&str]) -> Self {
        let (root, mut session) = shop_session();
        let sqlite_conn = Connection::open_in_memory().expect("Failed to create in-memory SQLite DB");
        for statement in setup {
            run_ok(&mut session, statement);
            sqlite_conn
                .execute(statement, [])
                .unwrap_or_else(|error| panic!("SQLite rejected `{}`: {}", statement, error));
        }
        Self {
            _root: root,
            session,
            sqlite_conn,
        }
    }

    /// `sql` must select a single key column; both engines must return the
    /// same keys in the same order.
    pub fn assert_parity_query(&mut self, sql: &str) {
        let molly_rows = query(&mut self.session, sql);
        let molly_keys: Vec<Option<String>> = first_column(&molly_rows)
            .into_iter()
            .map(|cell| cell.map(|cell| cell.to_string()))
            .collect();

        let mut statement = self
            .sqlite_conn
            .prepare(sql)
            .unwrap_or_else(|error| panic!("SQLite could not prepare `{}`: {}", sql, error));
        let mut rows = statement.query([]).expect("SQLite query failed");
        let mut sqlite_keys = vec![];
        while let Some(row) = rows.next().expect("SQLite next failed") {
            sqlite_keys.push(sqlite_val_to_text(row.get_ref(0).unwrap()));
        }

        assert_eq!(sqlite_keys, molly_keys, "results differ for `{}`", sql);
    }
}

fn sqlite_val_to_text(val: ValueRef) -> Option<String> {
    match val {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).to_string()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).to_string()),
    }
}

#![allow(dead_code)] // each test binary uses a different subset of these helpers

pub mod parity;

use std::path::Path;

use mollystore::config::EngineConfig;
use mollystore::db::manager::Manager;
use mollystore::db::table::operations::select::ResultSet;
use mollystore::error::DbError;
use mollystore::interpreter::executor::{Session, StatementOutcome};
use mollystore::interpreter::run_sql;
use tempfile::TempDir;

pub fn open_session(root: &Path) -> Session {
    Session::new(Manager::open(EngineConfig::new(root)).unwrap())
}

/// A session on a fresh storage root with database `shop` selected.
pub fn shop_session() -> (TempDir, Session) {
    let root = tempfile::tempdir().unwrap();
    let mut session = open_session(root.path());
    run_ok(&mut session, "CREATE DATABASE shop; USE shop;");
    (root, session)
}

/// Runs `sql` and panics on the first failing statement.
pub fn run_ok(session: &mut Session, sql: &str) -> Vec<StatementOutcome> {
    run_sql(session, sql)
        .into_iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(outcome) => outcome,
            Err(error) => panic!("statement {} failed: {}", index + 1, error),
        })
        .collect()
}

/// Runs a single query and returns its rows.
pub fn query(session: &mut Session, sql: &str) -> ResultSet {
    match run_ok(session, sql).pop() {
        Some(StatementOutcome::Rows(result)) => result,
        other => panic!("expected rows from `{}`, got {:?}", sql, other),
    }
}

pub fn run_err(session: &mut Session, sql: &str) -> DbError {
    match run_sql(session, sql).pop() {
        Some(Err(error)) => error,
        other => panic!("expected `{}` to fail, got {:?}", sql, other),
    }
}

pub fn cells(result: &ResultSet) -> Vec<Vec<Option<&str>>> {
    result
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.as_deref()).collect())
        .collect()
}

/// Values of the first column.
pub fn first_column(result: &ResultSet) -> Vec<Option<&str>> {
    result.rows.iter().map(|row| row[0].as_deref()).collect()
}

mod common;

use std::fs;

use common::{cells, first_column, open_session, query, run_err, run_ok};
use mollystore::config::EngineConfig;
use mollystore::db::manager::Manager;
use mollystore::error::DbError;
use mollystore::storage::catalog::{self, BLOCK_SIZE};

#[test]
fn test_tables_survive_restart() {
    let root = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(root.path());
        run_ok(
            &mut session,
            "CREATE DATABASE shop; USE shop;
             CREATE TABLE users (
                id INT PRIMARY KEY,
                name VARCHAR(20) NOT NULL DEFAULT 'anon',
                nick CHAR(4) UNIQUE,
                balance DECIMAL(8,2) CHECK (balance >= 0),
                kind ENUM('basic', 'pro'),
                joined DATE
             );
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
             CREATE INDEX idx_kind ON users (kind);
             INSERT INTO users VALUES (1, 'Ann', 'an', 10.25, 'pro', '2024-02-29');
             INSERT INTO users (id, nick) VALUES (2, NULL);
             INSERT INTO users VALUES (3, '', 'x', NULL, NULL, NULL);
             DELETE FROM users WHERE id = 2;",
        );
    }

    let mut session = open_session(root.path());
    run_ok(&mut session, "USE shop;");
    assert_eq!(
        first_column(&query(&mut session, "SHOW TABLES;")),
        vec![Some("orders"), Some("users")]
    );
    let result = query(&mut session, "SELECT * FROM users ORDER BY id;");
    assert_eq!(
        cells(&result),
        vec![
            vec![Some("1"), Some("Ann"), Some("an"), Some("10.25"), Some("pro"), Some("2024-02-29")],
            vec![Some("3"), Some(""), Some("x"), None, None, None],
        ]
    );

    let description = query(&mut session, "DESCRIBE users;");
    assert_eq!(cells(&description)[1][4], Some("'anon'"));
    assert_eq!(cells(&description)[4][1], Some("ENUM('basic','pro')"));

    let indexes = query(&mut session, "SHOW INDEXES FROM users;");
    assert_eq!(first_column(&indexes), vec![Some("users")]);

    // Constraints came back with the schema.
    let rejected = mollystore::interpreter::run_sql(
        &mut session,
        "INSERT INTO users VALUES (4, 'Bo', 'an', 1, 'pro', NULL);
         INSERT INTO users VALUES (5, 'Cy', 'cy', -1, 'pro', NULL);
         INSERT INTO users VALUES (6, 'Di', 'di', 1, 'gold', NULL);",
    );
    assert!(rejected.iter().all(|result| result.is_err()));
}

#[test]
fn test_alter_and_drop_are_persisted() {
    let root = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(root.path());
        run_ok(
            &mut session,
            "CREATE DATABASE shop; USE shop;
             CREATE TABLE users (id INT PRIMARY KEY, name TEXT);
             INSERT INTO users VALUES (1, 'Ann');
             ALTER TABLE users RENAME TO people;
             ALTER TABLE people ADD COLUMN age INT DEFAULT 7;
             CREATE TABLE scratch (id INT);
             DROP TABLE scratch;
             CREATE DATABASE old; DROP DATABASE old;",
        );
    }
    let data_dir = root.path().join("data");
    assert!(!data_dir.join("shop").join("users.tdf").exists());
    assert!(!data_dir.join("shop").join("scratch.tdf").exists());
    assert!(!data_dir.join("old").exists());

    let mut session = open_session(root.path());
    assert_eq!(first_column(&query(&mut session, "SHOW DATABASES;")), vec![Some("shop")]);
    run_ok(&mut session, "USE shop;");
    let result = query(&mut session, "SELECT * FROM people;");
    assert_eq!(result.columns, vec!["id", "name", "age"]);
    assert_eq!(cells(&result), vec![vec![Some("1"), Some("Ann"), Some("7")]]);
}

#[test]
fn test_catalog_tracks_databases() {
    let root = tempfile::tempdir().unwrap();
    let config = EngineConfig::new(root.path());
    {
        let mut session = open_session(root.path());
        run_ok(&mut session, "CREATE DATABASE alpha; CREATE DATABASE beta;");
    }
    let catalog_bytes = fs::read(config.catalog_path()).unwrap();
    assert_eq!(catalog_bytes.len(), 2 * BLOCK_SIZE);

    // A directory nobody registered is adopted, a registered one that vanished is dropped.
    fs::remove_dir_all(config.database_dir("beta")).unwrap();
    fs::create_dir_all(config.database_dir("gamma")).unwrap();
    let manager = Manager::open(config.clone()).unwrap();
    assert_eq!(manager.database_names(), vec!["alpha", "gamma"]);

    let entries = catalog::read_catalog(&config.catalog_path()).unwrap();
    let names: Vec<&str> = entries.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "gamma"]);
}

#[test]
fn test_unreadable_table_is_skipped() {
    let root = tempfile::tempdir().unwrap();
    {
        let mut session = open_session(root.path());
        run_ok(
            &mut session,
            "CREATE DATABASE shop; USE shop;
             CREATE TABLE good (id INT); CREATE TABLE bad (id INT);
             INSERT INTO good VALUES (1);",
        );
    }
    let definition = root.path().join("data").join("shop").join("bad.tdf");
    fs::write(&definition, [0xff, 0x01]).unwrap();

    let mut session = open_session(root.path());
    run_ok(&mut session, "USE shop;");
    assert_eq!(first_column(&query(&mut session, "SHOW TABLES;")), vec![Some("good")]);
}

#[test]
fn test_missing_root_without_create_flag() {
    let root = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        create_if_missing: false,
        ..EngineConfig::new(root.path().join("nowhere"))
    };
    assert!(matches!(Manager::open(config), Err(DbError::Io(_))));
}

#[test]
fn test_committed_row_of_every_type_survives_restart() {
    use mollystore::db::table::{DataType, Value};

    let root = tempfile::tempdir().unwrap();
    let select = "SELECT * FROM everything ORDER BY id;";
    let before = {
        let mut session = open_session(root.path());
        run_ok(
            &mut session,
            "CREATE DATABASE shop; USE shop;
             CREATE TABLE everything (
                id INT PRIMARY KEY, tiny TINYINT, small SMALLINT, big BIGINT,
                ratio FLOAT, amount DOUBLE, price DECIMAL(8,3), code CHAR(3),
                label VARCHAR(10), note TEXT, kind ENUM('a','b'), born DATE,
                seen DATETIME, stamped TIMESTAMP, active BOOL
             );
             BEGIN;
             INSERT INTO everything VALUES
                (1, -7, 300, 9007199254740993, 16777217, 0.1, 12.345, 'ab', 'hey', '', 'b',
                 '2024-02-29', '2024-01-02 03:04:05.750', '1999-12-31 23:59:59', TRUE),
                (2, NULL, NULL, NULL, '1e300', '-2.5e-8', NULL, NULL, NULL, NULL, NULL,
                 NULL, '2024-01-02T03:04:05.000001', NULL, FALSE);
             COMMIT;",
        );
        query(&mut session, select)
    };

    let mut session = open_session(root.path());
    run_ok(&mut session, "USE shop;");
    let after = query(&mut session, select);
    assert_eq!(after.columns, before.columns);
    assert_eq!(after.rows.len(), 2);

    let types = [
        DataType::Int, DataType::TinyInt, DataType::SmallInt, DataType::BigInt,
        DataType::Float, DataType::Double, DataType::Decimal, DataType::Char,
        DataType::Varchar, DataType::Text, DataType::Enum, DataType::Date,
        DataType::DateTime, DataType::Timestamp, DataType::Bool,
    ];
    let typed = |row: &Vec<Option<String>>| -> Vec<Option<Value>> {
        row.iter()
            .zip(types)
            .map(|(cell, data_type)| cell.as_deref().map(|raw| Value::convert(Some(raw), data_type)))
            .collect()
    };
    for (old, new) in before.rows.iter().zip(&after.rows) {
        assert_eq!(typed(new), typed(old));
    }
    assert_eq!(cells(&after)[0][12], Some("2024-01-02 03:04:05.750"));
    assert_eq!(cells(&after)[0][4], Some("16777217"));
    assert_eq!(cells(&after)[1][12], Some("2024-01-02 03:04:05.000001"));
}

#[test]
fn test_table_names_stay_inside_the_database_directory() {
    let root = tempfile::tempdir().unwrap();
    let mut session = open_session(root.path());
    run_ok(&mut session, "CREATE DATABASE shop; USE shop; CREATE TABLE users (id INT);");
    assert!(matches!(
        run_err(&mut session, "CREATE TABLE \"../../escaped\" (id INT);"),
        DbError::Schema(_)
    ));
    assert!(matches!(
        run_err(&mut session, "ALTER TABLE users RENAME TO `../moved`;"),
        DbError::Schema(_)
    ));
    assert!(!root.path().join("escaped.tdf").exists());
    assert!(!root.path().join("data").join("moved.tdf").exists());
    assert_eq!(first_column(&query(&mut session, "SHOW TABLES;")), vec![Some("users")]);
}

#[test]
fn test_enum_with_an_empty_member_is_rejected() {
    let root = tempfile::tempdir().unwrap();
    let mut session = open_session(root.path());
    run_ok(&mut session, "CREATE DATABASE shop; USE shop;");
    assert!(matches!(
        run_err(&mut session, "CREATE TABLE e (id INT PRIMARY KEY, k ENUM(''));"),
        DbError::Schema(_)
    ));
    run_ok(&mut session, "CREATE TABLE e (id INT PRIMARY KEY, k ENUM('x')); INSERT INTO e VALUES (1, 'x');");
    drop(session);

    let mut session = open_session(root.path());
    run_ok(&mut session, "USE shop;");
    assert_eq!(first_column(&query(&mut session, "SELECT k FROM e;")), vec![Some("x")]);
}

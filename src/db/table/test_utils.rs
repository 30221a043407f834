use crate::db::table::core::field::{Constraint, DataType, Field};
use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;

pub fn record(values: &[(&str, Option<&str>)]) -> Record {
    Record::from_values(
        values
            .iter()
            .map(|(name, value)| (name.to_string(), value.map(|value| value.to_string())))
            .collect(),
    )
}

pub fn default_table() -> Table {
    let mut table = Table::new(
        "users",
        "test_db",
        vec![
            Field::new("id", DataType::Int).with_constraint(Constraint::PrimaryKey),
            Field::new("name", DataType::Varchar).with_constraint(Constraint::Size(50)),
            Field::new("age", DataType::Int),
            Field::new("money", DataType::Double),
        ],
    );
    table.set_records(vec![
        record(&[("id", Some("1")), ("name", Some("John")), ("age", Some("25")), ("money", Some("1000"))]),
        record(&[("id", Some("2")), ("name", Some("Jane")), ("age", Some("30")), ("money", Some("2000"))]),
        record(&[("id", Some("3")), ("name", Some("Jim")), ("age", Some("35")), ("money", Some("3000"))]),
        record(&[("id", Some("4")), ("name", None), ("age", Some("40")), ("money", Some("4000"))]),
    ]);
    table
}

pub fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|record| record.value("id").unwrap_or("NULL").to_string())
        .collect()
}

pub fn assert_table_ids_unordered(mut expected: Vec<&str>, records: &[Record]) {
    let mut actual = ids(records);
    expected.sort();
    actual.sort();
    assert_eq!(expected, actual);
}

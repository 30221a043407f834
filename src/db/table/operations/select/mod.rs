pub mod explain;
pub mod join;

use std::fmt;

use crate::db::table::core::condition::Condition;
use crate::db::table::core::field::Field;
use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;
use crate::db::table::core::value::Value;
use crate::db::table::operations::helpers::order_by_clause::{
    apply_order_by_from_precomputed, OrderByKey, OrderDirection,
};
use crate::db::table::operations::helpers::where_clause::{evaluate, matching_indices, JoinSide};
use crate::error::{DbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub name: String,
    pub alias: Option<String>,
}

impl TableReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{} AS {}", self.name, alias),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER"),
            JoinKind::Left => write!(f, "LEFT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableReference,
    pub on: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    All,
    Column { name: String, alias: Option<String> },
}

impl fmt::Display for SelectColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectColumn::All => write!(f, "*"),
            SelectColumn::Column {
                name,
                alias: Some(alias),
            } => write!(f, "{} AS {}", name, alias),
            SelectColumn::Column { name, alias: None } => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub table: TableReference,
    pub join: Option<JoinClause>,
    pub columns: Vec<SelectColumn>,
    pub condition: Condition,
    pub order_by: Vec<OrderByKey>,
}

impl SelectQuery {
    /// `SELECT * FROM table`.
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: TableReference::new(table),
            join: None,
            columns: vec![SelectColumn::All],
            condition: Condition::Empty,
            order_by: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    /// Values of one result column, in row order.
    pub fn column_values(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().map(|row| row[index].as_deref()).collect(),
            None => vec![],
        }
    }
}

/// Aligned text table; NULL cells print as `NULL`.
impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|column| column.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.as_deref().unwrap_or("NULL").chars().count());
            }
        }
        let separator = widths
            .iter()
            .map(|width| "-".repeat(width + 2))
            .collect::<Vec<_>>()
            .join("+");
        writeln!(f, "+{}+", separator)?;
        write_row(f, &widths, self.columns.iter().map(String::as_str).collect())?;
        writeln!(f, "+{}+", separator)?;
        for row in &self.rows {
            write_row(f, &widths, row.iter().map(|cell| cell.as_deref().unwrap_or("NULL")).collect())?;
        }
        write!(f, "+{}+", separator)
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: Vec<&str>) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
        .collect();
    writeln!(f, "|{}|", padded.join("|"))
}

/// A table taking part in a query, under its optional alias.
pub struct Source<'a> {
    pub table: &'a Table,
    pub alias: Option<&'a str>,
}

impl<'a> Source<'a> {
    fn answers_to(&self, qualifier: &str) -> bool {
        self.table.matches_name(qualifier)
            || self
                .alias
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }

    fn display_name(&self) -> &'a str {
        self.alias.unwrap_or(&self.table.name)
    }
}

/// Visible records of `table` matching `condition`, in storage order.
pub fn select_data(table: &Table, condition: &Condition) -> Result<Vec<Record>> {
    Ok(matching_indices(table, condition)?
        .into_iter()
        .map(|index| table.records()[index].clone())
        .collect())
}

/// Runs `query` against `table`, joined with `joined` when the query has a JOIN.
pub fn select(query: &SelectQuery, table: &Table, joined: Option<&Table>) -> Result<ResultSet> {
    let mut sources = vec![Source {
        table,
        alias: query.table.alias.as_deref(),
    }];

    let rows = match (&query.join, joined) {
        (Some(join), Some(right_table)) => {
            let right = Source {
                table: right_table,
                alias: join.table.alias.as_deref(),
            };
            let rows = join::join_rows(&sources[0], &right, join.kind, &join.on, &query.condition)?;
            sources.push(right);
            rows
        }
        (None, _) => {
            let single = JoinSide {
                table,
                alias: query.table.alias.as_deref(),
                record: None,
            };
            let mut rows = vec![];
            for record in table.records() {
                let side = JoinSide {
                    record: Some(record),
                    ..single
                };
                if evaluate(&query.condition, &side)? {
                    rows.push(vec![Some(record)]);
                }
            }
            rows
        }
        (Some(join), None) => {
            return Err(DbError::schema(format!(
                "Table `{}` does not exist",
                join.table.name
            )));
        }
    };

    let (columns, projection) = expand_columns(&sources, &query.columns)?;

    let mut order_expressions = vec![];
    for key in &query.order_by {
        let aliased = query.columns.iter().find_map(|column| match column {
            SelectColumn::Column {
                name,
                alias: Some(alias),
            } if alias.eq_ignore_ascii_case(&key.column) => Some(name.as_str()),
            _ => None,
        });
        order_expressions.push(resolve_column(&sources, aliased.unwrap_or(&key.column))?);
    }
    let precomputed = rows
        .iter()
        .map(|row| {
            order_expressions
                .iter()
                .map(|(source, field)| {
                    Value::convert(row[*source].and_then(|record| record.value(&field.name)), field.data_type)
                })
                .collect::<Vec<Value>>()
        })
        .collect::<Vec<Vec<Value>>>();

    let mut result_rows = rows
        .iter()
        .map(|row| {
            projection
                .iter()
                .map(|(source, field)| {
                    row[*source]
                        .and_then(|record| record.value(&field.name))
                        .map(|value| value.to_string())
                })
                .collect::<Vec<Option<String>>>()
        })
        .collect::<Vec<Vec<Option<String>>>>();
    let directions = query
        .order_by
        .iter()
        .map(|key| key.direction)
        .collect::<Vec<OrderDirection>>();
    apply_order_by_from_precomputed(&mut result_rows, precomputed, &directions);

    Ok(ResultSet {
        columns,
        rows: result_rows,
    })
}

fn expand_columns<'a>(
    sources: &[Source<'a>],
    columns: &[SelectColumn],
) -> Result<(Vec<String>, Vec<(usize, &'a Field)>)> {
    let mut names = vec![];
    let mut projection = vec![];
    for column in columns {
        match column {
            SelectColumn::All => {
                for (index, source) in sources.iter().enumerate() {
                    for field in &source.table.fields {
                        if sources.len() > 1 {
                            names.push(format!("{}.{}", source.display_name(), field.name));
                        } else {
                            names.push(field.name.clone());
                        }
                        projection.push((index, field));
                    }
                }
            }
            SelectColumn::Column { name, alias } => {
                projection.push(resolve_column(sources, name)?);
                names.push(alias.clone().unwrap_or_else(|| name.clone()));
            }
        }
    }
    Ok((names, projection))
}

/// Strict resolution for projection and ordering: unknown or ambiguous
/// columns are schema errors.
fn resolve_column<'a>(sources: &[Source<'a>], column: &str) -> Result<(usize, &'a Field)> {
    if let Some((qualifier, name)) = column.split_once('.') {
        if let Some(index) = sources.iter().position(|source| source.answers_to(qualifier)) {
            let table = sources[index].table;
            return table
                .field(name)
                .map(|field| (index, field))
                .ok_or_else(|| {
                    DbError::schema(format!(
                        "Field `{}` does not exist in table `{}`",
                        name, table.name
                    ))
                });
        }
        return Err(DbError::schema(format!(
            "Unknown table or alias `{}` in `{}`",
            qualifier, column
        )));
    }
    let candidates = sources
        .iter()
        .enumerate()
        .filter_map(|(index, source)| source.table.field(column).map(|field| (index, field)))
        .collect::<Vec<(usize, &Field)>>();
    match candidates.as_slice() {
        [found] => Ok(*found),
        [] => Err(DbError::schema(format!(
            "Field `{}` does not exist in table `{}`",
            column,
            sources
                .iter()
                .map(|source| source.table.name.as_str())
                .collect::<Vec<&str>>()
                .join("` or `")
        ))),
        _ => Err(DbError::schema(format!("Column `{}` is ambiguous", column))),
    }
}

use std::cmp::Ordering;

use tracing::warn;

use crate::db::table::core::condition::{Comparison, ComparisonOperator, Condition, LogicalOperator, Operand};
use crate::db::table::core::field::DataType;
use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;
use crate::db::table::core::value::Value;
use crate::db::table::operations::helpers::like::like_matches;
use crate::error::{DbError, Result};

/// Result of resolving a column name against a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    Found {
        data_type: DataType,
        raw: Option<&'a str>,
    },
    Absent,
}

/// Anything a condition can be evaluated against.
pub trait RowSource {
    fn lookup(&self, column: &str) -> Result<Lookup<'_>>;
}

/// A record of a single table. Unknown columns are schema errors.
pub struct TableRow<'a> {
    pub table: &'a Table,
    pub record: &'a Record,
}

impl RowSource for TableRow<'_> {
    fn lookup(&self, column: &str) -> Result<Lookup<'_>> {
        let field = self.table.resolve_field(column)?;
        Ok(Lookup::Found {
            data_type: field.data_type,
            raw: self.record.value(&field.name),
        })
    }
}

/// One side of a joined row. `record` is `None` for the padded side of a LEFT JOIN.
pub struct JoinSide<'a> {
    pub table: &'a Table,
    pub alias: Option<&'a str>,
    pub record: Option<&'a Record>,
}

impl JoinSide<'_> {
    pub fn answers_to(&self, qualifier: &str) -> bool {
        self.table.matches_name(qualifier)
            || self
                .alias
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }

    pub fn display_name(&self) -> &str {
        self.alias.unwrap_or(&self.table.name)
    }

    fn found(&self, column: &str) -> Option<Lookup<'_>> {
        self.table.field(column).map(|field| Lookup::Found {
            data_type: field.data_type,
            raw: self.record.and_then(|record| record.value(&field.name)),
        })
    }
}

// A lone side is a single-table scan that also answers to its alias.
impl RowSource for JoinSide<'_> {
    fn lookup(&self, column: &str) -> Result<Lookup<'_>> {
        let name = match column.split_once('.') {
            Some((qualifier, name)) if self.answers_to(qualifier) => name,
            _ => column,
        };
        self.found(name).ok_or_else(|| {
            DbError::schema(format!(
                "Field `{}` does not exist in table `{}`",
                column, self.table.name
            ))
        })
    }
}

pub struct JoinedRow<'a> {
    pub left: JoinSide<'a>,
    pub right: JoinSide<'a>,
}

impl RowSource for JoinedRow<'_> {
    fn lookup(&self, column: &str) -> Result<Lookup<'_>> {
        if let Some((qualifier, name)) = column.split_once('.') {
            let side = if self.left.answers_to(qualifier) {
                &self.left
            } else if self.right.answers_to(qualifier) {
                &self.right
            } else {
                return Ok(Lookup::Absent);
            };
            return Ok(side.found(name).unwrap_or(Lookup::Absent));
        }
        match (self.left.found(column), self.right.found(column)) {
            (Some(found), None) | (None, Some(found)) => Ok(found),
            (Some(Lookup::Found { raw, .. }), Some(_)) => {
                warn!(column, "ambiguous column in join, comparing as text");
                Ok(Lookup::Found {
                    data_type: DataType::Text,
                    raw,
                })
            }
            _ => Ok(Lookup::Absent),
        }
    }
}

pub fn evaluate(condition: &Condition, row: &dyn RowSource) -> Result<bool> {
    match condition {
        Condition::Empty => Ok(true),
        Condition::Logic {
            operator: LogicalOperator::And,
            children,
        } => {
            for child in children {
                if !evaluate(child, row)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Condition::Logic {
            operator: LogicalOperator::Or,
            children,
        } => {
            for child in children {
                if evaluate(child, row)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        Condition::Negation(child) => Ok(!evaluate(child, row)?),
        Condition::Comparison(comparison) => evaluate_comparison(comparison, row),
    }
}

/// Indices of the visible records of `table` matching `condition`, in storage order.
pub fn matching_indices(table: &Table, condition: &Condition) -> Result<Vec<usize>> {
    let mut indices = vec![];
    for (index, record) in table.records().iter().enumerate() {
        if evaluate(condition, &TableRow { table, record })? {
            indices.push(index);
        }
    }
    Ok(indices)
}

fn evaluate_comparison(comparison: &Comparison, row: &dyn RowSource) -> Result<bool> {
    let (data_type, raw) = match row.lookup(&comparison.column)? {
        Lookup::Found { data_type, raw } => (data_type, raw),
        Lookup::Absent => return Ok(comparison.operator == ComparisonOperator::IsNull),
    };
    let raw = match (comparison.operator, raw) {
        (ComparisonOperator::IsNull, raw) => return Ok(raw.is_none()),
        (ComparisonOperator::IsNotNull, raw) => return Ok(raw.is_some()),
        (_, None) => return Ok(false),
        (_, Some(raw)) => raw,
    };
    let value = Value::convert(Some(raw), data_type);

    match comparison.operator {
        ComparisonOperator::Like | ComparisonOperator::NotLike => {
            let pattern = match expect_operands(comparison, 1)?[0] {
                Operand::Text(pattern) => pattern.clone(),
                Operand::Null => return Ok(false),
                Operand::Column(column) => match row.lookup(column)? {
                    Lookup::Found {
                        data_type,
                        raw: Some(pattern),
                    } if data_type.is_string_like() => pattern.to_string(),
                    Lookup::Found { raw: None, .. } | Lookup::Absent => return Ok(false),
                    Lookup::Found { .. } => return Err(like_pattern_error(comparison)),
                },
                Operand::Number(_) => return Err(like_pattern_error(comparison)),
            };
            let matched = like_matches(raw, &pattern, comparison.escape)?;
            Ok(matched == (comparison.operator == ComparisonOperator::Like))
        }
        ComparisonOperator::In | ComparisonOperator::NotIn => {
            if comparison.operands.is_empty() {
                return Err(operand_count_error(comparison, 1));
            }
            let mut found = false;
            for operand in &comparison.operands {
                if resolve_operand(operand, data_type, row)? == value {
                    found = true;
                    break;
                }
            }
            Ok(found == (comparison.operator == ComparisonOperator::In))
        }
        ComparisonOperator::Between | ComparisonOperator::NotBetween => {
            let operands = expect_operands(comparison, 2)?;
            let lower = resolve_operand(operands[0], data_type, row)?;
            let upper = resolve_operand(operands[1], data_type, row)?;
            let in_range = match (value.compare(&lower), value.compare(&upper)) {
                (Some(low), Some(high)) => low != Ordering::Less && high != Ordering::Greater,
                _ => return Ok(false),
            };
            Ok(in_range == (comparison.operator == ComparisonOperator::Between))
        }
        operator => {
            let other = resolve_operand(expect_operands(comparison, 1)?[0], data_type, row)?;
            let ordering = match value.compare(&other) {
                Some(ordering) => ordering,
                None => return Ok(false),
            };
            Ok(match operator {
                ComparisonOperator::Equals => ordering == Ordering::Equal,
                ComparisonOperator::NotEquals => ordering != Ordering::Equal,
                ComparisonOperator::LessThan => ordering == Ordering::Less,
                ComparisonOperator::LessEquals => ordering != Ordering::Greater,
                ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
                ComparisonOperator::GreaterEquals => ordering != Ordering::Less,
                _ => false,
            })
        }
    }
}

// Literals take the type of the column they are compared against.
fn resolve_operand(operand: &Operand, data_type: DataType, row: &dyn RowSource) -> Result<Value> {
    match operand {
        Operand::Text(text) | Operand::Number(text) => Ok(Value::convert(Some(text), data_type)),
        Operand::Null => Ok(Value::Null),
        Operand::Column(column) => match row.lookup(column)? {
            Lookup::Found { data_type, raw } => Ok(Value::convert(raw, data_type)),
            Lookup::Absent => Ok(Value::Null),
        },
    }
}

fn expect_operands(comparison: &Comparison, count: usize) -> Result<Vec<&Operand>> {
    if comparison.operands.len() != count {
        return Err(operand_count_error(comparison, count));
    }
    Ok(comparison.operands.iter().collect())
}

fn operand_count_error(comparison: &Comparison, count: usize) -> DbError {
    DbError::Syntax(format!(
        "Operator {} on `{}` expects {} operand(s), found {}",
        comparison.operator,
        comparison.column,
        count,
        comparison.operands.len()
    ))
}

fn like_pattern_error(comparison: &Comparison) -> DbError {
    DbError::Syntax(format!(
        "LIKE pattern for `{}` must be a string",
        comparison.column
    ))
}

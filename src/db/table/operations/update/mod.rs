use std::fmt;

use tracing::warn;

use crate::db::table::core::condition::Condition;
use crate::db::table::core::field::DataType;
use crate::db::table::core::record::Record;
use crate::db::table::core::table::Table;
use crate::db::table::core::value::format_float;
use crate::db::table::operations::helpers::validation::validate_record;
use crate::db::table::operations::helpers::where_clause::matching_indices;
use crate::error::{DbError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Subtract => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    Literal(Option<String>),
    /// `column <op> operand`, computed from the row as it was before the UPDATE.
    Arithmetic {
        column: String,
        operator: ArithmeticOperator,
        operand: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub value: SetValue,
}

#[derive(Debug, Default)]
pub struct UpdateOutcome {
    pub updated: usize,
    /// One entry per matching row that was left untouched.
    pub failures: Vec<DbError>,
}

/// Best-effort per row: a row whose candidate values fail validation is
/// skipped and reported in `failures`, the remaining rows are still updated.
pub fn update_data(
    table: &mut Table,
    assignments: &[Assignment],
    condition: &Condition,
) -> Result<UpdateOutcome> {
    let mut resolved = vec![];
    for assignment in assignments {
        let target = table.resolve_field(&assignment.column)?;
        let value = match &assignment.value {
            SetValue::Arithmetic {
                column,
                operator,
                operand,
            } => SetValue::Arithmetic {
                column: table.canonical_field_name(column)?,
                operator: *operator,
                operand: operand.clone(),
            },
            literal => literal.clone(),
        };
        resolved.push((target.name.clone(), target.data_type, target.scale(), value));
    }

    let row_indicies = matching_indices(table, condition)?;
    let mut outcome = UpdateOutcome::default();
    for index in row_indicies {
        let original = table.records()[index].clone();
        let mut candidate = original.clone();
        for (column, data_type, scale, value) in &resolved {
            let new_value = match value {
                SetValue::Literal(literal) => literal.clone(),
                SetValue::Arithmetic {
                    column: source,
                    operator,
                    operand,
                } => match compute(&original, source, *operator, operand, *data_type, *scale) {
                    Ok(result) => result,
                    Err(error) => {
                        warn!(table = %table.name, row = index, %error, "skipping SET clause");
                        continue;
                    }
                },
            };
            candidate.insert(column.clone(), new_value);
        }

        if let Err(error) = validate_record(table, &candidate, Some(index)) {
            warn!(table = %table.name, row = index, %error, "row not updated");
            outcome.failures.push(error);
            continue;
        }
        table.records_mut()[index] = candidate;
        outcome.updated += 1;
    }
    Ok(outcome)
}

fn compute(
    record: &Record,
    column: &str,
    operator: ArithmeticOperator,
    operand: &str,
    data_type: DataType,
    scale: Option<u32>,
) -> Result<Option<String>> {
    let base = match record.value(column) {
        Some(base) => base.trim(),
        None => return Ok(None),
    };
    let operand = operand.trim();
    let conversion_error = || {
        DbError::Conversion(format!(
            "Cannot compute {} {} {} as {}",
            base, operator, operand, data_type
        ))
    };

    if data_type.is_integer() {
        let left = base.parse::<i64>().map_err(|_| conversion_error())?;
        let right = operand.parse::<i64>().map_err(|_| conversion_error())?;
        if operator == ArithmeticOperator::Divide && right == 0 {
            return Err(DbError::Conversion(format!("Division by zero in `{}`", column)));
        }
        let result = match operator {
            ArithmeticOperator::Add => left.checked_add(right),
            ArithmeticOperator::Subtract => left.checked_sub(right),
            ArithmeticOperator::Multiply => left.checked_mul(right),
            ArithmeticOperator::Divide => left.checked_div(right),
        };
        return result
            .map(|result| Some(result.to_string()))
            .ok_or_else(conversion_error);
    }

    if !data_type.is_float() {
        return Err(conversion_error());
    }
    let left = base.parse::<f64>().map_err(|_| conversion_error())?;
    let right = operand.parse::<f64>().map_err(|_| conversion_error())?;
    if operator == ArithmeticOperator::Divide && right == 0.0 {
        return Err(DbError::Conversion(format!("Division by zero in `{}`", column)));
    }
    let result = match operator {
        ArithmeticOperator::Add => left + right,
        ArithmeticOperator::Subtract => left - right,
        ArithmeticOperator::Multiply => left * right,
        ArithmeticOperator::Divide => left / right,
    };
    let scale = if data_type == DataType::Decimal {
        Some(scale.unwrap_or(0))
    } else {
        None
    };
    Ok(Some(format_float(result, scale)))
}

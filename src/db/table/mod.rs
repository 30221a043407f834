pub mod core;
pub mod operations;
#[cfg(test)]
pub mod test_utils;

pub use self::core::condition::{Comparison, ComparisonOperator, Condition, LogicalOperator, Operand};
pub use self::core::constraint::{CheckConstraint, ForeignKey, ReferentialAction, UniqueConstraint};
pub use self::core::field::{Constraint, DataType, Field};
pub use self::core::record::Record;
pub use self::core::table::{Table, TableDefinition};
pub use self::core::value::Value;

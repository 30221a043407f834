pub mod column_definition;
pub mod common;
pub mod data_type;
pub mod order_by_clause;
pub mod token;
pub mod where_clause;

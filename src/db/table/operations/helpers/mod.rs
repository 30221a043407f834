pub mod like;
pub mod order_by_clause;
pub mod validation;
pub mod where_clause;

pub mod condition;
pub mod constraint;
pub mod field;
pub mod record;
pub mod table;
pub mod value;

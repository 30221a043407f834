pub mod alter_table;
pub mod delete;
pub mod helpers;
pub mod insert;
pub mod select;
pub mod update;

pub mod database;
pub mod index;
pub mod manager;
pub mod table;
pub mod transactions;

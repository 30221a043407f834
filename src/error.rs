use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Conversion error: {0}")]
    Conversion(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed storage file: {0}")]
    Malformed(String),
    #[error("Permission denied: {0}")]
    Permission(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub fn schema(message: impl Into<String>) -> Self {
        DbError::Schema(message.into())
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        DbError::Constraint(message.into())
    }

    pub fn transaction(message: impl Into<String>) -> Self {
        DbError::Transaction(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        DbError::Malformed(message.into())
    }
}

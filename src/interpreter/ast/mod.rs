use crate::db::table::core::condition::Condition;
use crate::db::table::core::table::TableDefinition;
use crate::db::table::operations::alter_table::AlterTableAction;
use crate::db::table::operations::select::SelectQuery;
use crate::db::table::operations::update::Assignment;
use crate::interpreter::tokenizer::{scanner::Token, token::TokenTypes};

mod alter_table_statement;
mod create_statement;
mod delete_statement;
mod drop_statement;
pub mod helpers;
mod insert_statement;
pub mod parser;
mod select_statement;
mod show_statement;
mod statement_builder;
#[cfg(test)]
mod test_utils;
mod transaction_statements;
mod update_statement;

#[derive(Debug, PartialEq)]
pub struct DatabaseSqlStatement {
    pub sql_statement: SqlStatement,
    pub line_num: usize,
    pub statement_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlStatement {
    CreateDatabase(DatabaseStatement),
    DropDatabase(DatabaseStatement),
    UseDatabase(String),
    ShowDatabases,
    ShowTables,
    ShowIndexes(Option<String>),
    Describe(String),
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    AlterTable(AlterTableStatement),
    CreateIndex(CreateIndexStatement),
    DropIndex(String),
    InsertInto(InsertIntoStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Select(SelectQuery),
    Explain(SelectQuery),
    BeginTransaction,
    Commit,
    Rollback,
}

impl SqlStatement {
    /// Whether the statement only reads.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            SqlStatement::UseDatabase(_)
                | SqlStatement::ShowDatabases
                | SqlStatement::ShowTables
                | SqlStatement::ShowIndexes(_)
                | SqlStatement::Describe(_)
                | SqlStatement::Select(_)
                | SqlStatement::Explain(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExistenceCheck {
    IfNotExists,
    IfExists,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStatement {
    pub name: String,
    pub existence_check: Option<ExistenceCheck>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    pub table_name: String,
    pub existence_check: Option<ExistenceCheck>,
    pub definition: TableDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    pub table_name: String,
    pub existence_check: Option<ExistenceCheck>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStatement {
    pub table_name: String,
    pub action: AlterTableAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    pub index_name: String,
    pub table_name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

/// `values` holds one entry per row; `None` is NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertIntoStatement {
    pub table_name: String,
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table_name: String,
    pub assignments: Vec<Assignment>,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table_name: String,
    pub condition: Condition,
}

pub fn generate(tokens: Vec<Token>) -> Vec<Result<DatabaseSqlStatement, String>> {
    let mut results: Vec<Result<DatabaseSqlStatement, String>> = vec![];
    let mut parser = parser::Parser::new(tokens);
    loop {
        // Empty statements (`;;`) are skipped.
        while parser.at(TokenTypes::SemiColon) {
            let _ = parser.advance_past_semicolon();
        }
        let line_num = match parser.line_num() {
            Ok(line_num) => line_num,
            Err(err) => {
                results.push(Err(err));
                break;
            }
        };
        let next_statement = match parser.next_statement() {
            Some(next_statement) => next_statement,
            None => break,
        };
        match next_statement {
            Err(error) => {
                results.push(Err(error));
                // If we encountered a parsing error, skip until we find a semicolon or EOF
                loop {
                    match parser.current_token() {
                        Ok(token) if token.token_type == TokenTypes::EOF => break,
                        Ok(token) if token.token_type == TokenTypes::SemiColon => {
                            let _ = parser.advance_past_semicolon();
                            break;
                        }
                        Ok(_) => {
                            if parser.advance().is_err() {
                                return results;
                            }
                        }
                        Err(_) => return results,
                    }
                }
            }
            Ok(sql_statement) => {
                if let Err(error) = parser.advance_past_semicolon() {
                    results.push(Err(error));
                    return results;
                }
                results.push(Ok(DatabaseSqlStatement {
                    sql_statement,
                    line_num,
                    statement_text: parser.get_sql_statement_text(),
                }));
            }
        }
    }
    return results;
}

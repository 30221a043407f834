use tracing::debug;

use crate::db::table::core::condition::Condition;
use crate::error::{DbError, Result};
use crate::interpreter::ast::helpers::where_clause::get_condition_expression;
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::executor::{Session, StatementOutcome};
use crate::interpreter::tokenizer::token::TokenTypes;

pub mod ast;
pub mod auth;
pub mod executor;
pub mod tokenizer;

/// Parses a `;`-separated script. Parse errors become [`DbError::Syntax`];
/// the statement after a bad one is still parsed.
pub fn generate(sql: &str) -> Vec<Result<ast::DatabaseSqlStatement>> {
    let tokens = tokenizer::tokenize(sql);
    ast::generate(tokens)
        .into_iter()
        .map(|statement| statement.map_err(DbError::Syntax))
        .collect()
}

/// Executes every statement of `sql` in order and returns one result per
/// statement. A failed statement does not stop the ones after it.
pub fn run_sql(session: &mut Session, sql: &str) -> Vec<Result<StatementOutcome>> {
    let mut results = vec![];
    for statement in generate(sql) {
        let result = statement.and_then(|statement| {
            debug!(line = statement.line_num, sql = %statement.statement_text, "executing");
            session.execute(statement.sql_statement)
        });
        results.push(result);
    }
    results
}

/// Parses a stand-alone predicate, as stored for CHECK constraints.
pub fn parse_condition(text: &str) -> Result<Condition> {
    let mut parser = Parser::new(tokenizer::tokenize(text));
    let condition = get_condition_expression(&mut parser).map_err(DbError::Syntax)?;
    if !parser.at(TokenTypes::EOF) {
        return Err(DbError::Syntax(parser.format_error()));
    }
    Ok(condition)
}

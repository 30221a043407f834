use crate::interpreter::ast::helpers::common::expect_statement_end;
use crate::interpreter::ast::{SqlStatement, parser::Parser};

// The keyword may be followed by TRANSACTION or WORK.
fn optional_transaction_word(parser: &mut Parser) -> Result<(), String> {
    if parser.at_word("TRANSACTION") || parser.at_word("WORK") {
        parser.advance()?;
    }
    expect_statement_end(parser)
}

pub fn build_begin(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    optional_transaction_word(parser)?;
    return Ok(SqlStatement::BeginTransaction);
}

pub fn build_commit(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    optional_transaction_word(parser)?;
    return Ok(SqlStatement::Commit);
}

pub fn build_rollback(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    optional_transaction_word(parser)?;
    return Ok(SqlStatement::Rollback);
}

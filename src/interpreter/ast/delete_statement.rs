use crate::db::table::core::condition::Condition;
use crate::interpreter::{
    ast::{
        DeleteStatement, SqlStatement,
        helpers::common::{expect_statement_end, get_table_name},
        helpers::token::consume,
        helpers::where_clause::get_where_clause,
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    consume(parser, TokenTypes::From)?;
    let table_name = get_table_name(parser)?;
    let condition = get_where_clause(parser)?.unwrap_or(Condition::Empty);
    expect_statement_end(parser)?;
    return Ok(SqlStatement::Delete(DeleteStatement { table_name, condition }));
}

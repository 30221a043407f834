use crate::db::table::core::condition::Condition;
use crate::db::table::operations::select::{JoinClause, JoinKind, SelectColumn, SelectQuery, TableReference};
use crate::interpreter::{
    ast::{
        SqlStatement,
        helpers::common::{expect_statement_end, get_column_reference, get_identifier, get_table_name},
        helpers::order_by_clause::get_order_by,
        helpers::token::{consume, expect_token_type},
        helpers::where_clause::{get_condition_expression, get_where_clause},
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    let query = get_select_query(parser)?;
    expect_statement_end(parser)?;
    return Ok(SqlStatement::Select(query));
}

// EXPLAIN SELECT ...
pub fn build_explain(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    expect_token_type(parser, TokenTypes::Select)?;
    let query = get_select_query(parser)?;
    expect_statement_end(parser)?;
    return Ok(SqlStatement::Explain(query));
}

fn get_select_query(parser: &mut Parser) -> Result<SelectQuery, String> {
    parser.advance()?;
    let columns = get_select_columns(parser)?;
    consume(parser, TokenTypes::From)?;
    let table = get_table_reference(parser)?;
    let join = get_join(parser)?;
    let condition = get_where_clause(parser)?.unwrap_or(Condition::Empty);
    let order_by = get_order_by(parser)?;
    return Ok(SelectQuery {
        table,
        join,
        columns,
        condition,
        order_by,
    });
}

fn get_select_columns(parser: &mut Parser) -> Result<Vec<SelectColumn>, String> {
    if parser.at(TokenTypes::Asterisk) {
        parser.advance()?;
        return Ok(vec![SelectColumn::All]);
    }
    let mut columns = vec![];
    loop {
        let name = get_column_reference(parser)?;
        let alias = get_alias(parser)?;
        columns.push(SelectColumn::Column { name, alias });
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    return Ok(columns);
}

// [AS] alias
fn get_alias(parser: &mut Parser) -> Result<Option<String>, String> {
    if parser.at(TokenTypes::As) {
        parser.advance()?;
        return Ok(Some(get_identifier(parser)?));
    }
    if parser.at(TokenTypes::Identifier) {
        return Ok(Some(get_identifier(parser)?));
    }
    return Ok(None);
}

fn get_table_reference(parser: &mut Parser) -> Result<TableReference, String> {
    let name = get_table_name(parser)?;
    let alias = get_alias(parser)?;
    return Ok(TableReference { name, alias });
}

// [INNER] JOIN t ON ... | LEFT [OUTER] JOIN t ON ...
fn get_join(parser: &mut Parser) -> Result<Option<JoinClause>, String> {
    let kind = match parser.current_token()?.token_type {
        TokenTypes::Join => JoinKind::Inner,
        TokenTypes::Inner => {
            parser.advance()?;
            expect_token_type(parser, TokenTypes::Join)?;
            JoinKind::Inner
        }
        TokenTypes::Left => {
            parser.advance()?;
            if parser.at_word("OUTER") {
                parser.advance()?;
            }
            expect_token_type(parser, TokenTypes::Join)?;
            JoinKind::Left
        }
        _ => return Ok(None),
    };
    parser.advance()?;
    let table = get_table_reference(parser)?;
    consume(parser, TokenTypes::On)?;
    let on = get_condition_expression(parser)?;
    return Ok(Some(JoinClause { kind, table, on }));
}

use crate::interpreter::{
    ast::{
        InsertIntoStatement,
        SqlStatement::{self, InsertInto},
        helpers::common::{expect_statement_end, get_table_name, parenthesized_identifier_list},
        helpers::token::{consume, tokens_to_value_list},
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    consume(parser, TokenTypes::Into)?;
    let table_name = get_table_name(parser)?;

    let columns = match parser.current_token()?.token_type {
        TokenTypes::LeftParen => Some(parenthesized_identifier_list(parser)?),
        TokenTypes::Values => None,
        _ => return Err(parser.format_error()),
    };

    consume(parser, TokenTypes::Values)?;
    let mut values = vec![];
    loop {
        consume(parser, TokenTypes::LeftParen)?;
        values.push(tokens_to_value_list(parser)?);
        consume(parser, TokenTypes::RightParen)?;
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    expect_statement_end(parser)?;

    let statement = InsertIntoStatement {
        table_name,
        columns,
        values,
    };
    validate_insert_statement(&statement)?;
    return Ok(InsertInto(statement));
}

fn validate_insert_statement(statement: &InsertIntoStatement) -> Result<(), String> {
    if let Some(columns) = &statement.columns {
        for (index, row) in statement.values.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(format!(
                    "Row {} has {} values for {} columns",
                    index + 1,
                    row.len(),
                    columns.len()
                ));
            }
        }
    }
    return Ok(());
}

use crate::db::table::core::condition::unescape_literal;
use crate::db::table::core::field::{Constraint, DEFAULT_CHAR_SIZE, DataType, Field};
use crate::interpreter::ast::helpers::token::{consume, expect_token_type};
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::tokenizer::token::TokenTypes;

/// Reads `TYPE[(params)]` and returns the field named `name` with its
/// size, precision and enum values filled in.
pub fn get_field_type(parser: &mut Parser, name: String) -> Result<Field, String> {
    expect_token_type(parser, TokenTypes::Identifier)?;
    let type_token = parser.current_token()?;
    let type_name = type_token.value;
    let data_type = DataType::from_name(type_name)
        .ok_or_else(|| format!("{} (unknown data type)", parser.format_error()))?;
    parser.advance()?;

    let field = Field::new(name, data_type);
    let has_params = parser.at(TokenTypes::LeftParen);
    match data_type {
        DataType::Char => {
            let size = if has_params {
                parser.advance()?;
                let size = if parser.at(TokenTypes::RightParen) {
                    DEFAULT_CHAR_SIZE
                } else {
                    get_number(parser)?
                };
                consume(parser, TokenTypes::RightParen)?;
                size
            } else {
                DEFAULT_CHAR_SIZE
            };
            Ok(field.with_constraint(Constraint::Size(size)))
        }
        DataType::Varchar => {
            if !has_params {
                return Err(format!("{} (VARCHAR needs a size)", parser.format_error()));
            }
            parser.advance()?;
            let size = get_number(parser)?;
            consume(parser, TokenTypes::RightParen)?;
            Ok(field.with_constraint(Constraint::Size(size)))
        }
        DataType::Decimal => {
            if !has_params {
                return Err(format!("{} (DECIMAL needs a precision)", parser.format_error()));
            }
            parser.advance()?;
            let precision = get_number(parser)?;
            let scale = if parser.at(TokenTypes::Comma) {
                parser.advance()?;
                get_number(parser)?
            } else {
                0
            };
            consume(parser, TokenTypes::RightParen)?;
            Ok(field
                .with_constraint(Constraint::Precision(precision))
                .with_constraint(Constraint::Scale(scale)))
        }
        DataType::Enum => {
            consume(parser, TokenTypes::LeftParen)?;
            let mut values = vec![];
            loop {
                expect_token_type(parser, TokenTypes::String)?;
                values.push(unescape_literal(parser.current_token()?.value));
                parser.advance()?;
                if !parser.at(TokenTypes::Comma) {
                    break;
                }
                parser.advance()?;
            }
            consume(parser, TokenTypes::RightParen)?;
            Ok(field.with_enum_values(values))
        }
        _ => {
            if has_params {
                return Err(format!(
                    "{} ({} takes no parameters)",
                    parser.format_error(),
                    data_type
                ));
            }
            Ok(field)
        }
    }
}

fn get_number(parser: &mut Parser) -> Result<u32, String> {
    expect_token_type(parser, TokenTypes::IntLiteral)?;
    let number = parser
        .current_token()?
        .value
        .parse::<u32>()
        .map_err(|_| parser.format_error())?;
    parser.advance()?;
    Ok(number)
}

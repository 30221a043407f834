use std::cmp::Ordering;

use crate::db::table::core::condition::{
    Comparison, ComparisonOperator, Condition, Operand, unescape_literal,
};
use crate::db::table::core::field::DataType;
use crate::db::table::core::value::Value;
use crate::interpreter::ast::helpers::common::get_column_reference;
use crate::interpreter::ast::helpers::token::{consume, expect_token_type};
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::tokenizer::token::TokenTypes;

/// One predicate: `TRUE`, `FALSE`, or `left <operator> ...`.
pub fn get_condition(parser: &mut Parser) -> Result<Condition, String> {
    match parser.current_token()?.token_type {
        TokenTypes::True => {
            parser.advance()?;
            return Ok(Condition::always_true());
        }
        TokenTypes::False => {
            parser.advance()?;
            return Ok(Condition::always_false());
        }
        _ => {}
    }

    let l_side = get_operand(parser)?;
    let column = match l_side {
        Operand::Column(column) => column,
        literal => return literal_on_the_left(parser, literal),
    };

    let token_type = parser.current_token()?.token_type;
    if let Some(operator) = comparison_operator(token_type) {
        parser.advance()?;
        let r_side = get_operand(parser)?;
        return Ok(Condition::Comparison(Comparison::new(column, operator, vec![r_side])));
    }

    if token_type == TokenTypes::Is {
        parser.advance()?;
        let operator = if parser.at(TokenTypes::Not) {
            parser.advance()?;
            ComparisonOperator::IsNotNull
        } else {
            ComparisonOperator::IsNull
        };
        consume(parser, TokenTypes::Null)?;
        return Ok(Condition::Comparison(Comparison::new(column, operator, vec![])));
    }

    let negated = parser.at(TokenTypes::Not);
    if negated {
        parser.advance()?;
    }
    let token_type = parser.current_token()?.token_type;
    let comparison = match token_type {
        TokenTypes::In => {
            parser.advance()?;
            consume(parser, TokenTypes::LeftParen)?;
            let mut operands = vec![];
            loop {
                operands.push(get_operand(parser)?);
                if !parser.at(TokenTypes::Comma) {
                    break;
                }
                parser.advance()?;
            }
            consume(parser, TokenTypes::RightParen)?;
            let operator = if negated { ComparisonOperator::NotIn } else { ComparisonOperator::In };
            Comparison::new(column, operator, operands)
        }
        TokenTypes::Between => {
            parser.advance()?;
            let lower = get_operand(parser)?;
            consume(parser, TokenTypes::And)?;
            let upper = get_operand(parser)?;
            let operator = if negated {
                ComparisonOperator::NotBetween
            } else {
                ComparisonOperator::Between
            };
            Comparison::new(column, operator, vec![lower, upper])
        }
        TokenTypes::Like => {
            parser.advance()?;
            let pattern = get_operand(parser)?;
            let operator = if negated { ComparisonOperator::NotLike } else { ComparisonOperator::Like };
            let mut comparison = Comparison::new(column, operator, vec![pattern]);
            if parser.at_word("ESCAPE") {
                parser.advance()?;
                comparison.escape = Some(get_escape_character(parser)?);
            }
            comparison
        }
        _ => return Err(parser.format_error()),
    };
    Ok(Condition::Comparison(comparison))
}

/// Reads one operand and advances past it.
pub fn get_operand(parser: &mut Parser) -> Result<Operand, String> {
    let token = parser.current_token()?;
    let operand = match token.token_type {
        TokenTypes::Identifier => return Ok(Operand::Column(get_column_reference(parser)?)),
        TokenTypes::IntLiteral | TokenTypes::RealLiteral => Operand::Number(token.value.to_string()),
        TokenTypes::String => Operand::Text(unescape_literal(token.value)),
        TokenTypes::Null => Operand::Null,
        TokenTypes::True => Operand::Text("true".to_string()),
        TokenTypes::False => Operand::Text("false".to_string()),
        _ => return Err(parser.format_error()),
    };
    parser.advance()?;
    Ok(operand)
}

fn comparison_operator(token_type: TokenTypes) -> Option<ComparisonOperator> {
    match token_type {
        TokenTypes::Equals => Some(ComparisonOperator::Equals),
        TokenTypes::NotEquals => Some(ComparisonOperator::NotEquals),
        TokenTypes::LessThan => Some(ComparisonOperator::LessThan),
        TokenTypes::LessEquals => Some(ComparisonOperator::LessEquals),
        TokenTypes::GreaterThan => Some(ComparisonOperator::GreaterThan),
        TokenTypes::GreaterEquals => Some(ComparisonOperator::GreaterEquals),
        _ => None,
    }
}

fn mirrored(operator: ComparisonOperator) -> ComparisonOperator {
    match operator {
        ComparisonOperator::LessThan => ComparisonOperator::GreaterThan,
        ComparisonOperator::LessEquals => ComparisonOperator::GreaterEquals,
        ComparisonOperator::GreaterThan => ComparisonOperator::LessThan,
        ComparisonOperator::GreaterEquals => ComparisonOperator::LessEquals,
        other => other,
    }
}

// `5 < age` becomes `age > 5`; two literals fold to TRUE or FALSE.
fn literal_on_the_left(parser: &mut Parser, literal: Operand) -> Result<Condition, String> {
    let operator = comparison_operator(parser.current_token()?.token_type)
        .ok_or_else(|| parser.format_error())?;
    parser.advance()?;
    let r_side = get_operand(parser)?;
    if let Operand::Column(column) = r_side {
        return Ok(Condition::Comparison(Comparison::new(
            column,
            mirrored(operator),
            vec![literal],
        )));
    }
    let ordering = match (&literal, &r_side) {
        (Operand::Number(left), Operand::Number(right)) => {
            Value::convert(Some(left.as_str()), DataType::Double)
                .compare(&Value::convert(Some(right.as_str()), DataType::Double))
        }
        (Operand::Number(left) | Operand::Text(left), Operand::Number(right) | Operand::Text(right)) => {
            Some(left.cmp(right))
        }
        _ => None,
    };
    let holds = match ordering {
        None => false,
        Some(ordering) => match operator {
            ComparisonOperator::Equals => ordering == Ordering::Equal,
            ComparisonOperator::NotEquals => ordering != Ordering::Equal,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::LessEquals => ordering != Ordering::Greater,
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            _ => ordering != Ordering::Less,
        },
    };
    Ok(if holds { Condition::always_true() } else { Condition::always_false() })
}

fn get_escape_character(parser: &mut Parser) -> Result<char, String> {
    expect_token_type(parser, TokenTypes::String)?;
    let text = unescape_literal(parser.current_token()?.value);
    let mut chars = text.chars();
    let escape = match (chars.next(), chars.next()) {
        (Some(escape), None) => escape,
        _ => return Err(format!("{} (ESCAPE needs exactly one character)", parser.format_error())),
    };
    parser.advance()?;
    Ok(escape)
}

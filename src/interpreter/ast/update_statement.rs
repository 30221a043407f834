use crate::db::table::core::condition::Condition;
use crate::db::table::operations::update::{ArithmeticOperator, Assignment, SetValue};
use crate::interpreter::{
    ast::{
        SqlStatement, UpdateStatement,
        helpers::common::{expect_statement_end, get_identifier, get_table_name},
        helpers::token::{consume, expect_token_type, token_to_value},
        helpers::where_clause::get_where_clause,
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let table_name = get_table_name(parser)?;
    consume(parser, TokenTypes::Set)?;
    let assignments = get_assignments(parser)?;
    let condition = get_where_clause(parser)?.unwrap_or(Condition::Empty);
    expect_statement_end(parser)?;
    return Ok(SqlStatement::Update(UpdateStatement {
        table_name,
        assignments,
        condition,
    }));
}

// column = literal | column = column (+|-|*|/) number, ...
fn get_assignments(parser: &mut Parser) -> Result<Vec<Assignment>, String> {
    let mut assignments = vec![];
    loop {
        let column = get_identifier(parser)?;
        consume(parser, TokenTypes::Equals)?;
        let value = if parser.at(TokenTypes::Identifier) {
            let source = get_identifier(parser)?;
            let operator = match parser.current_token()?.token_type {
                TokenTypes::Plus => ArithmeticOperator::Add,
                TokenTypes::Minus => ArithmeticOperator::Subtract,
                TokenTypes::Asterisk => ArithmeticOperator::Multiply,
                TokenTypes::Divide => ArithmeticOperator::Divide,
                _ => return Err(parser.format_error()),
            };
            parser.advance()?;
            let token_type = parser.current_token()?.token_type;
            if token_type != TokenTypes::RealLiteral {
                expect_token_type(parser, TokenTypes::IntLiteral)?;
            }
            let operand = parser.current_token()?.value.to_string();
            parser.advance()?;
            SetValue::Arithmetic {
                column: source,
                operator,
                operand,
            }
        } else {
            let value = token_to_value(parser)?;
            parser.advance()?;
            SetValue::Literal(value)
        };
        assignments.push(Assignment { column, value });
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    return Ok(assignments);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::core::condition::{ComparisonOperator, Operand};
    use crate::interpreter::ast::test_utils::token;
    use crate::interpreter::tokenizer::tokenize;

    #[test]
    fn update_statement_with_where_clause() {
        // UPDATE users SET name = 'Bob', age = NULL WHERE id = 1;
        let tokens = vec![
            token(TokenTypes::Update, "UPDATE"),
            token(TokenTypes::Identifier, "users"),
            token(TokenTypes::Set, "SET"),
            token(TokenTypes::Identifier, "name"),
            token(TokenTypes::Equals, "="),
            token(TokenTypes::String, "Bob"),
            token(TokenTypes::Comma, ","),
            token(TokenTypes::Identifier, "age"),
            token(TokenTypes::Equals, "="),
            token(TokenTypes::Null, "NULL"),
            token(TokenTypes::Where, "WHERE"),
            token(TokenTypes::Identifier, "id"),
            token(TokenTypes::Equals, "="),
            token(TokenTypes::IntLiteral, "1"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        let expected = SqlStatement::Update(UpdateStatement {
            table_name: "users".to_string(),
            assignments: vec![
                Assignment {
                    column: "name".to_string(),
                    value: SetValue::Literal(Some("Bob".to_string())),
                },
                Assignment {
                    column: "age".to_string(),
                    value: SetValue::Literal(None),
                },
            ],
            condition: Condition::compare("id", ComparisonOperator::Equals, vec![Operand::Number("1".to_string())]),
        });
        assert_eq!(build(&mut parser), Ok(expected));
    }

    #[test]
    fn update_with_arithmetic_and_no_where() {
        let mut parser = Parser::new(tokenize("UPDATE items SET price = price * 1.5, stock = stock - 1"));
        let expected = SqlStatement::Update(UpdateStatement {
            table_name: "items".to_string(),
            assignments: vec![
                Assignment {
                    column: "price".to_string(),
                    value: SetValue::Arithmetic {
                        column: "price".to_string(),
                        operator: ArithmeticOperator::Multiply,
                        operand: "1.5".to_string(),
                    },
                },
                Assignment {
                    column: "stock".to_string(),
                    value: SetValue::Arithmetic {
                        column: "stock".to_string(),
                        operator: ArithmeticOperator::Subtract,
                        operand: "1".to_string(),
                    },
                },
            ],
            condition: Condition::Empty,
        });
        assert_eq!(build(&mut parser), Ok(expected));
    }

    #[test]
    fn update_rejects_malformed_assignments() {
        let mut parser = Parser::new(tokenize("UPDATE t SET a = b;"));
        assert!(build(&mut parser).is_err());
        let mut parser = Parser::new(tokenize("UPDATE t SET a = a + 'x';"));
        assert!(build(&mut parser).is_err());
        let mut parser = Parser::new(tokenize("UPDATE t a = 1;"));
        assert!(build(&mut parser).is_err());
        let mut parser = Parser::new(tokenize("UPDATE t SET a = 1 WHERE;"));
        assert!(build(&mut parser).is_err());
    }
}

use crate::db::table::operations::helpers::order_by_clause::{OrderByKey, OrderDirection};
use crate::interpreter::ast::helpers::common::get_column_reference;
use crate::interpreter::ast::helpers::token::consume;
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::tokenizer::token::TokenTypes;

/// `ORDER BY column [ASC|DESC], ...`; an empty list when there is no ORDER BY.
pub fn get_order_by(parser: &mut Parser) -> Result<Vec<OrderByKey>, String> {
    if !parser.at(TokenTypes::Order) {
        return Ok(vec![]);
    }
    parser.advance()?;
    consume(parser, TokenTypes::By)?;

    let mut keys = vec![];
    loop {
        let column = get_column_reference(parser)?;
        let direction = match parser.current_token()?.token_type {
            TokenTypes::Asc => {
                parser.advance()?;
                OrderDirection::Asc
            }
            TokenTypes::Desc => {
                parser.advance()?;
                OrderDirection::Desc
            }
            _ => OrderDirection::Asc,
        };
        keys.push(OrderByKey { column, direction });
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    return Ok(keys);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ast::test_utils::token;

    #[test]
    fn order_by_clause_is_generated_correctly() {
        // ORDER BY age DESC, u.name;
        let tokens = vec![
            token(TokenTypes::Order, "ORDER"),
            token(TokenTypes::By, "BY"),
            token(TokenTypes::Identifier, "age"),
            token(TokenTypes::Desc, "DESC"),
            token(TokenTypes::Comma, ","),
            token(TokenTypes::Identifier, "u"),
            token(TokenTypes::Dot, "."),
            token(TokenTypes::Identifier, "name"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        let expected = vec![
            OrderByKey {
                column: "age".to_string(),
                direction: OrderDirection::Desc,
            },
            OrderByKey {
                column: "u.name".to_string(),
                direction: OrderDirection::Asc,
            },
        ];
        assert_eq!(get_order_by(&mut parser), Ok(expected));
        assert!(parser.at(TokenTypes::SemiColon));
    }

    #[test]
    fn not_order_by_clause_returns_empty() {
        let tokens = vec![token(TokenTypes::SemiColon, ";")];
        let mut parser = Parser::new(tokens);
        assert_eq!(get_order_by(&mut parser), Ok(vec![]));
    }

    #[test]
    fn order_without_by_is_an_error() {
        let tokens = vec![
            token(TokenTypes::Order, "ORDER"),
            token(TokenTypes::Identifier, "id"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        assert!(get_order_by(&mut parser).is_err());
    }
}

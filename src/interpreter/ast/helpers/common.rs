use crate::interpreter::ast::helpers::token::{consume, expect_token_type};
use crate::interpreter::ast::{ExistenceCheck, parser::Parser};
use crate::interpreter::tokenizer::token::TokenTypes;

pub fn get_identifier(parser: &mut Parser) -> Result<String, String> {
    let token = parser.current_token()?;
    expect_token_type(parser, TokenTypes::Identifier)?;
    let result = token.value.to_string();
    parser.advance()?;
    Ok(result)
}

pub fn get_table_name(parser: &mut Parser) -> Result<String, String> {
    get_identifier(parser)
}

/// `column` or `qualifier.column`.
pub fn get_column_reference(parser: &mut Parser) -> Result<String, String> {
    let name = get_identifier(parser)?;
    if parser.at(TokenTypes::Dot) {
        parser.advance()?;
        let column = get_identifier(parser)?;
        return Ok(format!("{}.{}", name, column));
    }
    Ok(name)
}

// Returns a list of Strings from the tokens when they are formated as "identifier, identifier, ..."
pub fn tokens_to_identifier_list(parser: &mut Parser) -> Result<Vec<String>, String> {
    let mut identifiers: Vec<String> = vec![];
    loop {
        identifiers.push(get_identifier(parser)?);
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    return Ok(identifiers);
}

/// `( identifier, ... )`
pub fn parenthesized_identifier_list(parser: &mut Parser) -> Result<Vec<String>, String> {
    consume(parser, TokenTypes::LeftParen)?;
    let identifiers = tokens_to_identifier_list(parser)?;
    consume(parser, TokenTypes::RightParen)?;
    Ok(identifiers)
}

pub fn exists_clause(parser: &mut Parser, check_type: ExistenceCheck) -> Result<Option<ExistenceCheck>, String> {
    if parser.current_token()?.token_type == TokenTypes::If {
        parser.advance()?;
        let token = parser.current_token()?;
        let existence_check = match (&token.token_type, check_type) {
            (TokenTypes::Not, ExistenceCheck::IfNotExists) => {
                parser.advance()?;
                expect_token_type(parser, TokenTypes::Exists)?;
                ExistenceCheck::IfNotExists
            }
            (TokenTypes::Exists, ExistenceCheck::IfExists) => ExistenceCheck::IfExists,
            (_, _) => return Err(parser.format_error()),
        };
        parser.advance()?;
        return Ok(Some(existence_check));
    }
    return Ok(None);
}

/// Every statement ends at `;` or at the end of the script.
pub fn expect_statement_end(parser: &Parser) -> Result<(), String> {
    if !parser.at_statement_end() {
        return Err(parser.format_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ast::test_utils::token;

    #[test]
    fn identifier_list_stops_after_last_name() {
        // (id, name) VALUES
        let tokens = vec![
            token(TokenTypes::LeftParen, "("),
            token(TokenTypes::Identifier, "id"),
            token(TokenTypes::Comma, ","),
            token(TokenTypes::Identifier, "name"),
            token(TokenTypes::RightParen, ")"),
            token(TokenTypes::Values, "VALUES"),
        ];
        let mut parser = Parser::new(tokens);
        assert_eq!(
            parenthesized_identifier_list(&mut parser),
            Ok(vec!["id".to_string(), "name".to_string()])
        );
        assert!(parser.at(TokenTypes::Values));
    }

    #[test]
    fn qualified_column_reference() {
        let tokens = vec![
            token(TokenTypes::Identifier, "u"),
            token(TokenTypes::Dot, "."),
            token(TokenTypes::Identifier, "age"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        assert_eq!(get_column_reference(&mut parser), Ok("u.age".to_string()));
    }

    #[test]
    fn exists_clause_matches_the_expected_form() {
        let tokens = vec![
            token(TokenTypes::If, "IF"),
            token(TokenTypes::Not, "NOT"),
            token(TokenTypes::Exists, "EXISTS"),
            token(TokenTypes::Identifier, "users"),
        ];
        let mut parser = Parser::new(tokens);
        assert_eq!(
            exists_clause(&mut parser, ExistenceCheck::IfNotExists),
            Ok(Some(ExistenceCheck::IfNotExists))
        );
        assert!(parser.at(TokenTypes::Identifier));

        let tokens = vec![
            token(TokenTypes::If, "IF"),
            token(TokenTypes::Exists, "EXISTS"),
            token(TokenTypes::Identifier, "users"),
        ];
        let mut parser = Parser::new(tokens);
        assert!(exists_clause(&mut parser, ExistenceCheck::IfNotExists).is_err());

        let tokens = vec![token(TokenTypes::Identifier, "users")];
        let mut parser = Parser::new(tokens);
        assert_eq!(exists_clause(&mut parser, ExistenceCheck::IfExists), Ok(None));
    }
}

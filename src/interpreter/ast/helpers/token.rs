use crate::db::table::core::condition::unescape_literal;
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::tokenizer::scanner::Token;
use crate::interpreter::tokenizer::token::TokenTypes;

// Returns an error if the current token does not match the given token type
pub fn expect_token_type(parser: &Parser, token_type: TokenTypes) -> Result<(), String> {
    let token = parser.current_token()?;
    if token.token_type != token_type {
        return Err(parser.format_error());
    }
    Ok(())
}

/// Checks the token type and steps over it.
pub fn consume(parser: &mut Parser, token_type: TokenTypes) -> Result<(), String> {
    expect_token_type(parser, token_type)?;
    parser.advance()
}

/// Reads the current literal without advancing. `None` is SQL NULL.
pub fn token_to_value(parser: &Parser) -> Result<Option<String>, String> {
    let token = parser.current_token()?;
    match token.token_type {
        TokenTypes::IntLiteral => {
            token.value.parse::<i64>().map_err(|_| parser.format_error())?;
            Ok(Some(token.value.to_string()))
        }
        TokenTypes::RealLiteral => {
            token.value.parse::<f64>().map_err(|_| parser.format_error())?;
            Ok(Some(token.value.to_string()))
        }
        TokenTypes::String => Ok(Some(unescape_literal(token.value))),
        TokenTypes::True => Ok(Some("true".to_string())),
        TokenTypes::False => Ok(Some("false".to_string())),
        TokenTypes::Null => Ok(None),
        _ => Err(parser.format_error()),
    }
}

// Returns a list of values from the tokens when they are formated as "value, value, ..."
pub fn tokens_to_value_list(parser: &mut Parser) -> Result<Vec<Option<String>>, String> {
    let mut values = vec![];
    loop {
        values.push(token_to_value(parser)?);
        parser.advance()?;
        if !parser.at(TokenTypes::Comma) {
            break;
        }
        parser.advance()?;
    }
    return Ok(values);
}

pub fn token_to_string(token: &Token) -> String {
    match token.token_type {
        TokenTypes::String => format!("'{}' ", token.value),
        TokenTypes::EOF => String::new(),
        TokenTypes::Dot => token.value.to_string(),
        TokenTypes::SemiColon | TokenTypes::LeftParen => token.value.to_string(),
        _ => token.value.to_string() + " ",
    }
}

/// Rebuilds readable statement text from its tokens, for logs and the shell.
pub fn format_statement_tokens(tokens: &[Token]) -> String {
    let mut result = String::new();
    for token in tokens {
        if token.token_type == TokenTypes::Dot && result.ends_with(' ') {
            result.pop();
        }
        result += &token_to_string(token);
    }
    result = result
        .replace(" ;", ";")
        .replace(" ,", ",")
        .replace(" )", ")");
    return result.trim_end().to_string();
}

use crate::interpreter::{
    ast::{
        SqlStatement,
        helpers::token::format_statement_tokens,
        statement_builder::{DefaultStatementBuilder, StatementBuilder},
    },
    tokenizer::scanner::Token,
    tokenizer::token::TokenTypes,
};

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    start: usize,
    current: usize,
    builder: &'a dyn StatementBuilder,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token<'a>>) -> Self {
        return Self {
            tokens,
            start: 0,
            current: 0,
            builder: &DefaultStatementBuilder,
        };
    }

    pub fn line_num(&self) -> Result<usize, String> {
        return Ok(self.current_token()?.line_num);
    }

    pub fn current_token(&self) -> Result<&Token<'a>, String> {
        if self.current >= self.tokens.len() {
            return Err(self.format_error());
        }
        return Ok(&self.tokens[self.current]);
    }

    pub fn peek_token(&self) -> Result<&Token<'a>, String> {
        if self.current + 1 >= self.tokens.len() {
            return Err(self.format_error());
        }
        return Ok(&self.tokens[self.current + 1]);
    }

    /// Whether the current token is `token_type`.
    pub fn at(&self, token_type: TokenTypes) -> bool {
        self.current_token()
            .is_ok_and(|token| token.token_type == token_type)
    }

    /// Whether the current token is the bare word `word`. Used for words that
    /// stay valid identifiers elsewhere (`DATABASES`, `CASCADE`, `OUTER`).
    pub fn at_word(&self, word: &str) -> bool {
        self.current_token().is_ok_and(|token| {
            token.token_type == TokenTypes::Identifier && token.value.eq_ignore_ascii_case(word)
        })
    }

    pub fn at_statement_end(&self) -> bool {
        self.at(TokenTypes::SemiColon) || self.at(TokenTypes::EOF)
    }

    pub fn get_sql_statement_text(&self) -> String {
        let end = self.current.min(self.tokens.len());
        return format_statement_tokens(&self.tokens[self.start..end]);
    }

    pub fn advance(&mut self) -> Result<(), String> {
        if let Ok(token) = self.current_token() {
            if token.token_type == TokenTypes::SemiColon {
                return Err(self.format_error());
            }
        }
        self.current += 1;
        Ok(())
    }

    /// Steps over the statement terminator. A statement may also end at EOF.
    pub fn advance_past_semicolon(&mut self) -> Result<(), String> {
        if let Ok(token) = self.current_token() {
            match token.token_type {
                TokenTypes::SemiColon => {
                    self.current += 1;
                    return Ok(());
                }
                TokenTypes::EOF => return Ok(()),
                _ => {}
            }
        }
        return Err("Expected token type: SemiColon was not found".to_string());
    }

    pub fn format_error(&self) -> String {
        if self.current < self.tokens.len() {
            let token = &self.tokens[self.current];
            if token.token_type == TokenTypes::EOF {
                return "Error at end of input.".to_string();
            }
            return format!(
                "Error at line {:?}, column {:?}: Unexpected value: {}",
                token.line_num, token.col_num, token.value
            );
        } else {
            return "Error at end of input.".to_string();
        }
    }

    pub fn format_error_nearby(&self) -> String {
        if self.current < self.tokens.len() {
            let token = &self.tokens[self.current];
            return format!(
                "Error near line {:?}, column {:?}",
                token.line_num, token.col_num
            );
        } else {
            return "Error at end of input.".to_string();
        }
    }

    pub fn next_statement(&mut self) -> Option<Result<SqlStatement, String>> {
        self.start = self.current;
        let token_type = match self.current_token() {
            Ok(token) => token.token_type,
            Err(error) => return Some(Err(error)),
        };
        let builder = self.builder;
        return match token_type {
            TokenTypes::EOF => None,
            TokenTypes::Create => Some(builder.build_create(self)),
            TokenTypes::Drop => Some(builder.build_drop(self)),
            TokenTypes::Alter => Some(builder.build_alter(self)),
            TokenTypes::Use => Some(builder.build_use(self)),
            TokenTypes::Show => Some(builder.build_show(self)),
            TokenTypes::Describe | TokenTypes::Desc => Some(builder.build_describe(self)),
            TokenTypes::Explain => Some(builder.build_explain(self)),
            TokenTypes::Insert => Some(builder.build_insert(self)),
            TokenTypes::Select => Some(builder.build_select(self)),
            TokenTypes::Update => Some(builder.build_update(self)),
            TokenTypes::Delete => Some(builder.build_delete(self)),
            TokenTypes::Begin => Some(builder.build_begin(self)),
            TokenTypes::Commit => Some(builder.build_commit(self)),
            TokenTypes::Rollback => Some(builder.build_rollback(self)),
            _ => Some(Err(self.format_error())),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ast::statement_builder::MockStatementBuilder;
    use crate::interpreter::ast::test_utils::{token, token_with_location};

    #[test]
    fn parser_formats_error_when_at_end_of_input() {
        let tokens = vec![];
        let parser = Parser::new(tokens);
        let result = parser.format_error();
        assert_eq!(result, "Error at end of input.");
    }

    #[test]
    fn parser_formats_error_when_unexpected_token_type() {
        let tokens = vec![token_with_location(TokenTypes::Insert, "INSERT", 15, 3)];
        let parser = Parser::new(tokens);
        let result = parser.format_error();
        assert_eq!(result, "Error at line 3, column 15: Unexpected value: INSERT");
    }

    #[test]
    fn parser_next_statement_dispatches_on_the_leading_keyword() {
        let tokens = vec![
            token(TokenTypes::Create, "CREATE"),
            token(TokenTypes::SemiColon, ";"),
            token(TokenTypes::Select, "SELECT"),
            token(TokenTypes::SemiColon, ";"),
            token(TokenTypes::Commit, "COMMIT"),
            token(TokenTypes::EOF, ""),
        ];
        let mut parser = Parser {
            tokens,
            start: 0,
            current: 0,
            builder: &MockStatementBuilder,
        };
        assert_eq!(parser.next_statement(), Some(Ok(SqlStatement::ShowDatabases)));
        assert!(parser.advance_past_semicolon().is_ok());
        assert_eq!(parser.next_statement(), Some(Ok(SqlStatement::ShowTables)));
        assert!(parser.advance_past_semicolon().is_ok());
        assert_eq!(parser.next_statement(), Some(Ok(SqlStatement::Commit)));
        assert!(parser.advance_past_semicolon().is_ok());
        assert_eq!(parser.next_statement(), None);
    }

    #[test]
    fn parser_next_statement_handles_errors_correctly() {
        let tokens = vec![
            token(TokenTypes::Identifier, "users"),
            token(TokenTypes::SemiColon, ";"),
            token(TokenTypes::EOF, ""),
        ];
        let mut parser = Parser {
            tokens,
            start: 0,
            current: 0,
            builder: &MockStatementBuilder,
        };
        let result = parser.next_statement();
        let expected = Some(Err("Error at line 1, column 0: Unexpected value: users".to_string()));
        assert_eq!(result, expected);
    }

    #[test]
    fn advance_refuses_to_cross_a_semicolon() {
        let tokens = vec![token(TokenTypes::SemiColon, ";"), token(TokenTypes::EOF, "")];
        let mut parser = Parser::new(tokens);
        assert!(parser.advance().is_err());
        assert!(parser.advance_past_semicolon().is_ok());
        assert!(parser.at_statement_end());
    }
}

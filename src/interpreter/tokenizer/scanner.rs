use crate::interpreter::tokenizer::token::TokenTypes;

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub token_type: TokenTypes,
    pub value: &'a str,
    pub col_num: usize,
    pub line_num: usize,
}

pub struct Scanner<'a> {
    input: &'a str,
    current: usize,
    line_num: usize,
    col_num: usize,
    token_col: usize,
    token_line: usize,
    after_operand: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        return Self {
            input,
            current: 0,
            line_num: 1,
            col_num: 0,
            token_col: 0,
            token_line: 1,
            after_operand: false,
        };
    }

    fn handle_skips(&mut self) -> bool {
        match self.current_char() {
            ' ' | '\t' | '\r' => {
                self.advance();
                true
            }
            '\n' => {
                self.advance();
                self.line_num += 1;
                self.col_num = self.current;
                true
            }
            _ => false,
        }
    }

    fn at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn advance(&mut self) {
        self.current += self.current_char().len_utf8();
    }

    fn current_char(&self) -> char {
        return self.input[self.current..].chars().next().unwrap_or('\0');
    }

    fn peek_char(&self) -> char {
        return self.input[self.current..].chars().nth(1).unwrap_or('\0');
    }

    fn build_token(&mut self, start: usize, token_type: TokenTypes) -> Token<'a> {
        self.advance();
        return self.token_between(start, self.current, token_type);
    }

    fn token_between(&mut self, from: usize, to: usize, token_type: TokenTypes) -> Token<'a> {
        self.after_operand = token_type.ends_operand();
        return Token {
            token_type,
            value: &self.input[from..to],
            col_num: self.token_col,
            line_num: self.token_line,
        };
    }

    // Leaves `current` on the closing quote. `''` and `\x` do not close it.
    fn read_quoted(&mut self, quote: char) -> TokenTypes {
        self.advance();
        while !self.at_end() {
            match self.current_char() {
                '\\' if quote == '\'' => {
                    self.advance();
                    self.advance();
                }
                c if c == quote && self.peek_char() == quote => {
                    self.advance();
                    self.advance();
                }
                c if c == quote => return TokenTypes::String,
                '\n' => {
                    self.advance();
                    self.line_num += 1;
                    self.col_num = self.current;
                }
                _ => self.advance(),
            }
        }
        return TokenTypes::Error;
    }

    fn read_identifier(&mut self, start: usize) -> TokenTypes {
        while self.peek_char().is_alphanumeric() || self.peek_char() == '_' {
            self.advance();
        }
        let end = self.current + self.current_char().len_utf8();
        return TokenTypes::keyword(&self.input[start..end]).unwrap_or(TokenTypes::Identifier);
    }

    fn read_digit(&mut self) -> TokenTypes {
        let mut token_type = TokenTypes::IntLiteral;
        loop {
            let next = self.peek_char();
            if next.is_ascii_digit() {
                self.advance();
            } else if next == '.' && token_type == TokenTypes::IntLiteral {
                token_type = TokenTypes::RealLiteral;
                self.advance();
            } else if next == 'e' || next == 'E' {
                let after = self.input[self.current..].chars().nth(2).unwrap_or('\0');
                if !(after.is_ascii_digit() || after == '-' || after == '+') {
                    break;
                }
                token_type = TokenTypes::RealLiteral;
                self.advance();
                self.advance();
            } else {
                break;
            }
        }
        return token_type;
    }

    fn skip_line_comment(&mut self) {
        while !self.at_end() && self.current_char() != '\n' {
            self.advance();
        }
    }

    fn read_block_comment(&mut self, start: usize) -> Option<Token<'a>> {
        self.advance();
        self.advance();
        while !self.at_end() {
            if self.current_char() == '*' && self.peek_char() == '/' {
                self.advance();
                self.advance();
                return self.next_token();
            }
            if self.current_char() == '\n' {
                self.line_num += 1;
                self.col_num = self.current + 1;
            }
            self.advance();
        }
        let end = self.current;
        return Some(self.token_between(start, end, TokenTypes::Error));
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        while self.handle_skips() {}

        if self.at_end() {
            return None;
        }
        let start = self.current;
        self.token_col = start - self.col_num;
        self.token_line = self.line_num;
        return match self.current_char() {
            '\'' => {
                let token_type = self.read_quoted('\'');
                if token_type == TokenTypes::Error {
                    let end = self.input.len();
                    return Some(self.token_between(start, end, TokenTypes::Error));
                }
                let end = self.current;
                self.advance();
                Some(self.token_between(start + 1, end, TokenTypes::String))
            }
            quote @ ('"' | '`') => {
                let token_type = self.read_quoted(quote);
                if token_type == TokenTypes::Error {
                    let end = self.input.len();
                    return Some(self.token_between(start, end, TokenTypes::Error));
                }
                let end = self.current;
                self.advance();
                Some(self.token_between(start + 1, end, TokenTypes::Identifier))
            }
            c if c.is_alphabetic() || c == '_' => {
                let token_type = self.read_identifier(start);
                Some(self.build_token(start, token_type))
            }
            c if c.is_ascii_digit() => {
                let token_type = self.read_digit();
                Some(self.build_token(start, token_type))
            }
            '*' => Some(self.build_token(start, TokenTypes::Asterisk)),
            ';' => Some(self.build_token(start, TokenTypes::SemiColon)),
            '(' => Some(self.build_token(start, TokenTypes::LeftParen)),
            ')' => Some(self.build_token(start, TokenTypes::RightParen)),
            ',' => Some(self.build_token(start, TokenTypes::Comma)),
            '.' => Some(self.build_token(start, TokenTypes::Dot)),
            '+' => Some(self.build_token(start, TokenTypes::Plus)),
            '-' => {
                if self.peek_char() == '-' {
                    self.skip_line_comment();
                    self.next_token()
                } else if self.peek_char().is_ascii_digit() && !self.after_operand {
                    self.advance();
                    let token_type = self.read_digit();
                    Some(self.build_token(start, token_type))
                } else {
                    Some(self.build_token(start, TokenTypes::Minus))
                }
            }
            '/' => {
                if self.peek_char() == '*' {
                    self.read_block_comment(start)
                } else {
                    Some(self.build_token(start, TokenTypes::Divide))
                }
            }
            '=' => {
                if self.peek_char() == '=' {
                    self.advance();
                }
                Some(self.build_token(start, TokenTypes::Equals))
            }
            '!' => {
                if self.peek_char() == '=' {
                    self.advance();
                    Some(self.build_token(start, TokenTypes::NotEquals))
                } else {
                    Some(self.build_token(start, TokenTypes::Error))
                }
            }
            '<' => match self.peek_char() {
                '=' => {
                    self.advance();
                    Some(self.build_token(start, TokenTypes::LessEquals))
                }
                '>' => {
                    self.advance();
                    Some(self.build_token(start, TokenTypes::NotEquals))
                }
                _ => Some(self.build_token(start, TokenTypes::LessThan)),
            },
            '>' => {
                if self.peek_char() == '=' {
                    self.advance();
                    Some(self.build_token(start, TokenTypes::GreaterEquals))
                } else {
                    Some(self.build_token(start, TokenTypes::GreaterThan))
                }
            }
            _ => Some(self.build_token(start, TokenTypes::Error)),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypes {
    // Statements
    Create, Drop, Alter, Use, Show, Describe, Explain,
    Insert, Into, Values, Select, From, Where, Update, Set, Delete,
    Begin, Commit, Rollback,
    // Objects
    Database, Table, Index, Column, Constraint,
    // Schema
    Add, Rename, To, Primary, Key, Foreign, References, Unique, Check, Default,
    // Clauses
    Join, Inner, Left, On, As, Order, By, Asc, Desc, If, Exists,
    // Logical Operators
    And, Or, Not, In, Is, Between, Like, Null, True, False,
    Equals, NotEquals, LessThan, LessEquals, GreaterThan, GreaterEquals,
    // Single Character Tokens
    Asterisk, SemiColon, LeftParen, RightParen, Comma, Dot,
    // Math Operators
    Plus, Minus, Divide,
    // Literals
    String, IntLiteral, RealLiteral,
    // Others
    Identifier,
    EOF, Error,
}

const KEYWORDS: &[(&str, TokenTypes)] = {
    use TokenTypes::*;
    &[
        ("CREATE", Create), ("DROP", Drop), ("ALTER", Alter), ("USE", Use),
        ("SHOW", Show), ("DESCRIBE", Describe), ("EXPLAIN", Explain), ("INSERT", Insert),
        ("INTO", Into), ("VALUES", Values), ("SELECT", Select), ("FROM", From),
        ("WHERE", Where), ("UPDATE", Update), ("SET", Set), ("DELETE", Delete),
        ("BEGIN", Begin), ("COMMIT", Commit), ("ROLLBACK", Rollback), ("DATABASE", Database),
        ("TABLE", Table), ("INDEX", Index), ("COLUMN", Column), ("CONSTRAINT", Constraint),
        ("ADD", Add), ("RENAME", Rename), ("TO", To), ("PRIMARY", Primary),
        ("KEY", Key), ("FOREIGN", Foreign), ("REFERENCES", References), ("UNIQUE", Unique),
        ("CHECK", Check), ("DEFAULT", Default), ("JOIN", Join), ("INNER", Inner),
        ("LEFT", Left), ("ON", On), ("AS", As), ("ORDER", Order),
        ("BY", By), ("ASC", Asc), ("DESC", Desc), ("IF", If),
        ("EXISTS", Exists), ("AND", And), ("OR", Or), ("NOT", Not),
        ("IN", In), ("IS", Is), ("BETWEEN", Between), ("LIKE", Like),
        ("NULL", Null), ("TRUE", True), ("FALSE", False),
    ]
};

impl TokenTypes {
    /// Reserved word spelled by `word`, compared case-insensitively.
    pub fn keyword(word: &str) -> Option<TokenTypes> {
        return KEYWORDS
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(word))
            .map(|(_, token_type)| *token_type);
    }

    /// Tokens after which a `-` is a binary minus rather than a sign.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenTypes::Identifier
                | TokenTypes::IntLiteral
                | TokenTypes::RealLiteral
                | TokenTypes::String
                | TokenTypes::RightParen
                | TokenTypes::Null
                | TokenTypes::True
                | TokenTypes::False
        )
    }
}

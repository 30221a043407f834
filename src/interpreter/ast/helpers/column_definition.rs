use crate::db::table::core::condition::{Condition, quote_literal, unescape_literal};
use crate::db::table::core::constraint::{CheckConstraint, ForeignKey, ReferentialAction, UniqueConstraint};
use crate::db::table::core::field::{Constraint, Field};
use crate::db::table::operations::alter_table::TableConstraint;
use crate::interpreter::ast::helpers::common::{get_identifier, get_table_name, parenthesized_identifier_list};
use crate::interpreter::ast::helpers::data_type::get_field_type;
use crate::interpreter::ast::helpers::token::consume;
use crate::interpreter::ast::helpers::where_clause::get_condition_expression;
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::tokenizer::token::TokenTypes;

/// A column as written in CREATE TABLE or ALTER TABLE ADD/MODIFY COLUMN.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub field: Field,
    /// Default expression as stored: a quoted literal, a number, `NULL`,
    /// `CURRENT_TIMESTAMP` or `CURRENT_DATE`.
    pub default: Option<String>,
    pub check: Option<Condition>,
    /// `REFERENCES` target; the name is left empty for the caller to assign.
    pub reference: Option<ForeignKey>,
}

pub fn get_column_definition(parser: &mut Parser) -> Result<ColumnDefinition, String> {
    let name = get_identifier(parser)?;
    let field = get_field_type(parser, name)?;
    let mut column = ColumnDefinition {
        field,
        default: None,
        check: None,
        reference: None,
    };

    loop {
        match parser.current_token()?.token_type {
            TokenTypes::Primary => {
                parser.advance()?;
                consume(parser, TokenTypes::Key)?;
                column.field.add_constraint(Constraint::PrimaryKey);
            }
            TokenTypes::Not => {
                parser.advance()?;
                consume(parser, TokenTypes::Null)?;
                column.field.add_constraint(Constraint::NotNull);
            }
            TokenTypes::Null => parser.advance()?,
            TokenTypes::Unique => {
                parser.advance()?;
                column.field.add_constraint(Constraint::Unique);
            }
            TokenTypes::Default => {
                parser.advance()?;
                column.default = Some(get_default_value(parser)?);
            }
            TokenTypes::Check => {
                parser.advance()?;
                column.check = Some(get_check_expression(parser)?);
            }
            TokenTypes::References => {
                let columns = vec![column.field.name.clone()];
                column.reference = Some(get_references(parser, String::new(), columns)?);
            }
            _ => break,
        }
    }
    Ok(column)
}

pub fn is_table_constraint_start(parser: &Parser) -> bool {
    [
        TokenTypes::Constraint,
        TokenTypes::Primary,
        TokenTypes::Unique,
        TokenTypes::Check,
        TokenTypes::Foreign,
    ]
    .iter()
    .any(|token_type| parser.at(*token_type))
}

/// `[CONSTRAINT name] PRIMARY KEY (..) | UNIQUE (..) | CHECK (..) | FOREIGN KEY (..) REFERENCES ..`.
/// Unnamed constraints get a name built from their columns, suffixed when it
/// is already in `taken`.
pub fn get_table_constraint(parser: &mut Parser, taken: &[String]) -> Result<TableConstraint, String> {
    let name = if parser.at(TokenTypes::Constraint) {
        parser.advance()?;
        Some(get_identifier(parser)?)
    } else {
        None
    };

    let constraint = match parser.current_token()?.token_type {
        TokenTypes::Primary => {
            parser.advance()?;
            consume(parser, TokenTypes::Key)?;
            TableConstraint::PrimaryKey {
                columns: parenthesized_identifier_list(parser)?,
            }
        }
        TokenTypes::Unique => {
            parser.advance()?;
            if parser.at(TokenTypes::Key) || parser.at(TokenTypes::Index) {
                parser.advance()?;
            }
            let columns = parenthesized_identifier_list(parser)?;
            let name = name.unwrap_or_else(|| fresh_name(constraint_name("uq", &columns), taken));
            TableConstraint::Unique(UniqueConstraint { name, columns })
        }
        TokenTypes::Check => {
            parser.advance()?;
            let condition = get_check_expression(parser)?;
            let name = name.unwrap_or_else(|| {
                let columns = condition
                    .columns()
                    .iter()
                    .map(|column| column.to_string())
                    .collect::<Vec<String>>();
                fresh_name(constraint_name("check", &columns), taken)
            });
            TableConstraint::Check(CheckConstraint { name, condition })
        }
        TokenTypes::Foreign => {
            parser.advance()?;
            consume(parser, TokenTypes::Key)?;
            let columns = parenthesized_identifier_list(parser)?;
            let name = name.unwrap_or_else(|| fresh_name(constraint_name("fk", &columns), taken));
            TableConstraint::ForeignKey(get_references(parser, name, columns)?)
        }
        _ => return Err(parser.format_error()),
    };
    Ok(constraint)
}

pub fn constraint_name(prefix: &str, columns: &[String]) -> String {
    let mut parts = vec![prefix.to_string()];
    for column in columns {
        let part = column.to_ascii_lowercase().replace('.', "_");
        if !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts.join("_")
}

/// `base`, or `base_2`, `base_3`, ... when the name is taken.
pub fn fresh_name(base: String, taken: &[String]) -> String {
    let is_taken = |name: &str| taken.iter().any(|other| other.eq_ignore_ascii_case(name));
    if !is_taken(&base) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", base, suffix);
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

fn get_default_value(parser: &mut Parser) -> Result<String, String> {
    let token = parser.current_token()?;
    let value = match token.token_type {
        TokenTypes::String => quote_literal(&unescape_literal(token.value)),
        TokenTypes::IntLiteral | TokenTypes::RealLiteral => token.value.to_string(),
        TokenTypes::Null => "NULL".to_string(),
        TokenTypes::True => "true".to_string(),
        TokenTypes::False => "false".to_string(),
        TokenTypes::Identifier
            if token.value.eq_ignore_ascii_case("CURRENT_TIMESTAMP")
                || token.value.eq_ignore_ascii_case("CURRENT_DATE") =>
        {
            token.value.to_ascii_uppercase()
        }
        _ => return Err(parser.format_error()),
    };
    parser.advance()?;
    Ok(value)
}

fn get_check_expression(parser: &mut Parser) -> Result<Condition, String> {
    consume(parser, TokenTypes::LeftParen)?;
    let condition = get_condition_expression(parser)?;
    consume(parser, TokenTypes::RightParen)?;
    Ok(condition)
}

// REFERENCES table (columns) [ON DELETE action] [ON UPDATE action]
fn get_references(parser: &mut Parser, name: String, columns: Vec<String>) -> Result<ForeignKey, String> {
    consume(parser, TokenTypes::References)?;
    let referenced_table = get_table_name(parser)?;
    let referenced_columns = parenthesized_identifier_list(parser)?;
    let mut foreign_key = ForeignKey {
        name,
        columns,
        referenced_table,
        referenced_columns,
        on_delete: ReferentialAction::NoAction,
        on_update: ReferentialAction::NoAction,
    };
    while parser.at(TokenTypes::On) {
        parser.advance()?;
        let event = parser.current_token()?.token_type;
        if event != TokenTypes::Delete && event != TokenTypes::Update {
            return Err(parser.format_error());
        }
        parser.advance()?;
        let action = get_referential_action(parser)?;
        if event == TokenTypes::Delete {
            foreign_key.on_delete = action;
        } else {
            foreign_key.on_update = action;
        }
    }
    Ok(foreign_key)
}

fn get_referential_action(parser: &mut Parser) -> Result<ReferentialAction, String> {
    let action = if parser.at_word("CASCADE") {
        ReferentialAction::Cascade
    } else if parser.at_word("RESTRICT") {
        ReferentialAction::Restrict
    } else if parser.at(TokenTypes::Set) {
        parser.advance()?;
        if !parser.at(TokenTypes::Null) {
            return Err(parser.format_error());
        }
        ReferentialAction::SetNull
    } else if parser.at_word("NO") {
        parser.advance()?;
        if !parser.at_word("ACTION") {
            return Err(parser.format_error());
        }
        ReferentialAction::NoAction
    } else {
        return Err(parser.format_error());
    };
    parser.advance()?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::core::condition::{ComparisonOperator, Operand};
    use crate::db::table::core::field::DataType;
    use crate::interpreter::tokenizer::tokenize;

    #[test]
    fn column_constraints_are_collected() {
        let mut parser = Parser::new(tokenize(
            "email VARCHAR(80) NOT NULL UNIQUE DEFAULT 'n/a' CHECK (email LIKE '%@%'),",
        ));
        let column = get_column_definition(&mut parser).unwrap();
        assert_eq!(column.field.data_type, DataType::Varchar);
        assert!(column.field.is_not_null());
        assert!(column.field.is_unique());
        assert_eq!(column.default, Some("'n/a'".to_string()));
        assert_eq!(
            column.check,
            Some(Condition::compare(
                "email",
                ComparisonOperator::Like,
                vec![Operand::Text("%@%".to_string())]
            ))
        );
        assert!(parser.at(TokenTypes::Comma));
    }

    #[test]
    fn default_accepts_keywords_and_numbers() {
        let mut parser = Parser::new(tokenize("created DATETIME DEFAULT current_timestamp"));
        assert_eq!(
            get_column_definition(&mut parser).unwrap().default,
            Some("CURRENT_TIMESTAMP".to_string())
        );
        let mut parser = Parser::new(tokenize("score INT DEFAULT -5"));
        assert_eq!(get_column_definition(&mut parser).unwrap().default, Some("-5".to_string()));
        let mut parser = Parser::new(tokenize("note TEXT DEFAULT NULL"));
        assert_eq!(get_column_definition(&mut parser).unwrap().default, Some("NULL".to_string()));
        let mut parser = Parser::new(tokenize("note TEXT DEFAULT now"));
        assert!(get_column_definition(&mut parser).is_err());
    }

    #[test]
    fn inline_reference_reads_actions() {
        let mut parser = Parser::new(tokenize(
            "owner INT REFERENCES users (id) ON DELETE CASCADE ON UPDATE SET NULL",
        ));
        let column = get_column_definition(&mut parser).unwrap();
        let reference = column.reference.unwrap();
        assert_eq!(reference.columns, vec!["owner".to_string()]);
        assert_eq!(reference.referenced_table, "users");
        assert_eq!(reference.on_delete, ReferentialAction::Cascade);
        assert_eq!(reference.on_update, ReferentialAction::SetNull);
    }

    #[test]
    fn table_constraints_are_named_from_their_columns() {
        let mut parser = Parser::new(tokenize("UNIQUE (first, last)"));
        assert_eq!(
            get_table_constraint(&mut parser, &[]),
            Ok(TableConstraint::Unique(UniqueConstraint {
                name: "uq_first_last".to_string(),
                columns: vec!["first".to_string(), "last".to_string()],
            }))
        );

        let mut parser = Parser::new(tokenize(
            "CONSTRAINT fk_owner FOREIGN KEY (owner) REFERENCES users (id) ON DELETE NO ACTION",
        ));
        match get_table_constraint(&mut parser, &[]).unwrap() {
            TableConstraint::ForeignKey(foreign_key) => {
                assert_eq!(foreign_key.name, "fk_owner");
                assert_eq!(foreign_key.on_delete, ReferentialAction::NoAction);
            }
            other => panic!("unexpected constraint {:?}", other),
        }

        let mut parser = Parser::new(tokenize("PRIMARY KEY (a, b)"));
        assert_eq!(
            get_table_constraint(&mut parser, &[]),
            Ok(TableConstraint::PrimaryKey {
                columns: vec!["a".to_string(), "b".to_string()]
            })
        );
    }

    #[test]
    fn check_constraint_name_uses_the_columns_it_reads() {
        let mut parser = Parser::new(tokenize("CHECK (price > 0 AND price < 100))"));
        match get_table_constraint(&mut parser, &[]).unwrap() {
            TableConstraint::Check(check) => assert_eq!(check.name, "check_price"),
            other => panic!("unexpected constraint {:?}", other),
        }
        assert!(parser.at(TokenTypes::RightParen));
    }

    #[test]
    fn generated_names_avoid_taken_ones() {
        let taken = vec!["uq_code".to_string(), "UQ_CODE_2".to_string()];
        let mut parser = Parser::new(tokenize("UNIQUE (code)"));
        match get_table_constraint(&mut parser, &taken).unwrap() {
            TableConstraint::Unique(unique) => assert_eq!(unique.name, "uq_code_3"),
            other => panic!("unexpected constraint {:?}", other),
        }
    }
}

use crate::db::table::core::field::Field;
use crate::db::table::operations::alter_table::AlterTableAction;
use crate::interpreter::{
    ast::helpers::column_definition::{
        ColumnDefinition, get_column_definition, get_table_constraint, is_table_constraint_start,
    },
    ast::helpers::common::{expect_statement_end, get_identifier, get_table_name},
    ast::helpers::token::consume,
    ast::{AlterTableStatement, SqlStatement, parser::Parser},
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    consume(parser, TokenTypes::Table)?;
    let table_name = get_table_name(parser)?;
    let action = get_action(parser)?;
    expect_statement_end(parser)?;
    return Ok(SqlStatement::AlterTable(AlterTableStatement { table_name, action }));
}

fn get_action(parser: &mut Parser) -> Result<AlterTableAction, String> {
    return match parser.current_token()?.token_type {
        TokenTypes::Rename => {
            parser.advance()?;
            if parser.at(TokenTypes::Column) {
                parser.advance()?;
                let old_name = get_identifier(parser)?;
                consume(parser, TokenTypes::To)?;
                let new_name = get_identifier(parser)?;
                return Ok(AlterTableAction::RenameColumn { old_name, new_name });
            }
            if parser.at(TokenTypes::To) {
                parser.advance()?;
            }
            let new_name = get_table_name(parser)?;
            Ok(AlterTableAction::RenameTable { new_name })
        }
        TokenTypes::Add => {
            parser.advance()?;
            if is_table_constraint_start(parser) {
                return Ok(AlterTableAction::AddConstraint(get_table_constraint(parser, &[])?));
            }
            if parser.at(TokenTypes::Column) {
                parser.advance()?;
            }
            let (field, default) = column_change(parser)?;
            Ok(AlterTableAction::AddColumn { field, default })
        }
        TokenTypes::Drop => {
            parser.advance()?;
            match parser.current_token()?.token_type {
                TokenTypes::Constraint => {
                    parser.advance()?;
                    Ok(AlterTableAction::DropConstraint {
                        name: get_identifier(parser)?,
                    })
                }
                TokenTypes::Primary => {
                    parser.advance()?;
                    consume(parser, TokenTypes::Key)?;
                    Ok(AlterTableAction::DropPrimaryKey)
                }
                _ => {
                    if parser.at(TokenTypes::Column) {
                        parser.advance()?;
                    }
                    Ok(AlterTableAction::DropColumn {
                        name: get_identifier(parser)?,
                    })
                }
            }
        }
        TokenTypes::Identifier if parser.at_word("MODIFY") => {
            parser.advance()?;
            if parser.at(TokenTypes::Column) {
                parser.advance()?;
            }
            let (field, default) = column_change(parser)?;
            Ok(AlterTableAction::ModifyColumn { field, default })
        }
        _ => Err(parser.format_error()),
    };
}

// A column definition carried by ADD or MODIFY; CHECK and REFERENCES belong in ADD CONSTRAINT.
fn column_change(parser: &mut Parser) -> Result<(Field, Option<String>), String> {
    let ColumnDefinition {
        field,
        default,
        check,
        reference,
    } = get_column_definition(parser)?;
    if check.is_some() || reference.is_some() {
        return Err(format!(
            "{} (use ADD CONSTRAINT for CHECK and FOREIGN KEY)",
            parser.format_error_nearby()
        ));
    }
    Ok((field, default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::core::constraint::UniqueConstraint;
    use crate::db::table::core::field::{Constraint, DataType};
    use crate::db::table::operations::alter_table::TableConstraint;
    use crate::interpreter::ast::test_utils::token;
    use crate::interpreter::tokenizer::tokenize;

    fn action(sql: &str) -> Result<AlterTableAction, String> {
        let mut parser = Parser::new(tokenize(sql));
        match build(&mut parser)? {
            SqlStatement::AlterTable(statement) => Ok(statement.action),
            other => panic!("unexpected statement {:?}", other),
        }
    }

    #[test]
    fn alter_table_rename_generates_proper_statement() {
        // ALTER TABLE users RENAME TO customers;
        let tokens = vec![
            token(TokenTypes::Alter, "ALTER"),
            token(TokenTypes::Table, "TABLE"),
            token(TokenTypes::Identifier, "users"),
            token(TokenTypes::Rename, "RENAME"),
            token(TokenTypes::To, "TO"),
            token(TokenTypes::Identifier, "customers"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        assert_eq!(
            build(&mut parser),
            Ok(SqlStatement::AlterTable(AlterTableStatement {
                table_name: "users".to_string(),
                action: AlterTableAction::RenameTable {
                    new_name: "customers".to_string()
                },
            }))
        );
        assert_eq!(
            action("ALTER TABLE users RENAME customers"),
            Ok(AlterTableAction::RenameTable {
                new_name: "customers".to_string()
            })
        );
    }

    #[test]
    fn alter_table_column_actions() {
        assert_eq!(
            action("ALTER TABLE users ADD COLUMN age INT NOT NULL DEFAULT 0;"),
            Ok(AlterTableAction::AddColumn {
                field: Field::new("age", DataType::Int).with_constraint(Constraint::NotNull),
                default: Some("0".to_string()),
            })
        );
        assert_eq!(
            action("ALTER TABLE users MODIFY name VARCHAR(20);"),
            Ok(AlterTableAction::ModifyColumn {
                field: Field::new("name", DataType::Varchar).with_constraint(Constraint::Size(20)),
                default: None,
            })
        );
        assert_eq!(
            action("ALTER TABLE users RENAME COLUMN name TO full_name;"),
            Ok(AlterTableAction::RenameColumn {
                old_name: "name".to_string(),
                new_name: "full_name".to_string(),
            })
        );
        assert_eq!(
            action("ALTER TABLE users DROP COLUMN age;"),
            Ok(AlterTableAction::DropColumn { name: "age".to_string() })
        );
    }

    #[test]
    fn alter_table_constraint_actions() {
        assert_eq!(
            action("ALTER TABLE users ADD CONSTRAINT uq_mail UNIQUE (email);"),
            Ok(AlterTableAction::AddConstraint(TableConstraint::Unique(UniqueConstraint {
                name: "uq_mail".to_string(),
                columns: vec!["email".to_string()],
            })))
        );
        assert_eq!(
            action("ALTER TABLE users DROP CONSTRAINT uq_mail;"),
            Ok(AlterTableAction::DropConstraint {
                name: "uq_mail".to_string()
            })
        );
        assert_eq!(action("ALTER TABLE users DROP PRIMARY KEY;"), Ok(AlterTableAction::DropPrimaryKey));
    }

    #[test]
    fn alter_table_rejects_inline_check_and_unknown_actions() {
        assert!(action("ALTER TABLE users ADD COLUMN age INT CHECK (age > 0);").is_err());
        assert!(action("ALTER TABLE users ADD owner INT REFERENCES people (id);").is_err());
        assert!(action("ALTER TABLE users TRUNCATE;").is_err());
        assert!(action("ALTER users RENAME TO x;").is_err());
    }
}

use crate::db::table::core::constraint::CheckConstraint;
use crate::db::table::core::table::TableDefinition;
use crate::db::table::operations::alter_table::TableConstraint;
use crate::interpreter::{
    ast::{
        CreateIndexStatement, CreateTableStatement, DatabaseStatement, ExistenceCheck, SqlStatement,
        helpers::column_definition::{
            constraint_name, fresh_name, get_column_definition, get_table_constraint,
            is_table_constraint_start,
        },
        helpers::common::{exists_clause, expect_statement_end, get_identifier, get_table_name, parenthesized_identifier_list},
        helpers::token::consume,
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;

    let token = parser.current_token()?;
    let statement = match token.token_type {
        TokenTypes::Database => database_statement(parser)?,
        TokenTypes::Table => table_statement(parser)?,
        TokenTypes::Index => index_statement(parser, false)?,
        TokenTypes::Unique => {
            parser.advance()?;
            index_statement(parser, true)?
        }
        _ => return Err(parser.format_error()),
    };

    expect_statement_end(parser)?;
    return Ok(statement);
}

fn database_statement(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let existence_check = exists_clause(parser, ExistenceCheck::IfNotExists)?;
    let name = get_identifier(parser)?;
    return Ok(SqlStatement::CreateDatabase(DatabaseStatement { name, existence_check }));
}

// CREATE [UNIQUE] INDEX name ON table (columns)
fn index_statement(parser: &mut Parser, unique: bool) -> Result<SqlStatement, String> {
    consume(parser, TokenTypes::Index)?;
    let index_name = get_identifier(parser)?;
    consume(parser, TokenTypes::On)?;
    let table_name = get_table_name(parser)?;
    let columns = parenthesized_identifier_list(parser)?;
    return Ok(SqlStatement::CreateIndex(CreateIndexStatement {
        index_name,
        table_name,
        columns,
        unique,
    }));
}

fn table_statement(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let existence_check = exists_clause(parser, ExistenceCheck::IfNotExists)?;
    let table_name = get_table_name(parser)?;
    let definition = table_definition(parser)?;
    return Ok(SqlStatement::CreateTable(CreateTableStatement {
        table_name,
        existence_check,
        definition,
    }));
}

// Column definitions and table constraints may be interleaved.
fn table_definition(parser: &mut Parser) -> Result<TableDefinition, String> {
    let mut definition = TableDefinition::default();
    let mut names: Vec<String> = vec![];
    let mut table_primary_key = false;

    consume(parser, TokenTypes::LeftParen)?;
    loop {
        if is_table_constraint_start(parser) {
            match get_table_constraint(parser, &names)? {
                TableConstraint::PrimaryKey { columns } => {
                    if table_primary_key {
                        return Err(format!("{} (multiple primary keys)", parser.format_error_nearby()));
                    }
                    table_primary_key = true;
                    definition.primary_key = columns;
                }
                TableConstraint::Unique(unique) => {
                    names.push(unique.name.clone());
                    definition.unique_constraints.push(unique);
                }
                TableConstraint::Check(check) => {
                    names.push(check.name.clone());
                    definition.check_constraints.push(check);
                }
                TableConstraint::ForeignKey(foreign_key) => {
                    names.push(foreign_key.name.clone());
                    definition.foreign_keys.push(foreign_key);
                }
            }
        } else {
            let column = get_column_definition(parser)?;
            let columns = vec![column.field.name.clone()];
            if let Some(default) = column.default {
                definition.defaults.insert(column.field.name.clone(), default);
            }
            if let Some(condition) = column.check {
                let name = fresh_name(constraint_name("check", &columns), &names);
                names.push(name.clone());
                definition.check_constraints.push(CheckConstraint { name, condition });
            }
            if let Some(mut foreign_key) = column.reference {
                foreign_key.name = fresh_name(constraint_name("fk", &columns), &names);
                names.push(foreign_key.name.clone());
                definition.foreign_keys.push(foreign_key);
            }
            definition.fields.push(column.field);
        }

        match parser.current_token()?.token_type {
            TokenTypes::Comma => parser.advance()?,
            TokenTypes::RightParen => {
                parser.advance()?;
                break;
            }
            _ => return Err(parser.format_error()),
        }
    }

    let column_primary_key = definition.fields.iter().filter(|field| field.is_primary_key()).count();
    if column_primary_key > 1 || (column_primary_key == 1 && table_primary_key) {
        return Err("Multiple primary keys defined; use PRIMARY KEY (a, b) for a composite key.".to_string());
    }
    return Ok(definition);
}

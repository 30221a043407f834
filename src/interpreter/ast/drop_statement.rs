use crate::interpreter::{
    ast::{
        DatabaseStatement, DropTableStatement, ExistenceCheck, SqlStatement,
        helpers::common::{exists_clause, expect_statement_end, get_identifier, get_table_name},
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

pub fn build(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let token = parser.current_token()?;
    let statement = match token.token_type {
        TokenTypes::Database => {
            parser.advance()?;
            let existence_check = exists_clause(parser, ExistenceCheck::IfExists)?;
            let name = get_identifier(parser)?;
            SqlStatement::DropDatabase(DatabaseStatement { name, existence_check })
        }
        TokenTypes::Table => {
            parser.advance()?;
            let existence_check = exists_clause(parser, ExistenceCheck::IfExists)?;
            let table_name = get_table_name(parser)?;
            SqlStatement::DropTable(DropTableStatement {
                table_name,
                existence_check,
            })
        }
        TokenTypes::Index => {
            parser.advance()?;
            let index_name = get_identifier(parser)?;
            // Index names are unique per database; `ON table` is accepted and ignored.
            if parser.at(TokenTypes::On) {
                parser.advance()?;
                get_table_name(parser)?;
            }
            SqlStatement::DropIndex(index_name)
        }
        _ => return Err(parser.format_error()),
    };
    expect_statement_end(parser)?;
    return Ok(statement);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ast::test_utils::token;
    use crate::interpreter::tokenizer::tokenize;

    #[test]
    fn drop_table_generates_proper_statement() {
        // DROP TABLE IF EXISTS users;
        let tokens = vec![
            token(TokenTypes::Drop, "DROP"),
            token(TokenTypes::Table, "TABLE"),
            token(TokenTypes::If, "IF"),
            token(TokenTypes::Exists, "EXISTS"),
            token(TokenTypes::Identifier, "users"),
            token(TokenTypes::SemiColon, ";"),
        ];
        let mut parser = Parser::new(tokens);
        assert_eq!(
            build(&mut parser),
            Ok(SqlStatement::DropTable(DropTableStatement {
                table_name: "users".to_string(),
                existence_check: Some(ExistenceCheck::IfExists),
            }))
        );
    }

    #[test]
    fn drop_database_and_index() {
        let mut parser = Parser::new(tokenize("DROP DATABASE shop;"));
        assert_eq!(
            build(&mut parser),
            Ok(SqlStatement::DropDatabase(DatabaseStatement {
                name: "shop".to_string(),
                existence_check: None,
            }))
        );
        let mut parser = Parser::new(tokenize("DROP INDEX idx_email ON users;"));
        assert_eq!(build(&mut parser), Ok(SqlStatement::DropIndex("idx_email".to_string())));
    }

    #[test]
    fn drop_statement_rejects_bad_forms() {
        let mut parser = Parser::new(tokenize("DROP TABLE IF NOT EXISTS users;"));
        assert!(build(&mut parser).is_err());
        let mut parser = Parser::new(tokenize("DROP users;"));
        assert!(build(&mut parser).is_err());
        let mut parser = Parser::new(tokenize("DROP TABLE users extra;"));
        assert!(build(&mut parser).is_err());
    }
}

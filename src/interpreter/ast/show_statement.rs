use crate::interpreter::{
    ast::{
        SqlStatement,
        helpers::common::{expect_statement_end, get_identifier, get_table_name},
        parser::Parser,
    },
    tokenizer::token::TokenTypes,
};

// USE database
pub fn build_use(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let name = get_identifier(parser)?;
    expect_statement_end(parser)?;
    return Ok(SqlStatement::UseDatabase(name));
}

// SHOW DATABASES | SHOW TABLES | SHOW INDEXES [FROM table]
pub fn build_show(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let statement = if parser.at_word("DATABASES") {
        parser.advance()?;
        SqlStatement::ShowDatabases
    } else if parser.at_word("TABLES") {
        parser.advance()?;
        SqlStatement::ShowTables
    } else if parser.at_word("INDEXES") || parser.at(TokenTypes::Index) {
        parser.advance()?;
        let table = if parser.at(TokenTypes::From) || parser.at(TokenTypes::In) || parser.at(TokenTypes::On) {
            parser.advance()?;
            Some(get_table_name(parser)?)
        } else {
            None
        };
        SqlStatement::ShowIndexes(table)
    } else {
        return Err(parser.format_error());
    };
    expect_statement_end(parser)?;
    return Ok(statement);
}

// DESCRIBE table | DESC table
pub fn build_describe(parser: &mut Parser) -> Result<SqlStatement, String> {
    parser.advance()?;
    let table_name = get_table_name(parser)?;
    expect_statement_end(parser)?;
    return Ok(SqlStatement::Describe(table_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::tokenizer::tokenize;

    #[test]
    fn show_variants() {
        let mut parser = Parser::new(tokenize("SHOW databases;"));
        assert_eq!(build_show(&mut parser), Ok(SqlStatement::ShowDatabases));
        let mut parser = Parser::new(tokenize("SHOW TABLES"));
        assert_eq!(build_show(&mut parser), Ok(SqlStatement::ShowTables));
        let mut parser = Parser::new(tokenize("SHOW INDEXES FROM users;"));
        assert_eq!(
            build_show(&mut parser),
            Ok(SqlStatement::ShowIndexes(Some("users".to_string())))
        );
        let mut parser = Parser::new(tokenize("SHOW INDEX;"));
        assert_eq!(build_show(&mut parser), Ok(SqlStatement::ShowIndexes(None)));
        let mut parser = Parser::new(tokenize("SHOW COLUMNS;"));
        assert!(build_show(&mut parser).is_err());
    }

    #[test]
    fn use_and_describe() {
        let mut parser = Parser::new(tokenize("USE shop;"));
        assert_eq!(build_use(&mut parser), Ok(SqlStatement::UseDatabase("shop".to_string())));
        let mut parser = Parser::new(tokenize("DESC users;"));
        assert_eq!(build_describe(&mut parser), Ok(SqlStatement::Describe("users".to_string())));
        let mut parser = Parser::new(tokenize("DESCRIBE;"));
        assert!(build_describe(&mut parser).is_err());
    }
}

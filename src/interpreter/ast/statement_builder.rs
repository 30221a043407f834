use crate::interpreter::ast::SqlStatement;
use crate::interpreter::ast::parser::Parser;
use crate::interpreter::ast::{
    alter_table_statement, create_statement, delete_statement, drop_statement, insert_statement,
    select_statement, show_statement, transaction_statements, update_statement,
};

pub trait StatementBuilder {
    fn build_create(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_drop(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_alter(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_use(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_show(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_describe(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_explain(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_insert(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_select(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_update(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_delete(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_begin(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_commit(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
    fn build_rollback(&self, parser: &mut Parser) -> Result<SqlStatement, String>;
}

pub struct DefaultStatementBuilder;

impl StatementBuilder for DefaultStatementBuilder {
    fn build_create(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        create_statement::build(parser)
    }

    fn build_drop(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        drop_statement::build(parser)
    }

    fn build_alter(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        alter_table_statement::build(parser)
    }

    fn build_use(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        show_statement::build_use(parser)
    }

    fn build_show(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        show_statement::build_show(parser)
    }

    fn build_describe(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        show_statement::build_describe(parser)
    }

    fn build_explain(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        select_statement::build_explain(parser)
    }

    fn build_insert(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        insert_statement::build(parser)
    }

    fn build_select(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        select_statement::build(parser)
    }

    fn build_update(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        update_statement::build(parser)
    }

    fn build_delete(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        delete_statement::build(parser)
    }

    fn build_begin(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        transaction_statements::build_begin(parser)
    }

    fn build_commit(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        transaction_statements::build_commit(parser)
    }

    fn build_rollback(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        transaction_statements::build_rollback(parser)
    }
}

/// Consumes the leading keyword and answers a fixed statement, so dispatch can
/// be tested without the real builders.
#[cfg(test)]
pub struct MockStatementBuilder;

#[cfg(test)]
impl MockStatementBuilder {
    fn fixed(parser: &mut Parser, statement: SqlStatement) -> Result<SqlStatement, String> {
        parser.advance()?;
        return Ok(statement);
    }
}

#[cfg(test)]
impl StatementBuilder for MockStatementBuilder {
    fn build_create(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::ShowDatabases)
    }

    fn build_drop(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::DropIndex("idx".to_string()))
    }

    fn build_alter(&self, _parser: &mut Parser) -> Result<SqlStatement, String> {
        Err("alter is not mocked".to_string())
    }

    fn build_use(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::UseDatabase("test_db".to_string()))
    }

    fn build_show(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::ShowTables)
    }

    fn build_describe(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::Describe("users".to_string()))
    }

    fn build_explain(&self, _parser: &mut Parser) -> Result<SqlStatement, String> {
        Err("explain is not mocked".to_string())
    }

    fn build_insert(&self, _parser: &mut Parser) -> Result<SqlStatement, String> {
        Err("insert is not mocked".to_string())
    }

    fn build_select(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::ShowTables)
    }

    fn build_update(&self, _parser: &mut Parser) -> Result<SqlStatement, String> {
        Err("update is not mocked".to_string())
    }

    fn build_delete(&self, _parser: &mut Parser) -> Result<SqlStatement, String> {
        Err("delete is not mocked".to_string())
    }

    fn build_begin(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::BeginTransaction)
    }

    fn build_commit(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::Commit)
    }

    fn build_rollback(&self, parser: &mut Parser) -> Result<SqlStatement, String> {
        Self::fixed(parser, SqlStatement::Rollback)
    }
}

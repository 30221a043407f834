use crate::interpreter::ast::helpers::where_clause::{Parentheses, WhereOperator, WhereStackElement};
use crate::interpreter::ast::parser::Parser;

#[derive(PartialEq, Debug)]
pub enum WhereClauseExpectedNextToken {
    ConditionLeftParenNot,
    LogicalOperatorRightParen,
}

// This function ensures that the current where stack element is correct based on the previous.
// Raises parser errors for strings like `WHERE NOT AND 1 = 1`, `WHERE a = 1 b = 2`, or `WHERE ()`.
pub fn next_expected_token_from_current(
    expected_token: &WhereClauseExpectedNextToken,
    where_stack_element: &WhereStackElement,
    parser: &Parser,
) -> Result<WhereClauseExpectedNextToken, String> {
    let (required, next) = match where_stack_element {
        WhereStackElement::Condition(_) => (
            WhereClauseExpectedNextToken::ConditionLeftParenNot,
            WhereClauseExpectedNextToken::LogicalOperatorRightParen,
        ),
        WhereStackElement::Operator(WhereOperator::Not)
        | WhereStackElement::Parentheses(Parentheses::Left) => (
            WhereClauseExpectedNextToken::ConditionLeftParenNot,
            WhereClauseExpectedNextToken::ConditionLeftParenNot,
        ),
        WhereStackElement::Operator(_) => (
            WhereClauseExpectedNextToken::LogicalOperatorRightParen,
            WhereClauseExpectedNextToken::ConditionLeftParenNot,
        ),
        WhereStackElement::Parentheses(Parentheses::Right) => (
            WhereClauseExpectedNextToken::LogicalOperatorRightParen,
            WhereClauseExpectedNextToken::LogicalOperatorRightParen,
        ),
    };
    if *expected_token != required {
        return Err(parser.format_error_nearby());
    }
    Ok(next)
}

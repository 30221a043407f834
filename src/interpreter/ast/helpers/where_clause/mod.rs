mod expected_token_matches_current;
mod where_condition;

use expected_token_matches_current::{WhereClauseExpectedNextToken, next_expected_token_from_current};
pub use where_condition::get_operand;

use crate::db::table::core::condition::{Condition, LogicalOperator};
use crate::interpreter::ast::{helpers::where_clause::where_condition::get_condition, parser::Parser};
use crate::interpreter::tokenizer::token::TokenTypes;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WhereOperator {
    Not,
    And,
    Or,
}

impl WhereOperator {
    fn precedence(&self) -> u8 {
        match self {
            WhereOperator::Not => 3,
            WhereOperator::And => 2,
            WhereOperator::Or => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parentheses {
    Left,
    Right,
}

#[derive(Debug, PartialEq)]
pub enum WhereStackElement {
    Condition(Condition),
    Operator(WhereOperator),
    Parentheses(Parentheses),
}

#[derive(Debug, PartialEq)]
enum StackOperator {
    Operator(WhereOperator),
    LeftParen,
}

/// Parses `WHERE <expression>` when the current token is WHERE.
pub fn get_where_clause(parser: &mut Parser) -> Result<Option<Condition>, String> {
    if !parser.at(TokenTypes::Where) {
        return Ok(None);
    }
    parser.advance()?;
    Ok(Some(get_condition_expression(parser)?))
}

// The where stack holds the expression in Reverse Polish Notation, built from the
// infix text with the shunting yard algorithm. Precedence is '()' > NOT > AND > OR.
// The expression ends at the first token that cannot continue it, or at a ')' that
// closes nothing (the end of a CHECK constraint).
pub fn get_condition_expression(parser: &mut Parser) -> Result<Condition, String> {
    let mut where_stack: Vec<WhereStackElement> = vec![];
    let mut operator_stack: Vec<StackOperator> = vec![];
    let mut expected_token = WhereClauseExpectedNextToken::ConditionLeftParenNot;

    while let Some(where_stack_element) = get_where_stack_element(parser, &operator_stack)? {
        expected_token = next_expected_token_from_current(&expected_token, &where_stack_element, parser)?;
        match where_stack_element {
            WhereStackElement::Condition(_) => where_stack.push(where_stack_element),
            WhereStackElement::Parentheses(Parentheses::Left) => operator_stack.push(StackOperator::LeftParen),
            WhereStackElement::Parentheses(Parentheses::Right) => loop {
                match operator_stack.pop() {
                    Some(StackOperator::LeftParen) => break,
                    Some(StackOperator::Operator(operator)) => {
                        where_stack.push(WhereStackElement::Operator(operator))
                    }
                    None => return Err("Mismatched parentheses found.".to_string()),
                }
            },
            WhereStackElement::Operator(WhereOperator::Not) => {
                operator_stack.push(StackOperator::Operator(WhereOperator::Not))
            }
            WhereStackElement::Operator(operator) => {
                while let Some(StackOperator::Operator(top)) = operator_stack.last() {
                    if top.precedence() < operator.precedence() {
                        break;
                    }
                    where_stack.push(WhereStackElement::Operator(*top));
                    operator_stack.pop();
                }
                operator_stack.push(StackOperator::Operator(operator));
            }
        }
    }
    if expected_token == WhereClauseExpectedNextToken::ConditionLeftParenNot {
        return Err(parser.format_error());
    }
    while let Some(operator) = operator_stack.pop() {
        match operator {
            StackOperator::Operator(operator) => where_stack.push(WhereStackElement::Operator(operator)),
            StackOperator::LeftParen => return Err("Mismatched parentheses found.".to_string()),
        }
    }

    where_stack_to_condition(where_stack)
}

fn get_where_stack_element(
    parser: &mut Parser,
    operator_stack: &[StackOperator],
) -> Result<Option<WhereStackElement>, String> {
    let token_type = parser.current_token()?.token_type;
    let element = match token_type {
        TokenTypes::And => WhereStackElement::Operator(WhereOperator::And),
        TokenTypes::Or => WhereStackElement::Operator(WhereOperator::Or),
        TokenTypes::Not => WhereStackElement::Operator(WhereOperator::Not),
        TokenTypes::LeftParen => WhereStackElement::Parentheses(Parentheses::Left),
        TokenTypes::RightParen => {
            if !operator_stack.contains(&StackOperator::LeftParen) {
                return Ok(None);
            }
            WhereStackElement::Parentheses(Parentheses::Right)
        }
        TokenTypes::Identifier
        | TokenTypes::IntLiteral
        | TokenTypes::RealLiteral
        | TokenTypes::String
        | TokenTypes::Null
        | TokenTypes::True
        | TokenTypes::False => return Ok(Some(WhereStackElement::Condition(get_condition(parser)?))),
        _ => return Ok(None),
    };
    parser.advance()?;
    Ok(Some(element))
}

fn where_stack_to_condition(where_stack: Vec<WhereStackElement>) -> Result<Condition, String> {
    let mut operands: Vec<Condition> = vec![];
    for element in where_stack {
        match element {
            WhereStackElement::Condition(condition) => operands.push(condition),
            WhereStackElement::Operator(WhereOperator::Not) => {
                let child = operands.pop().ok_or_else(malformed_expression)?;
                operands.push(Condition::negate(child));
            }
            WhereStackElement::Operator(operator) => {
                let right = operands.pop().ok_or_else(malformed_expression)?;
                let left = operands.pop().ok_or_else(malformed_expression)?;
                let logical = if operator == WhereOperator::And {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                };
                operands.push(combine(logical, left, right));
            }
            WhereStackElement::Parentheses(_) => return Err(malformed_expression()),
        }
    }
    let condition = operands.pop().ok_or_else(malformed_expression)?;
    if !operands.is_empty() {
        return Err(malformed_expression());
    }
    Ok(condition)
}

// `a AND (b AND c)` is stored as one AND with three children.
fn combine(operator: LogicalOperator, left: Condition, right: Condition) -> Condition {
    let mut children = vec![];
    for side in [left, right] {
        match side {
            Condition::Logic {
                operator: side_operator,
                children: side_children,
            } if side_operator == operator && !side_children.is_empty() => children.extend(side_children),
            other => children.push(other),
        }
    }
    Condition::Logic { operator, children }
}

fn malformed_expression() -> String {
    "Malformed logical expression.".to_string()
}

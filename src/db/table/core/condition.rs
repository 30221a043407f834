use std::fmt;

/// WHERE predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No WHERE clause; matches every row.
    Empty,
    /// AND with no children is true, OR with no children is false.
    Logic {
        operator: LogicalOperator,
        children: Vec<Condition>,
    },
    Negation(Box<Condition>),
    Comparison(Comparison),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    LessThan,
    LessEquals,
    GreaterThan,
    GreaterEquals,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Number(String),
    Null,
    /// Possibly qualified (`table.column`) column reference.
    Column(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub column: String,
    pub operator: ComparisonOperator,
    pub operands: Vec<Operand>,
    /// LIKE escape character; `\` when not given.
    pub escape: Option<char>,
}

impl Comparison {
    pub fn new(column: impl Into<String>, operator: ComparisonOperator, operands: Vec<Operand>) -> Self {
        Self {
            column: column.into(),
            operator,
            operands,
            escape: None,
        }
    }
}

impl Condition {
    pub fn always_true() -> Self {
        Condition::Logic {
            operator: LogicalOperator::And,
            children: vec![],
        }
    }

    pub fn always_false() -> Self {
        Condition::Logic {
            operator: LogicalOperator::Or,
            children: vec![],
        }
    }

    pub fn compare(column: &str, operator: ComparisonOperator, operands: Vec<Operand>) -> Self {
        Condition::Comparison(Comparison::new(column, operator, operands))
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Logic {
            operator: LogicalOperator::And,
            children,
        }
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Logic {
            operator: LogicalOperator::Or,
            children,
        }
    }

    pub fn negate(child: Condition) -> Self {
        Condition::Negation(Box::new(child))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Condition::Empty)
    }

    /// Every column name the predicate reads.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec![];
        self.collect_columns(&mut columns);
        columns
    }

    fn collect_columns<'a>(&'a self, columns: &mut Vec<&'a str>) {
        match self {
            Condition::Empty => {}
            Condition::Logic { children, .. } => {
                for child in children {
                    child.collect_columns(columns);
                }
            }
            Condition::Negation(child) => child.collect_columns(columns),
            Condition::Comparison(comparison) => {
                columns.push(&comparison.column);
                for operand in &comparison.operands {
                    if let Operand::Column(column) = operand {
                        columns.push(column);
                    }
                }
            }
        }
    }

    pub fn rename_column(&mut self, old_name: &str, new_name: &str) {
        match self {
            Condition::Empty => {}
            Condition::Logic { children, .. } => {
                for child in children {
                    child.rename_column(old_name, new_name);
                }
            }
            Condition::Negation(child) => child.rename_column(old_name, new_name),
            Condition::Comparison(comparison) => {
                if comparison.column.eq_ignore_ascii_case(old_name) {
                    comparison.column = new_name.to_string();
                }
                for operand in comparison.operands.iter_mut() {
                    if let Operand::Column(column) = operand {
                        if column.eq_ignore_ascii_case(old_name) {
                            *column = new_name.to_string();
                        }
                    }
                }
            }
        }
    }

    /// Top-level AND terms.
    pub fn conjuncts(&self) -> Vec<&Condition> {
        match self {
            Condition::Logic {
                operator: LogicalOperator::And,
                children,
            } => children.iter().flat_map(|child| child.conjuncts()).collect(),
            Condition::Empty => vec![],
            _ => vec![self],
        }
    }
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Inverse of [`quote_literal`] for the text between the quotes. Backslash
/// sequences other than `\\` and `\'` are kept, so LIKE escapes survive.
pub fn unescape_literal(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some('\\')) | ('\\', Some('\'')) | ('\'', Some('\'')) => {
                if let Some(next) = chars.next() {
                    result.push(next);
                }
            }
            _ => result.push(c),
        }
    }
    result
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => write!(f, "AND"),
            LogicalOperator::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ComparisonOperator::Equals => "=",
            ComparisonOperator::NotEquals => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessEquals => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterEquals => ">=",
            ComparisonOperator::IsNull => "IS NULL",
            ComparisonOperator::IsNotNull => "IS NOT NULL",
            ComparisonOperator::In => "IN",
            ComparisonOperator::NotIn => "NOT IN",
            ComparisonOperator::Between => "BETWEEN",
            ComparisonOperator::NotBetween => "NOT BETWEEN",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::NotLike => "NOT LIKE",
        };
        write!(f, "{}", text)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Text(text) => write!(f, "{}", quote_literal(text)),
            Operand::Number(number) => write!(f, "{}", number),
            Operand::Null => write!(f, "NULL"),
            Operand::Column(column) => write!(f, "{}", column),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands = self
            .operands
            .iter()
            .map(|operand| operand.to_string())
            .collect::<Vec<String>>();
        match self.operator {
            ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                write!(f, "{} {}", self.column, self.operator)
            }
            ComparisonOperator::In | ComparisonOperator::NotIn => {
                write!(f, "{} {} ({})", self.column, self.operator, operands.join(", "))
            }
            ComparisonOperator::Between | ComparisonOperator::NotBetween => write!(
                f,
                "{} {} {}",
                self.column,
                self.operator,
                operands.join(" AND ")
            ),
            ComparisonOperator::Like | ComparisonOperator::NotLike => {
                write!(f, "{} {} {}", self.column, self.operator, operands.join(" "))?;
                if let Some(escape) = self.escape {
                    write!(f, " ESCAPE {}", quote_literal(&escape.to_string()))?;
                }
                Ok(())
            }
            _ => write!(f, "{} {} {}", self.column, self.operator, operands.join(" ")),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Empty => write!(f, "TRUE"),
            Condition::Logic { operator, children } => {
                if children.is_empty() {
                    return match operator {
                        LogicalOperator::And => write!(f, "TRUE"),
                        LogicalOperator::Or => write!(f, "FALSE"),
                    };
                }
                let parts = children
                    .iter()
                    .map(|child| match child {
                        Condition::Logic { children, .. } if !children.is_empty() => {
                            format!("({})", child)
                        }
                        _ => child.to_string(),
                    })
                    .collect::<Vec<String>>();
                write!(f, "{}", parts.join(&format!(" {} ", operator)))
            }
            Condition::Negation(child) => write!(f, "NOT ({})", child),
            Condition::Comparison(comparison) => write!(f, "{}", comparison),
        }
    }
}

use crate::db::index::Index;
use crate::db::table::core::condition::{Comparison, ComparisonOperator, Condition, Operand};
use crate::db::table::operations::helpers::order_by_clause::OrderDirection;
use crate::db::table::operations::select::{ResultSet, SelectQuery, TableReference};

pub const PLAN_COLUMN: &str = "plan";

/// Describes how `query` would run. Nothing is executed. `indexes` are the
/// indexes of the database the query targets.
pub fn explain(query: &SelectQuery, indexes: &[Index]) -> ResultSet {
    let mut plan = vec![format!("SCAN TABLE {}", query.table)];
    plan.extend(index_candidates(&query.table, &query.condition, indexes));

    if let Some(join) = &query.join {
        plan.push(format!("{} JOIN {} ON {}", join.kind, join.table, join.on));
        plan.extend(index_candidates(&join.table, &join.on, indexes));
    }
    if !query.condition.is_empty() {
        plan.push(format!("FILTER {}", query.condition));
    }
    if !query.order_by.is_empty() {
        let keys = query
            .order_by
            .iter()
            .map(|key| match key.direction {
                OrderDirection::Asc => format!("{} ASC", key.column),
                OrderDirection::Desc => format!("{} DESC", key.column),
            })
            .collect::<Vec<String>>();
        plan.push(format!("SORT BY {}", keys.join(", ")));
    }
    let columns = query
        .columns
        .iter()
        .map(|column| column.to_string())
        .collect::<Vec<String>>();
    plan.push(format!("PROJECT {}", columns.join(", ")));

    ResultSet {
        columns: vec![PLAN_COLUMN.to_string()],
        rows: plan.into_iter().map(|line| vec![Some(line)]).collect(),
    }
}

// An index qualifies when its leading column is compared with `=` against a
// literal in a top-level AND term.
fn index_candidates(table: &TableReference, condition: &Condition, indexes: &[Index]) -> Vec<String> {
    let equalities = condition
        .conjuncts()
        .into_iter()
        .filter_map(|conjunct| match conjunct {
            Condition::Comparison(Comparison {
                column,
                operator: ComparisonOperator::Equals,
                operands,
                ..
            }) if !matches!(operands.as_slice(), [Operand::Column(_)]) => {
                Some(column.as_str())
            }
            _ => None,
        })
        .filter_map(|column| unqualified(table, column))
        .collect::<Vec<&str>>();

    indexes
        .iter()
        .filter(|index| index.table.eq_ignore_ascii_case(&table.name))
        .filter(|index| {
            index.columns.first().is_some_and(|first| {
                equalities
                    .iter()
                    .any(|column| column.eq_ignore_ascii_case(first))
            })
        })
        .map(|index| format!("USING INDEX {} ({})", index.name, index.columns.join(", ")))
        .collect()
}

// Strips a qualifier naming `table`; columns qualified for another table are dropped.
fn unqualified<'a>(table: &TableReference, column: &'a str) -> Option<&'a str> {
    match column.split_once('.') {
        Some((qualifier, name)) => {
            let matches = qualifier.eq_ignore_ascii_case(&table.name)
                || table
                    .alias
                    .as_deref()
                    .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier));
            matches.then_some(name)
        }
        None => Some(column),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::table::operations::helpers::order_by_clause::OrderByKey;
    use crate::db::table::operations::select::{JoinClause, JoinKind, SelectColumn};

    fn plan(result: &ResultSet) -> Vec<&str> {
        result.column_values(PLAN_COLUMN).into_iter().flatten().collect()
    }

    fn users_name_index() -> Index {
        Index {
            name: "idx_name".to_string(),
            table: "users".to_string(),
            columns: vec!["name".to_string()],
            unique: false,
        }
    }

    #[test]
    fn plain_scan_projects_everything() {
        let result = explain(&SelectQuery::all("users"), &[]);
        assert_eq!(plan(&result), vec!["SCAN TABLE users", "PROJECT *"]);
    }

    #[test]
    fn equality_on_leading_column_uses_index() {
        let query = SelectQuery {
            condition: Condition::and(vec![
                Condition::compare("u.name", ComparisonOperator::Equals, vec![Operand::Text("Jim".to_string())]),
                Condition::compare("age", ComparisonOperator::GreaterThan, vec![Operand::Number("3".to_string())]),
            ]),
            order_by: vec![OrderByKey {
                column: "age".to_string(),
                direction: OrderDirection::Desc,
            }],
            table: TableReference {
                name: "users".to_string(),
                alias: Some("u".to_string()),
            },
            columns: vec![SelectColumn::Column {
                name: "name".to_string(),
                alias: Some("n".to_string()),
            }],
            ..SelectQuery::all("users")
        };
        let result = explain(&query, &[users_name_index()]);
        assert_eq!(
            plan(&result),
            vec![
                "SCAN TABLE users AS u",
                "USING INDEX idx_name (name)",
                "FILTER u.name = 'Jim' AND age > 3",
                "SORT BY age DESC",
                "PROJECT name AS n",
            ]
        );
    }

    #[test]
    fn range_predicates_do_not_use_index() {
        let query = SelectQuery {
            condition: Condition::compare("name", ComparisonOperator::Like, vec![Operand::Text("J%".to_string())]),
            ..SelectQuery::all("users")
        };
        let result = explain(&query, &[users_name_index()]);
        assert!(!plan(&result).iter().any(|line| line.starts_with("USING INDEX")));
    }

    #[test]
    fn join_is_listed_after_scan() {
        let query = SelectQuery {
            join: Some(JoinClause {
                kind: JoinKind::Left,
                table: TableReference::new("orders"),
                on: Condition::compare(
                    "users.id",
                    ComparisonOperator::Equals,
                    vec![Operand::Column("orders.user_id".to_string())],
                ),
            }),
            ..SelectQuery::all("users")
        };
        let result = explain(&query, &[]);
        assert_eq!(
            plan(&result),
            vec![
                "SCAN TABLE users",
                "LEFT JOIN orders ON users.id = orders.user_id",
                "PROJECT *",
            ]
        );
    }
}

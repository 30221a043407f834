use std::cmp::Ordering;

use crate::db::table::core::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByKey {
    pub column: String,
    pub direction: OrderDirection,
}

/// Reorders `to_order` by keys computed once per element. The sort is stable,
/// so ties keep storage order.
pub fn apply_order_by_from_precomputed<T>(
    to_order: &mut Vec<T>,
    precomputed: Vec<Vec<Value>>,
    directions: &[OrderDirection],
) {
    let mut sorted_indices = (0..to_order.len()).collect::<Vec<usize>>();
    sorted_indices
        .sort_by(|a, b| perform_comparisons(&precomputed[*a], &precomputed[*b], directions));

    let mut slots = to_order.drain(..).map(Some).collect::<Vec<Option<T>>>();
    to_order.extend(sorted_indices.into_iter().filter_map(|i| slots[i].take()));
}

fn perform_comparisons(keys1: &[Value], keys2: &[Value], directions: &[OrderDirection]) -> Ordering {
    for (i, direction) in directions.iter().enumerate() {
        let ordering = keys1[i].sort_cmp(&keys2[i]);
        if ordering != Ordering::Equal {
            return if *direction == OrderDirection::Desc {
                ordering.reverse()
            } else {
                ordering
            };
        }
    }

    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_order_by_from_precomputed_single_column_asc() {
        let mut to_order = vec!["second", "fourth", "third", "first"];
        let precomputed = vec![
            vec![Value::Int(25)],
            vec![Value::Int(55)],
            vec![Value::Int(35)],
            vec![Value::Int(22)],
        ];

        apply_order_by_from_precomputed(&mut to_order, precomputed, &[OrderDirection::Asc]);

        assert_eq!(to_order, vec!["first", "second", "third", "fourth"]);
    }

    #[test]
    fn apply_order_by_from_precomputed_multiple_columns_desc() {
        let mut to_order = vec!["fifth", "second", "sixth", "third", "fourth", "first"];
        let precomputed = vec![
            vec![Value::Int(10), Value::Float(1.0)],
            vec![Value::Int(35), Value::Float(2.0)],
            vec![Value::Int(3), Value::Float(-10.5)],
            vec![Value::Int(35), Value::Float(3.0)],
            vec![Value::Int(10), Value::Float(0.0)],
            vec![Value::Int(35), Value::Float(-2.5)],
        ];

        apply_order_by_from_precomputed(
            &mut to_order,
            precomputed,
            &[OrderDirection::Desc, OrderDirection::Asc],
        );

        assert_eq!(
            to_order,
            vec!["first", "second", "third", "fourth", "fifth", "sixth"]
        );
    }

    #[test]
    fn nulls_sort_first_ascending_and_last_descending() {
        let mut ascending = vec!["b", "null", "a"];
        apply_order_by_from_precomputed(
            &mut ascending,
            vec![vec![Value::Int(2)], vec![Value::Null], vec![Value::Int(1)]],
            &[OrderDirection::Asc],
        );
        assert_eq!(ascending, vec!["null", "a", "b"]);

        let mut descending = vec!["b", "null", "a"];
        apply_order_by_from_precomputed(
            &mut descending,
            vec![vec![Value::Int(2)], vec![Value::Null], vec![Value::Int(1)]],
            &[OrderDirection::Desc],
        );
        assert_eq!(descending, vec!["b", "a", "null"]);
    }
}

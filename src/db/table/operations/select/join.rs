use crate::db::table::core::condition::Condition;
use crate::db::table::core::record::Record;
use crate::db::table::operations::helpers::where_clause::{evaluate, JoinSide, JoinedRow};
use crate::db::table::operations::select::{JoinKind, Source};
use crate::error::Result;

/// Nested-loop join. `on` decides which pairs match, `condition` then filters
/// the joined rows. LEFT pads unmatched left records with a `None` right side.
pub fn join_rows<'a>(
    left: &Source<'a>,
    right: &Source<'a>,
    kind: JoinKind,
    on: &Condition,
    condition: &Condition,
) -> Result<Vec<Vec<Option<&'a Record>>>> {
    let mut rows = vec![];
    for left_record in left.table.records() {
        let mut matched = false;
        for right_record in right.table.records() {
            let row = joined(left, right, left_record, Some(right_record));
            if !evaluate(on, &row)? {
                continue;
            }
            matched = true;
            if evaluate(condition, &row)? {
                rows.push(vec![Some(left_record), Some(right_record)]);
            }
        }
        if !matched && kind == JoinKind::Left {
            let row = joined(left, right, left_record, None);
            if evaluate(condition, &row)? {
                rows.push(vec![Some(left_record), None]);
            }
        }
    }
    Ok(rows)
}

fn joined<'a>(
    left: &Source<'a>,
    right: &Source<'a>,
    left_record: &'a Record,
    right_record: Option<&'a Record>,
) -> JoinedRow<'a> {
    JoinedRow {
        left: JoinSide {
            table: left.table,
            alias: left.alias,
            record: Some(left_record),
        },
        right: JoinSide {
            table: right.table,
            alias: right.alias,
            record: right_record,
        },
    }
}

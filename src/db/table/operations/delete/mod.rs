use crate::db::table::core::condition::Condition;
use crate::db::table::core::table::Table;
use crate::db::table::operations::helpers::where_clause::matching_indices;
use crate::error::Result;

/// Removes every visible record matching `condition`, returning how many went.
pub fn delete_data(table: &mut Table, condition: &Condition) -> Result<usize> {
    let row_indicies = matching_indices(table, condition)?;
    let records = table.records_mut();
    // Highest index first so earlier positions stay valid.
    for index in row_indicies.iter().rev() {
        records.remove(*index);
    }
    Ok(row_indicies.len())
}

use std::fmt;

use tracing::info;

use crate::model::Record;
use crate::selection::Selection;
use crate::store::{Result, Table};

/// The closed set of operations applied across a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOp<F> {
    Assign { field: F, value: String },
    Delete,
}

impl<F: fmt::Display> fmt::Display for BulkOp<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkOp::Assign { field, value } => write!(f, "set {} to {:?}", field, value),
            BulkOp::Delete => f.write_str("delete"),
        }
    }
}

/// Apply `op` to every selected record and clear the selection. Returns how
/// many records were touched.
///
/// Assignment is checked against every selected record before anything is
/// written; on error the table and the selection are left as they were.
pub fn apply<R: Record>(
    table: &mut Table<R>,
    selection: &mut Selection,
    op: &BulkOp<R::Field>,
) -> Result<usize> {
    let affected = match op {
        BulkOp::Assign { field, value } => {
            let mut updated = vec![];
            for record in table.records().iter().filter(|r| selection.contains(r.id())) {
                let mut record = record.clone();
                record.assign(*field, value)?;
                updated.push(record);
            }

            let count = updated.len();
            for record in updated {
                table.replace(record)?;
            }
            count
        }
        BulkOp::Delete => {
            let rows = table.rows_mut();
            let before = rows.len();
            rows.retain(|r| !selection.contains(r.id()));
            before - rows.len()
        }
    };

    info!(affected, selected = selection.len(), "applied bulk {}", op);
    selection.clear();

    Ok(affected)
}

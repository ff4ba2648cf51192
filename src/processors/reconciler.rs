use std::collections::HashSet;

use crate::error::{EtlError, Result};
use crate::models::{MasterKind, MasterRow, MasterTable};

/// Extend `master` with a surrogate key for every observed value it does not
/// already contain.
///
/// New keys start at `max_id + 1` (1 for an empty table) and follow the order
/// in which each value first appears in `observed`. Existing rows are left
/// untouched and in place. `id_column` / `value_column` must name the table's
/// columns, otherwise a `MissingColumn` error is returned.
pub fn reconcile<I, S>(
    master: &MasterTable,
    observed: I,
    id_column: &str,
    value_column: &str,
) -> Result<MasterTable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if master.id_column() != id_column {
        return Err(EtlError::missing_column("master table", id_column));
    }
    if master.value_column() != value_column {
        return Err(EtlError::missing_column("master table", value_column));
    }

    let mut known: HashSet<String> = master.rows().iter().map(|r| r.value.clone()).collect();
    let mut updated = master.clone();
    let mut last_id = master.max_id();

    for value in observed {
        let value = value.as_ref();
        if known.contains(value) {
            continue;
        }
        last_id = last_id.checked_add(1).ok_or_else(|| {
            EtlError::CorruptMaster(format!(
                "no {} left after {} for '{}'",
                id_column, last_id, value
            ))
        })?;
        known.insert(value.to_string());
        updated.append(MasterRow::new(last_id, value));
    }

    Ok(updated)
}

/// `reconcile` using the column names of `kind`
pub fn reconcile_kind<I, S>(master: &MasterTable, kind: MasterKind, observed: I) -> Result<MasterTable>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    reconcile(master, observed, kind.id_column(), kind.value_column())
}

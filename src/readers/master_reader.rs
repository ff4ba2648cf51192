use crate::error::{EtlError, Result};
use crate::models::{MasterKind, MasterRow, MasterTable};

/// Reads master tables from their CSV form (`<kind>_id,<kind>` header)
///
/// Values are kept exactly as stored so a table read back equals the table
/// written. Every table is validated on load.
pub struct MasterReader;

impl MasterReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_master(&self, kind: MasterKind, bytes: &[u8]) -> Result<MasterTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(bytes);

        let headers = reader.headers()?.clone();
        let id_index = column_index(&headers, kind, kind.id_column())?;
        let value_index = column_index(&headers, kind, kind.value_column())?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;

            let id_field = record.get(id_index).unwrap_or_default();
            let id = id_field.parse::<u64>().map_err(|_| {
                EtlError::CorruptMaster(format!(
                    "{} row {}: invalid {} '{}'",
                    kind.table_name(),
                    line + 1,
                    kind.id_column(),
                    id_field
                ))
            })?;
            let value = record.get(value_index).unwrap_or_default().to_string();

            rows.push(MasterRow::new(id, value));
        }

        let table = MasterTable::with_columns(kind.id_column(), kind.value_column(), rows);
        table.validate()?;

        Ok(table)
    }
}

impl Default for MasterReader {
    fn default() -> Self {
        Self::new()
    }
}

fn column_index(headers: &csv::StringRecord, kind: MasterKind, column: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| EtlError::missing_column(kind.table_name(), column))
}

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use validator::Validate;

use crate::error::{EtlError, Result};

/// The two master tables maintained by the transform run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MasterKind {
    PaymentType,
    Company,
}

impl MasterKind {
    pub const ALL: [MasterKind; 2] = [MasterKind::PaymentType, MasterKind::Company];

    /// Natural-key column, also the master's file type (`payment_type_master.csv`)
    pub fn value_column(&self) -> &'static str {
        match self {
            MasterKind::PaymentType => "payment_type",
            MasterKind::Company => "company",
        }
    }

    /// Surrogate-key column
    pub fn id_column(&self) -> &'static str {
        match self {
            MasterKind::PaymentType => "payment_type_id",
            MasterKind::Company => "company_id",
        }
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            MasterKind::PaymentType => "payment_type_master",
            MasterKind::Company => "company_master",
        }
    }
}

impl fmt::Display for MasterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value_column())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MasterRow {
    #[validate(range(min = 1))]
    pub id: u64,
    pub value: String,
}

impl MasterRow {
    pub fn new(id: u64, value: impl Into<String>) -> Self {
        Self {
            id,
            value: value.into(),
        }
    }
}

/// Append-only lookup table mapping natural keys to surrogate keys.
///
/// Rows keep their insertion order; existing rows are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterTable {
    id_column: String,
    value_column: String,
    rows: Vec<MasterRow>,
}

impl MasterTable {
    /// Empty table with the column names of `kind`
    pub fn empty(kind: MasterKind) -> Self {
        Self::with_columns(kind.id_column(), kind.value_column(), Vec::new())
    }

    /// Table for `kind` with the given rows, checked for key uniqueness
    pub fn from_rows(kind: MasterKind, rows: Vec<MasterRow>) -> Result<Self> {
        let table = Self::with_columns(kind.id_column(), kind.value_column(), rows);
        table.validate()?;
        Ok(table)
    }

    /// Table with arbitrary column names, as read from storage. Not validated.
    pub fn with_columns(
        id_column: impl Into<String>,
        value_column: impl Into<String>,
        rows: Vec<MasterRow>,
    ) -> Self {
        Self {
            id_column: id_column.into(),
            value_column: value_column.into(),
            rows,
        }
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    pub fn rows(&self) -> &[MasterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest surrogate key, or 0 for an empty table so new keys start at 1
    pub fn max_id(&self) -> u64 {
        self.rows.iter().map(|r| r.id).max().unwrap_or(0)
    }

    pub fn id_of(&self, value: &str) -> Option<u64> {
        self.rows.iter().find(|r| r.value == value).map(|r| r.id)
    }

    /// Natural key -> surrogate key index for bulk resolution
    pub fn lookup(&self) -> HashMap<&str, u64> {
        self.rows.iter().map(|r| (r.value.as_str(), r.id)).collect()
    }

    /// Check the column names match `kind`
    pub fn ensure_kind(&self, kind: MasterKind) -> Result<()> {
        if self.value_column != kind.value_column() {
            return Err(EtlError::missing_column(
                kind.table_name(),
                kind.value_column(),
            ));
        }
        if self.id_column != kind.id_column() {
            return Err(EtlError::missing_column(kind.table_name(), kind.id_column()));
        }
        Ok(())
    }

    /// Check keys are positive and both key columns are unique
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::with_capacity(self.rows.len());
        let mut values = HashSet::with_capacity(self.rows.len());

        for row in &self.rows {
            row.validate().map_err(|e| {
                EtlError::CorruptMaster(format!("{} {}: {}", self.id_column, row.id, e))
            })?;
            if !ids.insert(row.id) {
                return Err(EtlError::CorruptMaster(format!(
                    "duplicate {} {}",
                    self.id_column, row.id
                )));
            }
            if !values.insert(row.value.as_str()) {
                return Err(EtlError::CorruptMaster(format!(
                    "duplicate {} '{}'",
                    self.value_column, row.value
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn append(&mut self, row: MasterRow) {
        self.rows.push(row);
    }
}

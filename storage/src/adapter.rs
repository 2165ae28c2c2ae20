//! The storage adapter contract.

use crate::error::StorageResult;
use crate::filter::Filter;
use rowcheck_core::Row;
use std::fmt;

/// Storage primitive names, used to annotate failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Insert,
    Select,
    Count,
    Execute,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Delete => "delete",
            Operation::Insert => "insert",
            Operation::Select => "select",
            Operation::Count => "count",
            Operation::Execute => "execute",
        })
    }
}

/// Rows returned by a select, with the column list the store reported.
///
/// `columns` is filled even when no rows match so that diagnostics can
/// still print a header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Take the first row, if any.
    pub fn into_first(self) -> Option<Row> {
        self.rows.into_iter().next()
    }
}

/// Backing data store used by the mapper.
///
/// Calls are blocking; timeouts and cancellation are the adapter's concern.
pub trait StorageAdapter {
    /// Remove every row from a table.
    fn delete(&self, table: &str) -> StorageResult<()>;

    /// Insert rows, writing only the listed columns.
    fn insert(&self, table: &str, rows: &[Row], columns: &[String]) -> StorageResult<()>;

    /// Fetch rows matching `filter`. An empty `columns` list selects every
    /// column the table has.
    fn select(
        &self,
        table: &str,
        filter: &Filter,
        columns: &[String],
        limit: Option<usize>,
    ) -> StorageResult<RowSet>;

    /// Count every row in a table.
    fn count(&self, table: &str) -> StorageResult<usize>;

    /// Run a free-form statement, such as a sequence reset after cleanup.
    fn execute(&self, statement: &str) -> StorageResult<()>;
}

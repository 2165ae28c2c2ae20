//! In-memory storage adapter.
//!
//! Keeps tables as vectors of rows behind a shared lock. Clones share the
//! same data, so a test can hand one clone to a manager and inspect the
//! other.

use crate::adapter::{Operation, RowSet, StorageAdapter};
use crate::error::{StorageError, StorageResult};
use crate::filter::Filter;
use parking_lot::Mutex;
use rowcheck_core::{Row, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Row>,
    /// Column filled from a counter when an insert leaves it empty.
    sequence: Option<(String, i64)>,
}

impl MemoryTable {
    fn add_columns<'a>(&mut self, columns: impl IntoIterator<Item = &'a str>) {
        for col in columns {
            if !self.columns.iter().any(|c| c == col) {
                self.columns.push(col.to_string());
            }
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, MemoryTable>,
    statements: Vec<String>,
    failing: HashSet<Operation>,
}

/// Storage adapter that keeps everything in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table and its columns.
    pub fn create_table(&self, table: &str, columns: &[&str]) {
        let mut state = self.state.lock();
        let entry = state.tables.entry(table.to_string()).or_default();
        entry.add_columns(columns.iter().copied());
    }

    /// Fill `column` from an increasing counter whenever an inserted row
    /// leaves it missing or Null, like a server-generated ID.
    pub fn with_sequence(&self, table: &str, column: &str, start: i64) {
        let mut state = self.state.lock();
        let entry = state.tables.entry(table.to_string()).or_default();
        entry.add_columns([column]);
        entry.sequence = Some((column.to_string(), start));
    }

    /// Append rows directly, bypassing the adapter contract.
    pub fn seed(&self, table: &str, rows: Vec<Row>) {
        let mut state = self.state.lock();
        let entry = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            entry.add_columns(row.columns());
            entry.rows.push(row);
        }
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.state
            .lock()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Statements passed to `execute`, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().statements.clone()
    }

    /// Make every future call of `operation` fail.
    pub fn fail_on(&self, operation: Operation) {
        self.state.lock().failing.insert(operation);
    }

    /// Undo `fail_on`.
    pub fn recover(&self, operation: Operation) {
        self.state.lock().failing.remove(&operation);
    }

    fn check(state: &MemoryState, operation: Operation, table: &str) -> StorageResult<()> {
        if state.failing.contains(&operation) {
            return Err(StorageError::backend(operation, table, "injected failure"));
        }
        Ok(())
    }
}

impl StorageAdapter for MemoryStorage {
    fn delete(&self, table: &str) -> StorageResult<()> {
        let mut state = self.state.lock();
        Self::check(&state, Operation::Delete, table)?;
        if let Some(t) = state.tables.get_mut(table) {
            trace!(table, rows = t.rows.len(), "memory delete");
            t.rows.clear();
        }
        Ok(())
    }

    fn insert(&self, table: &str, rows: &[Row], columns: &[String]) -> StorageResult<()> {
        let mut state = self.state.lock();
        Self::check(&state, Operation::Insert, table)?;
        let entry = state.tables.entry(table.to_string()).or_default();
        entry.add_columns(columns.iter().map(|c| c.as_str()));

        for row in rows {
            let mut stored = row.project(columns);
            if let Some((column, next)) = entry.sequence.as_mut() {
                if stored.get_or_null(column).is_null() {
                    stored.insert(column.clone(), Value::Int(*next));
                    *next += 1;
                }
            }
            entry.rows.push(stored);
        }
        trace!(table, rows = rows.len(), "memory insert");
        Ok(())
    }

    fn select(
        &self,
        table: &str,
        filter: &Filter,
        columns: &[String],
        limit: Option<usize>,
    ) -> StorageResult<RowSet> {
        let state = self.state.lock();
        Self::check(&state, Operation::Select, table)?;

        let Some(t) = state.tables.get(table) else {
            return Ok(RowSet::new(columns.to_vec(), Vec::new()));
        };

        let columns = if columns.is_empty() {
            t.columns.clone()
        } else {
            columns.to_vec()
        };

        let rows = t
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| {
                columns
                    .iter()
                    .map(|c| (c.clone(), row.get_or_null(c).clone()))
                    .collect::<Row>()
            })
            .collect();

        Ok(RowSet::new(columns, rows))
    }

    fn count(&self, table: &str) -> StorageResult<usize> {
        let state = self.state.lock();
        Self::check(&state, Operation::Count, table)?;
        Ok(state.tables.get(table).map(|t| t.rows.len()).unwrap_or(0))
    }

    fn execute(&self, statement: &str) -> StorageResult<()> {
        let mut state = self.state.lock();
        if state.failing.contains(&Operation::Execute) {
            return Err(StorageError::statement(statement, "injected failure"));
        }
        state.statements.push(statement.to_string());
        Ok(())
    }
}

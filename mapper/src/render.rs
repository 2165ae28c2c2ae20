//! Failure diagnostics: live table contents as a text table.

use crate::error::{AssertError, AssertResult};
use rowcheck_codec::Codec;
use rowcheck_core::Value;
use rowcheck_storage::{Filter, Operation, RowSet, StorageAdapter};
use tracing::warn;

/// Renders fetched rows as a fixed-width pipe table.
#[derive(Debug, Clone, Copy)]
pub struct DiffRenderer<'c> {
    codec: &'c Codec,
}

impl<'c> DiffRenderer<'c> {
    pub fn new(codec: &'c Codec) -> Self {
        Self { codec }
    }

    /// Render `rows` restricted to `columns`, or to every returned column
    /// when `columns` is empty.
    ///
    /// ```text
    /// | id | status |
    /// | 1  | open   |
    /// ```
    pub fn render(&self, rows: &RowSet, columns: &[String]) -> String {
        let columns = if columns.is_empty() {
            rows.columns.as_slice()
        } else {
            columns
        };

        let cells: Vec<Vec<String>> = rows
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| self.cell(row.get_or_null(c)))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
        for line in &cells {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        write_line(&mut out, columns.iter().map(String::as_str), &widths);
        for line in &cells {
            write_line(&mut out, line.iter().map(String::as_str), &widths);
        }
        out
    }

    /// Fetch up to `limit` rows from the store and render them.
    pub fn snapshot(
        &self,
        storage: &dyn StorageAdapter,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> AssertResult<String> {
        let rows = storage
            .select(table, &Filter::new(), columns, Some(limit))
            .map_err(|e| AssertError::adapter(Operation::Select, table, "reading snapshot", e))?;
        Ok(self.render(&rows, columns))
    }

    /// Attach a snapshot of the table to `error`. A failed snapshot is
    /// appended to the original error instead of replacing it.
    pub fn enrich(
        &self,
        error: AssertError,
        storage: &dyn StorageAdapter,
        table: &str,
        columns: &[String],
        limit: usize,
    ) -> AssertError {
        match self.snapshot(storage, table, columns, limit) {
            Ok(snapshot) => AssertError::WithSnapshot {
                error: Box::new(error),
                snapshot,
            },
            Err(snapshot_error) => {
                warn!(table, error = %snapshot_error, "failed to render table snapshot");
                AssertError::SnapshotFailed {
                    error: Box::new(error),
                    snapshot_error: Box::new(snapshot_error),
                }
            }
        }
    }

    fn cell(&self, value: &Value) -> String {
        self.codec
            .encode(value)
            .unwrap_or_else(|_| value.to_string())
    }
}

fn write_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.zip(widths) {
        out.push(' ');
        out.push_str(cell);
        let pad = width.saturating_sub(cell.chars().count());
        out.extend(std::iter::repeat(' ').take(pad));
        out.push_str(" |");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowcheck_core::row;
    use rowcheck_storage::MemoryStorage;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_render_pads_to_widest_cell() {
        let codec = Codec::new();
        let rows = RowSet::new(
            cols(&["id", "status", "note"]),
            vec![
                row! { "id" => 1i64, "status" => "open", "note" => Value::Null },
                row! { "id" => 10i64, "status" => "closed", "note" => b"raw".to_vec() },
            ],
        );

        let text = DiffRenderer::new(&codec).render(&rows, &[]);
        assert_eq!(
            text,
            "| id | status | note |\n\
             | 1  | open   | NULL |\n\
             | 10 | closed | raw  |\n"
        );
    }

    #[test]
    fn test_render_restricts_columns() {
        let codec = Codec::new();
        let rows = RowSet::new(
            cols(&["id", "status"]),
            vec![row! { "id" => 1i64, "status" => "open" }],
        );

        let text = DiffRenderer::new(&codec).render(&rows, &cols(&["status"]));
        assert_eq!(text, "| status |\n| open   |\n");
    }

    #[test]
    fn test_snapshot_respects_limit() {
        let codec = Codec::new();
        let store = MemoryStorage::new();
        store.seed(
            "orders",
            (0..5i64).map(|i| row! { "id" => i }).collect(),
        );

        let text = DiffRenderer::new(&codec)
            .snapshot(&store, "orders", &cols(&["id"]), 2)
            .unwrap();
        assert_eq!(text, "| id |\n| 0  |\n| 1  |\n");
    }

    #[test]
    fn test_enrich_keeps_original_error_when_snapshot_fails() {
        let codec = Codec::new();
        let store = MemoryStorage::new();
        store.fail_on(Operation::Select);

        let original = AssertError::row_count_mismatch("orders", 1, 2);
        let err = DiffRenderer::new(&codec).enrich(original, &store, "orders", &[], 50);

        let message = err.to_string();
        assert!(message.starts_with("invalid number of rows in table orders: 1 expected, 2 found"));
        assert!(message.contains(", failed to query existing rows: "));
        assert!(err.snapshot().is_none());
        assert_eq!(err.kind(), rowcheck_core::ErrorKind::RowCountMismatch);
    }
}

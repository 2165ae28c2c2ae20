//! Text tables.
//!
//! A table is a matrix of string cells where row 0 is the header and the
//! remaining rows are data.

use crate::error::{TableError, TableResult};

/// A validated text table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table, checking that a header exists and every data row
    /// has as many cells as the header.
    pub fn new(rows: Vec<Vec<String>>) -> TableResult<Self> {
        let header_len = match rows.first() {
            Some(header) if !header.is_empty() => header.len(),
            _ => return Err(TableError::MissingHeader),
        };

        for (idx, row) in rows.iter().enumerate().skip(1) {
            if row.len() != header_len {
                return Err(TableError::ragged_row(idx, header_len, row.len()));
            }
        }

        Ok(Self { rows })
    }

    /// Build a table from string slices.
    pub fn from_cells<R, C>(rows: R) -> TableResult<Self>
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|r| r.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Parse a pipe-delimited table such as a Gherkin data table.
    ///
    /// Blank lines are ignored; cells are trimmed.
    pub fn parse_pipes(text: &str) -> TableResult<Self> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            rows.push(split_pipe_row(trimmed)?);
        }
        Self::new(rows)
    }

    /// Column names.
    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Data rows (everything after the header).
    pub fn data(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// Number of data rows.
    pub fn data_len(&self) -> usize {
        self.rows.len() - 1
    }

    /// All rows including the header.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Split one `| a | b |` line into trimmed cells.
pub fn split_pipe_row(line: &str) -> TableResult<Vec<String>> {
    let inner = line
        .strip_prefix('|')
        .and_then(|l| l.strip_suffix('|'))
        .ok_or_else(|| TableError::malformed_line(line))?;

    Ok(inner.split('|').map(|c| c.trim().to_string()).collect())
}

//! Where table data comes from.

use crate::error::{SessionError, SessionResult};
use rowcheck_core::Table;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Table data, inline or from a CSV file.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Inline(Table),
    File(PathBuf),
}

impl TableSource {
    /// Build a file source from step text: the text is trimmed and its first
    /// line is the path.
    pub fn from_file_text(text: &str) -> SessionResult<Self> {
        let path = text.trim().lines().next().unwrap_or("").trim();
        if path.is_empty() {
            return Err(SessionError::MissingFileName);
        }
        Ok(TableSource::File(PathBuf::from(path)))
    }

    /// Produce the table, reading the file if needed.
    pub fn load(&self) -> SessionResult<Cow<'_, Table>> {
        match self {
            TableSource::Inline(table) => Ok(Cow::Borrowed(table)),
            TableSource::File(path) => load_table_from_file(path).map(Cow::Owned),
        }
    }
}

impl From<Table> for TableSource {
    fn from(table: Table) -> Self {
        TableSource::Inline(table)
    }
}

/// Read a CSV file into a table. The first record is the header.
///
/// Every record must have as many fields as the header.
pub fn load_table_from_file(path: &Path) -> SessionResult<Table> {
    if path.as_os_str().is_empty() {
        return Err(SessionError::MissingFileName);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| SessionError::read_file(path, e))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| SessionError::read_file(path, e))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded table file");
    Ok(Table::new(rows)?)
}

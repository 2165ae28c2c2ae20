//! Row schemas.
//!
//! A `RowSchema` is the statically declared mapping from column names to
//! typed fields for one row type. It is built once (usually from a
//! `RowType` implementation) and consulted on every decode.

use crate::ValueKind;
use std::collections::HashMap;

/// Definition of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name as it appears in table headers.
    pub name: String,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Whether the column accepts Null.
    pub nullable: bool,
    /// Custom type name used to look up codec overrides.
    pub type_name: Option<String>,
}

impl ColumnDef {
    /// Create a non-nullable column of the given kind.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            type_name: None,
        }
    }

    /// Mark the column as nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Attach a custom type name.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// The key under which codec overrides for this column are registered.
    pub fn type_key(&self) -> &str {
        self.type_name.as_deref().unwrap_or(self.kind.as_str())
    }
}

/// Ordered set of column definitions for one row type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSchema {
    columns: Vec<ColumnDef>,
    by_name: HashMap<String, usize>,
}

impl RowSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. A later column with the same name replaces the earlier one.
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.push(column);
        self
    }

    /// Add a column of the given kind.
    pub fn with(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.column(ColumnDef::new(name, kind))
    }

    /// Add a nullable column of the given kind.
    pub fn with_nullable(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.column(ColumnDef::new(name, kind).nullable())
    }

    fn push(&mut self, column: ColumnDef) {
        match self.by_name.get(&column.name) {
            Some(&idx) => self.columns[idx] = column,
            None => {
                self.by_name.insert(column.name.clone(), self.columns.len());
                self.columns.push(column);
            }
        }
    }

    /// Get a column by name.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.by_name.get(name).map(|&idx| &self.columns[idx])
    }

    /// Check if the schema declares a column.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Iterate over columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter()
    }

    /// Column names in declaration order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Implemented by row types that declare their table schema.
///
/// ```ignore
/// struct OrderRow;
///
/// impl RowType for OrderRow {
///     fn schema() -> RowSchema {
///         RowSchema::new()
///             .with("id", ValueKind::Int)
///             .with("status", ValueKind::String)
///             .with_nullable("deleted_at", ValueKind::Timestamp)
///     }
/// }
/// ```
pub trait RowType {
    fn schema() -> RowSchema;
}

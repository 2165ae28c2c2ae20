//! Equality filters sent to the store.

use rowcheck_core::{Row, Value};
use std::fmt;

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`.
    Eq { column: String, value: Value },
    /// `column IS NULL`.
    IsNull { column: String },
}

impl Condition {
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq { column, .. } | Condition::IsNull { column } => column,
        }
    }

    /// Evaluate the condition against a row. Missing columns count as Null.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Eq { column, value } => row.get_or_null(column) == value,
            Condition::IsNull { column } => row.get_or_null(column).is_null(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Eq { column, value } => write!(f, "{} = {}", column, value),
            Condition::IsNull { column } => write!(f, "{} IS NULL", column),
        }
    }
}

/// Conjunction of conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition for a value; Null becomes `IS NULL`.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if value.is_null() {
            self.conditions.push(Condition::IsNull { column });
        } else {
            self.conditions.push(Condition::Eq { column, value });
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value.into());
        self
    }

    pub fn is_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push(Condition::IsNull {
            column: column.into(),
        });
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Check whether the filter constrains a column.
    pub fn constrains(&self, column: &str) -> bool {
        self.conditions.iter().any(|c| c.column() == column)
    }

    /// True when every condition holds for the row.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "(no conditions)");
        }
        for (i, cond) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", cond)?;
        }
        Ok(())
    }
}

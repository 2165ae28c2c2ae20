//! Table mapping and assertion engine.
//!
//! # Structure
//!
//! - **vars** - scenario-scoped variable tokens and their bound values
//! - **table** - decodes whole text tables into rows, or walks them row by
//!   row for a visitor
//! - **matcher** - builds per-row filters, fetches, runs deferred checks and
//!   binds variables
//! - **render** - prints fetched rows as a fixed-width table for failures
//! - **assertion** - ties the above together for one table assertion

mod assertion;
mod error;
mod matcher;
mod render;
mod table;
mod vars;

pub use assertion::{TableAssertion, DEFAULT_SNAPSHOT_LIMIT};
pub use error::{AssertError, AssertResult};
pub use matcher::{check_count, looks_like_json, RowMatcher};
pub use render::DiffRenderer;
pub use table::{CellDisposition, ExpectedRow, RowVisitor, TableMapper};
pub use vars::{ChangeHook, VariableStore, DEFAULT_VAR_PREFIX};

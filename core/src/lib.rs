//! Rowcheck Core Types
//!
//! This crate provides the foundational types used throughout rowcheck:
//! - Value types (the `Value` enum and its `ValueKind`)
//! - Row schemas (column definitions declared once per row type)
//! - Rows (header-ordered column values)
//! - Tables (text matrices with a header row)
//! - Common error types

mod error;
mod row;
mod schema;
mod table;
mod value;

pub use error::*;
pub use row::*;
pub use schema::*;
pub use table::*;
pub use value::*;

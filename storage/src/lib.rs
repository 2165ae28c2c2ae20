//! Storage adapters for rowcheck.
//!
//! The mapper never talks to a database directly. Everything it needs goes
//! through the four primitives of `StorageAdapter` (plus `execute` for
//! cleanup statements), so any backend can be plugged in.

mod adapter;
mod error;
mod filter;
mod memory;

pub use adapter::{Operation, RowSet, StorageAdapter};
pub use error::{StorageError, StorageResult};
pub use filter::{Condition, Filter};
pub use memory::MemoryStorage;

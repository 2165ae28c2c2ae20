//! Rowcheck Session
//!
//! Named database instances, their table registries and the scenario-level
//! operations that clear, populate and assert tables.

mod config;
mod error;
mod manager;
mod source;

pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use manager::{Instance, Manager, DEFAULT_DATABASE};
pub use source::{load_table_from_file, TableSource};

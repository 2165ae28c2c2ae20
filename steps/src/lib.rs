//! Rowcheck Steps
//!
//! Runs feature text whose steps clear, populate and assert database tables:
//!
//! ```text
//! Scenario: orders are stored
//!   Given there are no rows in table "orders"
//!   And these rows are stored in table "orders"
//!     | id | status | created_at           |
//!     | 1  | open   | 2021-01-01T00:00:00Z |
//!   Then only these rows are available in table "orders"
//!     | id  | status |
//!     | $o1 | open   |
//! ```
//!
//! Every phrase accepts an optional `of database "name"` clause after the
//! table name.

mod error;
mod loader;
mod phrases;
mod runner;

pub use error::{StepsError, StepsResult};
pub use loader::{Feature, Scenario, Step, StepArgument};
pub use phrases::{Action, Invocation, PhraseMatcher};
pub use runner::{Runner, ScenarioReport};

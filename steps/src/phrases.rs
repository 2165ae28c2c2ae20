//! Step phrases and their dispatch onto the manager.

use regex_lite::Regex;
use rowcheck_session::{Manager, SessionResult, DEFAULT_DATABASE};
use tracing::debug;

use crate::error::{StepsError, StepsResult};
use crate::loader::Step;

/// What a matched step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `there are no rows in table "t"`
    ClearTable,
    /// `these rows are stored in table "t"`
    StoreRows,
    /// `rows from this file are stored in table "t"`
    StoreRowsFromFile,
    /// `these rows are available in table "t"`
    AssertRows,
    /// `only these rows are available in table "t"`
    AssertOnlyRows,
    /// `rows from this file are available in table "t"`
    AssertRowsFromFile,
    /// `only rows from this file are available in table "t"`
    AssertOnlyRowsFromFile,
    /// `no rows are available in table "t"`
    AssertNoRows,
}

/// A step resolved to an action on a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    pub table: String,
    pub database: String,
}

const TABLE: &str = r#"table "([^"]*)"(?: of database "([^"]*)")?"#;

const PHRASES: [(&str, Action); 8] = [
    ("(?:there are )?no rows in", Action::ClearTable),
    ("these rows are stored in", Action::StoreRows),
    ("rows from this file are stored in", Action::StoreRowsFromFile),
    ("only rows from this file are available in", Action::AssertOnlyRowsFromFile),
    ("only these rows are available in", Action::AssertOnlyRows),
    ("rows from this file are available in", Action::AssertRowsFromFile),
    ("these rows are available in", Action::AssertRows),
    ("no rows are available in", Action::AssertNoRows),
];

/// Matches step text against the table phrases.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    patterns: Vec<(Regex, Action)>,
}

impl PhraseMatcher {
    pub fn new() -> StepsResult<Self> {
        let patterns = PHRASES
            .iter()
            .map(|(phrase, action)| {
                let pattern = format!("^{} {}:?$", phrase, TABLE);
                Ok((Regex::new(&pattern)?, *action))
            })
            .collect::<StepsResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Resolve step text. A missing database clause means the default one.
    pub fn resolve(&self, text: &str) -> Option<Invocation> {
        self.patterns.iter().find_map(|(re, action)| {
            let caps = re.captures(text)?;
            Some(Invocation {
                action: *action,
                table: caps.get(1)?.as_str().to_string(),
                database: caps
                    .get(2)
                    .map_or(DEFAULT_DATABASE, |m| m.as_str())
                    .to_string(),
            })
        })
    }

    /// Run a step against the manager.
    ///
    /// Unknown phrases and missing arguments are reported as `StepsError`;
    /// the returned `SessionResult` carries the outcome of the table
    /// operation itself.
    pub fn execute(&self, manager: &mut Manager, step: &Step) -> StepsResult<SessionResult<()>> {
        let invocation = self
            .resolve(&step.text)
            .ok_or_else(|| StepsError::undefined_step(&step.text))?;

        debug!(
            action = ?invocation.action,
            table = %invocation.table,
            database = %invocation.database,
            "running step"
        );

        let rows = || {
            step.table()
                .ok_or_else(|| StepsError::missing_argument(&step.text, "data table"))
        };
        let file = || {
            step.doc_string()
                .ok_or_else(|| StepsError::missing_argument(&step.text, "doc string"))
        };
        let (table, db) = (invocation.table.as_str(), invocation.database.as_str());

        Ok(match invocation.action {
            Action::ClearTable => manager.clear_table_in(table, db),
            Action::StoreRows => manager.store_rows_in(table, db, rows()?),
            Action::StoreRowsFromFile => manager.store_rows_from_file_in(table, db, file()?),
            Action::AssertRows => manager.assert_rows_in(table, db, rows()?),
            Action::AssertOnlyRows => manager.assert_only_rows_in(table, db, rows()?),
            Action::AssertRowsFromFile => manager.assert_rows_from_file_in(table, db, file()?),
            Action::AssertOnlyRowsFromFile => {
                manager.assert_only_rows_from_file_in(table, db, file()?)
            }
            Action::AssertNoRows => manager.assert_no_rows_in(table, db),
        })
    }
}

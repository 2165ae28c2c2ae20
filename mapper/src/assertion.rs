//! A single table assertion, end to end.

use crate::error::AssertResult;
use crate::matcher::{check_count, RowMatcher};
use crate::render::DiffRenderer;
use crate::table::TableMapper;
use crate::vars::VariableStore;
use rowcheck_codec::Codec;
use rowcheck_core::{RowSchema, Table};
use rowcheck_storage::StorageAdapter;
use tracing::debug;

/// Rows fetched into a failure snapshot.
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 50;

/// Asserts that a table in the store contains the expected rows.
///
/// In exhaustive mode the live row count must equal the number of expected
/// rows; that check runs before any per-row comparison.
pub struct TableAssertion<'a> {
    codec: &'a Codec,
    storage: &'a dyn StorageAdapter,
    table: &'a str,
    schema: &'a RowSchema,
    exhaustive: bool,
    snapshot_limit: usize,
}

impl<'a> TableAssertion<'a> {
    pub fn new(
        codec: &'a Codec,
        storage: &'a dyn StorageAdapter,
        table: &'a str,
        schema: &'a RowSchema,
    ) -> Self {
        Self {
            codec,
            storage,
            table,
            schema,
            exhaustive: false,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }

    /// Require the live row count to match.
    pub fn exhaustive(mut self, exhaustive: bool) -> Self {
        self.exhaustive = exhaustive;
        self
    }

    pub fn snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = limit;
        self
    }

    /// Run the assertion. `None` means no expected rows.
    ///
    /// Any failure is returned with a rendered snapshot of the live table.
    pub fn run(&self, expected: Option<&Table>, vars: &mut VariableStore) -> AssertResult<()> {
        self.check(expected, vars).map_err(|err| {
            let columns = expected.map(|t| t.header().to_vec()).unwrap_or_default();
            DiffRenderer::new(self.codec).enrich(
                err,
                self.storage,
                self.table,
                &columns,
                self.snapshot_limit,
            )
        })
    }

    fn check(&self, expected: Option<&Table>, vars: &mut VariableStore) -> AssertResult<()> {
        if self.exhaustive {
            let count = expected.map(Table::data_len).unwrap_or(0);
            check_count(self.storage, self.table, count)?;
        }

        let Some(table) = expected else {
            return Ok(());
        };

        debug!(
            table = self.table,
            rows = table.data_len(),
            exhaustive = self.exhaustive,
            "asserting rows"
        );

        let mut matcher = RowMatcher::new(self.codec, self.storage, vars, self.table, self.schema)?;
        TableMapper::new(self.codec).iterate(table, self.schema, &mut matcher)
    }
}

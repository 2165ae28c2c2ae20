//! Per-row matching against the store.
//!
//! For each expected row the matcher:
//! 1. classifies cells (JSON payloads are deferred, unbound variables are
//!    left for the fetch to fill in, everything else is compared),
//! 2. builds an equality filter from the compared columns,
//! 3. fetches one row,
//! 4. compares deferred columns on decoded values and binds variables.

use crate::error::{AssertError, AssertResult};
use crate::table::{CellDisposition, ExpectedRow, RowVisitor};
use crate::vars::VariableStore;
use rowcheck_codec::Codec;
use rowcheck_core::{ColumnDef, Row, RowSchema, Value};
use rowcheck_storage::{Filter, Operation, StorageAdapter};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Returns true when a cell is a JSON object or array.
///
/// Stores cannot express JSON equality reliably in a filter, so such cells
/// are compared after the fetch instead.
pub fn looks_like_json(raw: &str) -> bool {
    matches!(raw.as_bytes().first(), Some(b'{') | Some(b'['))
        && serde_json::from_str::<serde_json::Value>(raw).is_ok()
}

/// Compare the live row count of a table with the expected count.
pub fn check_count(storage: &dyn StorageAdapter, table: &str, expected: usize) -> AssertResult<()> {
    let found = storage
        .count(table)
        .map_err(|e| AssertError::adapter(Operation::Count, table, "counting rows", e))?;

    debug!(table, expected, found, "exhaustive row count");
    if found != expected {
        return Err(AssertError::row_count_mismatch(table, expected, found));
    }
    Ok(())
}

/// Matches expected rows of one table against the store.
pub struct RowMatcher<'a> {
    codec: &'a Codec,
    storage: &'a dyn StorageAdapter,
    vars: &'a mut VariableStore,
    table: &'a str,
    schema: &'a RowSchema,
    /// Encoded text of every bound variable.
    substitutions: HashMap<String, String>,
}

impl<'a> RowMatcher<'a> {
    /// Create a matcher, seeding substitutions from the variables bound so far.
    pub fn new(
        codec: &'a Codec,
        storage: &'a dyn StorageAdapter,
        vars: &'a mut VariableStore,
        table: &'a str,
        schema: &'a RowSchema,
    ) -> AssertResult<Self> {
        let mut substitutions = HashMap::with_capacity(vars.len());
        for (token, value) in vars.get_all() {
            let text = match vars.encoded(token) {
                Some(text) => text.to_string(),
                None => codec.encode(value).map_err(|source| AssertError::Variable {
                    token: token.clone(),
                    source,
                })?,
            };
            substitutions.insert(token.clone(), text);
        }

        Ok(Self {
            codec,
            storage,
            vars,
            table,
            schema,
            substitutions,
        })
    }

    /// Equality filter for the compared columns of an expected row.
    ///
    /// Null values become `IS NULL` conditions.
    pub fn build_filter(&self, header: &[String], expected: &ExpectedRow) -> Filter {
        let mut filter = Filter::new();
        for (column, disposition) in header.iter().zip(&expected.dispositions) {
            if disposition.is_excluded() {
                continue;
            }
            if let Some(value) = expected.row.get(column) {
                filter.push(column.clone(), value.clone());
            }
        }
        filter
    }

    /// Fetch the row matching `expected`, then run deferred checks and bind
    /// variables from it.
    pub fn check_row(&mut self, header: &[String], expected: ExpectedRow) -> AssertResult<()> {
        let filter = self.build_filter(header, &expected);
        trace!(table = self.table, row = expected.index, %filter, "fetching expected row");

        let fetched = self
            .storage
            .select(self.table, &filter, header, Some(1))
            .map_err(|e| {
                AssertError::adapter(
                    Operation::Select,
                    self.table,
                    format!("row {} with {}", expected.index, filter),
                    e,
                )
            })?;

        let Some(actual) = fetched.into_first() else {
            return Err(AssertError::RowNotFound {
                table: self.table.to_string(),
                row: expected.index,
                filter: filter.to_string(),
                expected: self.describe(header, &expected),
            });
        };

        self.post_check(header, &expected, &actual)
    }

    fn post_check(&mut self, header: &[String], expected: &ExpectedRow, actual: &Row) -> AssertResult<()> {
        let schema = self.schema;
        let cells = header.iter().zip(&expected.raw).zip(&expected.dispositions);
        for ((name, raw), disposition) in cells {
            let is_variable = self.vars.is_variable(raw);
            let deferred = *disposition == CellDisposition::Deferred;
            // Compared columns already matched through the filter.
            if !is_variable && !deferred {
                continue;
            }
            let Some(column) = schema.get(name) else {
                continue;
            };
            let actual_value = self
                .codec
                .normalize(column, actual.get_or_null(name))
                .map_err(|e| AssertError::invalid_format(expected.index, e))?;

            if is_variable {
                self.bind(raw, &actual_value, column)?;
            }

            if !deferred {
                continue;
            }

            let expected_value = expected.row.get_or_null(name);
            if expected_value != &actual_value {
                return Err(AssertError::ValueMismatch {
                    row: expected.index,
                    column: name.clone(),
                    expected: expected_value.to_string(),
                    actual: actual_value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn bind(&mut self, token: &str, value: &Value, column: &ColumnDef) -> AssertResult<()> {
        let text = self
            .codec
            .encode_column(column, value)
            .map_err(|source| AssertError::Variable {
                token: token.to_string(),
                source,
            })?;
        debug!(token, value = %value, text = %text, "variable bound");
        self.vars.set_encoded(token, value.clone(), text.clone());
        self.substitutions.insert(token.to_string(), text);
        Ok(())
    }

    fn describe(&self, header: &[String], expected: &ExpectedRow) -> String {
        let cells: Vec<String> = header
            .iter()
            .zip(&expected.raw)
            .map(|(column, raw)| match self.substitutions.get(raw) {
                Some(resolved) => format!("{}={} ({})", column, raw, resolved),
                None => format!("{}={}", column, raw),
            })
            .collect();
        format!("{{{}}}", cells.join(", "))
    }
}

impl RowVisitor for RowMatcher<'_> {
    fn classify(&mut self, _column: &str, raw: &str) -> CellDisposition {
        if looks_like_json(raw) {
            return CellDisposition::Deferred;
        }
        if self.vars.is_variable(raw) && self.vars.get(raw).is_none() {
            return CellDisposition::Unbound;
        }
        CellDisposition::Compare
    }

    fn substitute(&self, raw: &str) -> Option<String> {
        self.substitutions.get(raw).cloned()
    }

    fn receive_row(&mut self, header: &[String], expected: ExpectedRow) -> AssertResult<()> {
        self.check_row(header, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableMapper;
    use pretty_assertions::assert_eq;
    use rowcheck_core::{row, Table, ValueKind};
    use rowcheck_storage::{Condition, MemoryStorage, RowSet, StorageResult};

    /// Returns the same row for every select, as a store that renders
    /// values in its own text format would.
    struct Fixed(Row);

    impl StorageAdapter for Fixed {
        fn delete(&self, _table: &str) -> StorageResult<()> {
            Ok(())
        }

        fn insert(&self, _table: &str, _rows: &[Row], _columns: &[String]) -> StorageResult<()> {
            Ok(())
        }

        fn select(
            &self,
            _table: &str,
            _filter: &Filter,
            columns: &[String],
            _limit: Option<usize>,
        ) -> StorageResult<RowSet> {
            Ok(RowSet::new(columns.to_vec(), vec![self.0.clone()]))
        }

        fn count(&self, _table: &str) -> StorageResult<usize> {
            Ok(1)
        }

        fn execute(&self, _statement: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    fn schema() -> RowSchema {
        RowSchema::new()
            .with("id", ValueKind::Int)
            .with("name", ValueKind::String)
            .with("meta", ValueKind::Json)
            .with_nullable("deleted_at", ValueKind::Timestamp)
    }

    fn codec() -> Codec {
        let mut codec = Codec::new();
        codec.register_json_type("json");
        codec
    }

    fn expected(index: usize, row: Row, dispositions: Vec<CellDisposition>, raw: &[&str]) -> ExpectedRow {
        ExpectedRow {
            index,
            row,
            dispositions,
            raw: raw.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_looks_like_json() {
        assert!(looks_like_json(r#"{"a":1}"#));
        assert!(looks_like_json("[1, 2]"));
        assert!(!looks_like_json("{not json"));
        assert!(!looks_like_json("42"));
        assert!(!looks_like_json(r#""quoted""#));
        assert!(!looks_like_json(""));
    }

    #[test]
    fn test_classify_rules() {
        let codec = codec();
        let store = MemoryStorage::new();
        let schema = schema();
        let mut vars = VariableStore::new();
        vars.set("$known", Value::Int(1));

        let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
        assert_eq!(matcher.classify("meta", r#"{"a":1}"#), CellDisposition::Deferred);
        assert_eq!(matcher.classify("id", "$new"), CellDisposition::Unbound);
        assert_eq!(matcher.classify("id", "$known"), CellDisposition::Compare);
        assert_eq!(matcher.classify("deleted_at", "NULL"), CellDisposition::Compare);
        assert_eq!(matcher.classify("name", "alice"), CellDisposition::Compare);
        assert_eq!(matcher.substitute("$known"), Some("1".to_string()));
    }

    #[test]
    fn test_filter_skips_excluded_and_maps_null() {
        let codec = codec();
        let store = MemoryStorage::new();
        let schema = schema();
        let mut vars = VariableStore::new();
        let matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();

        let header: Vec<String> = ["id", "name", "meta", "deleted_at"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = expected(
            1,
            row! {
                "name" => "alice",
                "meta" => serde_json::json!({"a": 1}),
                "deleted_at" => Value::Null,
            },
            vec![
                CellDisposition::Unbound,
                CellDisposition::Compare,
                CellDisposition::Deferred,
                CellDisposition::Compare,
            ],
            &["$id", "alice", r#"{"a":1}"#, "NULL"],
        );

        let filter = matcher.build_filter(&header, &row);
        assert_eq!(
            filter.conditions(),
            &[
                Condition::Eq {
                    column: "name".into(),
                    value: Value::from("alice")
                },
                Condition::IsNull {
                    column: "deleted_at".into()
                },
            ]
        );
    }

    #[test]
    fn test_binds_unbound_variable_from_fetch() {
        let codec = codec();
        let store = MemoryStorage::new();
        store.seed("users", vec![row! { "id" => 42i64, "name" => "alice" }]);
        let schema = schema();
        let mut vars = VariableStore::new();

        let table = Table::parse_pipes("| id | name |\n| $id1 | alice |").unwrap();
        {
            let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
            TableMapper::new(&codec)
                .iterate(&table, &schema, &mut matcher)
                .unwrap();
        }

        assert_eq!(vars.get("$id1"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_compared_columns_are_not_re_decoded() {
        let codec = codec();
        let store = Fixed(row! {
            "id" => 7i64,
            "name" => "alice",
            "deleted_at" => "2021-01-03 10:00:00.123456+00",
        });
        let schema = schema();
        let mut vars = VariableStore::new();

        let table =
            Table::parse_pipes("| id | name | deleted_at |\n| $id | alice | 2021-01-03 10:00:00 |")
                .unwrap();
        let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
        TableMapper::new(&codec)
            .iterate(&table, &schema, &mut matcher)
            .unwrap();

        assert_eq!(vars.get("$id"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_deferred_json_mismatch() {
        let codec = codec();
        let store = MemoryStorage::new();
        store.seed(
            "users",
            vec![row! { "id" => 1i64, "meta" => r#"{"a": 2}"# }],
        );
        let schema = schema();
        let mut vars = VariableStore::new();

        let table = Table::parse_pipes("| id | meta |\n| 1 | {\"a\":1} |").unwrap();
        let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
        let err = TableMapper::new(&codec)
            .iterate(&table, &schema, &mut matcher)
            .unwrap_err();

        match err {
            AssertError::ValueMismatch {
                row,
                column,
                expected,
                actual,
            } => {
                assert_eq!(row, 1);
                assert_eq!(column, "meta");
                assert_eq!(expected, r#"{"a":1}"#);
                assert_eq!(actual, r#"{"a":2}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deferred_json_equal_despite_formatting() {
        let codec = codec();
        let store = MemoryStorage::new();
        store.seed(
            "users",
            vec![row! { "id" => 1i64, "meta" => r#"{ "b": [1, 2], "a": 1 }"# }],
        );
        let schema = schema();
        let mut vars = VariableStore::new();

        let table = Table::parse_pipes("| id | meta |\n| 1 | {\"a\":1,\"b\":[1,2]} |").unwrap();
        let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
        TableMapper::new(&codec)
            .iterate(&table, &schema, &mut matcher)
            .unwrap();
    }

    #[test]
    fn test_row_not_found_reports_filter() {
        let codec = codec();
        let store = MemoryStorage::new();
        store.seed("users", vec![row! { "id" => 1i64, "name" => "bob" }]);
        let schema = schema();
        let mut vars = VariableStore::new();

        let table = Table::parse_pipes("| id | name |\n| 1 | alice |").unwrap();
        let mut matcher = RowMatcher::new(&codec, &store, &mut vars, "users", &schema).unwrap();
        let err = TableMapper::new(&codec)
            .iterate(&table, &schema, &mut matcher)
            .unwrap_err();

        match err {
            AssertError::RowNotFound { row, filter, expected, .. } => {
                assert_eq!(row, 1);
                assert_eq!(filter, r#"id = 1 AND name = "alice""#);
                assert_eq!(expected, "{id=1, name=alice}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_count() {
        let store = MemoryStorage::new();
        store.seed("users", vec![row! { "id" => 1i64 }, row! { "id" => 2i64 }]);

        assert!(check_count(&store, "users", 2).is_ok());
        match check_count(&store, "users", 1).unwrap_err() {
            AssertError::RowCountMismatch { expected, found, .. } => {
                assert_eq!(expected, 1);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Database manager.
//!
//! A `Manager` owns the codec, the scenario variables and a set of named
//! database instances. Every table step resolves its database and table
//! first, so unregistered names fail before the store is touched.

use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::source::TableSource;
use rowcheck_codec::Codec;
use rowcheck_core::{RowSchema, RowType, Table};
use rowcheck_mapper::{TableAssertion, TableMapper, VariableStore};
use rowcheck_storage::{Operation, StorageAdapter};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Name of the database used when a step does not name one.
pub const DEFAULT_DATABASE: &str = "default";

/// A database: its storage adapter and the tables registered for it.
pub struct Instance {
    storage: Box<dyn StorageAdapter>,
    tables: HashMap<String, RowSchema>,
    cleanup: HashMap<String, Vec<String>>,
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tables: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        tables.sort_unstable();
        f.debug_struct("Instance")
            .field("tables", &tables)
            .field("cleanup", &self.cleanup)
            .finish_non_exhaustive()
    }
}

impl Instance {
    /// Create an instance with no tables.
    pub fn new(storage: impl StorageAdapter + 'static) -> Self {
        Self::from_boxed(Box::new(storage))
    }

    pub fn from_boxed(storage: Box<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            tables: HashMap::new(),
            cleanup: HashMap::new(),
        }
    }

    /// Register a table with an explicit schema.
    pub fn with_table(mut self, table: impl Into<String>, schema: RowSchema) -> Self {
        self.tables.insert(table.into(), schema);
        self
    }

    /// Register a table with a row type's schema.
    pub fn with_row_type<R: RowType>(self, table: impl Into<String>) -> Self {
        self.with_table(table, R::schema())
    }

    /// Statements run after the table is cleared, e.g. sequence resets.
    pub fn with_cleanup<I, S>(mut self, table: impl Into<String>, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cleanup
            .entry(table.into())
            .or_default()
            .extend(statements.into_iter().map(Into::into));
        self
    }

    pub fn storage(&self) -> &dyn StorageAdapter {
        self.storage.as_ref()
    }

    pub fn schema(&self, table: &str) -> Option<&RowSchema> {
        self.tables.get(table)
    }

    pub fn cleanup(&self, table: &str) -> &[String] {
        self.cleanup.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }
}

/// Owns database instances and scenario state for table steps.
#[derive(Debug)]
pub struct Manager {
    codec: Codec,
    vars: VariableStore,
    config: Config,
    instances: HashMap<String, Instance>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Create a manager with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a manager with a custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            codec: Codec::new().with_null_marker(config.null_marker.clone()),
            vars: VariableStore::with_prefix(config.var_prefix.clone()),
            config,
            instances: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// Codec for registering decoders and encoders.
    pub fn codec_mut(&mut self) -> &mut Codec {
        &mut self.codec
    }

    /// Variables bound in the current scenario.
    pub fn vars(&self) -> &VariableStore {
        &self.vars
    }

    pub fn vars_mut(&mut self) -> &mut VariableStore {
        &mut self.vars
    }

    /// Register a database instance, replacing any previous one.
    pub fn add_instance(&mut self, name: impl Into<String>, instance: Instance) {
        self.instances.insert(name.into(), instance);
    }

    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.add_instance(name, instance);
        self
    }

    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    /// Decode cells of these type keys as JSON documents.
    pub fn register_json_types(&mut self, keys: &[&str]) {
        for key in keys {
            self.codec.register_json_type(*key);
        }
    }

    /// Reset variables before a scenario.
    pub fn start_scenario(&mut self) {
        debug!(bound = self.vars.len(), "starting scenario");
        self.vars.reset();
    }

    // ==================== Prerequisites ====================

    /// Delete every row of a default-database table.
    pub fn clear_table(&self, table: &str) -> SessionResult<()> {
        self.clear_table_in(table, DEFAULT_DATABASE)
    }

    /// Delete every row of a table, then run its cleanup statements.
    pub fn clear_table_in(&self, table: &str, database: &str) -> SessionResult<()> {
        let (instance, _) = resolve(&self.instances, table, database)?;
        let storage = instance.storage();

        storage
            .delete(table)
            .map_err(|e| SessionError::adapter(Operation::Delete, table, database, e))?;

        for statement in instance.cleanup(table) {
            storage
                .execute(statement)
                .map_err(|source| SessionError::Cleanup {
                    statement: statement.clone(),
                    table: table.to_string(),
                    database: database.to_string(),
                    source,
                })?;
        }

        debug!(table, database, cleanup = instance.cleanup(table).len(), "table cleared");
        Ok(())
    }

    pub fn store_rows(&self, table: &str, rows: &Table) -> SessionResult<()> {
        self.store_rows_in(table, DEFAULT_DATABASE, rows)
    }

    /// Decode every row, then insert them with the header columns.
    pub fn store_rows_in(&self, table: &str, database: &str, rows: &Table) -> SessionResult<()> {
        let (instance, schema) = resolve(&self.instances, table, database)?;
        let decoded = TableMapper::new(&self.codec).decode_all(rows, schema)?;

        instance
            .storage()
            .insert(table, &decoded, rows.header())
            .map_err(|e| SessionError::adapter(Operation::Insert, table, database, e))?;

        debug!(table, database, rows = decoded.len(), "table populated");
        Ok(())
    }

    pub fn store_rows_from_file(&self, table: &str, file_text: &str) -> SessionResult<()> {
        self.store_rows_from_file_in(table, DEFAULT_DATABASE, file_text)
    }

    pub fn store_rows_from_file_in(
        &self,
        table: &str,
        database: &str,
        file_text: &str,
    ) -> SessionResult<()> {
        self.store_in(table, database, &TableSource::from_file_text(file_text)?)
    }

    /// Store rows from any source.
    pub fn store_in(&self, table: &str, database: &str, source: &TableSource) -> SessionResult<()> {
        let rows = source.load()?;
        self.store_rows_in(table, database, &rows)
    }

    // ==================== Assertions ====================

    pub fn assert_rows(&mut self, table: &str, rows: &Table) -> SessionResult<()> {
        self.assert_rows_in(table, DEFAULT_DATABASE, rows)
    }

    /// Each expected row must be present; other rows may exist.
    pub fn assert_rows_in(&mut self, table: &str, database: &str, rows: &Table) -> SessionResult<()> {
        self.assert_table(table, database, Some(rows), false)
    }

    pub fn assert_only_rows(&mut self, table: &str, rows: &Table) -> SessionResult<()> {
        self.assert_only_rows_in(table, DEFAULT_DATABASE, rows)
    }

    /// The table must hold exactly the expected rows.
    pub fn assert_only_rows_in(
        &mut self,
        table: &str,
        database: &str,
        rows: &Table,
    ) -> SessionResult<()> {
        self.assert_table(table, database, Some(rows), true)
    }

    pub fn assert_no_rows(&mut self, table: &str) -> SessionResult<()> {
        self.assert_no_rows_in(table, DEFAULT_DATABASE)
    }

    /// The table must be empty.
    pub fn assert_no_rows_in(&mut self, table: &str, database: &str) -> SessionResult<()> {
        self.assert_table(table, database, None, true)
    }

    pub fn assert_rows_from_file(&mut self, table: &str, file_text: &str) -> SessionResult<()> {
        self.assert_rows_from_file_in(table, DEFAULT_DATABASE, file_text)
    }

    pub fn assert_rows_from_file_in(
        &mut self,
        table: &str,
        database: &str,
        file_text: &str,
    ) -> SessionResult<()> {
        let source = TableSource::from_file_text(file_text)?;
        self.assert_in(table, database, &source, false)
    }

    pub fn assert_only_rows_from_file(&mut self, table: &str, file_text: &str) -> SessionResult<()> {
        self.assert_only_rows_from_file_in(table, DEFAULT_DATABASE, file_text)
    }

    pub fn assert_only_rows_from_file_in(
        &mut self,
        table: &str,
        database: &str,
        file_text: &str,
    ) -> SessionResult<()> {
        let source = TableSource::from_file_text(file_text)?;
        self.assert_in(table, database, &source, true)
    }

    /// Assert rows from any source.
    pub fn assert_in(
        &mut self,
        table: &str,
        database: &str,
        source: &TableSource,
        exhaustive: bool,
    ) -> SessionResult<()> {
        let rows = source.load()?;
        self.assert_table(table, database, Some(rows.as_ref()), exhaustive)
    }

    fn assert_table(
        &mut self,
        table: &str,
        database: &str,
        rows: Option<&Table>,
        exhaustive: bool,
    ) -> SessionResult<()> {
        let (instance, schema) = resolve(&self.instances, table, database)?;

        TableAssertion::new(&self.codec, instance.storage(), table, schema)
            .exhaustive(exhaustive)
            .snapshot_limit(self.config.snapshot_limit)
            .run(rows, &mut self.vars)?;
        Ok(())
    }
}

fn resolve<'m>(
    instances: &'m HashMap<String, Instance>,
    table: &str,
    database: &str,
) -> SessionResult<(&'m Instance, &'m RowSchema)> {
    let instance = instances
        .get(database)
        .ok_or_else(|| SessionError::unknown_database(database))?;
    let schema = instance
        .schema(table)
        .ok_or_else(|| SessionError::unknown_table(table, database))?;
    Ok((instance, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowcheck_core::{row, ErrorKind, Value, ValueKind};
    use rowcheck_storage::MemoryStorage;

    struct OrderRow;

    impl RowType for OrderRow {
        fn schema() -> RowSchema {
            RowSchema::new()
                .with("id", ValueKind::Int)
                .with("status", ValueKind::String)
        }
    }

    fn manager(store: &MemoryStorage) -> Manager {
        Manager::new().with_instance(
            DEFAULT_DATABASE,
            Instance::new(store.clone())
                .with_row_type::<OrderRow>("orders")
                .with_cleanup("orders", ["ALTER SEQUENCE orders_id_seq RESTART"]),
        )
    }

    #[test]
    fn test_unknown_database_and_table() {
        let store = MemoryStorage::new();
        let mut m = manager(&store);

        let err = m.clear_table_in("orders", "reports").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownDatabase);
        assert_eq!(err.to_string(), "unknown database reports");

        let err = m.assert_no_rows("customers").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTable);
        assert_eq!(err.to_string(), "unknown table customers in database default");
    }

    #[test]
    fn test_clear_runs_cleanup_and_is_repeatable() {
        let store = MemoryStorage::new();
        store.seed("orders", vec![row! { "id" => 1i64, "status" => "open" }]);
        let m = manager(&store);

        m.clear_table("orders").unwrap();
        m.clear_table("orders").unwrap();

        assert!(store.rows("orders").is_empty());
        assert_eq!(
            store.statements(),
            vec![
                "ALTER SEQUENCE orders_id_seq RESTART".to_string(),
                "ALTER SEQUENCE orders_id_seq RESTART".to_string(),
            ]
        );
    }

    #[test]
    fn test_cleanup_failure_names_statement() {
        let store = MemoryStorage::new();
        store.fail_on(Operation::Execute);
        let m = manager(&store);

        let err = m.clear_table("orders").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AdapterFailure);
        assert!(err
            .to_string()
            .starts_with("failed to execute post cleanup statement \"ALTER SEQUENCE orders_id_seq RESTART\""));
    }

    #[test]
    fn test_store_decodes_before_insert() {
        let store = MemoryStorage::new();
        let m = manager(&store);

        let rows = Table::parse_pipes("| id | status |\n| 1 | open |\n| x | open |").unwrap();
        let err = m.store_rows("orders", &rows).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(store.rows("orders").is_empty());

        let rows = Table::parse_pipes("| id | status |\n| 1 | open |").unwrap();
        m.store_rows("orders", &rows).unwrap();
        assert_eq!(
            store.rows("orders"),
            vec![row! { "id" => 1i64, "status" => "open" }]
        );
    }

    #[test]
    fn test_start_scenario_resets_vars() {
        let store = MemoryStorage::new();
        store.seed("orders", vec![row! { "id" => 5i64, "status" => "open" }]);
        let mut m = manager(&store);

        let rows = Table::parse_pipes("| id | status |\n| $o | open |").unwrap();
        m.assert_rows("orders", &rows).unwrap();
        assert_eq!(m.vars().get("$o"), Some(&Value::Int(5)));

        m.start_scenario();
        assert!(m.vars().is_empty());
    }

    #[test]
    fn test_custom_config_prefix_and_marker() {
        let store = MemoryStorage::new();
        store.seed(
            "orders",
            vec![row! { "id" => 9i64, "status" => Value::Null }],
        );
        let config = Config::from_json(r#"{"var_prefix": ":", "null_marker": "<nil>"}"#).unwrap();
        let mut m = Manager::with_config(config).with_instance(
            DEFAULT_DATABASE,
            Instance::new(store.clone()).with_table(
                "orders",
                RowSchema::new()
                    .with("id", ValueKind::Int)
                    .with_nullable("status", ValueKind::String),
            ),
        );

        let rows = Table::parse_pipes("| id | status |\n| :id | <nil> |").unwrap();
        m.assert_only_rows("orders", &rows).unwrap();
        assert_eq!(m.vars().get(":id"), Some(&Value::Int(9)));
    }

    #[test]
    fn test_missing_file_name() {
        let store = MemoryStorage::new();
        let mut m = manager(&store);

        let err = m.assert_rows_from_file("orders", "   ").unwrap_err();
        assert!(matches!(err, SessionError::MissingFileName));
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }
}

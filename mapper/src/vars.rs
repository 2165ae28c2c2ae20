//! Scenario-scoped variables.

use rowcheck_core::Value;
use std::collections::HashMap;
use std::fmt;

/// Default prefix that marks a cell as a variable token.
pub const DEFAULT_VAR_PREFIX: &str = "$";

/// Observer called synchronously after every `set`.
pub type ChangeHook = Box<dyn FnMut(&str, &Value) + Send>;

/// Maps variable tokens to values observed in the store.
///
/// One store belongs to one scenario; it is cleared with `reset` when the
/// next scenario starts.
pub struct VariableStore {
    prefix: String,
    values: HashMap<String, Value>,
    /// Cell text of values bound from a typed column.
    encoded: HashMap<String, String>,
    hooks: Vec<ChangeHook>,
}

impl Default for VariableStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VariableStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableStore")
            .field("prefix", &self.prefix)
            .field("values", &self.values)
            .field("encoded", &self.encoded)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl VariableStore {
    /// Create a store using the default `$` prefix.
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_VAR_PREFIX)
    }

    /// Create a store with a custom token prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            values: HashMap::new(),
            encoded: HashMap::new(),
            hooks: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// Drop all bindings. Observers stay registered.
    pub fn reset(&mut self) {
        self.values.clear();
        self.encoded.clear();
    }

    /// Prefix test only; does not look the token up.
    pub fn is_variable(&self, token: &str) -> bool {
        !self.prefix.is_empty()
            && token.len() > self.prefix.len()
            && token.starts_with(self.prefix.as_str())
    }

    /// Get the value bound to a token.
    pub fn get(&self, token: &str) -> Option<&Value> {
        self.values.get(token)
    }

    /// Cell text recorded with the binding, if it was bound through a column.
    pub fn encoded(&self, token: &str) -> Option<&str> {
        self.encoded.get(token).map(String::as_str)
    }

    /// Bind a token. A later call for the same token replaces the value and
    /// drops any cell text recorded for it.
    pub fn set(&mut self, token: impl Into<String>, value: Value) {
        let token = token.into();
        self.encoded.remove(&token);
        self.store(token, value);
    }

    /// Bind a token together with the cell text its column encodes it to.
    ///
    /// Later tables substitute the token with this text, so custom column
    /// encodings survive across assertions.
    pub fn set_encoded(&mut self, token: impl Into<String>, value: Value, text: impl Into<String>) {
        let token = token.into();
        self.encoded.insert(token.clone(), text.into());
        self.store(token, value);
    }

    fn store(&mut self, token: String, value: Value) {
        self.values.insert(token.clone(), value);
        if let Some(value) = self.values.get(&token) {
            for hook in &mut self.hooks {
                hook(token.as_str(), value);
            }
        }
    }

    /// All current bindings.
    pub fn get_all(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// Register an observer for future `set` calls.
    pub fn on_change<F>(&mut self, hook: F)
    where
        F: FnMut(&str, &Value) + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_is_variable_is_a_prefix_test() {
        let vars = VariableStore::new();
        assert!(vars.is_variable("$id1"));
        assert!(!vars.is_variable("$"));
        assert!(!vars.is_variable("id1"));
        assert!(!vars.is_variable(""));

        let custom = VariableStore::with_prefix("var:");
        assert!(custom.is_variable("var:order"));
        assert!(!custom.is_variable("$order"));
    }

    #[test]
    fn test_set_get_reset() {
        let mut vars = VariableStore::new();
        assert_eq!(vars.get("$id"), None);

        vars.set("$id", Value::Int(42));
        assert_eq!(vars.get("$id"), Some(&Value::Int(42)));

        vars.set("$id", Value::Int(43));
        assert_eq!(vars.get("$id"), Some(&Value::Int(43)));
        assert_eq!(vars.len(), 1);

        vars.reset();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_encoded_text_follows_binding() {
        let mut vars = VariableStore::new();
        vars.set_encoded("$price", Value::Int(1250), "12.50");
        assert_eq!(vars.get("$price"), Some(&Value::Int(1250)));
        assert_eq!(vars.encoded("$price"), Some("12.50"));

        vars.set("$price", Value::Int(99));
        assert_eq!(vars.encoded("$price"), None);

        vars.set_encoded("$price", Value::Int(1), "0.01");
        vars.reset();
        assert_eq!(vars.encoded("$price"), None);
    }

    #[test]
    fn test_on_change_sees_every_set() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut vars = VariableStore::new();
        let sink = Arc::clone(&seen);
        vars.on_change(move |token, value| {
            sink.lock().unwrap().push((token.to_string(), value.clone()));
        });

        vars.set("$a", Value::Int(1));
        vars.reset();
        vars.set("$b", Value::from("x"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("$a".to_string(), Value::Int(1)),
                ("$b".to_string(), Value::from("x")),
            ]
        );
    }
}

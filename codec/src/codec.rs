//! The cell codec and its override registry.

use crate::error::{CodecError, CodecResult};
use crate::time::{format_time, parse_time};
use rowcheck_core::{ColumnDef, Row, RowSchema, Value, ValueKind};
use std::collections::HashMap;
use std::fmt;

/// Literal that stands for an absent value in table text.
pub const DEFAULT_NULL_MARKER: &str = "NULL";

/// Custom decoder from cell text.
pub type DecodeFn = Box<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Custom encoder to cell text.
pub type EncodeFn = Box<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;

/// Converts cells to values and back.
///
/// Overrides are keyed by a column's type key (its custom type name, or the
/// kind name such as `"timestamp"`) and are consulted before the default
/// conversion.
pub struct Codec {
    decoders: HashMap<String, DecodeFn>,
    encoders: HashMap<String, EncodeFn>,
    null_marker: String,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut decoders: Vec<&str> = self.decoders.keys().map(|k| k.as_str()).collect();
        let mut encoders: Vec<&str> = self.encoders.keys().map(|k| k.as_str()).collect();
        decoders.sort_unstable();
        encoders.sort_unstable();
        f.debug_struct("Codec")
            .field("decoders", &decoders)
            .field("encoders", &encoders)
            .field("null_marker", &self.null_marker)
            .finish()
    }
}

impl Codec {
    /// Create a codec with no overrides and the default null marker.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            encoders: HashMap::new(),
            null_marker: DEFAULT_NULL_MARKER.to_string(),
        }
    }

    /// Replace the null marker.
    pub fn with_null_marker(mut self, marker: impl Into<String>) -> Self {
        self.null_marker = marker.into();
        self
    }

    pub fn set_null_marker(&mut self, marker: impl Into<String>) {
        self.null_marker = marker.into();
    }

    pub fn null_marker(&self) -> &str {
        &self.null_marker
    }

    /// Check whether raw cell text is the null marker.
    pub fn is_null_marker(&self, raw: &str) -> bool {
        raw == self.null_marker
    }

    // ==================== Registration ====================

    /// Register a decoder for a type key.
    pub fn register_decoder<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.decoders.insert(key.into(), Box::new(f));
    }

    /// Register a decoder for every column of a kind without a custom type name.
    pub fn register_kind_decoder<F>(&mut self, kind: ValueKind, f: F)
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register_decoder(kind.as_str(), f);
    }

    /// Register an encoder for a type key.
    pub fn register_encoder<F>(&mut self, key: impl Into<String>, f: F)
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        self.encoders.insert(key.into(), Box::new(f));
    }

    /// Decode cells under `key` as JSON documents.
    pub fn register_json_type(&mut self, key: impl Into<String>) {
        self.register_decoder(key, |s| {
            serde_json::from_str(s)
                .map(Value::Json)
                .map_err(|e| e.to_string())
        });
    }

    pub fn has_decoder(&self, key: &str) -> bool {
        self.decoders.contains_key(key)
    }

    fn decoder_for(&self, column: &ColumnDef) -> Option<&DecodeFn> {
        self.decoders
            .get(column.type_key())
            .or_else(|| self.decoders.get(column.kind.as_str()))
    }

    fn encoder_for(&self, key: &str, kind: Option<ValueKind>) -> Option<&EncodeFn> {
        self.encoders
            .get(key)
            .or_else(|| kind.and_then(|k| self.encoders.get(k.as_str())))
    }

    // ==================== Decoding ====================

    /// Decode one cell for a column.
    pub fn decode(&self, column: &ColumnDef, raw: &str) -> CodecResult<Value> {
        if self.is_null_marker(raw) {
            return Ok(Value::Null);
        }

        if let Some(decoder) = self.decoder_for(column) {
            return decoder(raw).map_err(|e| CodecError::invalid_format(&column.name, raw, e));
        }

        decode_default(column.kind, raw)
            .map_err(|e| CodecError::invalid_format(&column.name, raw, e))
    }

    /// Decode a whole data row whose cells follow `header`.
    pub fn decode_row(
        &self,
        schema: &RowSchema,
        header: &[String],
        cells: &[String],
    ) -> CodecResult<Row> {
        let mut row = Row::new();
        for (name, raw) in header.iter().zip(cells) {
            let column = schema
                .get(name)
                .ok_or_else(|| CodecError::unknown_column(name))?;
            row.insert(name.clone(), self.decode(column, raw)?);
        }
        Ok(row)
    }

    /// Bring a fetched value into the column's decoded representation.
    ///
    /// Stores often hand back JSON or timestamps as text; such values are
    /// decoded through the codec so they compare against expected values.
    pub fn normalize(&self, column: &ColumnDef, value: &Value) -> CodecResult<Value> {
        match (value, column.kind) {
            (Value::Null, _) => Ok(Value::Null),
            (v, kind) if v.kind() == Some(kind) && !self.decoders.contains_key(column.type_key()) => {
                Ok(v.clone())
            }
            (Value::Json(_), ValueKind::Json) => Ok(value.clone()),
            (Value::String(s), _) => self.decode(column, s),
            (Value::Bytes(b), kind) if kind != ValueKind::Bytes => {
                self.decode(column, &String::from_utf8_lossy(b))
            }
            (Value::Int(i), ValueKind::Float) => Ok(Value::Float(*i as f64)),
            _ => Ok(value.clone()),
        }
    }

    // ==================== Encoding ====================

    /// Encode a value using kind-keyed overrides, then the default format.
    pub fn encode(&self, value: &Value) -> CodecResult<String> {
        let kind = value.kind();
        match kind.and_then(|k| self.encoders.get(k.as_str())) {
            Some(encoder) => encoder(value).map_err(|e| CodecError::encode(value.type_name(), e)),
            None => self.encode_default(value),
        }
    }

    /// Encode a value for a specific column, honoring its custom type name.
    pub fn encode_column(&self, column: &ColumnDef, value: &Value) -> CodecResult<String> {
        match self.encoder_for(column.type_key(), Some(column.kind)) {
            Some(encoder) if !value.is_null() => {
                encoder(value).map_err(|e| CodecError::encode(column.type_key(), e))
            }
            _ => self.encode(value),
        }
    }

    /// Encode a row's cells in row order.
    pub fn encode_row(&self, schema: &RowSchema, row: &Row) -> CodecResult<Vec<String>> {
        row.iter()
            .map(|(name, value)| match schema.get(name) {
                Some(column) => self.encode_column(column, value),
                None => Err(CodecError::unknown_column(name)),
            })
            .collect()
    }

    fn encode_default(&self, value: &Value) -> CodecResult<String> {
        Ok(match value {
            Value::Null => self.null_marker.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Timestamp(t) => format_time(t),
            Value::Json(j) => serde_json::to_string(j)
                .map_err(|e| CodecError::encode(value.type_name(), e.to_string()))?,
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
        })
    }
}

fn decode_default(kind: ValueKind, raw: &str) -> Result<Value, String> {
    match kind {
        ValueKind::Bool => parse_bool(raw).map(Value::Bool),
        ValueKind::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| e.to_string()),
        ValueKind::Float => raw
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Timestamp => parse_time(raw.trim()).map(Value::Timestamp),
        ValueKind::Bytes => Ok(Value::Bytes(raw.as_bytes().to_vec())),
        ValueKind::Json => Err("no decoder registered for JSON column".to_string()),
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        other => Err(format!("invalid boolean {:?}", other)),
    }
}

//! Table-level decoding.

use crate::error::{AssertError, AssertResult};
use rowcheck_codec::{Codec, CodecError};
use rowcheck_core::{Row, RowSchema, Table};

/// How an expected cell takes part in a row comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDisposition {
    /// Decoded and sent as an equality condition.
    Compare,
    /// Decoded but kept out of the filter; compared after fetch.
    Deferred,
    /// Not decoded and kept out of the filter; its value comes from the fetch.
    Unbound,
}

impl CellDisposition {
    /// True when the column is left out of the store filter.
    pub fn is_excluded(&self) -> bool {
        !matches!(self, CellDisposition::Compare)
    }
}

/// One decoded expected row handed to a `RowVisitor`.
#[derive(Debug, Clone)]
pub struct ExpectedRow {
    /// Position in the table; the header is row 0.
    pub index: usize,
    /// Decoded values. Unbound cells are absent.
    pub row: Row,
    /// Disposition per header column.
    pub dispositions: Vec<CellDisposition>,
    /// Cells as written, before substitution.
    pub raw: Vec<String>,
}

impl ExpectedRow {
    /// Columns left out of the filter, in header order.
    pub fn excluded<'h>(&self, header: &'h [String]) -> Vec<&'h str> {
        header
            .iter()
            .zip(&self.dispositions)
            .filter(|(_, d)| d.is_excluded())
            .map(|(c, _)| c.as_str())
            .collect()
    }
}

/// Callbacks driven by `TableMapper::iterate`.
pub trait RowVisitor {
    /// Decide, from the raw cell, how a column takes part in the comparison.
    fn classify(&mut self, column: &str, raw: &str) -> CellDisposition;

    /// Replacement text for a raw cell, applied before decoding.
    fn substitute(&self, raw: &str) -> Option<String>;

    /// Receive one decoded row.
    fn receive_row(&mut self, header: &[String], expected: ExpectedRow) -> AssertResult<()>;
}

/// Applies a `Codec` to whole tables.
#[derive(Debug, Clone, Copy)]
pub struct TableMapper<'c> {
    codec: &'c Codec,
}

impl<'c> TableMapper<'c> {
    pub fn new(codec: &'c Codec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &'c Codec {
        self.codec
    }

    /// Decode every data row. The first bad cell aborts with its row number.
    pub fn decode_all(&self, table: &Table, schema: &RowSchema) -> AssertResult<Vec<Row>> {
        let header = table.header();
        check_header(schema, header)?;

        table
            .data()
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                self.codec
                    .decode_row(schema, header, cells)
                    .map_err(|e| AssertError::invalid_format(i + 1, e))
            })
            .collect()
    }

    /// Walk data rows in order, decoding each after classification and
    /// substitution, and hand them to the visitor one at a time.
    pub fn iterate<V: RowVisitor>(
        &self,
        table: &Table,
        schema: &RowSchema,
        visitor: &mut V,
    ) -> AssertResult<()> {
        let header = table.header();
        check_header(schema, header)?;

        for (i, cells) in table.data().iter().enumerate() {
            let index = i + 1;
            let mut row = Row::new();
            let mut dispositions = Vec::with_capacity(cells.len());

            for (name, raw) in header.iter().zip(cells) {
                let disposition = visitor.classify(name, raw);
                dispositions.push(disposition);
                if disposition == CellDisposition::Unbound {
                    continue;
                }

                let text = visitor.substitute(raw);
                let text = text.as_deref().unwrap_or(raw);
                // Header was checked above.
                let Some(column) = schema.get(name) else {
                    continue;
                };
                let value = self
                    .codec
                    .decode(column, text)
                    .map_err(|e| AssertError::invalid_format(index, e))?;
                row.insert(name.clone(), value);
            }

            visitor.receive_row(
                header,
                ExpectedRow {
                    index,
                    row,
                    dispositions,
                    raw: cells.clone(),
                },
            )?;
        }

        Ok(())
    }
}

fn check_header(schema: &RowSchema, header: &[String]) -> AssertResult<()> {
    match header.iter().find(|name| !schema.contains(name)) {
        Some(name) => Err(AssertError::invalid_format(0, CodecError::unknown_column(name))),
        None => Ok(()),
    }
}

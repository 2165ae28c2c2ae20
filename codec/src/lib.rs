//! Cell codec for rowcheck.
//!
//! Converts between the string form of a table cell and a typed `Value`,
//! driven by the column definitions of a `RowSchema`. Per-type overrides
//! live in a `Codec` instance, so two managers never share conversion state.

mod codec;
mod error;
mod time;

pub use codec::{Codec, DecodeFn, EncodeFn, DEFAULT_NULL_MARKER};
pub use error::{CodecError, CodecResult};
pub use time::{format_time, parse_time, parse_time_with, TimeFormat, DEFAULT_TIME_FORMATS};

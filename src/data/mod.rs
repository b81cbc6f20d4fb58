mod gen;
mod run;
pub mod table;
pub mod time;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::BufRead;

pub use gen::*;
pub use run::*;

/// Reads a JSON value, e.g. an [`Instance`](crate::core::Instance), from the reader.
///
/// # Errors
/// - If the input is not valid JSON for `T`.
pub fn deserialize<T: DeserializeOwned>(reader: &mut impl BufRead) -> Result<T> {
    Ok(serde_json::from_reader(reader)?)
}

/// Writes a value as pretty-printed JSON.
///
/// # Errors
/// - If `T` cannot be represented as JSON.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

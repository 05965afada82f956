//! Row types and the JSON documents stored inside them.
//!
//! Every JSON column is wrapped in a `{"schema_version": N, "data": ...}`
//! envelope so a reader never silently accepts a shape it does not know.

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub mod admin;
pub mod interview;
pub mod report;

/// Version written for every JSON column today.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    schema_version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    schema_version: u32,
    data: T,
}

pub fn encode_versioned<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        schema_version: SCHEMA_VERSION,
        data,
    })
    .context("Failed to serialize JSON column")
}

pub fn decode_versioned<T: DeserializeOwned>(column: &str, raw: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(raw)
        .with_context(|| format!("Column '{column}' does not hold a valid document"))?;
    if envelope.schema_version != SCHEMA_VERSION {
        bail!(
            "Column '{column}' has schema_version {} (expected {SCHEMA_VERSION})",
            envelope.schema_version
        );
    }
    Ok(envelope.data)
}

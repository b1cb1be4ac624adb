//! Stream schemas
//!
//! Persona resources carry many template-specific attributes, so every
//! stream schema is permissive: declared properties document the common
//! fields and `additionalProperties` stays `true`.

mod types;

pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};

#[cfg(test)]
mod tests;

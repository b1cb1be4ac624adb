//! Response decoder module
//!
//! Turns Persona's JSON:API pages into flat records: `id` and `type` lifted
//! to the top level, attributes inlined with underscored names, and
//! `relationships` kept verbatim.

mod normalizer;

pub use normalizer::{flatten_resource, normalize_field_name, ResponseNormalizer};

#[cfg(test)]
mod tests;

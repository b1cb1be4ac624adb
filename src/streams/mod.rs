//! Persona streams
//!
//! The tap syncs two collections, `inquiries` and `cases`, through one
//! strategy implementation configured per collection.

mod definition;
mod strategy;

pub use definition::{StreamDefinition, CASES, EXTRACTED_AT_FIELD, INQUIRIES};
pub use strategy::{JsonApiStream, PageRequest, StreamStrategy, PAGE_BEFORE_PARAM, PAGE_SIZE_PARAM};

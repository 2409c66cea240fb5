//! persona.interaction_event.v1 schema
//!
//! Serialized form of the raw input events the analyzer consumes, used to
//! replay recorded sessions through the pipeline.

mod adapter;
mod interaction_event;

pub use adapter::*;
pub use interaction_event::*;

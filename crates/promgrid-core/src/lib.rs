//! promgrid-core — shared domain types for promgrid.
//!
//! Defines the target record, the canonical identity policy under which
//! records are stored and addressed, and the group shape written into
//! generated discovery files. Every other promgrid crate builds on these.

pub mod types;

pub use types::*;

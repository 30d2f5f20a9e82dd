//! promgrid-state — embedded target store for promgrid.
//!
//! Backed by [redb](https://docs.rs/redb), persists registered monitoring
//! targets as JSON in a single `&str`-keyed table. The table key is the
//! record's composite identity, `{exporter}/{zone}/{inventory_hostname}/{target}`,
//! which makes upsert a plain keyed insert and the `(exporter, zone)` filter
//! a prefix scan.
//!
//! The `TargetStore` is `Clone` + `Send` + `Sync` (backed by
//! `Arc<Database>`); it is opened once at process start and shared across
//! request handlers.

pub mod error;
pub mod store;
pub mod tables;

pub use error::{StateError, StateResult};
pub use store::TargetStore;

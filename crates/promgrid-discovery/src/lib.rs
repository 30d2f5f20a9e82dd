//! promgrid-discovery — keeps generated discovery files in sync with the store.
//!
//! The scrape process consumes one JSON file per exporter
//! (`<targets-dir>/<exporter>.json`) as its file_sd target list. This crate
//! owns the synchronization contract: after every mutation, the file for the
//! affected exporter equals the projection of the store's current
//! `(exporter, zone)` set.
//!
//! Three pieces:
//! - [`DiscoveryWriter`] regenerates one file from store state and replaces
//!   it atomically (write-temp, fsync, rename).
//! - [`ExporterLocks`] hands out one async mutex per exporter.
//! - [`TargetRegistry`] drives a mutation end to end: lock the exporter,
//!   write the store, rewrite the file, release.

pub mod error;
pub mod locks;
pub mod registry;
pub mod writer;

pub use error::{DiscoveryError, DiscoveryResult};
pub use locks::ExporterLocks;
pub use registry::TargetRegistry;
pub use writer::DiscoveryWriter;

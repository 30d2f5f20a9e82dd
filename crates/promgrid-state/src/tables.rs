//! redb table definitions for the promgrid target store.

use redb::TableDefinition;

/// Registered targets keyed by `{exporter}/{zone}/{inventory_hostname}/{target}`.
///
/// Values are JSON-serialized [`promgrid_core::TargetRecord`]s. Key segments
/// must not contain `/` — the layout is what makes `(exporter, zone)`
/// filtering a prefix scan.
pub const TARGETS: TableDefinition<&str, &[u8]> = TableDefinition::new("targets");

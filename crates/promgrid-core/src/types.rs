//! Domain types for the promgrid target registry.
//!
//! A [`TargetRecord`] is the unit of storage: one scrape address plus its
//! label set, owned by an exporter. Records are addressed by a composite
//! [`TargetIdentity`] and projected into [`TargetGroup`]s when the
//! per-exporter discovery file is generated.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label set attached to a target.
///
/// Keys and values are Prometheus label strings. `BTreeMap` keeps the
/// serialized order stable so repeated projections of the same state are
/// byte-identical.
pub type Labels = BTreeMap<String, String>;

/// Label partitioning an exporter's targets into zones.
pub const LABEL_ZONE: &str = "zone";

/// Label carrying the inventory hostname half of a target's identity.
pub const LABEL_INVENTORY_HOSTNAME: &str = "inventory_hostname";

/// Label overriding the scrape path for a target.
pub const LABEL_METRICS_PATH: &str = "__metrics_path__";

/// Scrape path stored when a record arrives without one.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// A registered monitoring target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Exporter this target belongs to; names the generated discovery file.
    pub exporter: String,
    /// Scrape address, `host:port` style.
    pub target: String,
    /// Operator-supplied metadata, including the reserved identity labels.
    pub labels: Labels,
}

impl TargetRecord {
    /// The `zone` label, if present.
    pub fn zone(&self) -> Option<&str> {
        self.labels.get(LABEL_ZONE).map(String::as_str)
    }

    /// The `inventory_hostname` label, if present.
    pub fn inventory_hostname(&self) -> Option<&str> {
        self.labels.get(LABEL_INVENTORY_HOSTNAME).map(String::as_str)
    }

    /// Identity under which this record is stored.
    ///
    /// Returns `None` when either identity label is missing; such a record
    /// cannot be addressed and must be rejected before it reaches the store.
    pub fn identity(&self) -> Option<TargetIdentity> {
        Some(TargetIdentity {
            exporter: self.exporter.clone(),
            target: self.target.clone(),
            zone: self.zone()?.to_string(),
            inventory_hostname: self.inventory_hostname()?.to_string(),
        })
    }

    /// Store the default scrape path unless the record already carries one.
    pub fn ensure_metrics_path(&mut self) {
        self.labels
            .entry(LABEL_METRICS_PATH.to_string())
            .or_insert_with(|| DEFAULT_METRICS_PATH.to_string());
    }
}

/// Composite identity addressing exactly one stored record.
///
/// The scrape-path label is deliberately not part of the identity: changing
/// it replaces the stored record in place instead of leaving an orphan
/// behind under the old path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIdentity {
    pub exporter: String,
    pub target: String,
    pub zone: String,
    pub inventory_hostname: String,
}

impl TargetIdentity {
    /// Table key `{exporter}/{zone}/{inventory_hostname}/{target}`.
    ///
    /// Identity segments must not contain `/`; the key layout is what makes
    /// `(exporter, zone)` filtering a prefix scan.
    pub fn table_key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.exporter, self.zone, self.inventory_hostname, self.target
        )
    }

    /// Key prefix covering every identity for one `(exporter, zone)` pair.
    pub fn zone_prefix(exporter: &str, zone: &str) -> String {
        format!("{exporter}/{zone}/")
    }
}

/// One group in a generated discovery file.
///
/// The file format wraps each scrape address in a single-element `targets`
/// list next to the record's full label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    pub targets: Vec<String>,
    pub labels: Labels,
}

impl From<TargetRecord> for TargetGroup {
    fn from(record: TargetRecord) -> Self {
        Self {
            targets: vec![record.target],
            labels: record.labels,
        }
    }
}

//! TargetRegistry — drives one mutation end to end.
//!
//! Store write and file write happen under the exporter's mutation lock, so
//! the projected file reflects store commit order even under concurrent
//! requests for the same exporter. Reads bypass the locks; they only query
//! the store.

use std::collections::BTreeSet;

use tracing::info;

use promgrid_core::{LABEL_INVENTORY_HOSTNAME, LABEL_ZONE, TargetIdentity, TargetRecord};
use promgrid_state::TargetStore;

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::locks::ExporterLocks;
use crate::writer::DiscoveryWriter;

/// Mutation orchestrator over the store and the discovery writer.
#[derive(Clone)]
pub struct TargetRegistry {
    store: TargetStore,
    writer: DiscoveryWriter,
    locks: ExporterLocks,
}

impl TargetRegistry {
    pub fn new(store: TargetStore, writer: DiscoveryWriter) -> Self {
        Self {
            store,
            writer,
            locks: ExporterLocks::new(),
        }
    }

    fn identity_of(record: &TargetRecord) -> DiscoveryResult<TargetIdentity> {
        record.identity().ok_or_else(|| {
            let label = if record.zone().is_none() {
                LABEL_ZONE
            } else {
                LABEL_INVENTORY_HOSTNAME
            };
            DiscoveryError::MissingIdentityLabel {
                exporter: record.exporter.clone(),
                target: record.target.clone(),
                label,
            }
        })
    }

    /// Insert or replace a target, then rewrite its exporter's file.
    ///
    /// Applies the scrape-path default before storing. Returns the record
    /// as stored.
    pub async fn upsert(&self, mut record: TargetRecord) -> DiscoveryResult<TargetRecord> {
        DiscoveryWriter::validate_exporter(&record.exporter)?;
        record.ensure_metrics_path();
        let identity = Self::identity_of(&record)?;

        let _guard = self.locks.acquire(&identity.exporter).await;
        self.store.upsert(&record)?;
        self.writer
            .project(&self.store, &identity.exporter, &identity.zone)?;
        info!(
            exporter = %identity.exporter,
            target = %identity.target,
            zone = %identity.zone,
            "target upserted"
        );
        Ok(record)
    }

    /// Delete a target, then rewrite its exporter's file.
    ///
    /// Returns whether a record was removed. A zero-removed delete is not
    /// an error; the rewrite re-confirms the existing projection.
    pub async fn delete(&self, identity: &TargetIdentity) -> DiscoveryResult<bool> {
        DiscoveryWriter::validate_exporter(&identity.exporter)?;

        let _guard = self.locks.acquire(&identity.exporter).await;
        let removed = self.store.delete(identity)?;
        self.writer
            .project(&self.store, &identity.exporter, &identity.zone)?;
        info!(
            exporter = %identity.exporter,
            target = %identity.target,
            removed,
            "target delete handled"
        );
        Ok(removed)
    }

    /// Every stored record.
    pub fn list_all(&self) -> DiscoveryResult<Vec<TargetRecord>> {
        Ok(self.store.list_all()?)
    }

    /// Stored records for one `(exporter, zone)` pair.
    pub fn find(&self, exporter: &str, zone: &str) -> DiscoveryResult<Vec<TargetRecord>> {
        Ok(self.store.find(exporter, zone)?)
    }

    /// Regenerate every `(exporter, zone)` file present in the store.
    ///
    /// Run at startup: a crash between a store commit and its file write
    /// leaves the store ahead of the file, and the resync heals the gap.
    /// Returns the number of files written.
    pub async fn resync(&self) -> DiscoveryResult<usize> {
        let mut pairs = BTreeSet::new();
        for record in self.store.list_all()? {
            if let Some(identity) = record.identity() {
                pairs.insert((identity.exporter, identity.zone));
            }
        }
        for (exporter, zone) in &pairs {
            let _guard = self.locks.acquire(exporter).await;
            self.writer.project(&self.store, exporter, zone)?;
        }
        info!(files = pairs.len(), "discovery files resynced");
        Ok(pairs.len())
    }
}

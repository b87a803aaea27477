use std::collections::HashSet;

use discovery_core::{Item, KnownIdentities};
use engine_logging::{engine_debug, engine_info};

use crate::lock::{hold, target_lock};
use crate::{MergeSummary, PersistError, PersistedStore};

/// Known identities of one persisted store plus the means to grow it.
///
/// Loading and merging each take the store target's lock, so sessions that
/// share a target never both append the same identity.
pub struct AccumulationStore<P: PersistedStore> {
    store: P,
    known: KnownIdentities,
}

impl<P: PersistedStore> AccumulationStore<P> {
    pub fn load(store: P) -> Result<Self, PersistError> {
        let lock = target_lock(store.target());
        let known = {
            let _guard = hold(&lock);
            store.read_all_identities()?
        };
        engine_info!("loaded {} known identities from {}", known.len(), store.target());
        Ok(Self { store, known })
    }

    pub fn known(&self) -> &KnownIdentities {
        &self.known
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    /// Appends the items whose identity is unknown at merge time.
    ///
    /// The store is re-read under the lock first, picking up rows written by
    /// other sessions since [`AccumulationStore::load`].
    pub fn merge(&mut self, items: &[Item]) -> Result<MergeSummary, PersistError> {
        let lock = target_lock(self.store.target());
        let _guard = hold(&lock);

        let current = self.store.read_all_identities()?;
        self.known.extend(current);

        let mut batch = HashSet::new();
        let fresh: Vec<Item> = items
            .iter()
            .filter(|item| !self.known.contains(&item.identity))
            .filter(|item| batch.insert(item.identity.as_str()))
            .cloned()
            .collect();

        self.store.append_rows(&fresh)?;
        self.known.extend(fresh.iter().map(|item| item.identity.clone()));

        let summary = MergeSummary {
            written: fresh.len(),
            duplicates: items.len() - fresh.len(),
        };
        engine_debug!(
            "merged into {}: written={} duplicates={}",
            self.store.target(),
            summary.written,
            summary.duplicates
        );
        Ok(summary)
    }
}

/// Loads the store and merges `items` into it in one call.
pub fn accumulate<P: PersistedStore>(
    items: &[Item],
    store: P,
) -> Result<MergeSummary, PersistError> {
    let mut accumulation = AccumulationStore::load(store)?;
    let summary = accumulation.merge(items)?;
    engine_info!(
        "accumulated {} new items ({} duplicates) into {}",
        summary.written,
        summary.duplicates,
        accumulation.store().target()
    );
    Ok(summary)
}

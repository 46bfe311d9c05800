//! Per-database vector indexes.

use crate::vector::index::VectorIndex;
use crate::vector::metric::DistanceMetric;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns one [`VectorIndex`] per database id.
///
/// Indexes live only in memory for the lifetime of the process.
#[derive(Debug)]
pub struct VectorRegistry {
    indexes: RwLock<HashMap<u64, Arc<VectorIndex>>>,
    metric: DistanceMetric,
}

impl VectorRegistry {
    pub fn new(metric: DistanceMetric) -> Self {
        Self {
            indexes: RwLock::new(HashMap::new()),
            metric,
        }
    }

    /// Index for `database_id`, if anything was ever written to it.
    pub fn get(&self, database_id: u64) -> Option<Arc<VectorIndex>> {
        self.indexes.read().get(&database_id).cloned()
    }

    /// Index for `database_id`, created empty on first use.
    pub fn get_or_create(&self, database_id: u64) -> Arc<VectorIndex> {
        if let Some(index) = self.get(database_id) {
            return index;
        }
        let mut guard = self.indexes.write();
        Arc::clone(
            guard
                .entry(database_id)
                .or_insert_with(|| Arc::new(VectorIndex::new(self.metric))),
        )
    }

    /// Drops the index for a database that no longer exists.
    pub fn remove(&self, database_id: u64) -> Option<Arc<VectorIndex>> {
        self.indexes.write().remove(&database_id)
    }

    pub fn total_vectors(&self) -> usize {
        self.indexes.read().values().map(|index| index.len()).sum()
    }
}

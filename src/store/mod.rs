pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::warn;

/// A thread-safe key-value store that can hold multiple collections.
///
/// Persistent collections need a keyspace; without one they are not created
/// and callers fall back to memory.
pub struct KeyValueStore {
    collections: RwLock<HashMap<String, Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens a store whose persistent collections live under `data_path/cache`.
    pub fn new(data_path: &Path) -> Self {
        let cache_dir = data_path.join("cache");
        let keyspace = match fjall::Config::new(&cache_dir).open() {
            Ok(keyspace) => Some(Arc::new(keyspace)),
            Err(e) => {
                warn!(
                    "Could not open cache at {}: {}. Using memory only",
                    cache_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// A store without persistence.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn create_collection(&self, name: &str, persist: bool) -> Option<Arc<dyn KeyValueCollection>> {
        if !persist {
            return Some(Arc::new(MemoryCollection::new()));
        }
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(Arc::new(DiskCollection::new(partition))),
            Err(e) => {
                warn!("Could not open cache partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Store for KeyValueStore {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>> {
        if let Some(collection) = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
        {
            return Some(Arc::clone(collection));
        }
        if !create_if_missing {
            return None;
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(collection) = collections.get(name) {
            return Some(Arc::clone(collection));
        }
        let collection = self.create_collection(name, persist)?;
        collections.insert(name.to_string(), Arc::clone(&collection));
        Some(collection)
    }
}

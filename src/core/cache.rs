//! Cache abstractions shared by the services and the store backends

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A best-effort byte key/value collection with optional per-entry TTL.
///
/// Implementations never fail: infrastructure errors are logged and turn into a
/// miss on `get` and a `false` status on `put`.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Stores `value`, returning whether the write reached the backend.
    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> bool;

    async fn remove(&self, key: &[u8]);
}

/// A named set of collections.
pub trait Store: Send + Sync {
    fn get_collection(
        &self,
        name: &str,
        persist: bool,
        create_if_missing: bool,
    ) -> Option<Arc<dyn KeyValueCollection>>;
}

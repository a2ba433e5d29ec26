use crate::core::cache::KeyValueCollection;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::PartitionHandle;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Stored values carry an 8 byte big-endian expiry header (milliseconds since
/// the Unix epoch, zero for none) followed by the raw value.
const HEADER_LEN: usize = 8;

/// Collection persisted in a fjall partition, shared across runs.
pub struct DiskCollection {
    partition: PartitionHandle,
}

fn encode_entry(value: &[u8], ttl: Option<Duration>) -> Result<Vec<u8>> {
    let expires_at = match ttl {
        Some(ttl) => {
            let millis = (SystemTime::now() + ttl)
                .duration_since(UNIX_EPOCH)
                .context("System clock is before the Unix epoch")?
                .as_millis();
            u64::try_from(millis).context("Cache expiry out of range")?.max(1)
        }
        None => 0,
    };
    let mut entry = Vec::with_capacity(HEADER_LEN + value.len());
    entry.extend_from_slice(&expires_at.to_be_bytes());
    entry.extend_from_slice(value);
    Ok(entry)
}

/// Splits a stored entry into its expiry and value.
fn decode_entry(raw: &[u8]) -> Result<(Option<SystemTime>, &[u8])> {
    if raw.len() < HEADER_LEN {
        return Err(anyhow!("Cache entry is truncated ({} bytes)", raw.len()));
    }
    let (header, value) = raw.split_at(HEADER_LEN);
    let mut millis = [0u8; HEADER_LEN];
    millis.copy_from_slice(header);
    let expires_at = match u64::from_be_bytes(millis) {
        0 => None,
        millis => Some(UNIX_EPOCH + Duration::from_millis(millis)),
    };
    Ok((expires_at, value))
}

impl DiskCollection {
    pub fn new(partition: PartitionHandle) -> Self {
        Self { partition }
    }

    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.partition.get(key)? else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
            return Ok(None);
        };
        let (expires_at, value) = decode_entry(&raw)?;
        if expires_at.is_some_and(|expires_at| SystemTime::now() > expires_at) {
            debug!("Cache entry expired for key: {}", String::from_utf8_lossy(key));
            self.partition.remove(key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        Ok(Some(value.to_vec()))
    }

    fn write(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> Result<()> {
        self.partition.insert(key, encode_entry(value, ttl)?)?;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        Ok(())
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Disk cache read failed for key {}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8], ttl: Option<Duration>) -> bool {
        match self.write(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Disk cache write failed for key {}: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                false
            }
        }
    }

    async fn remove(&self, key: &[u8]) {
        if let Err(e) = self.partition.remove(key) {
            warn!(
                "Disk cache remove failed for key {}: {}",
                String::from_utf8_lossy(key),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;
    use tokio::time::sleep;

    fn open_collection(path: &std::path::Path) -> DiskCollection {
        let keyspace = fjall::Config::new(path).open().unwrap();
        let partition = keyspace
            .open_partition("test", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(partition)
    }

    #[tokio::test]
    async fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        assert!(cache.get(b"key1").await.is_none());
        assert!(cache.put(b"key1", b"123", None).await);
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));
        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        cache
            .put(b"key1", b"123", Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(b"key1").await.is_none());
    }

    #[tokio::test]
    async fn test_disk_cache_remove() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        cache.put(b"key1", b"123", None).await;
        cache.remove(b"key1").await;
        assert!(cache.get(b"key1").await.is_none());
    }

    #[tokio::test]
    async fn test_values_are_stored_raw() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());
        let payload = br#"{"USD":"1.1234","GBP":"0.85"}"#;

        assert!(cache.put(b"key1", payload, Some(Duration::from_secs(60))).await);
        let raw = cache.partition.get(b"key1").unwrap().unwrap();
        assert_eq!(raw.len(), HEADER_LEN + payload.len());
        assert_eq!(&raw[HEADER_LEN..], payload.as_slice());

        assert!(cache.put(b"key2", b"", None).await);
        assert_eq!(cache.get(b"key2").await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_miss() {
        let dir = tempdir().unwrap();
        let cache = open_collection(dir.path());

        cache
            .partition
            .insert(b"key1".as_slice(), b"garbage".as_slice())
            .unwrap();
        assert!(cache.get(b"key1").await.is_none());
    }
}

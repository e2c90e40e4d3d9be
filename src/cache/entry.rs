//! Stored cache entry with integrity digest

use tokio::time::{Duration, Instant};

/// One value owned by the cache manager.
///
/// The value is kept as serialized JSON plus its MD5 digest; `digest` is
/// checked on every read.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub namespace: String,
    pub key: String,
    pub value: Vec<u8>,
    pub digest: md5::Digest,
    pub created_at: Instant,
    pub ttl: Duration,
    pub last_access: Instant,
}

impl CacheEntry {
    pub fn new(namespace: &str, key: &str, value: Vec<u8>, ttl: Duration, now: Instant) -> Self {
        let digest = md5::compute(&value);
        Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
            digest,
            created_at: now,
            ttl,
            last_access: now,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Expired once age reaches the TTL, not after.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.age(now) >= self.ttl
    }

    pub fn is_intact(&self) -> bool {
        md5::compute(&self.value) == self.digest
    }

    /// Memory estimate used for the namespace budget.
    pub fn size_bytes(&self) -> usize {
        self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_inclusive_of_ttl() {
        let start = Instant::now();
        let entry = CacheEntry::new("solar", "k", b"{}".to_vec(), Duration::from_secs(10), start);
        assert!(!entry.is_expired(start + Duration::from_secs(9)));
        assert!(entry.is_expired(start + Duration::from_secs(10)));
    }

    #[test]
    fn tampered_value_fails_digest() {
        let mut entry =
            CacheEntry::new("solar", "k", b"{\"sfi\":150}".to_vec(), Duration::from_secs(10), Instant::now());
        assert!(entry.is_intact());
        entry.value[7] = b'9';
        assert!(!entry.is_intact());
    }
}

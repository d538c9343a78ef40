//! Cache Entry Module
//!
//! Stored payload plus the absolute and sliding expiration bookkeeping used
//! by the in-memory store.

use crate::cache::options::duration_ms;
use crate::cache::ExpirationOptions;

// == Cache Entry ==
/// A single stored payload with its expiration metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The encoded value
    pub value: String,
    /// Hard deadline (Unix milliseconds), None = no absolute expiration
    pub absolute_deadline: Option<i64>,
    /// Sliding window in milliseconds, None = no sliding expiration
    pub sliding_ms: Option<i64>,
    /// Last successful read or write (Unix milliseconds)
    pub last_access: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry written now under the given expiration policy.
    pub fn new(value: String, options: &ExpirationOptions) -> Self {
        Self::written_at(value, options, current_timestamp_ms())
    }

    /// Creates an entry as if written at `now`.
    pub fn written_at(value: String, options: &ExpirationOptions, now: i64) -> Self {
        Self {
            value,
            absolute_deadline: options
                .absolute_ttl
                .map(|ttl| now.saturating_add(duration_ms(ttl))),
            sliding_ms: options.sliding_ttl.map(duration_ms),
            last_access: now,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is dead at `now`.
    ///
    /// Boundaries are inclusive: an entry whose deadline equals `now` is
    /// already expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        if let Some(deadline) = self.absolute_deadline {
            if now >= deadline {
                return true;
            }
        }
        match self.sliding_ms {
            Some(window) => now >= self.last_access.saturating_add(window),
            None => false,
        }
    }

    // == Touch ==
    /// Restarts the sliding window from `now`.
    pub fn touch_at(&mut self, now: i64) {
        self.last_access = now;
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds at `now`, or None if unbounded.
    pub fn ttl_remaining_ms_at(&self, now: i64) -> Option<i64> {
        let absolute = self.absolute_deadline.map(|deadline| deadline.saturating_sub(now));
        let sliding = self
            .sliding_ms
            .map(|window| self.last_access.saturating_add(window).saturating_sub(now));

        let remaining = match (absolute, sliding) {
            (Some(a), Some(s)) => Some(a.min(s)),
            (a, s) => a.or(s),
        };
        remaining.map(|ms| ms.max(0))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_entry_never_expires() {
        let entry = CacheEntry::written_at("v".to_string(), &ExpirationOptions::never(), NOW);

        assert!(entry.absolute_deadline.is_none());
        assert!(entry.sliding_ms.is_none());
        assert!(!entry.is_expired_at(NOW + 1_000_000_000));
        assert!(entry.ttl_remaining_ms_at(NOW).is_none());
    }

    #[test]
    fn test_huge_ttls_saturate() {
        let options = ExpirationOptions::never()
            .with_absolute_ttl(Duration::from_secs(u64::MAX))
            .with_sliding_ttl(Duration::from_secs(u64::MAX));
        let entry = CacheEntry::written_at("v".to_string(), &options, NOW);

        assert_eq!(entry.absolute_deadline, Some(i64::MAX));
        assert!(!entry.is_expired_at(NOW + 1_000_000_000));
        assert_eq!(entry.ttl_remaining_ms_at(NOW), Some(i64::MAX - NOW));
    }

    #[test]
    fn test_absolute_expiration_boundary() {
        let options = ExpirationOptions::never().with_absolute_ttl(Duration::from_secs(10));
        let entry = CacheEntry::written_at("v".to_string(), &options, NOW);

        assert!(!entry.is_expired_at(NOW + 9_999));
        assert!(entry.is_expired_at(NOW + 10_000), "deadline is inclusive");
    }

    #[test]
    fn test_sliding_window_resets_on_touch() {
        let options = ExpirationOptions::never().with_sliding_ttl(Duration::from_secs(30));
        let mut entry = CacheEntry::written_at("v".to_string(), &options, NOW);

        entry.touch_at(NOW + 20_000);
        assert!(!entry.is_expired_at(NOW + 45_000));
        assert!(entry.is_expired_at(NOW + 50_000));
    }

    #[test]
    fn test_absolute_caps_sliding() {
        let mut entry =
            CacheEntry::written_at("v".to_string(), &ExpirationOptions::default(), NOW);

        // Keep reading every 20s; sliding never lapses but absolute does at 120s
        let mut t = NOW;
        while t + 20_000 < NOW + 120_000 {
            t += 20_000;
            assert!(!entry.is_expired_at(t));
            entry.touch_at(t);
        }
        assert!(entry.is_expired_at(NOW + 120_000));
    }

    #[test]
    fn test_ttl_remaining_takes_sooner_window() {
        let entry = CacheEntry::written_at("v".to_string(), &ExpirationOptions::default(), NOW);

        assert_eq!(entry.ttl_remaining_ms_at(NOW), Some(30_000));
        assert_eq!(entry.ttl_remaining_ms_at(NOW + 40_000), Some(0));
    }
}

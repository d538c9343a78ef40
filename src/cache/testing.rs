//! Test doubles for the store and codec contracts.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::cache::{
    Cancellation, Codec, Decoded, DistributedStore, ExpirationOptions, JsonCodec, MemoryStore,
};
use crate::error::{CacheError, Result};

/// A write observed by `FakeStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedWrite {
    pub key: String,
    pub value: String,
    pub options: ExpirationOptions,
}

/// Memory-backed store that records traffic and can be told to fail.
#[derive(Debug, Default)]
pub struct FakeStore {
    inner: MemoryStore,
    writes: Mutex<Vec<RecordedWrite>>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts raw text in the store without recording it as a write.
    pub async fn seed(&self, key: &str, value: &str) {
        self.inner
            .set(key, value.to_string(), ExpirationOptions::never(), &Cancellation::never())
            .await
            .unwrap();
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key, &Cancellation::never()).await.unwrap()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl DistributedStore for FakeStore {
    async fn get(&self, key: &str, cancel: &Cancellation) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Store("read refused".to_string()));
        }
        self.inner.get(key, cancel).await
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        options: ExpirationOptions,
        cancel: &Cancellation,
    ) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Store("write refused".to_string()));
        }
        self.writes.lock().unwrap().push(RecordedWrite {
            key: key.to_string(),
            value: value.clone(),
            options,
        });
        self.inner.set(key, value, options, cancel).await
    }

    async fn remove(&self, key: &str, cancel: &Cancellation) -> Result<()> {
        self.inner.remove(key, cancel).await
    }
}

/// JSON on the read side, always fails to encode.
#[derive(Debug, Default)]
pub struct BrokenEncoder;

impl Codec for BrokenEncoder {
    fn encode<T: Serialize>(&self, _value: &T) -> Result<String> {
        Err(CacheError::Serialization("encoder offline".to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Decoded<T> {
        JsonCodec.decode(text)
    }
}

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::debug;

use super::client::{IndicatorSource, RequestKey};
use crate::error::FetchError;

/// Payloads already fetched this session, keyed by request.
#[derive(Debug, Default)]
struct ResponseCache {
    entries: HashMap<RequestKey, Value>,
}

impl ResponseCache {
    fn get(&self, key: &RequestKey) -> Option<&Value> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: RequestKey, payload: Value) {
        self.entries.insert(key, payload);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// An [`IndicatorSource`] fronted by a per-session response cache.
///
/// Failures are never cached.
pub struct CachedSource {
    inner: Box<dyn IndicatorSource>,
    cache: Mutex<ResponseCache>,
}

impl CachedSource {
    pub fn new(inner: Box<dyn IndicatorSource>) -> Self {
        Self { inner, cache: Mutex::new(ResponseCache::default()) }
    }

    /// Returns the cached payload for `key`, fetching it on a miss or when
    /// `refresh` is set.
    pub fn get(&self, key: &RequestKey, refresh: bool) -> Result<Value, FetchError> {
        if !refresh {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = cache.get(key) {
                debug!(indicator = %key.indicator, span = %key.span.query(), "cache hit");
                return Ok(hit.clone());
            }
        }

        // Lock released during the request; concurrent misses on the same
        // key both fetch and the later insert wins.
        let payload = self.inner.fetch(key)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), payload.clone());
        Ok(payload)
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

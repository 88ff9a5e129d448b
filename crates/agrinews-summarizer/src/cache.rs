//! Bounded, expiring memo in front of a [`TextGenerator`].
//!
//! Only successful [`Generation::Text`] results are kept; refusals and
//! errors always reach the inner generator again on the next call.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::SummarizerError;
use crate::generator::{Generation, TextGenerator};

struct Entry {
    text: String,
    stored_at: Instant,
}

pub struct CachedGenerator<G> {
    inner: G,
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<String, Entry>>,
}

impl<G: TextGenerator> CachedGenerator<G> {
    /// Wraps `inner`, keeping at most `capacity` prompts for `ttl` each.
    ///
    /// A zero `capacity` or `ttl` caches nothing.
    #[must_use]
    pub fn new(inner: G, ttl: Duration, capacity: usize) -> Self {
        Self {
            inner,
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .values()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.text.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: String, text: String) {
        if self.capacity == 0 || self.ttl.is_zero() {
            return;
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);

        while entries.len() >= self.capacity {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.stored_at)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            entries.remove(&oldest);
        }

        entries.insert(
            key,
            Entry {
                text,
                stored_at: Instant::now(),
            },
        );
    }
}

fn prompt_key(prompt: &str) -> String {
    format!("{:x}", Sha256::digest(prompt.as_bytes()))
}

#[async_trait]
impl<G: TextGenerator> TextGenerator for CachedGenerator<G> {
    async fn generate(&self, prompt: &str) -> Result<Generation, SummarizerError> {
        let key = prompt_key(prompt);
        if let Some(text) = self.lookup(&key) {
            tracing::debug!(key = %key, "summarizer: cache hit");
            return Ok(Generation::Text(text));
        }

        let generation = self.inner.generate(prompt).await?;
        if let Generation::Text(text) = &generation {
            self.store(key, text.clone());
        }
        Ok(generation)
    }
}

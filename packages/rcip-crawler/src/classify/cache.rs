//! Memoizing classifier wrapper.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::trace;

use crate::error::ClassifyResult;
use crate::traits::classifier::Classifier;
use crate::types::posting::Classification;

/// Caches successful classifications by (title, description).
///
/// Failures are not cached, so a posting that timed out is retried on the
/// next sighting.
pub struct CachedClassifier<C: Classifier> {
    inner: C,
    cache: RwLock<HashMap<(String, String), Classification>>,
}

impl<C: Classifier> CachedClassifier<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached answers.
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<C: Classifier> Classifier for CachedClassifier<C> {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification> {
        let key = (title.to_string(), description.to_string());

        let hit = self.cache.read().ok().and_then(|c| c.get(&key).cloned());
        if let Some(hit) = hit {
            trace!(title = %title, "Classification cache hit");
            return Ok(hit);
        }

        let classification = self.inner.classify(title, description).await?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, classification.clone());
        }
        Ok(classification)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

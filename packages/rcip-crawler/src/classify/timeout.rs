//! Latency bound for classifiers.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use crate::error::{ClassifyError, ClassifyResult};
use crate::traits::classifier::Classifier;
use crate::types::posting::Classification;

/// Fails a classification that does not finish within `timeout`.
pub struct TimeoutClassifier<C: Classifier> {
    inner: C,
    timeout: Duration,
}

impl<C: Classifier> TimeoutClassifier<C> {
    pub fn new(inner: C, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<C: Classifier> Classifier for TimeoutClassifier<C> {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification> {
        match tokio::time::timeout(self.timeout, self.inner.classify(title, description)).await {
            Ok(result) => result,
            Err(_) => {
                let millis = self.timeout.as_millis() as u64;
                warn!(title = %title, timeout_ms = millis, "Classification timed out");
                Err(ClassifyError::Timeout { millis })
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

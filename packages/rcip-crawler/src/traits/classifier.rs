//! Occupation classification.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ClassifyResult;
use crate::types::posting::Classification;

/// Maps a job title and description to a NOC code and TEER level.
///
/// The service behind this trait is slow and imprecise; callers treat any
/// error as "unclassified" rather than as a reason to drop a posting.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification>;

    /// Name for logging.
    fn name(&self) -> &str {
        "classifier"
    }
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification> {
        (**self).classify(title, description).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

//! Occupation classifier implementations.
//!
//! - `OpenAIClassifier` - chat-completions call returning a NOC code and TEER level
//! - `TimeoutClassifier` - bounds any classifier's latency
//! - `CachedClassifier` - memoizes successful answers per (title, description)

pub mod cache;
pub mod openai;
pub mod timeout;

pub use cache::CachedClassifier;
pub use openai::{parse_classification, OpenAIClassifier};
pub use timeout::TimeoutClassifier;

//! Core trait abstractions.
//!
//! Every external dependency of the pipeline (network, classifier, store)
//! sits behind one of these traits so that the orchestrator can be built from
//! real clients in production and from the mocks in [`crate::testing`] in tests.

pub mod classifier;
pub mod extractor;
pub mod fetcher;
pub mod store;

//! Data types shared across the crawler pipeline.

pub mod posting;
pub mod report;
pub mod store;
pub mod target;

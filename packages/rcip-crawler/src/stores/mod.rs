//! Job store implementations.
//!
//! - `MemoryStore` - in-memory, for tests and dry runs
//! - `PostgresStore` - PostgreSQL (feature `postgres`)

pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

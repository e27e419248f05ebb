//! Profile store implementations.
//!
//! Available backends:
//! - `MemoryProfileStore` - In-memory storage (always available)
//! - `SqliteProfileStore` - SQLite file-based storage (requires `sqlite` feature)

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::MemoryProfileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteProfileStore;

//! Internal company directory: the store contract and the in-memory
//! reference backend.

pub mod memory;
pub mod store;

pub use memory::InMemoryDirectoryStore;
pub use store::{DirectoryStore, MatchFilters, ProvenanceNote, StoreError};

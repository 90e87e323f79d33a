//! Storage implementations.
//!
//! The durable [`FileKeyValueStore`] backs the token cache in production;
//! the in-memory doubles (re-exported from `echodue-common`) back it in
//! tests. [`InMemoryRecordStore`] implements the record store port for
//! local use and tests; the production record store is an external
//! collaborator.

pub mod file_kv;
pub mod records;

pub use echodue_common::testing::mocks::MemoryKeyValueStore;
pub use file_kv::FileKeyValueStore;
pub use records::InMemoryRecordStore;

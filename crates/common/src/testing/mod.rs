//! Test support utilities shared across EchoDue crates.

pub mod mocks;

pub use mocks::{MemoryKeyValueStore, MockConsentFlow, PromptCounter};

//! Extraction service integration.

pub mod client;

pub use client::ExtractionClient;

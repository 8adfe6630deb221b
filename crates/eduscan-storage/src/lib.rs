//! EduScan Storage Abstraction
//!
//! This crate provides the key-value state store the session gate persists to:
//! - `StateStore` trait (string keys, string values)
//! - `FileStateStore`, an in-memory map written through to a JSON file
//! - `AtomicWriter` for crash-safe file replacement

pub mod atomic_writer;
pub mod state;
pub mod traits;

pub use state::FileStateStore;
pub use traits::{StateStore, StorageError, StorageResult};

// ABOUTME: Workflow store module - per-account workflow collections and their durable records
// Storage and transaction submission are injected so both can be swapped in tests

pub mod catalog;
pub mod error;
pub mod persistence;
pub mod store;

pub use catalog::{find_template, seed_workflows, templates};
pub use error::{StorageError, StoreError};
pub use persistence::{record_key, FileStorage, MemoryStorage, WorkflowStorage};
pub use store::WorkflowStore;

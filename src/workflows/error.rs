// ABOUTME: Error types for the workflow store and its durable per-account records

use crate::chain::SubmitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A wallet address is required")]
    MissingAddress,

    #[error("Workflow not found: {0}")]
    NotFound(String),

    #[error("Failed to save workflows: {0}")]
    Persistence(String),

    #[error("Transaction submission failed: {0}")]
    Submission(#[from] SubmitError),
}

impl StoreError {
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

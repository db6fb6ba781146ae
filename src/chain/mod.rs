// ABOUTME: Chain integration - the transaction submission seam used by the workflow store

pub mod submitter;

pub use submitter::{
    EntryFunctionPayload, SimulatedSubmitter, SubmitError, TransactionReceipt, TransactionSubmitter,
};

#[cfg(test)]
pub use submitter::MockTransactionSubmitter;

// ABOUTME: Transaction submission capability consumed by the workflow store
// SimulatedSubmitter stands in for a real chain client and always succeeds

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),
    #[error("Transaction failed on chain: {0}")]
    Failed(String),
    #[error("Node unreachable: {0}")]
    Unreachable(String),
}

/// Entry function call with positional JSON arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub payload_type: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub fn new(function: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            payload_type: "entry_function_payload".to_string(),
            function: function.into(),
            type_arguments: Vec::new(),
            arguments,
        }
    }

    /// `<address>::workflow::<function>` on the account's own workflow module
    pub fn workflow_call(address: &str, function: &str, arguments: Vec<Value>) -> Self {
        Self::new(format!("{address}::workflow::{function}"), arguments)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub hash: String,
    pub success: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(
        &self,
        sender: &str,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionReceipt, SubmitError>;
}

/// Logs the payload and returns a random hash. No network traffic.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSubmitter {
    node_url: Option<String>,
}

impl SimulatedSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_url(node_url: impl Into<String>) -> Self {
        Self {
            node_url: Some(node_url.into()),
        }
    }

    fn random_hash() -> String {
        let a = Uuid::new_v4().simple().to_string();
        let b = Uuid::new_v4().simple().to_string();
        format!("0x{a}{b}")
    }
}

#[async_trait]
impl TransactionSubmitter for SimulatedSubmitter {
    async fn submit(
        &self,
        sender: &str,
        payload: EntryFunctionPayload,
    ) -> Result<TransactionReceipt, SubmitError> {
        debug!(
            "Simulating transaction submission from {} to {:?}: {:?}",
            sender, self.node_url, payload
        );

        let receipt = TransactionReceipt {
            hash: Self::random_hash(),
            success: true,
        };

        info!("Simulated {} -> {}", payload.function, receipt.hash);
        Ok(receipt)
    }
}

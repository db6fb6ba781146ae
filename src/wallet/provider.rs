// ABOUTME: Wallet provider capability interface injected into the session manager
// Any wallet exposing connect/disconnect/isConnected/account/onAccountChange fits

use crate::models::Account;
use crate::wallet::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Options passed to the wallet's connect prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    /// `true` would let the wallet approve silently; the session always asks for a prompt
    pub only_if_trusted: bool,
    pub network_name: String,
}

impl ConnectOptions {
    pub fn prompt(network_name: impl Into<String>) -> Self {
        Self {
            only_if_trusted: false,
            network_name: network_name.into(),
        }
    }
}

/// Account as reported by a provider. The address may be empty on a malformed response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAccount {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub public_key: Option<String>,
}

impl ProviderAccount {
    pub fn new(address: impl Into<String>, public_key: Option<String>) -> Self {
        Self {
            address: address.into(),
            public_key,
        }
    }

    /// `None` when the provider returned no usable address
    pub fn into_account(self) -> Option<Account> {
        if self.address.trim().is_empty() {
            None
        } else {
            Some(Account::new(self.address, self.public_key))
        }
    }
}

pub type AccountChangeCallback = Box<dyn Fn(Option<ProviderAccount>) + Send + Sync>;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> String;

    async fn connect(&self, options: ConnectOptions) -> Result<ProviderAccount, ProviderError>;

    async fn disconnect(&self) -> Result<(), ProviderError>;

    async fn is_connected(&self) -> Result<bool, ProviderError>;

    async fn account(&self) -> Result<ProviderAccount, ProviderError>;

    /// Register for account-change notifications. Returns `false` when unsupported.
    fn on_account_change(&self, _callback: AccountChangeCallback) -> bool {
        false
    }
}

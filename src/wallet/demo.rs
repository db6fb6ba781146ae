// ABOUTME: In-process demo wallet for running without a browser extension
// Opt-in only: remembers its approval in a small JSON file so sessions survive restarts

use crate::wallet::error::ProviderError;
use crate::wallet::provider::{AccountChangeCallback, ConnectOptions, ProviderAccount, WalletProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEMO_ADDRESS: &str = "0x7a3f1c9e2b5d8a4f6e0c3b7d9a1e5f2c8b4d6a0e3f7c1b9d5a2e8f4c6b0d3a7e";
pub const DEMO_PUBLIC_KEY: &str = "0x4e8b2d6f0a3c7e1b5d9f2a6c0e4b8d3f7a1c5e9b2d6f0a4c8e3b7d1f5a9c2e6b";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DemoWalletState {
    connected: bool,
    account: ProviderAccount,
}

pub struct DemoWalletProvider {
    account: Mutex<ProviderAccount>,
    connected: Mutex<bool>,
    state_file: Option<PathBuf>,
    reject_requests: bool,
    listeners: Mutex<Vec<AccountChangeCallback>>,
}

impl DemoWalletProvider {
    pub fn new() -> Self {
        Self::with_account(ProviderAccount::new(DEMO_ADDRESS, Some(DEMO_PUBLIC_KEY.to_string())))
    }

    pub fn with_account(account: ProviderAccount) -> Self {
        Self {
            account: Mutex::new(account),
            connected: Mutex::new(false),
            state_file: None,
            reject_requests: false,
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Persist approval to `path` and restore any earlier approval from it.
    pub fn with_state_file(mut self, path: PathBuf) -> Self {
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<DemoWalletState>(&content) {
                Ok(saved) => {
                    debug!("Restored demo wallet state from {:?}", path);
                    self.connected = Mutex::new(saved.connected);
                    if !saved.account.address.is_empty() {
                        self.account = Mutex::new(saved.account);
                    }
                }
                Err(e) => warn!("Ignoring unreadable demo wallet state {:?}: {}", path, e),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to read demo wallet state {:?}: {}", path, e),
        }
        self.state_file = Some(path);
        self
    }

    /// Every connect request is declined as if the user pressed "Reject".
    pub fn rejecting(mut self) -> Self {
        self.reject_requests = true;
        self
    }

    fn current_account(&self) -> ProviderAccount {
        self.account.lock().map(|a| a.clone()).unwrap_or_default()
    }

    fn set_connected(&self, connected: bool) -> Result<(), ProviderError> {
        let mut flag = self
            .connected
            .lock()
            .map_err(|_| ProviderError::Failed("Demo wallet state poisoned".to_string()))?;
        *flag = connected;
        drop(flag);
        self.save_state()
    }

    fn save_state(&self) -> Result<(), ProviderError> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };

        let state = DemoWalletState {
            connected: self.connected.lock().map(|c| *c).unwrap_or(false),
            account: self.current_account(),
        };
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| ProviderError::Failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ProviderError::Failed(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| ProviderError::Failed(e.to_string()))
    }

    /// Simulate the user switching accounts in the wallet UI. `None` logs the user out.
    pub fn switch_account(&self, account: Option<ProviderAccount>) {
        match &account {
            Some(new_account) => {
                if let Ok(mut current) = self.account.lock() {
                    *current = new_account.clone();
                }
            }
            None => {
                if let Ok(mut connected) = self.connected.lock() {
                    *connected = false;
                }
            }
        }
        if let Err(e) = self.save_state() {
            warn!("Failed to save demo wallet state: {}", e);
        }

        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(account.clone());
            }
        }
    }
}

impl Default for DemoWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for DemoWalletProvider {
    fn name(&self) -> String {
        "Demo Wallet".to_string()
    }

    async fn connect(&self, options: ConnectOptions) -> Result<ProviderAccount, ProviderError> {
        debug!("Demo wallet connect request: {:?}", options);
        if self.reject_requests {
            return Err(ProviderError::UserRejected);
        }

        self.set_connected(true)?;
        let account = self.current_account();
        info!("Demo wallet approved {} on {}", account.address, options.network_name);
        Ok(account)
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.set_connected(false)
    }

    async fn is_connected(&self) -> Result<bool, ProviderError> {
        self.connected
            .lock()
            .map(|c| *c)
            .map_err(|_| ProviderError::Failed("Demo wallet state poisoned".to_string()))
    }

    async fn account(&self) -> Result<ProviderAccount, ProviderError> {
        Ok(self.current_account())
    }

    fn on_account_change(&self, callback: AccountChangeCallback) -> bool {
        match self.listeners.lock() {
            Ok(mut listeners) => {
                listeners.push(callback);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn approval_survives_a_new_provider_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo_wallet.json");

        let wallet = DemoWalletProvider::new().with_state_file(path.clone());
        assert!(!wallet.is_connected().await.unwrap());
        wallet.connect(ConnectOptions::prompt("devnet")).await.unwrap();

        let reopened = DemoWalletProvider::new().with_state_file(path);
        assert!(reopened.is_connected().await.unwrap());
        assert_eq!(reopened.account().await.unwrap().address, DEMO_ADDRESS);
    }

    #[tokio::test]
    async fn rejecting_wallet_reports_user_rejection() {
        let wallet = DemoWalletProvider::new().rejecting();
        let result = wallet.connect(ConnectOptions::prompt("devnet")).await;
        assert_eq!(result, Err(ProviderError::UserRejected));
    }
}

// ABOUTME: Wallet session lifecycle - detection, connect/disconnect, auto-reconnect and
// reaction to provider-driven account changes. One session at a time.

use crate::models::Account;
use crate::wallet::error::ConnectionError;
use crate::wallet::provider::{ConnectOptions, ProviderAccount, WalletProvider};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(Account),
}

impl SessionState {
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Disconnected => "○",
            Self::Connecting => "◌",
            Self::Connected(_) => "●",
        }
    }

    pub const fn account(&self) -> Option<&Account> {
        match self {
            Self::Connected(account) => Some(account),
            _ => None,
        }
    }
}

/// Where the session is being evaluated. Providers are only ever reachable
/// from an interactive client context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeContext {
    Interactive,
    Headless,
}

enum ConnectStart {
    Proceed,
    AlreadyConnecting,
    AlreadyConnected(Account),
}

pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    context: RuntimeContext,
    options: ConnectOptions,
    state: Arc<watch::Sender<SessionState>>,
    error: Mutex<Option<String>>,
}

impl WalletSession {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        context: RuntimeContext,
        options: ConnectOptions,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Disconnected);
        Self {
            provider,
            context,
            options,
            state: Arc::new(state),
            error: Mutex::new(None),
        }
    }

    pub fn is_provider_available(&self) -> bool {
        self.context == RuntimeContext::Interactive && self.provider.is_some()
    }

    fn available_provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        if self.context == RuntimeContext::Interactive {
            self.provider.as_ref()
        } else {
            None
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch state transitions, including ones fired by the provider.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn account(&self) -> Option<Account> {
        self.state.borrow().account().cloned()
    }

    pub fn is_connected(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Connected(_))
    }

    pub fn is_connecting(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Connecting)
    }

    /// Human-readable message from the last failed operation
    pub fn error(&self) -> Option<String> {
        self.error.lock().ok().and_then(|e| e.clone())
    }

    fn set_error(&self, message: Option<String>) {
        if let Ok(mut error) = self.error.lock() {
            *error = message;
        }
    }

    /// Recover an existing session, then start listening for account changes.
    pub async fn init(&self) -> bool {
        let recovered = self.check_existing_session().await;
        self.register_account_listener();
        recovered
    }

    pub async fn connect(&self) -> Result<Account, ConnectionError> {
        self.set_error(None);

        let mut start = ConnectStart::Proceed;
        self.state.send_if_modified(|state| match state {
            SessionState::Connecting => {
                start = ConnectStart::AlreadyConnecting;
                false
            }
            SessionState::Connected(account) => {
                start = ConnectStart::AlreadyConnected(account.clone());
                false
            }
            SessionState::Disconnected => {
                *state = SessionState::Connecting;
                true
            }
        });

        match start {
            ConnectStart::AlreadyConnecting => {
                debug!("Ignoring connect request while another is pending");
                return Err(ConnectionError::AlreadyConnecting);
            }
            ConnectStart::AlreadyConnected(account) => return Ok(account),
            ConnectStart::Proceed => {}
        }

        let result = self.request_connection().await;
        let outcome = match &result {
            Ok(account) => SessionState::Connected(account.clone()),
            Err(_) => SessionState::Disconnected,
        };
        // A disconnect or account change that landed while the prompt was open wins
        let applied = self.finish_connecting(outcome);

        match result {
            Ok(account) if applied => {
                info!("Wallet connected: {}", account.address);
                Ok(account)
            }
            Ok(account) => {
                warn!("Discarding approval for {}, session changed while connecting", account.address);
                let e = ConnectionError::Interrupted;
                self.set_error(Some(e.to_string()));
                Err(e)
            }
            Err(e) => {
                error!("Wallet connection error: {}", e);
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Leave `Connecting` for `outcome`; false if the state already moved on.
    fn finish_connecting(&self, outcome: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Connecting {
                *state = outcome;
                true
            } else {
                false
            }
        })
    }

    async fn request_connection(&self) -> Result<Account, ConnectionError> {
        let provider = self
            .available_provider()
            .ok_or(ConnectionError::ProviderMissing)?;

        info!(
            "Requesting connection from {} on {}",
            provider.name(),
            self.options.network_name
        );
        let response = provider.connect(self.options.clone()).await?;

        response
            .into_account()
            .ok_or(ConnectionError::InvalidResponse)
    }

    /// Best effort: provider failures are logged, local state is always cleared.
    pub async fn disconnect(&self) {
        if let Some(provider) = self.available_provider() {
            if let Err(e) = provider.disconnect().await {
                warn!("Error disconnecting from {}: {}", provider.name(), e);
            }
        }

        self.state.send_replace(SessionState::Disconnected);
        info!("Wallet disconnected");
    }

    /// Silently look for a connection the wallet already approved.
    pub async fn check_existing_session(&self) -> bool {
        let Some(provider) = self.available_provider() else {
            return false;
        };

        let connected = match provider.is_connected().await {
            Ok(connected) => connected,
            Err(e) => {
                warn!("Error checking connection: {}", e);
                return false;
            }
        };
        if !connected {
            return false;
        }

        match provider.account().await {
            Ok(response) => match response.into_account() {
                Some(account) => {
                    info!("Recovered existing wallet session for {}", account.address);
                    self.state.send_replace(SessionState::Connected(account));
                    true
                }
                None => false,
            },
            Err(e) => {
                warn!("Error reading connected account: {}", e);
                false
            }
        }
    }

    fn register_account_listener(&self) {
        let Some(provider) = self.available_provider() else {
            return;
        };

        let state = Arc::clone(&self.state);
        let registered = provider.on_account_change(Box::new(move |new_account| {
            Self::apply_account_change(&state, new_account);
        }));

        if registered {
            debug!("Listening for account changes from {}", provider.name());
        } else {
            debug!("{} does not support account change notifications", provider.name());
        }
    }

    fn apply_account_change(state: &watch::Sender<SessionState>, new_account: Option<ProviderAccount>) {
        match new_account.and_then(ProviderAccount::into_account) {
            Some(account) => {
                info!("Wallet account changed to {}", account.address);
                state.send_replace(SessionState::Connected(account));
            }
            None => {
                info!("Wallet account cleared by provider");
                state.send_replace(SessionState::Disconnected);
            }
        }
    }
}

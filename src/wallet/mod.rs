// ABOUTME: Wallet session management - provider capability, session lifecycle and errors
// The session manager never reaches for ambient globals; providers are injected

pub mod demo;
pub mod error;
pub mod provider;
pub mod session;

pub use demo::DemoWalletProvider;
pub use error::{ConnectionError, ProviderError};
pub use provider::{AccountChangeCallback, ConnectOptions, ProviderAccount, WalletProvider};
pub use session::{RuntimeContext, SessionState, WalletSession};

// ABOUTME: Tests for the wallet session lifecycle - connect/disconnect, session recovery,
// provider-driven account changes and the overlapping connect guard

use aptos_flow::models::Account;
use aptos_flow::wallet::{
    AccountChangeCallback, ConnectOptions, ConnectionError, DemoWalletProvider, ProviderAccount,
    ProviderError, RuntimeContext, SessionState, WalletProvider, WalletSession,
};
use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;
use tokio::sync::Notify;

mock! {
    pub Wallet {}

    #[async_trait]
    impl WalletProvider for Wallet {
        fn name(&self) -> String;
        async fn connect(&self, options: ConnectOptions) -> Result<ProviderAccount, ProviderError>;
        async fn disconnect(&self) -> Result<(), ProviderError>;
        async fn is_connected(&self) -> Result<bool, ProviderError>;
        async fn account(&self) -> Result<ProviderAccount, ProviderError>;
        fn on_account_change(&self, callback: AccountChangeCallback) -> bool;
    }
}

fn mock_wallet() -> MockWallet {
    let mut wallet = MockWallet::new();
    wallet.expect_name().returning(|| "Mock Wallet".to_string());
    wallet
}

fn create_session(provider: Option<Arc<dyn WalletProvider>>) -> WalletSession {
    WalletSession::new(provider, RuntimeContext::Interactive, ConnectOptions::prompt("devnet"))
}

#[tokio::test]
async fn test_connect_requests_prompt_on_configured_network() {
    let mut wallet = mock_wallet();
    wallet
        .expect_connect()
        .withf(|options| !options.only_if_trusted && options.network_name == "devnet")
        .times(1)
        .returning(|_| Ok(ProviderAccount::new("0xA", Some("0xPK".to_string()))));
    let session = create_session(Some(Arc::new(wallet)));

    let account = session.connect().await.unwrap();

    assert_eq!(account, Account::new("0xA", Some("0xPK".to_string())));
    assert_eq!(session.state(), SessionState::Connected(account));
    assert!(session.error().is_none());
}

#[tokio::test]
async fn test_connect_without_provider_fails_with_provider_missing() {
    let session = create_session(None);

    assert!(!session.is_provider_available());
    let err = session.connect().await.unwrap_err();

    assert_eq!(err, ConnectionError::ProviderMissing);
    assert_eq!(err.reason(), "provider_missing");
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.error().unwrap().contains("not installed"));
}

#[tokio::test]
async fn test_headless_context_never_sees_a_provider() {
    let wallet = mock_wallet();
    let session = WalletSession::new(
        Some(Arc::new(wallet)),
        RuntimeContext::Headless,
        ConnectOptions::prompt("devnet"),
    );

    assert!(!session.is_provider_available());
    assert_eq!(session.connect().await.unwrap_err(), ConnectionError::ProviderMissing);
    assert!(!session.check_existing_session().await);
}

#[tokio::test]
async fn test_rejected_connection_leaves_session_disconnected() {
    let mut wallet = mock_wallet();
    wallet
        .expect_connect()
        .returning(|_| Err(ProviderError::Failed("User rejected the request".to_string())));
    let session = create_session(Some(Arc::new(wallet)));

    let err = session.connect().await.unwrap_err();

    assert_eq!(err, ConnectionError::Rejected);
    assert!(!session.is_connected());
    assert!(session.error().unwrap().contains("rejected"));
}

#[tokio::test]
async fn test_response_without_address_is_invalid() {
    let mut wallet = mock_wallet();
    wallet
        .expect_connect()
        .returning(|_| Ok(ProviderAccount::default()));
    let session = create_session(Some(Arc::new(wallet)));

    let err = session.connect().await.unwrap_err();

    assert_eq!(err.reason(), "invalid_response");
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_disconnect_clears_state_even_when_provider_fails() {
    let mut wallet = mock_wallet();
    wallet
        .expect_connect()
        .returning(|_| Ok(ProviderAccount::new("0xA", None)));
    wallet
        .expect_disconnect()
        .times(1)
        .returning(|| Err(ProviderError::Failed("extension crashed".to_string())));
    let session = create_session(Some(Arc::new(wallet)));
    session.connect().await.unwrap();

    session.disconnect().await;

    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.account().is_none());
}

#[tokio::test]
async fn test_existing_session_is_recovered_silently() {
    let mut wallet = mock_wallet();
    wallet.expect_is_connected().returning(|| Ok(true));
    wallet
        .expect_account()
        .returning(|| Ok(ProviderAccount::new("0xB", None)));
    wallet.expect_connect().never();
    wallet.expect_on_account_change().returning(|_| false);
    let session = create_session(Some(Arc::new(wallet)));

    assert!(session.init().await);
    assert_eq!(session.account().unwrap().address, "0xB");
}

#[tokio::test]
async fn test_existing_session_check_swallows_provider_errors() {
    let mut wallet = mock_wallet();
    wallet
        .expect_is_connected()
        .returning(|| Err(ProviderError::Failed("locked".to_string())));
    let session = create_session(Some(Arc::new(wallet)));

    assert!(!session.check_existing_session().await);
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_account_change_notifications_replace_or_clear_the_session() {
    let wallet = Arc::new(DemoWalletProvider::new());
    let session = create_session(Some(wallet.clone() as Arc<dyn WalletProvider>));
    assert!(!session.init().await);
    let mut updates = session.subscribe();
    session.connect().await.unwrap();

    wallet.switch_account(Some(ProviderAccount::new("0xNEW", None)));
    assert_eq!(session.account().unwrap().address, "0xNEW");
    assert!(updates.has_changed().unwrap());
    updates.borrow_and_update();

    wallet.switch_account(None);
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(updates.has_changed().unwrap());
}

#[tokio::test]
async fn test_connect_when_already_connected_returns_current_account() {
    let mut wallet = mock_wallet();
    wallet
        .expect_connect()
        .times(1)
        .returning(|_| Ok(ProviderAccount::new("0xA", None)));
    let session = create_session(Some(Arc::new(wallet)));

    let first = session.connect().await.unwrap();
    let second = session.connect().await.unwrap();

    assert_eq!(first, second);
}

/// Holds the approval prompt open until released
struct SlowWallet {
    release: Notify,
}

#[async_trait]
impl WalletProvider for SlowWallet {
    fn name(&self) -> String {
        "Slow Wallet".to_string()
    }

    async fn connect(&self, _options: ConnectOptions) -> Result<ProviderAccount, ProviderError> {
        self.release.notified().await;
        Ok(ProviderAccount::new("0xSLOW", None))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn is_connected(&self) -> Result<bool, ProviderError> {
        Ok(false)
    }

    async fn account(&self) -> Result<ProviderAccount, ProviderError> {
        Ok(ProviderAccount::default())
    }
}

#[tokio::test]
async fn test_overlapping_connect_is_ignored_while_connecting() {
    let wallet = Arc::new(SlowWallet { release: Notify::new() });
    let session = create_session(Some(wallet.clone() as Arc<dyn WalletProvider>));

    let (first, second) = tokio::join!(session.connect(), async {
        while !session.is_connecting() {
            tokio::task::yield_now().await;
        }
        let result = session.connect().await;
        wallet.release.notify_one();
        result
    });

    assert_eq!(second.unwrap_err(), ConnectionError::AlreadyConnecting);
    assert_eq!(first.unwrap().address, "0xSLOW");
    assert!(session.is_connected());
}

#[tokio::test]
async fn test_disconnect_while_connecting_is_not_undone_by_the_approval() {
    let wallet = Arc::new(SlowWallet { release: Notify::new() });
    let session = create_session(Some(wallet.clone() as Arc<dyn WalletProvider>));

    let (first, ()) = tokio::join!(session.connect(), async {
        while !session.is_connecting() {
            tokio::task::yield_now().await;
        }
        session.disconnect().await;
        wallet.release.notify_one();
    });

    let err = first.unwrap_err();
    assert_eq!(err, ConnectionError::Interrupted);
    assert_eq!(err.reason(), "interrupted");
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.error().unwrap().contains("interrupted"));
}

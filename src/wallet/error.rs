// ABOUTME: Error types for wallet session management
// ProviderError is what a wallet reports, ConnectionError is what callers of the session see

use thiserror::Error;

const USER_REJECTED: &str = "User rejected the request";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Wallet provider is not installed. Please install a wallet extension first.")]
    ProviderMissing,

    #[error("Connection request was rejected. Please approve the connection in your wallet.")]
    Rejected,

    #[error("Failed to connect to wallet. Please try again.")]
    InvalidResponse,

    #[error("A connection request is already pending in your wallet.")]
    AlreadyConnecting,

    #[error("Connection request was interrupted by a disconnect or account change.")]
    Interrupted,

    #[error("Failed to connect wallet: {0}")]
    Provider(String),
}

impl ConnectionError {
    /// Stable machine-readable reason code
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ProviderMissing => "provider_missing",
            Self::Rejected => "rejected",
            Self::InvalidResponse => "invalid_response",
            Self::AlreadyConnecting => "already_connecting",
            Self::Interrupted => "interrupted",
            Self::Provider(_) => "provider_error",
        }
    }
}

impl From<ProviderError> for ConnectionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => Self::Rejected,
            // Some wallets only report rejection through the message text
            ProviderError::Failed(msg) if msg.contains(USER_REJECTED) => Self::Rejected,
            ProviderError::Failed(msg) => Self::Provider(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_maps_to_rejected() {
        let err: ConnectionError =
            ProviderError::Failed("Error: User rejected the request.".to_string()).into();
        assert_eq!(err, ConnectionError::Rejected);
        assert_eq!(err.reason(), "rejected");
    }

    #[test]
    fn other_provider_failures_keep_their_message() {
        let err: ConnectionError = ProviderError::Failed("locked".to_string()).into();
        assert_eq!(err.reason(), "provider_error");
        assert_eq!(err.to_string(), "Failed to connect wallet: locked");
    }
}

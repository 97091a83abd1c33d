//! Wallet errors. `Display` yields the exact message published to observers.

use thiserror::Error;

use super::codes::{balance, connect, messages};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Connect issued outside a browser build
    #[error("{}", messages::CONNECT_UNAVAILABLE)]
    ConnectUnavailable,
    /// Balance query issued outside a browser build
    #[error("{}", messages::BALANCE_UNAVAILABLE)]
    BalanceUnavailable,
    /// Bridge answered a connect request with an error code
    #[error("{}", connect_message(.0))]
    Connection(String),
    /// Bridge answered a balance request with a failure marker
    #[error("{}", balance_message(.0))]
    Balance(String),
    /// Operation requires a connected wallet
    #[error("{}", messages::NOT_CONNECTED)]
    NotConnected,
}

impl WalletError {
    /// The install page is opened only when the extension is missing.
    pub fn wants_install_page(&self) -> bool {
        matches!(self, WalletError::Connection(code) if code == connect::WALLET_NOT_FOUND)
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, WalletError::ConnectUnavailable | WalletError::BalanceUnavailable)
    }
}

fn connect_message(code: &str) -> String {
    match code {
        connect::WALLET_NOT_FOUND => messages::WALLET_NOT_FOUND.to_string(),
        connect::CONNECTION_REJECTED => messages::CONNECTION_REJECTED.to_string(),
        connect::NO_ACCOUNTS => messages::NO_ACCOUNTS.to_string(),
        other => format!("{}{}", messages::CONNECT_FAILED_PREFIX, other),
    }
}

fn balance_message(marker: &str) -> &'static str {
    match marker {
        balance::SDK_NOT_LOADED => messages::SDK_NOT_LOADED,
        balance::SDK_STRUCTURE_ERROR => messages::SDK_STRUCTURE_ERROR,
        _ => messages::BALANCE_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_codes_map_verbatim() {
        assert_eq!(
            WalletError::Connection("WALLET_NOT_FOUND".into()).to_string(),
            "Keethings Wallet not found. Please install the extension."
        );
        assert_eq!(
            WalletError::Connection("CONNECTION_REJECTED".into()).to_string(),
            "Connection request rejected by user."
        );
        assert_eq!(
            WalletError::Connection("NO_ACCOUNTS".into()).to_string(),
            "No accounts found in wallet."
        );
        assert_eq!(
            WalletError::Connection("TIMEOUT".into()).to_string(),
            "Failed to connect wallet: TIMEOUT"
        );
    }

    #[test]
    fn test_balance_markers_map_verbatim() {
        assert_eq!(
            WalletError::Balance("SDK_NOT_LOADED".into()).to_string(),
            "Keeta SDK is still loading. Please try again."
        );
        assert_eq!(
            WalletError::Balance("SDK_STRUCTURE_ERROR".into()).to_string(),
            "Keeta SDK version mismatch. Please refresh the page."
        );
        assert_eq!(
            WalletError::Balance("ERROR".into()).to_string(),
            "Failed to fetch balance from Keeta Network"
        );
    }

    #[test]
    fn test_install_page_only_for_missing_wallet() {
        assert!(WalletError::Connection("WALLET_NOT_FOUND".into()).wants_install_page());
        assert!(!WalletError::Connection("NO_ACCOUNTS".into()).wants_install_page());
        assert!(!WalletError::NotConnected.wants_install_page());
    }

    #[test]
    fn test_precondition_and_environment_messages() {
        assert_eq!(WalletError::NotConnected.to_string(), "No wallet connected");
        assert!(WalletError::ConnectUnavailable.is_environment());
        assert!(!WalletError::NotConnected.is_environment());
    }
}

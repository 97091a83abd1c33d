//! Wire codes and user-facing messages exchanged with the wallet bridge
//!
//! Centralized registry for every string the bridge may send and every
//! string the controller may publish. Messages are reproduced verbatim.

/// Error codes delivered through the connect error callback
pub mod connect {
    pub const WALLET_NOT_FOUND: &str = "WALLET_NOT_FOUND";
    pub const CONNECTION_REJECTED: &str = "CONNECTION_REJECTED";
    pub const NO_ACCOUNTS: &str = "NO_ACCOUNTS";
}

/// Failure markers delivered in place of a balance
pub mod balance {
    pub const ERROR: &str = "ERROR";
    pub const SDK_NOT_LOADED: &str = "SDK_NOT_LOADED";
    pub const SDK_STRUCTURE_ERROR: &str = "SDK_STRUCTURE_ERROR";

    pub const ALL: &[&str] = &[ERROR, SDK_NOT_LOADED, SDK_STRUCTURE_ERROR];

    pub fn is_sentinel(value: &str) -> bool {
        ALL.contains(&value)
    }
}

/// Values delivered through the account-change listener
pub mod account {
    pub const DISCONNECTED: &str = "DISCONNECTED";
}

/// User-facing messages
pub mod messages {
    pub const WALLET_NOT_FOUND: &str = "Keethings Wallet not found. Please install the extension.";
    pub const CONNECTION_REJECTED: &str = "Connection request rejected by user.";
    pub const NO_ACCOUNTS: &str = "No accounts found in wallet.";
    pub const CONNECT_FAILED_PREFIX: &str = "Failed to connect wallet: ";

    pub const SDK_NOT_LOADED: &str = "Keeta SDK is still loading. Please try again.";
    pub const SDK_STRUCTURE_ERROR: &str = "Keeta SDK version mismatch. Please refresh the page.";
    pub const BALANCE_FAILED: &str = "Failed to fetch balance from Keeta Network";

    pub const NOT_CONNECTED: &str = "No wallet connected";
    pub const DISCONNECTED: &str = "Wallet disconnected";

    pub const CONNECT_UNAVAILABLE: &str = "Wallet connection only available in browser builds";
    pub const BALANCE_UNAVAILABLE: &str = "Balance queries only available in browser builds";
}

/// Chrome Web Store page of the Keethings extension
pub const INSTALL_URL: &str =
    "https://chromewebstore.google.com/detail/keythings-wallet/jhngbkboonmpephhenljbljnpffabloh";

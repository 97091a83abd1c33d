//! Bridge for hosts without the browser extension

use super::{AccountListener, BalanceReply, BridgeError, ConnectReply, WalletBridge};

/// Every request fails synchronously; the controller turns that into an
/// immediate `Error` notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBridge;

impl WalletBridge for UnavailableBridge {
    fn detect_wallet(&self) -> bool {
        false
    }

    fn request_connect(&self, _reply: ConnectReply) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable)
    }

    fn request_balance(&self, _address: &str, _reply: BalanceReply) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable)
    }

    fn register_account_listener(&self, _listener: AccountListener) -> Result<(), BridgeError> {
        Err(BridgeError::Unavailable)
    }
}

//! Bridge boundary: the wallet extension seen from the controller
//!
//! # Architecture
//!
//! ```text
//! WalletController ──request_*(reply slot)──▶ WalletBridge (extension, script, or nothing)
//!        ▲                                          │
//!        │                                   reply.approve / reject / deliver
//!        │                                          │
//!   ResponseInbox ◀──────── mpsc ◀──────────────────┘
//! ```
//!
//! Reply slots are consumed by value, so a bridge answers each request at
//! most once. Dropping a slot without answering is the "never" case.
//!
//! | Implementation | Where |
//! |----------------|-------|
//! | `JsBridge` | browser build (`wasm` feature), binds `window.keethingsBridge` |
//! | [`UnavailableBridge`] | any other host; every request fails synchronously |
//! | [`ScriptedBridge`] | in-process wallet for tests and the CLI simulator |

mod offline;
mod scripted;

pub use offline::UnavailableBridge;
pub use scripted::ScriptedBridge;

use futures::channel::mpsc;
use futures::StreamExt;
use thiserror::Error;

/// Bridge failures raised synchronously at request time
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("wallet bridge unavailable in this environment")]
    Unavailable,
    #[error("wallet bridge call failed: {0}")]
    Call(String),
}

/// Controller-assigned identity of an outstanding request
pub type RequestId = u64;

/// The external wallet, as the controller talks to it
pub trait WalletBridge {
    /// Synchronous capability check
    fn detect_wallet(&self) -> bool;

    /// Ask the wallet to connect. Answer through `reply`.
    fn request_connect(&self, reply: ConnectReply) -> Result<(), BridgeError>;

    /// Ask for the balance of `address`. Answer through `reply`.
    fn request_balance(&self, address: &str, reply: BalanceReply) -> Result<(), BridgeError>;

    /// Called once at startup. `listener` may fire any number of times.
    fn register_account_listener(&self, listener: AccountListener) -> Result<(), BridgeError>;

    /// Best-effort UI side effect; failures are ignored.
    fn open_install_page(&self, _url: &str) {}
}

/// Raw answer from the bridge, routed through the inbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BridgeResponse {
    ConnectApproved { id: RequestId, address: String },
    ConnectRejected { id: RequestId, code: String },
    Balance { id: RequestId, address: String, value: String },
    AccountChanged { value: String },
}

/// One-shot reply slot for a connect request
#[derive(Debug)]
pub struct ConnectReply {
    id: RequestId,
    tx: mpsc::UnboundedSender<BridgeResponse>,
}

impl ConnectReply {
    pub(crate) fn new(id: RequestId, tx: mpsc::UnboundedSender<BridgeResponse>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn approve(self, address: impl Into<String>) {
        self.send(BridgeResponse::ConnectApproved { id: self.id, address: address.into() });
    }

    pub fn reject(self, code: impl Into<String>) {
        self.send(BridgeResponse::ConnectRejected { id: self.id, code: code.into() });
    }

    fn send(&self, response: BridgeResponse) {
        if self.tx.unbounded_send(response).is_err() {
            tracing::debug!(id = self.id, "connect reply after controller shutdown");
        }
    }
}

/// One-shot reply slot for a balance request
#[derive(Debug)]
pub struct BalanceReply {
    id: RequestId,
    address: String,
    tx: mpsc::UnboundedSender<BridgeResponse>,
}

impl BalanceReply {
    pub(crate) fn new(id: RequestId, address: String, tx: mpsc::UnboundedSender<BridgeResponse>) -> Self {
        Self { id, address, tx }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Balance string or failure marker
    pub fn deliver(self, value: impl Into<String>) {
        let response = BridgeResponse::Balance { id: self.id, address: self.address, value: value.into() };
        if self.tx.unbounded_send(response).is_err() {
            tracing::debug!(id = self.id, "balance reply after controller shutdown");
        }
    }
}

/// Multi-shot handle for out-of-band account changes
#[derive(Debug, Clone)]
pub struct AccountListener {
    tx: mpsc::UnboundedSender<BridgeResponse>,
}

impl AccountListener {
    pub(crate) fn new(tx: mpsc::UnboundedSender<BridgeResponse>) -> Self {
        Self { tx }
    }

    /// New address, or the `DISCONNECTED` sentinel
    pub fn notify(&self, value: impl Into<String>) {
        if self.tx.unbounded_send(BridgeResponse::AccountChanged { value: value.into() }).is_err() {
            tracing::debug!("account change after controller shutdown");
        }
    }
}

/// Receiving end of every bridge reply; drained by the controller
pub struct ResponseInbox {
    rx: mpsc::UnboundedReceiver<BridgeResponse>,
}

impl ResponseInbox {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<BridgeResponse>) -> Self {
        Self { rx }
    }

    pub(crate) fn try_next(&mut self) -> Option<BridgeResponse> {
        self.rx.try_next().ok().flatten()
    }

    pub(crate) async fn next(&mut self) -> Option<BridgeResponse> {
        self.rx.next().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_outliving_inbox_is_harmless() {
        let (tx, rx) = mpsc::unbounded();
        let listener = AccountListener::new(tx);
        drop(ResponseInbox::new(rx));

        listener.notify("kta1abc");
        listener.notify("DISCONNECTED");
    }

    #[test]
    fn test_listener_forwards_account_changes() {
        let (tx, rx) = mpsc::unbounded();
        let mut inbox = ResponseInbox::new(rx);
        AccountListener::new(tx).notify("kta1def");

        assert_eq!(
            inbox.try_next(),
            Some(BridgeResponse::AccountChanged { value: "kta1def".into() })
        );
    }
}

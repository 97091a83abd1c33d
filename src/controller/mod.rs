//! WalletController - connection state machine over the wallet bridge
//!
//! # State Machine
//!
//! ```text
//!                 connect()                 approve(address)
//!  Disconnected ────────────▶ Connecting ────────────────────▶ Connected ──┐
//!       ▲   │                     │                               │  ▲     │ account change
//!       │   └─ bridge unavailable │ reject(code)                  │  └─────┘ (new address)
//!       │      → Error            ▼                               │
//!       └──────────────────── Error(message)                      │
//!       ▲                                                         │
//!       └────── disconnect() / account change "DISCONNECTED" ─────┘
//! ```
//!
//! Every transition mutates state first and publishes afterwards, so an
//! observer never sees a notification ahead of the state it describes.
//! Reaching `Connected` (by connect or account switch) chains a balance
//! refresh automatically.
//!
//! # Replies
//!
//! Requests return immediately. Replies land in the [`ResponseInbox`]
//! returned by [`WalletController::new`] and are applied by
//! [`WalletController::pump`] (synchronous drain) or
//! [`WalletController::run`] (async loop). Each request carries a
//! [`RequestId`]; only the newest connect and the newest balance request are
//! honored, older replies are dropped. No timeouts, no cancellation.

mod config;

pub use config::WalletConfig;

use futures::channel::mpsc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::bridge::{
    AccountListener, BalanceReply, BridgeError, BridgeResponse, ConnectReply, RequestId, ResponseInbox, WalletBridge,
};
use crate::core::codes::{account, balance, connect, messages};
use crate::core::error::WalletError;
use crate::core::state::{ConnectionState, Phase, Snapshot};
use crate::notify::{Notification, NotificationHub, NotificationKind, Subscription};

#[derive(Debug, Default)]
struct Session {
    phase: Phase,
    state: ConnectionState,
    pending_connect: Option<RequestId>,
    pending_balance: Option<RequestId>,
}

pub struct WalletController<B> {
    bridge: B,
    config: WalletConfig,
    session: Mutex<Session>,
    hub: NotificationHub,
    replies: mpsc::UnboundedSender<BridgeResponse>,
    next_request: AtomicU64,
}

impl<B: WalletBridge> WalletController<B> {
    /// Build a disconnected controller and the inbox its replies arrive on.
    pub fn new(bridge: B, config: WalletConfig) -> (Self, ResponseInbox) {
        let (replies, rx) = mpsc::unbounded();
        let controller = Self {
            bridge,
            config,
            session: Mutex::new(Session::default()),
            hub: NotificationHub::new(),
            replies,
            next_request: AtomicU64::new(1),
        };
        (controller, ResponseInbox::new(rx))
    }

    /// Register the account-change listener. Call once at startup.
    pub fn start(&self) {
        match self.bridge.register_account_listener(AccountListener::new(self.replies.clone())) {
            Ok(()) => tracing::info!("Wallet controller started, listening for account changes"),
            Err(e) => tracing::debug!("Account change listener not registered: {}", e),
        }
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Request a connection. Reissued even when already connected.
    pub fn connect(&self) {
        let id = self.next_id();
        let (phase, superseded) = {
            let mut session = self.lock();
            (session.phase, session.pending_connect.replace(id))
        };
        tracing::info!(id, "Requesting wallet connection");

        if let Err(e) = self.bridge.request_connect(ConnectReply::new(id, self.replies.clone())) {
            tracing::warn!(id, "Connect request failed: {}", e);
            // A request that never reached the wallet must not orphan the one in flight.
            {
                let mut session = self.lock();
                if session.pending_connect == Some(id) {
                    session.pending_connect = superseded;
                }
            }
            self.fail(connect_failure(e));
            return;
        }

        let mut session = self.lock();
        if session.pending_connect == Some(id) && phase == Phase::Disconnected && session.phase == Phase::Disconnected {
            session.phase = Phase::Connecting;
        }
    }

    /// Clear address and balance and publish `Disconnected`. Idempotent.
    pub fn disconnect(&self) {
        {
            let mut session = self.lock();
            session.phase = Phase::Disconnected;
            session.state.clear();
            session.pending_connect = None;
            session.pending_balance = None;
        }
        tracing::info!("Wallet disconnected");
        self.hub.publish(Notification::Disconnected(messages::DISCONNECTED.into()));
    }

    /// Ask the bridge for the balance of the connected address.
    pub fn refresh_balance(&self) {
        let current = self.lock().state.address.clone();
        let address = match current {
            Some(address) => address,
            None => {
                self.fail(WalletError::NotConnected);
                return;
            }
        };

        let id = self.next_id();
        let superseded = self.lock().pending_balance.replace(id);
        tracing::debug!(id, %address, "Fetching balance");

        let reply = BalanceReply::new(id, address.clone(), self.replies.clone());
        if let Err(e) = self.bridge.request_balance(&address, reply) {
            tracing::warn!(id, "Balance request failed: {}", e);
            {
                let mut session = self.lock();
                if session.pending_balance == Some(id) {
                    session.pending_balance = superseded;
                }
            }
            self.fail(balance_failure(e));
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn is_connected(&self) -> bool {
        self.lock().state.is_connected()
    }

    pub fn address(&self) -> Option<String> {
        self.lock().state.address.clone()
    }

    pub fn balance(&self) -> Option<String> {
        self.lock().state.balance.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = self.lock();
        Snapshot::new(session.phase, &session.state)
    }

    /// Whether the extension is present in the host page
    pub fn is_wallet_detected(&self) -> bool {
        self.bridge.detect_wallet()
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn subscribe_to(&self, kinds: &[NotificationKind]) -> Subscription {
        self.hub.subscribe_to(kinds)
    }

    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    // =========================================================================
    // REPLY HANDLING
    // =========================================================================

    /// Apply every reply already in the inbox. Returns how many were applied.
    pub fn pump(&self, inbox: &mut ResponseInbox) -> usize {
        let mut applied = 0;
        while let Some(response) = inbox.try_next() {
            self.dispatch(response);
            applied += 1;
        }
        applied
    }

    /// Apply replies as they arrive, for as long as the controller lives.
    pub async fn run(&self, mut inbox: ResponseInbox) {
        while let Some(response) = inbox.next().await {
            self.dispatch(response);
        }
    }

    fn dispatch(&self, response: BridgeResponse) {
        match response {
            BridgeResponse::ConnectApproved { id, address } => self.on_connect_approved(id, address),
            BridgeResponse::ConnectRejected { id, code } => self.on_connect_rejected(id, code),
            BridgeResponse::Balance { id, address, value } => self.on_balance(id, &address, value),
            BridgeResponse::AccountChanged { value } => self.on_account_changed(value),
        }
    }

    fn on_connect_approved(&self, id: RequestId, address: String) {
        if address.trim().is_empty() {
            tracing::warn!(id, "Wallet approved connection without an account");
            self.on_connect_rejected(id, connect::NO_ACCOUNTS.into());
            return;
        }
        {
            let mut session = self.lock();
            if session.pending_connect != Some(id) {
                tracing::warn!(id, "Dropping stale connect approval");
                return;
            }
            session.pending_connect = None;
            Self::adopt_address(&mut session, &address);
        }
        tracing::info!(id, %address, "Wallet connected");
        self.hub.publish(Notification::Connected(address));
        self.refresh_balance();
    }

    fn on_connect_rejected(&self, id: RequestId, code: String) {
        {
            let mut session = self.lock();
            if session.pending_connect != Some(id) {
                tracing::warn!(id, %code, "Dropping stale connect rejection");
                return;
            }
            session.pending_connect = None;
            if session.phase == Phase::Connecting {
                session.phase = Phase::Disconnected;
            }
        }
        tracing::warn!(id, %code, "Connection error");
        let error = WalletError::Connection(code);
        let open_page = error.wants_install_page() && self.config.open_install_page;
        self.fail(error);
        if open_page {
            self.bridge.open_install_page(&self.config.install_url);
        }
    }

    fn on_balance(&self, id: RequestId, address: &str, value: String) {
        {
            let mut session = self.lock();
            if session.pending_balance != Some(id) || session.state.address.as_deref() != Some(address) {
                tracing::warn!(id, %address, "Dropping stale balance reply");
                return;
            }
            session.pending_balance = None;
            if !balance::is_sentinel(&value) {
                session.state.balance = Some(value.clone());
            }
        }
        if balance::is_sentinel(&value) {
            self.fail(WalletError::Balance(value));
            return;
        }
        tracing::info!(id, %value, "Balance received");
        self.hub.publish(Notification::BalanceUpdated(value));
    }

    fn on_account_changed(&self, value: String) {
        if value == account::DISCONNECTED {
            tracing::info!("Wallet reported disconnect");
            self.disconnect();
            return;
        }
        if value.trim().is_empty() {
            tracing::warn!("Ignoring empty account change");
            return;
        }
        {
            let mut session = self.lock();
            match session.phase {
                Phase::Disconnected => {
                    tracing::debug!(%value, "Account change while disconnected, ignored");
                    return;
                }
                Phase::Connecting => session.pending_connect = None,
                Phase::Connected => {}
            }
            Self::adopt_address(&mut session, &value);
        }
        tracing::info!(address = %value, "Wallet account changed");
        self.hub.publish(Notification::Connected(value));
        self.refresh_balance();
    }

    // A different account invalidates the balance and any balance in flight.
    fn adopt_address(session: &mut Session, address: &str) {
        if session.state.address.as_deref() != Some(address) {
            session.state.balance = None;
            session.pending_balance = None;
        }
        session.state.address = Some(address.to_string());
        session.phase = Phase::Connected;
    }

    fn fail(&self, error: WalletError) {
        if error.is_environment() {
            tracing::debug!("{}", error);
        } else {
            tracing::warn!("{}", error);
        }
        self.hub.publish(Notification::Error(error.to_string()));
    }

    fn next_id(&self) -> RequestId {
        self.next_request.fetch_add(1, Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn connect_failure(error: BridgeError) -> WalletError {
    match error {
        BridgeError::Unavailable => WalletError::ConnectUnavailable,
        BridgeError::Call(reason) => WalletError::Connection(reason),
    }
}

fn balance_failure(error: BridgeError) -> WalletError {
    match error {
        BridgeError::Unavailable => WalletError::BalanceUnavailable,
        BridgeError::Call(_) => WalletError::Balance(balance::ERROR.into()),
    }
}

//! keethings-link: connection controller for the Keethings browser wallet.
//!
//! # Architecture
//!
//! ```text
//! StatusPresenter (observer, renders into a ViewSink)
//!   ▲
//!   │ Subscription (Connected / Disconnected / BalanceUpdated / Error)
//!   │
//! WalletController (state machine: Disconnected → Connecting → Connected)
//!   │        ▲
//!   │        └── ResponseInbox ◀── reply slots (approve / reject / deliver / notify)
//!   ▼
//! WalletBridge
//!   ├── JsBridge          (browser build: window.keethingsBridge)
//!   ├── UnavailableBridge (any other host)
//!   └── ScriptedBridge    (tests, CLI simulator)
//! ```
//!
//! # Operations
//!
//! | Operation | Method | Outcome |
//! |-----------|--------|---------|
//! | connect | `controller.connect()` | `Connected(address)` then a balance refresh, or `Error` |
//! | disconnect | `controller.disconnect()` | `Disconnected` (always, idempotent) |
//! | refresh | `controller.refresh_balance()` | `BalanceUpdated(balance)` or `Error` |
//! | read | `is_connected()` / `address()` / `balance()` | current state, no side effects |
//!
//! # Features
//!
//! - `native` - CLI simulator, tokio, stderr logging (default)
//! - `wasm` - browser bindings over wasm-bindgen
//!
//! # Usage
//!
//! ```
//! use keethings_link::{Notification, ScriptedBridge, WalletConfig, WalletController};
//!
//! let bridge = ScriptedBridge::new().approving("kta1abc").with_balance("9000000000");
//! let (controller, mut inbox) = WalletController::new(bridge, WalletConfig::default());
//! let mut events = controller.subscribe();
//!
//! controller.connect();
//! while controller.pump(&mut inbox) > 0 {}
//!
//! assert_eq!(events.try_next(), Some(Notification::Connected("kta1abc".into())));
//! assert_eq!(events.try_next(), Some(Notification::BalanceUpdated("9000000000".into())));
//! assert_eq!(controller.balance().as_deref(), Some("9000000000"));
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod bridge;
pub mod controller;
pub mod core;
pub mod notify;
pub mod presenter;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use bridge::{
    AccountListener, BalanceReply, BridgeError, ConnectReply, RequestId, ResponseInbox, ScriptedBridge,
    UnavailableBridge, WalletBridge,
};
pub use controller::{WalletConfig, WalletController};
pub use core::balance::{format_balance, KTA_DECIMALS};
pub use core::error::WalletError;
pub use core::state::{ConnectionState, Phase, Snapshot};
pub use notify::{Notification, NotificationHub, NotificationKind, Subscription};
pub use presenter::{project, Controls, StatusLine, StatusPresenter, StatusTone, ViewSink, ViewUpdate};

#[cfg(feature = "wasm")]
pub use wasm::{JsBridge, KeethingsWallet, WalletSubscription};

//! WASM module: Keethings wallet in the browser
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        KeethingsWallet (JS API)         │
//! │  connect, disconnect, refreshBalance,   │
//! │  onNotification                         │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │      WalletController<JsBridge>         │
//! │  state machine + run loop (spawn_local) │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   JsBridge → window.keethingsBridge     │
//! │  detectWallet, connectWallet,           │
//! │  getBalance, onAccountChange            │
//! └─────────────────────────────────────────┘
//! ```

mod bridge;
mod wallet;

pub use bridge::JsBridge;
pub use wallet::{KeethingsWallet, WalletSubscription};

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

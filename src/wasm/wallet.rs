//! KeethingsWallet: the controller exposed to JavaScript
//!
//! ```javascript
//! import { KeethingsWallet } from 'keethings-link';
//!
//! const wallet = new KeethingsWallet({ ticker: 'KTA' });
//! const sub = wallet.onNotification(({ kind, value }) => {
//!     if (kind === 'connected') showAddress(value);
//!     if (kind === 'balanceUpdated') showBalance(wallet.formatBalance(value));
//!     if (kind === 'error') showError(value);
//! });
//! wallet.connect();
//! // later
//! sub.unsubscribe();
//! ```

use futures::future::{abortable, AbortHandle};
use futures::StreamExt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::bridge::JsBridge;
use super::log;
use crate::controller::{WalletConfig, WalletController};
use crate::core::balance::format_balance;

#[wasm_bindgen]
pub struct KeethingsWallet {
    controller: Rc<WalletController<JsBridge>>,
}

#[wasm_bindgen]
impl KeethingsWallet {
    /// Create the controller, register the account listener and start the
    /// reply loop. `config` is an optional `WalletConfig`-shaped object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<KeethingsWallet, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            WalletConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let (controller, inbox) = WalletController::new(JsBridge::new(), config);
        let controller = Rc::new(controller);
        controller.start();

        let runner = controller.clone();
        spawn_local(async move { runner.run(inbox).await });
        log!("[KeethingsWallet] initialized");

        Ok(Self { controller })
    }

    pub fn connect(&self) {
        self.controller.connect();
    }

    pub fn disconnect(&self) {
        self.controller.disconnect();
    }

    #[wasm_bindgen(js_name = "refreshBalance")]
    pub fn refresh_balance(&self) {
        self.controller.refresh_balance();
    }

    #[wasm_bindgen(js_name = "isConnected")]
    pub fn is_connected(&self) -> bool {
        self.controller.is_connected()
    }

    #[wasm_bindgen(js_name = "isWalletDetected")]
    pub fn is_wallet_detected(&self) -> bool {
        self.controller.is_wallet_detected()
    }

    #[wasm_bindgen(getter)]
    pub fn address(&self) -> Option<String> {
        self.controller.address()
    }

    #[wasm_bindgen(getter)]
    pub fn balance(&self) -> Option<String> {
        self.controller.balance()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.controller.phase().as_str().to_string()
    }

    /// `{phase, connected, address, balance}`
    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.controller.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Smallest units to display units, using the configured decimals.
    /// Non-numeric input comes back unchanged.
    #[wasm_bindgen(js_name = "formatBalance")]
    pub fn format_balance(&self, raw: &str) -> String {
        format_balance(raw, self.controller.config().decimals).unwrap_or_else(|| raw.to_string())
    }

    /// Call `callback({kind, value})` for every notification from now on.
    #[wasm_bindgen(js_name = "onNotification")]
    pub fn on_notification(&self, callback: js_sys::Function) -> WalletSubscription {
        let mut subscription = self.controller.subscribe();
        let (task, handle) = abortable(async move {
            while let Some(notification) = subscription.next().await {
                let value = serde_wasm_bindgen::to_value(&notification).unwrap_or(JsValue::NULL);
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    log!("[KeethingsWallet] notification callback threw: {:?}", e);
                }
            }
        });
        spawn_local(async move {
            let _ = task.await;
        });
        WalletSubscription { handle }
    }
}

/// Disposable notification subscription
#[wasm_bindgen]
pub struct WalletSubscription {
    handle: AbortHandle,
}

#[wasm_bindgen]
impl WalletSubscription {
    pub fn unsubscribe(&self) {
        self.handle.abort();
    }
}

impl Drop for WalletSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

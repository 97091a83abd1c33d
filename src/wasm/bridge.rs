//! JsBridge - WalletBridge over `window.keethingsBridge`
//!
//! The page script owns the extension handshake (including retries while the
//! extension is still injecting). This side only hands it callbacks:
//!
//! | JS function | Callbacks |
//! |-------------|-----------|
//! | `detectWallet()` | returns boolean |
//! | `connectWallet(onSuccess, onError)` | one of them, once, with address / error code |
//! | `getBalance(address, onBalance)` | once, with balance or failure marker |
//! | `onAccountChange(callback)` | any number of times, address or `"DISCONNECTED"` |

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::bridge::{AccountListener, BalanceReply, BridgeError, ConnectReply, WalletBridge};

const BRIDGE_GLOBAL: &str = "keethingsBridge";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = keethingsBridge, js_name = detectWallet)]
    fn js_detect_wallet() -> Result<bool, JsValue>;

    #[wasm_bindgen(catch, js_namespace = keethingsBridge, js_name = connectWallet)]
    fn js_connect_wallet(on_success: &JsValue, on_error: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = keethingsBridge, js_name = getBalance)]
    fn js_get_balance(address: &str, on_balance: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch, js_namespace = keethingsBridge, js_name = onAccountChange)]
    fn js_on_account_change(callback: &JsValue) -> Result<(), JsValue>;
}

fn bridge_present() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str(BRIDGE_GLOBAL)).unwrap_or(false)
}

fn call_error(e: JsValue) -> BridgeError {
    BridgeError::Call(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

#[derive(Default)]
pub struct JsBridge {
    account_callback: RefCell<Option<Closure<dyn FnMut(String)>>>,
}

impl JsBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_present(&self) -> Result<(), BridgeError> {
        if bridge_present() { Ok(()) } else { Err(BridgeError::Unavailable) }
    }
}

impl WalletBridge for JsBridge {
    fn detect_wallet(&self) -> bool {
        bridge_present() && js_detect_wallet().unwrap_or(false)
    }

    fn request_connect(&self, reply: ConnectReply) -> Result<(), BridgeError> {
        self.ensure_present()?;
        // Both callbacks share the slot; whichever fires first consumes it.
        let slot = Rc::new(RefCell::new(Some(reply)));
        let on_success = {
            let slot = slot.clone();
            Closure::once_into_js(move |address: String| {
                let reply = slot.borrow_mut().take();
                if let Some(reply) = reply {
                    reply.approve(address);
                }
            })
        };
        let on_error = Closure::once_into_js(move |code: String| {
            let reply = slot.borrow_mut().take();
            if let Some(reply) = reply {
                reply.reject(code);
            }
        });
        js_connect_wallet(&on_success, &on_error).map_err(call_error)
    }

    fn request_balance(&self, address: &str, reply: BalanceReply) -> Result<(), BridgeError> {
        self.ensure_present()?;
        let on_balance = Closure::once_into_js(move |value: String| reply.deliver(value));
        js_get_balance(address, &on_balance).map_err(call_error)
    }

    fn register_account_listener(&self, listener: AccountListener) -> Result<(), BridgeError> {
        self.ensure_present()?;
        let callback = Closure::<dyn FnMut(String)>::new(move |value: String| listener.notify(value));
        js_on_account_change(callback.as_ref()).map_err(call_error)?;
        *self.account_callback.borrow_mut() = Some(callback);
        Ok(())
    }

    fn open_install_page(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.open_with_url_and_target(url, "_blank");
        }
    }
}

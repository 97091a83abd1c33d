//! ScriptedBridge - in-process wallet for tests and the CLI simulator
//!
//! Requests are recorded. Reply slots are either answered immediately from a
//! script (`approving`, `with_balance`) or parked until the caller takes them
//! with `take_connect` / `take_balance` and answers at a moment of its choice.
//! Clones share the same wallet.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AccountListener, BalanceReply, BridgeError, ConnectReply, WalletBridge};

#[derive(Debug)]
struct Script {
    available: bool,
    detected: bool,
    call_error: Option<String>,
    connect_outcome: Option<Result<String, String>>,
    balance_outcome: Option<String>,
    parked_connects: VecDeque<ConnectReply>,
    parked_balances: VecDeque<BalanceReply>,
    connect_calls: usize,
    balance_calls: Vec<String>,
    listener: Option<AccountListener>,
    install_pages: Vec<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            available: true,
            detected: true,
            call_error: None,
            connect_outcome: None,
            balance_outcome: None,
            parked_connects: VecDeque::new(),
            parked_balances: VecDeque::new(),
            connect_calls: 0,
            balance_calls: Vec::new(),
            listener: None,
            install_pages: Vec::new(),
        }
    }
}

impl Script {
    fn check(&self) -> Result<(), BridgeError> {
        if !self.available {
            return Err(BridgeError::Unavailable);
        }
        match &self.call_error {
            Some(reason) => Err(BridgeError::Call(reason.clone())),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedBridge {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBridge {
    /// Wallet present, every reply parked
    pub fn new() -> Self {
        Self::default()
    }

    /// Extension missing from the page: requests fail synchronously
    pub fn offline() -> Self {
        let bridge = Self::new();
        {
            let mut script = bridge.lock();
            script.available = false;
            script.detected = false;
        }
        bridge
    }

    /// Answer every connect with `address`
    pub fn approving(self, address: impl Into<String>) -> Self {
        self.lock().connect_outcome = Some(Ok(address.into()));
        self
    }

    /// Answer every connect with error `code`
    pub fn rejecting(self, code: impl Into<String>) -> Self {
        self.lock().connect_outcome = Some(Err(code.into()));
        self
    }

    /// Answer every balance request with `value`
    pub fn with_balance(self, value: impl Into<String>) -> Self {
        self.set_balance(value);
        self
    }

    pub fn with_detected(self, detected: bool) -> Self {
        self.lock().detected = detected;
        self
    }

    pub fn set_balance(&self, value: impl Into<String>) {
        self.lock().balance_outcome = Some(value.into());
    }

    /// Extension removed from (or restored to) the page mid-session
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Make every connect and balance call throw with `reason`; `None` heals it
    pub fn set_call_error(&self, reason: Option<&str>) {
        self.lock().call_error = reason.map(str::to_string);
    }

    /// Oldest parked connect reply
    pub fn take_connect(&self) -> Option<ConnectReply> {
        self.lock().parked_connects.pop_front()
    }

    /// Oldest parked balance reply
    pub fn take_balance(&self) -> Option<BalanceReply> {
        self.lock().parked_balances.pop_front()
    }

    pub fn connect_requests(&self) -> usize {
        self.lock().connect_calls
    }

    /// Addresses of every balance request, in order
    pub fn balance_requests(&self) -> Vec<String> {
        self.lock().balance_calls.clone()
    }

    pub fn account_listener(&self) -> Option<AccountListener> {
        self.lock().listener.clone()
    }

    /// Fire the registered account listener. False if none is registered.
    pub fn change_account(&self, value: impl Into<String>) -> bool {
        match self.account_listener() {
            Some(listener) => {
                listener.notify(value);
                true
            }
            None => false,
        }
    }

    pub fn opened_install_pages(&self) -> Vec<String> {
        self.lock().install_pages.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WalletBridge for ScriptedBridge {
    fn detect_wallet(&self) -> bool {
        self.lock().detected
    }

    fn request_connect(&self, reply: ConnectReply) -> Result<(), BridgeError> {
        let mut script = self.lock();
        script.check()?;
        script.connect_calls += 1;
        match script.connect_outcome.clone() {
            Some(Ok(address)) => reply.approve(address),
            Some(Err(code)) => reply.reject(code),
            None => script.parked_connects.push_back(reply),
        }
        Ok(())
    }

    fn request_balance(&self, address: &str, reply: BalanceReply) -> Result<(), BridgeError> {
        let mut script = self.lock();
        script.check()?;
        script.balance_calls.push(address.to_string());
        match script.balance_outcome.clone() {
            Some(value) => reply.deliver(value),
            None => script.parked_balances.push_back(reply),
        }
        Ok(())
    }

    fn register_account_listener(&self, listener: AccountListener) -> Result<(), BridgeError> {
        let mut script = self.lock();
        if !script.available {
            return Err(BridgeError::Unavailable);
        }
        script.listener = Some(listener);
        Ok(())
    }

    fn open_install_page(&self, url: &str) {
        self.lock().install_pages.push(url.to_string());
    }
}

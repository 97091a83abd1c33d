//! Connection state owned by the controller

use serde::Serialize;

/// Where the connection state machine currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Disconnected => "disconnected",
            Phase::Connecting => "connecting",
            Phase::Connected => "connected",
        }
    }
}

/// Address and last known balance. `connected` is derived from `address`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionState {
    pub address: Option<String>,
    /// Smallest-unit decimal string, stored exactly as the bridge sent it
    pub balance: Option<String>,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.address = None;
        self.balance = None;
    }
}

/// Point-in-time copy of the controller state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub connected: bool,
    pub address: Option<String>,
    pub balance: Option<String>,
}

impl Snapshot {
    pub(crate) fn new(phase: Phase, state: &ConnectionState) -> Self {
        Self {
            phase,
            connected: state.is_connected(),
            address: state.address.clone(),
            balance: state.balance.clone(),
        }
    }
}

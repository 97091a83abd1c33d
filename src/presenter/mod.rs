//! StatusPresenter - projects controller notifications onto a view
//!
//! The presenter owns a subscription and a [`ViewSink`] (the rendering layer,
//! external to this crate). Each notification becomes one [`ViewUpdate`]
//! through the pure function [`project`]; the presenter keeps no view state
//! of its own.
//!
//! | Notification | Status | Address | Balance | Controls |
//! |--------------|--------|---------|---------|----------|
//! | `Connected(a)` | Connected | `Address: a` | `Loading...` | disconnect |
//! | `Disconnected(_)` | Not Connected | `Address: -` | `-` | connect |
//! | `BalanceUpdated(b)` | | | formatted `b` | |
//! | `Error(m)` | `Error: m` | | | |

use futures::StreamExt;
use serde::Serialize;

use crate::bridge::WalletBridge;
use crate::controller::{WalletConfig, WalletController};
use crate::core::balance::format_balance;
use crate::notify::{Notification, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Neutral,
    Connected,
    Disconnected,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

/// Which of the two mutually exclusive buttons is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Controls {
    Connect,
    Disconnect,
}

/// Partial view change; `None` fields are left as they are
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<Controls>,
}

impl ViewUpdate {
    /// Before any notification: only the connect button
    pub fn initial() -> Self {
        Self { controls: Some(Controls::Connect), ..Default::default() }
    }

    /// Shown between a user-initiated connect and its outcome
    pub fn connecting() -> Self {
        Self { status: Some(status("Wallet Status: Connecting...", StatusTone::Neutral)), ..Default::default() }
    }
}

/// Rendering layer
pub trait ViewSink {
    fn render(&mut self, update: &ViewUpdate);
}

impl ViewSink for Vec<ViewUpdate> {
    fn render(&mut self, update: &ViewUpdate) {
        self.push(update.clone());
    }
}

/// Map a notification to the view change it causes
pub fn project(notification: &Notification, config: &WalletConfig) -> ViewUpdate {
    let ticker = &config.ticker;
    match notification {
        Notification::Connected(address) => ViewUpdate {
            status: Some(status("Wallet Status: Connected", StatusTone::Connected)),
            address: Some(format!("Address: {}", address)),
            balance: Some(format!("{} Balance: Loading...", ticker)),
            controls: Some(Controls::Disconnect),
        },
        Notification::Disconnected(_) => ViewUpdate {
            status: Some(status("Wallet Status: Not Connected", StatusTone::Disconnected)),
            address: Some("Address: -".into()),
            balance: Some(format!("{} Balance: -", ticker)),
            controls: Some(Controls::Connect),
        },
        Notification::BalanceUpdated(raw) => {
            let text = match format_balance(raw, config.decimals) {
                Some(amount) => format!("{} Balance: {} {}", ticker, amount, ticker),
                None => format!("{} Balance: {}", ticker, raw),
            };
            ViewUpdate { balance: Some(text), ..Default::default() }
        }
        Notification::Error(message) => ViewUpdate {
            status: Some(status(format!("Error: {}", message), StatusTone::Error)),
            ..Default::default()
        },
    }
}

fn status(text: impl Into<String>, tone: StatusTone) -> StatusLine {
    StatusLine { text: text.into(), tone }
}

pub struct StatusPresenter<S: ViewSink> {
    subscription: Subscription,
    sink: S,
    config: WalletConfig,
}

impl<S: ViewSink> StatusPresenter<S> {
    /// Take over `subscription` and render the initial view.
    pub fn new(subscription: Subscription, mut sink: S, config: WalletConfig) -> Self {
        sink.render(&ViewUpdate::initial());
        Self { subscription, sink, config }
    }

    /// Subscribe to every notification kind of `controller`.
    pub fn attach<B: WalletBridge>(controller: &WalletController<B>, sink: S) -> Self {
        Self::new(controller.subscribe(), sink, controller.config().clone())
    }

    /// Render the connecting status, then ask `controller` to connect.
    pub fn connect<B: WalletBridge>(&mut self, controller: &WalletController<B>) {
        self.sink.render(&ViewUpdate::connecting());
        controller.connect();
    }

    /// Render every notification already delivered.
    pub fn pump(&mut self) -> usize {
        let mut rendered = 0;
        while let Some(notification) = self.subscription.try_next() {
            self.show(&notification);
            rendered += 1;
        }
        rendered
    }

    /// Wait for the next notification, render it, and hand it back.
    pub async fn next(&mut self) -> Option<Notification> {
        let notification = self.subscription.next().await?;
        self.show(&notification);
        Some(notification)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Unsubscribe and give the sink back.
    pub fn teardown(self) -> S {
        let Self { subscription, sink, .. } = self;
        subscription.unsubscribe();
        sink
    }

    fn show(&mut self, notification: &Notification) {
        tracing::debug!(kind = ?notification.kind(), "Rendering notification");
        let update = project(notification, &self.config);
        self.sink.render(&update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_projection_formats_smallest_units() {
        let update = project(&Notification::BalanceUpdated("9000000000".into()), &WalletConfig::default());
        assert_eq!(update.balance.as_deref(), Some("KTA Balance: 9.000000000 KTA"));
        assert!(update.status.is_none());
    }

    #[test]
    fn test_non_numeric_balance_passes_through() {
        let update = project(&Notification::BalanceUpdated("n/a".into()), &WalletConfig::default());
        assert_eq!(update.balance.as_deref(), Some("KTA Balance: n/a"));
    }

    #[test]
    fn test_error_projection_only_touches_status() {
        let update = project(&Notification::Error("No wallet connected".into()), &WalletConfig::default());
        assert_eq!(
            update.status,
            Some(StatusLine { text: "Error: No wallet connected".into(), tone: StatusTone::Error })
        );
        assert_eq!(update.address, None);
        assert_eq!(update.controls, None);
    }

    #[test]
    fn test_connected_then_disconnected_swap_controls() {
        let config = WalletConfig::default();
        let connected = project(&Notification::Connected("kta1abc".into()), &config);
        assert_eq!(connected.address.as_deref(), Some("Address: kta1abc"));
        assert_eq!(connected.balance.as_deref(), Some("KTA Balance: Loading..."));
        assert_eq!(connected.controls, Some(Controls::Disconnect));

        let disconnected = project(&Notification::Disconnected("Wallet disconnected".into()), &config);
        assert_eq!(disconnected.address.as_deref(), Some("Address: -"));
        assert_eq!(disconnected.balance.as_deref(), Some("KTA Balance: -"));
        assert_eq!(disconnected.controls, Some(Controls::Connect));
    }

    #[test]
    fn test_custom_ticker() {
        let config = WalletConfig::default().with_ticker("tKTA").with_decimals(2);
        let update = project(&Notification::BalanceUpdated("150".into()), &config);
        assert_eq!(update.balance.as_deref(), Some("tKTA Balance: 1.50 tKTA"));
    }
}

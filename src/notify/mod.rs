//! Notifications: typed broadcast from the controller to its observers
//!
//! # Delivery
//!
//! ```text
//! controller ──publish(Notification)──▶ NotificationHub
//!                                           │  (fan-out, filtered by kind)
//!                         ┌─────────────────┼─────────────────┐
//!                         ▼                 ▼                 ▼
//!                   Subscription      Subscription      Subscription
//!                  (dropped = gone)
//! ```
//!
//! Notifications are fire-once. A subscription only sees what was published
//! after it was created. Dropping a [`Subscription`] removes it from the hub.

use futures::channel::mpsc;
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll};

/// Event published by the controller after its state mutation has landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Notification {
    Connected(String),
    Disconnected(String),
    BalanceUpdated(String),
    Error(String),
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Connected(_) => NotificationKind::Connected,
            Notification::Disconnected(_) => NotificationKind::Disconnected,
            Notification::BalanceUpdated(_) => NotificationKind::BalanceUpdated,
            Notification::Error(_) => NotificationKind::Error,
        }
    }

    /// Payload: address, reason, balance or message
    pub fn value(&self) -> &str {
        match self {
            Notification::Connected(v)
            | Notification::Disconnected(v)
            | Notification::BalanceUpdated(v)
            | Notification::Error(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Connected,
    Disconnected,
    BalanceUpdated,
    Error,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 4] = [
        NotificationKind::Connected,
        NotificationKind::Disconnected,
        NotificationKind::BalanceUpdated,
        NotificationKind::Error,
    ];

    fn bit(self) -> u8 {
        match self {
            NotificationKind::Connected => 1,
            NotificationKind::Disconnected => 1 << 1,
            NotificationKind::BalanceUpdated => 1 << 2,
            NotificationKind::Error => 1 << 3,
        }
    }
}

struct Subscriber {
    id: u64,
    mask: u8,
    tx: mpsc::UnboundedSender<Notification>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<Subscriber>,
}

/// Fan-out point for notifications. Cloning shares the subscriber list.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<Mutex<Subscribers>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every notification kind
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_to(&NotificationKind::ALL)
    }

    /// Subscribe to a subset of kinds
    pub fn subscribe_to(&self, kinds: &[NotificationKind]) -> Subscription {
        let mask = kinds.iter().fold(0u8, |acc, k| acc | k.bit());
        let (tx, rx) = mpsc::unbounded();
        let mut subs = self.lock();
        subs.next_id += 1;
        let id = subs.next_id;
        subs.entries.push(Subscriber { id, mask, tx });
        tracing::debug!(id, "subscriber attached");
        Subscription { id, rx, hub: Arc::downgrade(&self.inner) }
    }

    /// Deliver to every live subscriber interested in this kind
    pub fn publish(&self, notification: Notification) {
        let bit = notification.kind().bit();
        let mut subs = self.lock();
        subs.entries.retain(|sub| {
            if sub.mask & bit == 0 {
                return true;
            }
            sub.tx.unbounded_send(notification.clone()).is_ok()
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Subscribers> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Live subscription. Released from the hub when dropped.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<Notification>,
    hub: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next already-delivered notification, without waiting
    pub fn try_next(&mut self) -> Option<Notification> {
        self.rx.try_next().ok().flatten()
    }

    /// Everything delivered so far
    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    pub fn unsubscribe(self) {}
}

impl Stream for Subscription {
    type Item = Notification;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut subs = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            subs.entries.retain(|sub| sub.id != self.id);
            tracing::debug!(id = self.id, "subscriber released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_late_subscriber_sees_nothing_retroactively() {
        let hub = NotificationHub::new();
        hub.publish(Notification::Connected("kta1abc".into()));
        let mut sub = hub.subscribe();
        assert_eq!(sub.try_next(), None);

        hub.publish(Notification::BalanceUpdated("1".into()));
        assert_eq!(sub.drain(), vec![Notification::BalanceUpdated("1".into())]);
    }

    #[test]
    fn test_kind_filter() {
        let hub = NotificationHub::new();
        let mut errors = hub.subscribe_to(&[NotificationKind::Error]);
        hub.publish(Notification::Connected("kta1abc".into()));
        hub.publish(Notification::Error("boom".into()));
        assert_eq!(errors.drain(), vec![Notification::Error("boom".into())]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = NotificationHub::new();
        let first = hub.subscribe();
        let _second = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 2);
        first.unsubscribe();
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn test_serializes_as_tagged_value() {
        let json = serde_json::to_value(Notification::BalanceUpdated("9000000000".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "balanceUpdated", "value": "9000000000"}));
    }
}

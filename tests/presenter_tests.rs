//! Presenter Test Suite: notifications rendered into a recording sink
//!
//! Test 1: full session renders initial → connecting → connected → balance
//! Test 2: errors only touch the status line
//! Test 3: teardown releases the subscription
//! Test 4: async run loop + presenter.next()

use futures::StreamExt;
use keethings_link::{
    Controls, Notification, ScriptedBridge, StatusPresenter, StatusTone, ViewUpdate, WalletConfig, WalletController,
};

/// Test 1: session as the user sees it, 9000000000 renders as 9.000000000
#[test]
fn session_renders_in_order() {
    let bridge = ScriptedBridge::new().approving("kta1abc").with_balance("9000000000");
    let (controller, mut inbox) = WalletController::new(bridge, WalletConfig::default());
    let mut presenter = StatusPresenter::attach(&controller, Vec::<ViewUpdate>::new());

    presenter.connect(&controller);
    while controller.pump(&mut inbox) > 0 {}
    assert_eq!(presenter.pump(), 2);

    controller.disconnect();
    assert_eq!(presenter.pump(), 1);

    let views = presenter.sink();
    assert_eq!(views.len(), 5);
    assert_eq!(views[0], ViewUpdate::initial());
    assert_eq!(views[1].status.as_ref().map(|s| s.text.as_str()), Some("Wallet Status: Connecting..."));

    assert_eq!(views[2].status.as_ref().map(|s| s.tone), Some(StatusTone::Connected));
    assert_eq!(views[2].address.as_deref(), Some("Address: kta1abc"));
    assert_eq!(views[2].balance.as_deref(), Some("KTA Balance: Loading..."));
    assert_eq!(views[2].controls, Some(Controls::Disconnect));

    assert_eq!(views[3].balance.as_deref(), Some("KTA Balance: 9.000000000 KTA"));

    assert_eq!(views[4].status.as_ref().map(|s| s.text.as_str()), Some("Wallet Status: Not Connected"));
    assert_eq!(views[4].controls, Some(Controls::Connect));
}

/// Test 2: a connect failure leaves address and controls alone
#[test]
fn error_updates_status_only() {
    let bridge = ScriptedBridge::new().rejecting("CONNECTION_REJECTED");
    let (controller, mut inbox) = WalletController::new(bridge, WalletConfig::default());
    let mut presenter = StatusPresenter::attach(&controller, Vec::<ViewUpdate>::new());

    presenter.connect(&controller);
    controller.pump(&mut inbox);
    presenter.pump();

    let last = presenter.sink().last().cloned().unwrap();
    let status = last.status.unwrap();
    assert_eq!(status.text, "Error: Connection request rejected by user.");
    assert_eq!(status.tone, StatusTone::Error);
    assert_eq!(last.address, None);
    assert_eq!(last.controls, None);
}

/// Test 3: dropping the presenter's subscription detaches it from the controller
#[test]
fn teardown_unsubscribes() {
    let (controller, _inbox) = WalletController::new(ScriptedBridge::new(), WalletConfig::default());
    let presenter = StatusPresenter::attach(&controller, Vec::<ViewUpdate>::new());
    assert_eq!(controller.subscriber_count(), 1);

    let views = presenter.teardown();
    assert_eq!(controller.subscriber_count(), 0);
    assert_eq!(views, vec![ViewUpdate::initial()]);

    // publishing with nobody listening is fine
    controller.disconnect();
    assert_eq!(controller.subscriber_count(), 0);
}

/// Test 4: replies applied by the async loop reach the presenter
#[tokio::test]
async fn run_loop_drives_presenter() {
    let bridge = ScriptedBridge::new().approving("kta1abc").with_balance("1500000000");
    let (controller, inbox) = WalletController::new(bridge, WalletConfig::default());
    let mut presenter = StatusPresenter::attach(&controller, Vec::<ViewUpdate>::new());
    let mut raw = controller.subscribe();

    presenter.connect(&controller);
    let seen = tokio::select! {
        _ = controller.run(inbox) => panic!("reply loop ended"),
        seen = async {
            let connected = presenter.next().await;
            let balance = presenter.next().await;
            (connected, balance)
        } => seen,
    };

    assert_eq!(seen.0, Some(Notification::Connected("kta1abc".into())));
    assert_eq!(seen.1, Some(Notification::BalanceUpdated("1500000000".into())));
    assert_eq!(
        presenter.sink().last().and_then(|v| v.balance.clone()).as_deref(),
        Some("KTA Balance: 1.500000000 KTA")
    );
    assert_eq!(raw.next().await, Some(Notification::Connected("kta1abc".into())));
}

use std::sync::Arc;

use tokio_test::{assert_pending, assert_ready, task};

use crate::app::{self, Server};
use crate::support::{new_app, wait_app, wait_until, MockServer};

#[tokio::test]
async fn test_zero_servers_start_then_stop() {
    let (app, _notifier) = new_app(Vec::new(), vec![]);

    app.start().unwrap();
    assert!(!app.is_stopped());

    app.stop();
    wait_app(&app).await.unwrap();
    assert!(app.is_stopped());
}

#[tokio::test]
async fn test_three_servers_share_one_token() {
    let mocks: Vec<Arc<MockServer>> = (0..3).map(|_| MockServer::new()).collect();
    let (app, _notifier) = new_app(mocks.iter().map(|m| m.as_server()).collect(), vec![]);

    app.start().unwrap();
    wait_until("all servers started", || mocks.iter().all(|m| m.starts() == 1)).await;

    let tokens: Vec<_> = mocks.iter().flat_map(|m| m.tokens()).collect();
    assert_eq!(tokens.len(), 3);
    assert!(tokens.iter().all(|t| !t.is_cancelled()));
    assert!(mocks.iter().all(|m| m.stops() == 0));

    // Cancelling the token one server holds must cancel the app and every peer.
    tokens[0].cancel();
    assert!(app.is_stopped());
    assert!(tokens.iter().all(|t| t.is_cancelled()));

    wait_app(&app).await.unwrap();
    for mock in &mocks {
        assert_eq!(mock.stops(), 1);
    }
}

#[tokio::test]
async fn test_every_server_stopped_once_for_any_count() {
    for n in [0usize, 1, 2, 5, 16] {
        let mocks: Vec<Arc<MockServer>> = (0..n).map(|_| MockServer::new()).collect();
        let (app, _notifier) = new_app(mocks.iter().map(|m| m.as_server()).collect(), vec![]);

        app.start().unwrap();
        app.stop();
        wait_app(&app).await.unwrap();

        for mock in &mocks {
            assert_eq!(mock.stops(), 1, "n = {}", n);
        }
    }
}

#[tokio::test]
async fn test_double_stop_is_a_noop() {
    let mocks: Vec<Arc<MockServer>> = (0..2).map(|_| MockServer::new()).collect();
    let (app, _notifier) = new_app(mocks.iter().map(|m| m.as_server()).collect(), vec![]);

    app.start().unwrap();
    app.stop();
    app.stop();
    wait_app(&app).await.unwrap();
    app.stop();

    for mock in &mocks {
        assert_eq!(mock.stops(), 1);
    }
}

#[tokio::test]
async fn test_concurrent_stop_calls() {
    let mock = MockServer::new();
    let (app, _notifier) = new_app(vec![mock.as_server()], vec![]);
    app.start().unwrap();

    let stoppers = (0..8).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { app.stop() })
    });
    for joined in futures::future::join_all(stoppers).await {
        joined.unwrap();
    }

    wait_app(&app).await.unwrap();
    assert_eq!(mock.stops(), 1);
}

#[tokio::test]
async fn test_late_watcher_sees_fired_token() {
    let (app, _notifier) = new_app(Vec::new(), vec![]);
    app.start().unwrap();

    let early = app.token();
    let mut before = task::spawn(early.cancelled());
    assert_pending!(before.poll());

    app.stop();
    assert!(before.is_woken());
    assert_ready!(before.poll());

    // Subscribed only after the fact: must not miss the signal.
    let late = app.token();
    let mut after = task::spawn(late.cancelled());
    assert_ready!(after.poll());
}

#[tokio::test]
async fn test_duplicate_registration_runs_twice() {
    let mock = MockServer::new();
    let server: Arc<dyn Server> = mock.clone();
    let (app, _notifier) = new_app(vec![server.clone(), server], vec![]);
    assert_eq!(app.servers(), 2);

    app.start().unwrap();
    wait_until("both registrations started", || mock.starts() == 2).await;

    app.stop();
    wait_app(&app).await.unwrap();
    assert_eq!(mock.stops(), 2);
}

#[tokio::test]
async fn test_stop_before_start_still_stops_servers() {
    let mock = MockServer::new();
    let (app, _notifier) = new_app(vec![mock.as_server()], vec![app::name("early-stop")]);

    app.stop();
    app.start().unwrap();
    wait_app(&app).await.unwrap();

    assert_eq!(mock.stops(), 1);
}

//! Behavioural scenarios of the console list, driven by a scripted host.

mod common;

use std::time::Duration;

use common::{next_request, record, reply, reply_raw, scripted_bus, settle_pump, RecordingPresenter};
use greenlight_core::{ConsoleId, HostError, InboundMessage, Request, RoutingPolicy};
use greenlight_ui::application::{ConsoleListScope, CycleState, RouteError};
use greenlight_ui::infrastructure::ui_bridge::console_cards;
use serde_json::json;

const SETTLE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn scenario_unauthorized_error_is_shown_and_list_stays_empty() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let presenter = RecordingPresenter::new();
    let mut scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
    let (cid, request) = next_request(&mut host).await;

    // Act
    reply(&host, cid, InboundMessage::Error(HostError::new("unauthorized"))).await;
    let settled = scope.wait_settled(SETTLE).await;

    // Assert
    assert_eq!(request, Request::GetConsoles);
    assert_eq!(settled, Err(RouteError::Host(HostError::new("unauthorized"))));
    assert_eq!(presenter.shown(), vec!["unauthorized".to_string()]);
    assert!(scope.consoles().is_empty());
}

#[tokio::test]
async fn scenario_unauthorized_error_without_correlation_id_is_shown() {
    // Arrange: default routing, host replies in the minimal wire shape
    let (bus, mut host) = scripted_bus(RoutingPolicy::default());
    let presenter = RecordingPresenter::new();
    let mut scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
    let _ = next_request(&mut host).await;

    // Act
    reply_raw(&host, json!({"kind": "error", "message": "unauthorized"})).await;
    let settled = scope.wait_settled(SETTLE).await;

    // Assert: shown at once, never as a timeout
    assert_eq!(settled, Err(RouteError::Host(HostError::new("unauthorized"))));
    assert_eq!(presenter.shown(), vec!["unauthorized".to_string()]);
    assert!(scope.consoles().is_empty());
    assert_eq!(bus.registry().lock().dropped(), 0);
}

#[tokio::test]
async fn scenario_uncorrelated_console_list_is_accepted_under_strict_routing() {
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let _ = next_request(&mut host).await;

    reply_raw(
        &host,
        json!({"kind": "consoles", "data": [{"id": "A1", "name": "Box1", "powerState": "On", "consoleType": "Xbox"}]}),
    )
    .await;

    assert_eq!(scope.wait_settled(SETTLE).await, Ok(CycleState::Resolved));
    let ids: Vec<_> = scope.consoles().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ConsoleId::new("A1")]);
}

#[tokio::test]
async fn scenario_single_console_is_listed_with_stream_link() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;

    // Act
    reply(&host, cid, InboundMessage::Consoles { data: vec![record("A1", "Box1")] }).await;
    scope.wait_settled(SETTLE).await.unwrap();

    // Assert
    assert_eq!(scope.consoles(), vec![record("A1", "Box1")]);
    let cards = console_cards(&scope.consoles());
    assert_eq!(cards[0].stream_route, "stream/A1");
    let route = scope.start_stream(&ConsoleId::new("A1")).await.unwrap();
    assert_eq!(route.console_id().as_str(), "A1");
}

#[tokio::test]
async fn scenario_remount_under_legacy_routing_last_delivered_wins() {
    // Arrange: mount, unmount, and mount again before any answer arrives
    let (bus, mut host) = scripted_bus(RoutingPolicy::Legacy);
    let first = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let _ = next_request(&mut host).await;
    first.unmount();
    let mut second = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let _ = next_request(&mut host).await;

    // Act: a legacy host answers without kind or correlation, R2 then R1
    reply_raw(&host, json!({"data": [{"id": "R2", "name": "second", "powerState": "On", "consoleType": "Xbox"}]})).await;
    reply_raw(&host, json!({"data": [{"id": "R1", "name": "first", "powerState": "On", "consoleType": "Xbox"}]})).await;
    settle_pump().await;

    // Assert: the answer to the older request overwrote the newer one
    assert_eq!(second.wait_settled(SETTLE).await, Ok(CycleState::Resolved));
    let ids: Vec<_> = second.consoles().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![ConsoleId::new("R1")]);
    assert_eq!(second.revision(), 2);
}

#[tokio::test]
async fn scenario_remount_under_strict_routing_keeps_newest_answer() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let first = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (r1, _) = next_request(&mut host).await;
    first.unmount();
    let mut second = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (r2, _) = next_request(&mut host).await;

    // Act: answers arrive R2 then R1
    reply(&host, r2, InboundMessage::Consoles { data: vec![record("R2", "second")] }).await;
    reply(&host, r1, InboundMessage::Consoles { data: vec![record("R1", "first")] }).await;
    settle_pump().await;

    // Assert: the stale R1 found no handler
    assert_eq!(second.wait_settled(SETTLE).await, Ok(CycleState::Resolved));
    assert_eq!(second.consoles(), vec![record("R2", "second")]);
    assert_eq!(second.revision(), 1);
    assert_eq!(bus.registry().lock().dropped(), 1);
}

#[tokio::test]
async fn scenario_error_with_data_shows_message_and_data() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let presenter = RecordingPresenter::new();
    let mut scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;

    // Act
    reply(
        &host,
        cid,
        InboundMessage::Error(HostError::with_data(
            "token expired",
            json!({"retry": false, "code": 401}),
        )),
    )
    .await;
    let _ = scope.wait_settled(SETTLE).await;

    // Assert
    let shown = presenter.shown();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].starts_with("token expired: "));
    assert!(shown[0].contains(r#""retry":false"#));
    assert!(shown[0].contains(r#""code":401"#));
}

#[tokio::test]
async fn scenario_late_answer_after_unmount_is_dropped() {
    for policy in [RoutingPolicy::Strict, RoutingPolicy::Legacy] {
        // Arrange
        let (bus, mut host) = scripted_bus(policy);
        let presenter = RecordingPresenter::new();
        let scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
        let (cid, _) = next_request(&mut host).await;

        // Act
        scope.unmount();
        reply(&host, cid, InboundMessage::Consoles { data: vec![record("A1", "Box1")] }).await;
        reply(&host, cid, InboundMessage::Error(HostError::new("late failure"))).await;
        settle_pump().await;

        // Assert
        let registry = bus.registry().lock();
        assert!(registry.is_empty(), "{policy:?}");
        assert_eq!(registry.dropped(), 2, "{policy:?}");
        assert!(presenter.shown().is_empty(), "{policy:?}");
    }
}

#[tokio::test]
async fn legacy_routing_degrades_malformed_data_to_empty_list() {
    let (bus, mut host) = scripted_bus(RoutingPolicy::Legacy);
    let presenter = RecordingPresenter::new();
    let mut scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
    let _ = next_request(&mut host).await;

    reply_raw(&host, json!({"kind": "consoles", "data": "not a list"})).await;

    assert_eq!(scope.wait_settled(SETTLE).await, Ok(CycleState::Resolved));
    assert!(scope.consoles().is_empty());
    assert!(presenter.shown().is_empty());
}

#[tokio::test]
async fn strict_routing_rejects_untagged_success() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let presenter = RecordingPresenter::new();
    let mut scope = ConsoleListScope::mount(&bus, presenter.clone()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;

    // Act: correlated but with no kind
    reply_raw(&host, json!({"correlation_id": cid.unwrap().to_string(), "data": []})).await;
    let settled = scope.wait_settled(SETTLE).await;

    // Assert
    assert!(matches!(settled, Err(RouteError::Protocol(_))));
    assert_eq!(presenter.shown().len(), 1);
    assert_eq!(scope.revision(), 0);
}

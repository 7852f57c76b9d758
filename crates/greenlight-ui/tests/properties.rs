//! Invariants of the console list that must hold whatever the host sends.

mod common;

use std::time::Duration;

use common::{next_request, record, reply, scripted_bus, settle_pump, RecordingPresenter};
use greenlight_core::{ConsoleId, HostError, InboundMessage, Request, RoutingPolicy, StreamRoute};
use greenlight_ui::application::ConsoleListScope;

const SETTLE: Duration = Duration::from_secs(2);

#[tokio::test]
async fn replace_is_total_with_no_merge() {
    // Arrange: a loaded list R1
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;
    let r1 = vec![record("A1", "Box1"), record("B2", "Box2")];
    reply(&host, cid, InboundMessage::Consoles { data: r1 }).await;
    scope.wait_settled(SETTLE).await.unwrap();

    // Act: remount and receive R2
    drop(scope);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;
    let r2 = vec![record("C3", "Box3")];
    reply(&host, cid, InboundMessage::Consoles { data: r2.clone() }).await;
    scope.wait_settled(SETTLE).await.unwrap();

    // Assert
    assert_eq!(scope.consoles(), r2);
}

#[tokio::test]
async fn error_leaves_loaded_list_untouched() {
    // Arrange: a loaded list
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;
    reply(&host, cid, InboundMessage::Consoles { data: vec![record("A1", "Box1")] }).await;
    scope.wait_settled(SETTLE).await.unwrap();
    let before = scope.consoles();

    // Act: the stream start fails on the host
    scope.start_stream(&ConsoleId::new("A1")).await.unwrap();
    let (cid, _) = next_request(&mut host).await;
    reply(&host, cid, InboundMessage::Error(HostError::new("console is off"))).await;
    let settled = scope.wait_settled(SETTLE).await;

    // Assert
    assert!(settled.is_err());
    assert_eq!(scope.consoles(), before);
    assert_eq!(scope.revision(), 1);
}

#[tokio::test]
async fn unmounted_scope_never_sees_later_envelopes() {
    let (bus, mut host) = scripted_bus(RoutingPolicy::Legacy);
    let scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let owner = scope.owner();
    let (cid, _) = next_request(&mut host).await;

    drop(scope);
    for _ in 0..3 {
        reply(&host, cid, InboundMessage::Consoles { data: vec![] }).await;
    }
    settle_pump().await;

    let registry = bus.registry().lock();
    assert_eq!(registry.owned_by(owner), 0);
    assert_eq!(registry.dropped(), 3);
}

#[tokio::test]
async fn console_id_survives_list_and_stream_start_byte_for_byte() {
    // Arrange: an id with spaces, slashes, and non-ASCII
    let odd_id = "Box 7/ä%20x";
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);
    let mut scope = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid, _) = next_request(&mut host).await;
    reply(&host, cid, InboundMessage::Consoles { data: vec![record(odd_id, "odd")] }).await;
    scope.wait_settled(SETTLE).await.unwrap();

    // Act
    let route = scope.start_stream(&ConsoleId::new(odd_id)).await.unwrap();
    let (_, request) = next_request(&mut host).await;

    // Assert
    assert_eq!(
        request,
        Request::StartStream {
            console_id: ConsoleId::new(odd_id)
        }
    );
    assert_eq!(route.path(), format!("stream/{odd_id}"));
    assert_eq!(StreamRoute::parse(&route.path()).unwrap(), route);
}

#[tokio::test]
async fn each_mount_issues_its_own_request() {
    // Arrange
    let (bus, mut host) = scripted_bus(RoutingPolicy::Strict);

    // Act
    let first = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid1, req1) = next_request(&mut host).await;
    first.unmount();
    let second = ConsoleListScope::mount(&bus, RecordingPresenter::new()).await.unwrap();
    let (cid2, req2) = next_request(&mut host).await;

    // Assert
    assert_eq!(req1, Request::GetConsoles);
    assert_eq!(req2, Request::GetConsoles);
    assert_ne!(cid1, cid2);
    // One handler for uncorrelated envelopes plus the pending request
    assert_eq!(bus.registry().lock().owned_by(second.owner()), 2);
    assert_eq!(bus.registry().lock().len(), 2);
}

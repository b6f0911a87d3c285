//! Frame → host events through the communication bridge

mod common;

use common::{harness, AlertReply, Harness};
use mfe_shell::frames::MountOutcome;
use mfe_shell::{FrameId, FrameSurface, History, InboundEvent, NavigationNode, RouteOutcome, ShellConfig, ShellError};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn app() -> ShellConfig {
    ShellConfig::new(vec![
        NavigationNode::new("home")
            .with_view_url("https://apps.example.com/home")
            .with_children(vec![NavigationNode::new("dashboard").with_view_url("https://apps.example.com/dash")]),
        NavigationNode::new("reports").with_view_url("https://reports.example.com/"),
    ])
}

async fn started(location: &str) -> (Harness, FrameId) {
    let h = harness(app(), location);
    let frame = match h.shell.start().await.expect("start") {
        RouteOutcome::Committed(Some(mount)) => mount.frame(),
        other => panic!("expected a mounted frame, got {other:?}"),
    };
    (h, frame)
}

fn last_message(h: &Harness, frame: FrameId) -> Value {
    h.connector.surface.messages_for(frame).last().cloned().unwrap_or(Value::Null)
}

#[tokio::test]
async fn alert_close_is_reported_back() {
    let (h, frame) = started("/home").await;
    h.connector.alert_reply.replace(AlertReply::Key("ok".into()));

    h.shell
        .dispatch_wire(frame, json!({ "msg": "show-alert-request", "data": { "id": "a1", "text": "Saved", "type": "info" } }))
        .await
        .expect("dispatch");

    assert_eq!(h.connector.alerts.borrow()[0].text, "Saved");
    let answer = last_message(&h, frame);
    assert_eq!(answer["msg"], "luigi.ux.alert.hide");
    assert_eq!(answer["id"], "a1");
    assert_eq!(answer["dismissKey"], "ok");
}

#[tokio::test]
async fn alert_link_navigates() {
    let (h, frame) = started("/home").await;
    h.connector.alert_reply.replace(AlertReply::Link("more".into()));

    h.shell
        .dispatch_wire(
            frame,
            json!({
                "msg": "luigi.ux.alert.show",
                "data": { "text": "See reports", "links": { "more": { "text": "reports", "url": "/reports" } } }
            }),
        )
        .await
        .expect("dispatch");

    assert_eq!(h.history.location(), "/reports");
}

#[tokio::test]
async fn confirmation_result_is_reported_back() {
    let (h, frame) = started("/home").await;

    h.connector.confirm_reply.set(Some(false));
    h.shell
        .dispatch(frame, InboundEvent::ShowConfirmationModal { data: Default::default() })
        .await
        .expect("dispatch");
    let answer = last_message(&h, frame);
    assert_eq!(answer["msg"], "luigi.ux.confirmationModal.hide");
    assert_eq!(answer["data"]["confirmed"], false);

    // A connector that never settles counts as a dismissal.
    h.connector.confirm_reply.set(None);
    h.shell
        .dispatch(frame, InboundEvent::ShowConfirmationModal { data: Default::default() })
        .await
        .expect("dispatch");
    assert_eq!(last_message(&h, frame)["data"]["confirmed"], false);
}

#[tokio::test]
async fn path_exists_answers_with_correlation_id() {
    let (h, frame) = started("/home").await;

    h.shell
        .dispatch_wire(
            frame,
            json!({ "msg": "check-path-exists-request", "correlationId": "c1", "data": { "link": "dashboard", "relative": true } }),
        )
        .await
        .expect("dispatch");
    let answer = last_message(&h, frame);
    assert_eq!(answer["msg"], "luigi.navigation.pathExists.answer");
    assert_eq!(answer["correlationId"], "c1");
    assert_eq!(answer["data"], true);

    h.shell
        .dispatch_wire(frame, json!({ "msg": "check-path-exists-request", "correlationId": "c2", "data": { "link": "/nowhere" } }))
        .await
        .expect("dispatch");
    assert_eq!(last_message(&h, frame)["data"], false);
}

#[tokio::test]
async fn dirty_frame_asks_before_leaving() {
    let (h, frame) = started("/home").await;
    h.shell.dispatch(frame, InboundEvent::SetDirtyStatus { dirty: true }).await.expect("dispatch");

    h.connector.confirm_reply.set(Some(false));
    let request = json!({ "msg": "navigation-request", "params": { "link": "/reports" } });
    h.shell.dispatch_wire(frame, request.clone()).await.expect("dispatch");
    assert_eq!(h.connector.confirmations.borrow().len(), 1);
    assert_eq!(h.history.location(), "/home");
    assert!(h.shell.ux().is_dirty());

    h.connector.confirm_reply.set(Some(true));
    h.shell.dispatch_wire(frame, request).await.expect("dispatch");
    assert_eq!(h.history.location(), "/reports");
    assert!(!h.shell.ux().is_dirty());
}

#[tokio::test]
async fn relative_navigation_with_node_params() {
    let (h, frame) = started("/home").await;

    h.shell
        .dispatch_wire(
            frame,
            json!({ "msg": "navigation-request", "params": { "link": "dashboard", "relative": true, "nodeParams": { "tab": "2" } } }),
        )
        .await
        .expect("dispatch");

    assert_eq!(h.history.location(), "/home/dashboard?~tab=2");
    let route = h.shell.routing().current_route().expect("route");
    assert_eq!(route.path, "home/dashboard");
    assert_eq!(route.node_params.get("tab").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn backdrops_nest() {
    let (h, frame) = started("/home").await;
    for msg in ["add-backdrop-request", "luigi.add-backdrop", "remove-backdrop-request", "remove-backdrop-request"] {
        h.shell.dispatch_wire(frame, json!({ "msg": msg })).await.expect("dispatch");
    }
    assert_eq!(h.connector.backdrop_added.get(), 1);
    assert_eq!(h.connector.backdrop_removed.get(), 1);
    assert_eq!(h.shell.ux().backdrop_count(), 0);
}

#[tokio::test]
async fn node_params_update_location_without_rerouting() {
    let (h, frame) = started("/home").await;
    let navs_before = h.connector.left_navs.borrow().len();

    h.shell
        .dispatch_wire(frame, json!({ "msg": "add-node-params-request", "data": { "sort": "asc" }, "keepBrowserHistory": true }))
        .await
        .expect("dispatch");

    assert_eq!(h.history.location(), "/home?~sort=asc");
    assert_eq!(h.history.len(), 2);
    assert_eq!(h.connector.left_navs.borrow().len(), navs_before);
    let route = h.shell.routing().current_route().expect("route");
    assert_eq!(route.node_params.get("sort").map(String::as_str), Some("asc"));

    h.shell
        .dispatch_wire(frame, json!({ "msg": "add-search-params-request", "data": { "q": "x" } }))
        .await
        .expect("dispatch");
    assert_eq!(h.history.location(), "/home?q=x&~sort=asc");
    assert_eq!(h.history.len(), 2);
}

#[tokio::test]
async fn custom_messages_reach_their_listener() {
    let (h, frame) = started("/home").await;
    let seen: Rc<RefCell<Vec<(FrameId, Value)>>> = Rc::default();
    let sink = seen.clone();
    h.shell.on_custom_message("my.event", move |source, data| sink.borrow_mut().push((source, data.clone())));

    h.shell
        .dispatch_wire(frame, json!({ "msg": "custom", "id": "my.event", "data": { "n": 1 } }))
        .await
        .expect("dispatch");
    h.shell
        .dispatch_wire(frame, json!({ "msg": "custom-message", "id": "other" }))
        .await
        .expect("dispatch");

    assert_eq!(*seen.borrow(), vec![(frame, json!({ "n": 1 }))]);
}

#[tokio::test]
async fn ux_requests_reach_the_connector() {
    let (h, frame) = started("/home").await;
    let events = [
        json!({ "msg": "set-document-title-request", "title": "Inbox (3)" }),
        json!({ "msg": "open-user-settings-request", "data": { "tab": "language" } }),
        json!({ "msg": "close-user-settings-request" }),
        json!({ "msg": "show-loading-indicator-request" }),
        json!({ "msg": "hide-loading-indicator-request" }),
    ];
    for event in events {
        h.shell.dispatch_wire(frame, event).await.expect("dispatch");
    }

    assert_eq!(*h.connector.titles.borrow(), vec!["Inbox (3)".to_string()]);
    assert_eq!(h.shell.ux().document_title().as_deref(), Some("Inbox (3)"));
    assert_eq!(*h.connector.user_settings.borrow(), Some(json!({ "tab": "language" })));
    assert!(h.connector.user_settings_closed.get());
    assert!(h.connector.loading_shown.get() >= 2);
    assert!(h.connector.loading_hidden.get() >= 1);
}

#[tokio::test]
async fn get_context_answers_with_init() {
    let (h, frame) = started("/home").await;
    h.shell
        .dispatch_wire(frame, json!({ "msg": "get-context-request", "clientVersion": "1.2.0" }))
        .await
        .expect("dispatch");

    let init = last_message(&h, frame);
    assert_eq!(init["msg"], "luigi.init");
    assert!(init["context"].is_string());
    let handle = h.shell.frames().handle(frame).expect("handle");
    assert_eq!(handle.luigi.init_ok, Some(false));
    assert_eq!(handle.luigi.client_version.as_deref(), Some("1.2.0"));
}

#[tokio::test]
async fn preserved_view_is_restored_on_go_back() {
    let (h, home) = started("/home").await;

    h.shell
        .dispatch_wire(home, json!({ "msg": "navigation-request", "params": { "link": "/reports", "preserveView": true } }))
        .await
        .expect("dispatch");
    let reports = h.shell.frames().active_frame(mfe_shell::Slot::Main).expect("reports frame");
    assert_ne!(reports, home);
    assert!(h.connector.surface.contains(home));
    assert_eq!(h.shell.frames().view_stack_size(), 1);

    h.shell
        .dispatch_wire(reports, json!({ "msg": "go-back-request", "goBackContext": { "saved": true } }))
        .await
        .expect("dispatch");

    assert_eq!(h.shell.frames().active_frame(mfe_shell::Slot::Main), Some(home));
    assert!(!h.connector.surface.contains(reports));
    assert_eq!(h.history.location(), "/home");

    let navigate = last_message(&h, home);
    assert_eq!(navigate["msg"], "luigi.navigate");
    let internal: Value = serde_json::from_str(navigate["internal"].as_str().unwrap_or("{}")).expect("internal");
    assert_eq!(internal["isNavigateBack"], true);
    let context: Value = serde_json::from_str(navigate["context"].as_str().unwrap_or("{}")).expect("context");
    assert_eq!(context["saved"], true);
}

#[tokio::test]
async fn unknown_frames_and_events_are_rejected() {
    let (h, frame) = started("/home").await;

    let err = h.shell.dispatch(FrameId(999), InboundEvent::AddBackdrop).await.unwrap_err();
    assert!(matches!(err, ShellError::UnknownFrame(_)));

    let err = h.shell.dispatch_wire(frame, json!({ "msg": "teleport-request" })).await.unwrap_err();
    assert!(matches!(err, ShellError::Protocol(_)));
}

#[tokio::test]
async fn first_mount_creates_frame() {
    let h = harness(app(), "/reports");
    let outcome = h.shell.start().await.expect("start");
    assert!(matches!(outcome, RouteOutcome::Committed(Some(MountOutcome::Created(_)))));
}

#[tokio::test]
async fn host_custom_message_is_posted_to_frame() {
    let (h, frame) = started("/home").await;
    h.shell
        .send_custom_message(frame, json!({ "id": "refresh", "scope": "all" }))
        .expect("known frame");

    let message = last_message(&h, frame);
    assert_eq!(message["msg"], "custom");
    assert_eq!(message["data"], json!({ "id": "refresh", "scope": "all" }));

    let err = h.shell.send_custom_message(FrameId(999), json!({ "id": "refresh" })).unwrap_err();
    assert!(matches!(err, ShellError::UnknownFrame(_)));
}

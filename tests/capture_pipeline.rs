// tests/capture_pipeline.rs
//! End-to-end capture: page events in, workflow records out

use std::sync::Arc;
use std::time::Duration;
use workflow_recorder::capture::{CaptureConfig, Recorder};
use workflow_recorder::dom::{NodeBuilder, Page};
use workflow_recorder::recording::{
    ChannelSink, ClickPayload, EventKind, EventQueue, ExportFormat, Exporter, RecordingSession,
    StorageConfig, ValuePayload, WorkflowStore,
};
use workflow_recorder::scenario::Scenario;
use workflow_recorder::selector::SemanticRole;

fn recorder_with_session() -> (Recorder, Arc<RecordingSession>) {
    let session = Arc::new(RecordingSession::new());
    let recorder = Recorder::new(CaptureConfig::default(), session.clone());
    (recorder, session)
}

#[test]
fn test_submit_button_with_dynamic_id() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://shop.example/checkout", "Checkout");
    let form = page.append(page.body(), NodeBuilder::new("form"));
    let button = page.append(
        form,
        NodeBuilder::new("button")
            .attr("id", "submit-42892001")
            .attr("data-testid", "submit-btn")
            .text("Submit"),
    );

    let _subscription = recorder.attach(&page);
    page.click(button);

    let events = session.snapshot();
    let click = events.iter().find(|e| e.kind == EventKind::Click).unwrap();
    let target = click.target.as_ref().unwrap();

    assert_eq!(target.selector.as_deref(), Some("[data-testid=\"submit-btn\"]"));
    assert_eq!(target.xpath, "/html[1]/body[1]/form[1]/button[1]");
    assert_eq!(target.tag_name, "BUTTON");
    assert_eq!(target.semantic_role, SemanticRole::SubmitButton);
    assert_eq!(click.page_context.url, "https://shop.example/checkout");

    let payload: ClickPayload = click.payload_as().unwrap();
    assert_eq!(payload.text.as_deref(), Some("Submit"));
}

#[test]
fn test_stable_id_beats_test_id() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://example.com", "Example");
    let button = page.append(
        page.body(),
        NodeBuilder::new("button")
            .attr("id", "checkout")
            .attr("data-testid", "checkout-btn"),
    );

    let _subscription = recorder.attach(&page);
    page.click(button);

    let click = session.snapshot().pop().unwrap();
    assert_eq!(click.target.unwrap().selector.as_deref(), Some("#checkout"));
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_burst_yields_one_input() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://example.com/login", "Login");
    let email = page.append(
        page.body(),
        NodeBuilder::new("input").attr("type", "email").attr("name", "email"),
    );

    let _subscription = recorder.attach(&page);
    for value in ["a", "al", "ali", "alic", "alice"] {
        page.input(email, value);
        tokio::time::sleep(Duration::from_millis(90)).await;
    }
    tokio::time::sleep(Duration::from_millis(600)).await;

    let inputs: Vec<_> = session
        .snapshot()
        .into_iter()
        .filter(|e| e.kind == EventKind::Input)
        .collect();
    assert_eq!(inputs.len(), 1);

    let payload: ValuePayload = inputs[0].payload_as().unwrap();
    assert_eq!(payload.value.as_deref(), Some("alice"));
    assert_eq!(inputs[0].target.as_ref().unwrap().input_type.as_deref(), Some("email"));
}

#[test]
fn test_bare_div_filtered_role_button_kept() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://example.com", "Example");
    let div = page.append(page.body(), NodeBuilder::new("div").text("Open"));

    let _subscription = recorder.attach(&page);
    page.click(div);
    assert!(session.snapshot().iter().all(|e| e.kind != EventKind::Click));

    page.set_attribute(div, "role", "button");
    page.click(div);

    let clicks = session
        .snapshot()
        .into_iter()
        .filter(|e| e.kind == EventKind::Click)
        .count();
    assert_eq!(clicks, 1);
}

#[test]
fn test_in_page_navigation_never_repeats_page_visit() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://docs.example/guide", "Guide");

    let _subscription = recorder.attach(&page);
    page.hash_change("https://docs.example/guide#install");
    page.hash_change("https://docs.example/guide#usage");
    page.push_state("https://docs.example/guide/advanced");

    let kinds: Vec<_> = session.snapshot().into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::PageVisit,
            EventKind::Navigation,
            EventKind::Navigation,
            EventKind::Navigation,
        ]
    );
}

#[test]
fn test_disconnected_channel_does_not_stop_recording() {
    let (sink, _rx) = ChannelSink::new();
    let sink = Arc::new(sink);
    let recorder = Recorder::new(CaptureConfig::default(), sink.clone());
    let page = Page::new("https://example.com", "Example");
    let link = page.append(page.body(), NodeBuilder::new("a").attr("href", "/next"));

    let _subscription = recorder.attach(&page);
    sink.disconnect();
    page.click(link);

    let mut rx = sink.reconnect();
    page.click(link);

    assert_eq!(rx.try_recv().unwrap().kind, EventKind::Click);
    assert_eq!(recorder.stats().dropped, 1);
    assert_eq!(recorder.stats().delivered, 2);
}

#[test]
fn test_full_queue_counts_drops() {
    let queue = Arc::new(EventQueue::new(3));
    let recorder = Recorder::new(CaptureConfig::default(), queue.clone());
    let page = Page::new("https://example.com", "Example");
    let link = page.append(page.body(), NodeBuilder::new("a").attr("href", "/next"));

    let _subscription = recorder.attach(&page);
    for _ in 0..4 {
        page.click(link);
    }

    assert_eq!(recorder.stats().delivered, 3);
    assert_eq!(recorder.stats().dropped, 2);
    assert_eq!(queue.stats().drop_count, 2);

    let kinds: Vec<_> = queue.drain().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::PageVisit, EventKind::Click, EventKind::Click]);

    page.click(link);
    assert_eq!(queue.try_pop().unwrap().kind, EventKind::Click);
    assert_eq!(recorder.stats().delivered, 4);
}

#[test]
fn test_same_page_attached_twice_records_once() {
    let (recorder, session) = recorder_with_session();
    let page = Page::new("https://example.com/", "Example");
    let button = page.append(page.body(), NodeBuilder::new("button").text("Next"));

    let _panel = recorder.attach(&page);
    let _toolbar = recorder.attach(&page);
    page.click(button);
    page.push_state("https://example.com/step-2");

    let kinds: Vec<_> = session.snapshot().into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::PageVisit, EventKind::Click, EventKind::Navigation]
    );
}

#[test]
fn test_reattach_before_load_still_records_visit() {
    let (recorder, session) = recorder_with_session();
    let page = Page::loading("https://example.com/slow", "Slow");

    recorder.attach(&page).detach();
    let _subscription = recorder.attach(&page);
    page.finish_loading();

    let kinds: Vec<_> = session.snapshot().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::PageVisit]);
}

#[tokio::test(start_paused = true)]
async fn test_scenario_to_store_and_export() {
    let scenario = Scenario::parse(
        r#"
name: Sign in
page:
  url: https://app.example/login
  title: Sign in
  loaded: false
dom:
  - tag: input
    key: user
    attrs: { id: username, type: text }
  - tag: input
    key: pass
    attrs: { id: password, type: password }
  - tag: button
    key: login
    text: Log in
steps:
  - load
  - type: { target: user, text: ada }
  - wait: 600
  - type: { target: pass, text: hunter2, delay_ms: 10 }
  - enter: pass
  - push_state: https://app.example/home
"#,
    )
    .unwrap();

    let (recorder, session) = recorder_with_session();
    scenario.record(&recorder).await.unwrap();
    let workflow = session.finish(scenario.display_name());

    let kinds: Vec<_> = workflow.events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::PageVisit,
            EventKind::Input,
            EventKind::KeypressEnter,
            EventKind::Navigation,
            EventKind::Input,
        ]
    );
    assert_eq!(
        workflow.events[2].target.as_ref().unwrap().semantic_role,
        SemanticRole::PasswordField
    );

    let dir = tempfile::tempdir().unwrap();
    let store = WorkflowStore::new(StorageConfig {
        base_dir: dir.path().to_path_buf(),
        ..Default::default()
    })
    .await
    .unwrap();
    store.save(&workflow).await.unwrap();

    let loaded = store.get(&workflow.id).await.unwrap().unwrap();
    assert_eq!(loaded, workflow);

    let summary = Exporter::new(ExportFormat::Summary).export(&loaded).unwrap();
    assert!(summary.starts_with("Sign in (5 events"));
    assert!(summary.contains("#password = \"hunter2\""));

    let request = Exporter::new(ExportFormat::OptimizationRequest)
        .export(&loaded)
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&request).unwrap();
    assert_eq!(body["workflowName"], "Sign in");
    assert_eq!(body["events"][0]["kind"], "page_visit");
}

#[tokio::test(start_paused = true)]
async fn test_checkout_demo() {
    let scenario = Scenario::parse(include_str!("../demos/checkout.yaml")).unwrap();
    let (recorder, session) = recorder_with_session();
    scenario.record(&recorder).await.unwrap();

    let events = session.snapshot();
    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::PageVisit,
            EventKind::Click,
            EventKind::Navigation,
            EventKind::Scroll,
            EventKind::Input,
            EventKind::Input,
            EventKind::Click,
            EventKind::Navigation,
        ]
    );

    assert_eq!(events[0].page_context.title, "Cart (1) | Shop");
    assert_eq!(events[0].payload["referrer"], "https://shop.example/products/espresso-beans");
    assert_eq!(events[1].target.as_ref().unwrap().selector.as_deref(), Some("#checkout-btn"));
    assert_eq!(events[3].page_context.url, "https://shop.example/checkout");
    assert_eq!(
        events[5].target.as_ref().unwrap().selector.as_deref(),
        Some("[data-testid=\"card-number\"]")
    );
    assert_eq!(
        events[6].target.as_ref().unwrap().selector.as_deref(),
        Some("[data-testid=\"submit-btn\"]")
    );
}

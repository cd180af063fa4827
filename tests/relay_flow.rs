// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! End-to-end relay flows against mock IDP and relying-party servers

use std::sync::Arc;
use std::time::Duration;

use callback_relay::agent::{AbortReason, AGENT_INITIATOR};
use callback_relay::browser::form::find_callback_form;
use callback_relay::store::{DomainMapping, MemoryStore, Settings};
use callback_relay::{
    Browser, ContentAgent, FieldMap, HandlerOutcome, InterceptedSubmission, Message, MessageBus,
    RelayConfig, RelaySession,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

fn callback_page(action: &str) -> String {
    format!(
        r#"<html>
<head><title>Signing in</title></head>
<body>
  <form method="post" action="{action}">
    <input type="hidden" name="code" value="auth-code-123">
    <input type="hidden" name="id_token" value="eyJhbGciOi.payload.sig">
    <input type="hidden" name="state" value="af0ifjsldkj">
    <input type="hidden" name="session_state" value="abc.def">
    <button type="submit">Continue</button>
  </form>
</body>
</html>"#
    )
}

const LOGIN_PAGE: &str = r#"<html><body>
  <form method="post" action="/login">
    <input name="username" value="alice">
    <input type="password" name="password" value="secret">
  </form>
</body></html>"#;

async fn idp_serving(html: String) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/idp/done"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8"))
        .mount(&server)
        .await;
    server
}

async fn relying_party(expected: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/callback"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>signed in</p>", "text/html"),
        )
        .expect(expected)
        .mount(&server)
        .await;
    server
}

fn browser() -> Browser {
    Browser::new(RelayConfig::for_local_development().timeout(WAIT)).unwrap()
}

async fn store_with(mappings: &[(&str, &str)]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let settings = Settings::new(store.clone());
    for (source, target) in mappings {
        settings
            .add_mapping(DomainMapping::new(*source, *target))
            .await
            .unwrap();
    }
    store
}

async fn posted_fields(server: &MockServer) -> Vec<(String, String)> {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    url::form_urlencoded::parse(&requests[0].body)
        .into_owned()
        .collect()
}

#[tokio::test]
async fn test_callback_relayed_to_mapped_target() {
    let dev = relying_party(1).await;
    let idp = idp_serving(callback_page(
        "https://portal.example.com/callback?foo=bar",
    ))
    .await;
    let store = store_with(&[("portal.example.com", &dev.uri())]).await;

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();

    assert!(session.trigger_callback().await.unwrap().is_suppressed());
    let outcome = session.next_outcome(WAIT).await.unwrap();

    assert_eq!(
        outcome,
        HandlerOutcome::Submitted {
            action: format!("{}/callback?foo=bar", dev.uri()),
            status: Some(200),
        }
    );

    let fields = posted_fields(&dev).await;
    assert_eq!(
        fields,
        vec![
            ("code".to_string(), "auth-code-123".to_string()),
            ("id_token".to_string(), "eyJhbGciOi.payload.sig".to_string()),
            ("state".to_string(), "af0ifjsldkj".to_string()),
            ("session_state".to_string(), "abc.def".to_string()),
            (
                "original_action".to_string(),
                "https://portal.example.com/callback?foo=bar".to_string()
            ),
        ]
    );

    let requests = dev.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("foo=bar"));
    assert!(session.page().dialogs().is_empty());
    assert!(session
        .page()
        .url()
        .unwrap()
        .starts_with(&dev.uri()));

    // Only the agent posted; the page's own submit never left
    let network = browser.network();
    assert_eq!(network.form_submissions().len(), 1);
    let relayed = network.submissions_by(AGENT_INITIATOR);
    assert_eq!(relayed.len(), 1);
    assert!(relayed[0].is_success());
}

#[tokio::test]
async fn test_last_callback_recorded() {
    let dev = relying_party(1).await;
    let idp = idp_serving(callback_page("https://portal.example.com/callback")).await;
    let store = store_with(&[("portal.example.com", &dev.uri())]).await;

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();
    session.trigger_callback().await.unwrap();
    session.next_outcome(WAIT).await.unwrap();

    let response = session
        .router()
        .send(Message::GetLastOAuthCallback)
        .await
        .unwrap();
    let record = response.oauth_data.unwrap();
    assert_eq!(record.code.as_deref(), Some("auth-code-123"));
    assert_eq!(record.session_state.as_deref(), Some("abc.def"));
    assert!(record.scope.is_none());
}

#[tokio::test]
async fn test_unmapped_host_aborts_with_one_alert() {
    let dev = relying_party(0).await;
    let idp = idp_serving(callback_page("https://portal.example.com/callback")).await;
    let store = store_with(&[("other.example.com", &dev.uri())]).await;

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();

    assert!(session.trigger_callback().await.unwrap().is_suppressed());
    let outcome = session.next_outcome(WAIT).await.unwrap();

    assert_eq!(
        outcome,
        HandlerOutcome::Aborted {
            host: Some("portal.example.com".to_string()),
            reason: AbortReason::NoMapping,
        }
    );
    let dialogs = session.page().dialogs();
    assert_eq!(dialogs.len(), 1);
    assert!(dialogs[0].message.contains("portal.example.com"));
    assert!(browser.network().form_submissions().is_empty());
}

#[tokio::test]
async fn test_disabled_interception_is_transparent() {
    let prod = relying_party(1).await;
    let action = format!("{}/callback?foo=bar", prod.uri());
    let idp = idp_serving(callback_page(&action)).await;
    let store = store_with(&[("127.0.0.1", "localhost:1")]).await;
    Settings::new(store.clone())
        .set_interception_disabled(true)
        .await
        .unwrap();

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();
    assert!(session.interceptor().interception_disabled());

    let outcome = session.trigger_callback().await.unwrap();
    assert_eq!(outcome.response().unwrap().status_code(), 200);

    let fields = posted_fields(&prod).await;
    assert_eq!(fields.len(), 4);
    assert!(fields.iter().all(|(name, _)| name != "original_action"));
    assert!(session.next_outcome(Duration::from_millis(200)).await.is_err());
}

#[tokio::test]
async fn test_disabled_state_follows_navigation() {
    let prod = relying_party(1).await;
    let action = format!("{}/callback", prod.uri());
    let idp = idp_serving(LOGIN_PAGE.to_string()).await;
    let store = store_with(&[]).await;
    Settings::new(store.clone())
        .set_interception_disabled(true)
        .await
        .unwrap();

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();
    assert!(session.interceptor().interception_disabled());

    session
        .page()
        .load_html(&callback_page(&action), &format!("{}/idp/again", idp.uri()))
        .unwrap();
    assert!(session.interceptor().interception_disabled());

    let form = find_callback_form(&session.page().document().unwrap()).unwrap();
    let outcome = session.page().dispatch_submit(&form).await.unwrap();
    assert!(!outcome.is_suppressed());
    assert_eq!(posted_fields(&prod).await.len(), 4);
    assert!(session.next_outcome(Duration::from_millis(200)).await.is_err());
}

#[tokio::test]
async fn test_agent_replays_when_flag_set_after_capture() {
    let prod = relying_party(1).await;
    let action = format!("{}/callback?foo=bar", prod.uri());
    let store = store_with(&[]).await;
    let settings = Settings::new(store.clone());
    settings.set_interception_disabled(true).await.unwrap();

    let browser = browser();
    let page = browser.new_page();
    page.load_html("<html><body></body></html>", "https://idp.example.com/done")
        .unwrap();
    let router = Arc::new(callback_relay::MessageRouter::new(settings.clone()));
    let agent = ContentAgent::new(&page, settings, router);

    let form_data: FieldMap = vec![("code", "c1"), ("state", "s1")].into_iter().collect();
    let outcome = agent
        .handle(InterceptedSubmission {
            form_data,
            original_action: action.clone(),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        HandlerOutcome::Replayed {
            action,
            status: Some(200),
        }
    );
    assert_eq!(
        posted_fields(&prod).await,
        vec![
            ("code".to_string(), "c1".to_string()),
            ("state".to_string(), "s1".to_string()),
        ]
    );
    assert!(page.dialogs().is_empty());
}

#[tokio::test]
async fn test_non_callback_form_submits_unmodified() {
    let idp = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/idp/done"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LOGIN_PAGE, "text/html"))
        .mount(&idp)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/home"))
        .expect(1)
        .mount(&idp)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>home</p>", "text/html"))
        .mount(&idp)
        .await;

    let store = store_with(&[("127.0.0.1", "localhost:1")]).await;
    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();

    let document = session.page().document().unwrap();
    assert!(find_callback_form(&document).is_none());
    let form = document.forms().remove(0);

    let outcome = session.page().submit_form(&form).await.unwrap();
    assert!(!outcome.is_suppressed());
    assert!(session.page().url().unwrap().ends_with("/home"));
    assert!(session.next_outcome(Duration::from_millis(200)).await.is_err());
}

#[tokio::test]
async fn test_user_submit_event_is_intercepted() {
    let dev = relying_party(1).await;
    let idp = idp_serving(callback_page("https://portal.example.com/callback")).await;
    let store = store_with(&[("portal.example.com", &dev.uri())]).await;

    let browser = browser();
    let mut session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();

    let form = find_callback_form(&session.page().document().unwrap()).unwrap();
    assert!(session.page().dispatch_submit(&form).await.unwrap().is_suppressed());

    let outcome = session.next_outcome(WAIT).await.unwrap();
    assert!(matches!(outcome, HandlerOutcome::Submitted { .. }));
}

#[tokio::test]
async fn test_toggle_reaches_page_world() {
    let idp = idp_serving(callback_page("https://portal.example.com/callback")).await;
    let store = store_with(&[]).await;

    let browser = browser();
    let session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();
    assert!(!session.interceptor().interception_disabled());

    session
        .router()
        .send(Message::SetInterceptionDisabled { disabled: true })
        .await
        .unwrap();

    let mut attempts = 0;
    while !session.interceptor().interception_disabled() && attempts < 100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        attempts += 1;
    }
    assert!(session.interceptor().interception_disabled());
}

#[tokio::test]
async fn test_authorize_request_reported_on_attach() {
    let idp = idp_serving(
        r#"<html><body>
  <form method="post" action="/authorize">
    <input type="hidden" name="client_id" value="portal">
    <input type="hidden" name="response_type" value="code">
    <input type="hidden" name="redirect_uri" value="https://portal.example.com/callback">
  </form>
</body></html>"#
            .to_string(),
    )
    .await;
    let store = store_with(&[]).await;

    let browser = browser();
    let session = RelaySession::open(&browser, store, &format!("{}/idp/done", idp.uri()))
        .await
        .unwrap();

    let data = session.settings().last_authorize_data().await.unwrap().unwrap();
    assert_eq!(data["client_id"], "portal");
    assert_eq!(data["redirect_uri"], "https://portal.example.com/callback");
    assert!(session.trigger_callback().await.is_err());
}

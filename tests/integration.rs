#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use kudos_bot::{
    base::{
        config::{Config, ConfigInner},
        types::{Res, Void},
    },
    interaction::{
        directory,
        verify::{RequestVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    },
    runtime::Runtime,
    service::chat::{ChatClient, ChatUser, ChatUserGroup, GenericChatClient},
};
use mockall::{mock, predicate::eq};
use tower::ServiceExt;

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn post_message(&self, channel_id: &str, text: &str) -> Void;
        async fn list_users(&self) -> Res<Vec<ChatUser>>;
        async fn user_info(&self, user_id: &str) -> Res<ChatUser>;
        async fn list_user_groups(&self) -> Res<Vec<ChatUserGroup>>;
    }
}

const SECRET: &str = "test_secret";

/// A chat client that fails the test if anything is posted.
fn silent_chat() -> MockChat {
    let mut mock = MockChat::new();

    mock.expect_post_message().never();

    mock
}

/// Helper function to setup the test environment.
fn setup_test_environment(chat: MockChat) -> Runtime {
    let config = Config::from(ConfigInner {
        slack_bot_token: "xoxb-test".to_string(),
        slack_signing_secret: SECRET.to_string(),
        ..Default::default()
    });

    Runtime::with_chat(config, ChatClient::new(Arc::new(chat)))
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Build a request signed the way Slack signs it.
fn signed_request(uri: &str, content_type: &str, body: &str, timestamp: i64, secret: &str) -> Request<Body> {
    let signature = RequestVerifier::new(secret, 300).sign(timestamp, body.as_bytes());

    Request::post(uri)
        .header(header::CONTENT_TYPE, content_type)
        .header(SIGNATURE_HEADER, signature)
        .header(TIMESTAMP_HEADER, timestamp.to_string())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn event_request(body: &str) -> Request<Body> {
    signed_request("/events", "application/json", body, now(), SECRET)
}

fn slash_request(body: &str) -> Request<Body> {
    signed_request("/slash", "application/x-www-form-urlencoded", body, now(), SECRET)
}

async fn send(runtime: &Runtime, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = runtime.router().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).map(|v| v.to_str().unwrap().to_string());
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

// Events.

#[tokio::test]
async fn test_url_verification_echoes_challenge() {
    let runtime = setup_test_environment(silent_chat());

    let (status, content_type, body) = send(&runtime, event_request(r#"{"type":"url_verification","challenge":"abc123"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text"));
    assert_eq!(body, "abc123");
}

#[tokio::test]
async fn test_app_mention_posts_greeting() {
    let mut chat = MockChat::new();
    chat.expect_post_message().with(eq("C1"), eq("Yes, hello.")).times(1).returning(|_, _| Ok(()));

    let runtime = setup_test_environment(chat);

    let (status, _, body) = send(&runtime, event_request(r#"{"type":"event_callback","event":{"type":"app_mention","channel":"C1"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_trigger_phrase_posts_kudos() {
    let mut chat = MockChat::new();
    chat.expect_post_message().with(eq("C2"), eq("Sweetwater rocks!")).times(1).returning(|_, _| Ok(()));

    let runtime = setup_test_environment(chat);

    let (status, _, _) = send(&runtime, event_request(r#"{"type":"event_callback","event":{"type":"message","channel":"C2","text":"sweetwater"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_near_miss_messages_are_ignored() {
    let runtime = setup_test_environment(silent_chat());

    for text in ["Sweetwater", "sweetwater!", "sweetwater ", "hello"] {
        let body = serde_json::json!({ "type": "event_callback", "event": { "type": "message", "channel": "C2", "text": text } }).to_string();

        let (status, _, _) = send(&runtime, event_request(&body)).await;

        assert_eq!(status, StatusCode::OK, "text {text:?}");
    }
}

#[tokio::test]
async fn test_configured_trigger_phrase() {
    let mut chat = MockChat::new();
    chat.expect_post_message().with(eq("C3"), eq("Kudos!")).times(1).returning(|_, _| Ok(()));

    let config = Config::from(ConfigInner {
        slack_bot_token: "xoxb-test".to_string(),
        slack_signing_secret: SECRET.to_string(),
        trigger_phrase: "kudos".to_string(),
        trigger_reply: "Kudos!".to_string(),
        ..Default::default()
    });
    let runtime = Runtime::with_chat(config, ChatClient::new(Arc::new(chat)));

    let (status, _, _) = send(&runtime, event_request(r#"{"type":"event_callback","event":{"type":"message","channel":"C3","text":"kudos"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_inner_event_is_ignored() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, body) = send(&runtime, event_request(r#"{"type":"event_callback","event":{"type":"reaction_added","reaction":"tada"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_rate_limited_envelope_is_acknowledged() {
    let runtime = setup_test_environment(silent_chat());

    let body = r#"{"token":"t","type":"app_rate_limited","team_id":"T1","minute_rate_limited":1518467820,"api_app_id":"A1"}"#;
    let (status, _, body) = send(&runtime, event_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_notifier_failure_is_not_surfaced() {
    let mut chat = MockChat::new();
    chat.expect_post_message().times(1).returning(|_, _| Err(anyhow::anyhow!("channel_not_found")));

    let runtime = setup_test_environment(chat);

    let (status, _, _) = send(&runtime, event_request(r#"{"type":"event_callback","event":{"type":"app_mention","channel":"C404"}}"#)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_event_body_is_server_error() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, _) = send(&runtime, event_request("{not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _, _) = send(&runtime, event_request(r#"{"type":"url_verification"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_bad_event_signature_is_rejected_before_dispatch() {
    let runtime = setup_test_environment(silent_chat());
    let body = r#"{"type":"event_callback","event":{"type":"app_mention","channel":"C1"}}"#;

    // Wrong secret.
    let request = signed_request("/events", "application/json", body, now(), "not_the_secret");
    let (status, _, _) = send(&runtime, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Stale timestamp, correctly signed.
    let request = signed_request("/events", "application/json", body, now() - 3600, SECRET);
    let (status, _, _) = send(&runtime, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Tampered body.
    let mut request = event_request(body);
    *request.body_mut() = Body::from(body.replace("C1", "C9"));
    let (status, _, _) = send(&runtime, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage body with a bad signature never reaches the parser.
    let request = signed_request("/events", "application/json", "{not json", now(), "not_the_secret");
    let (status, _, _) = send(&runtime, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_signature_headers_are_bad_requests() {
    let runtime = setup_test_environment(silent_chat());

    let request = Request::post("/events").body(Body::from(r#"{"type":"url_verification","challenge":"abc123"}"#)).unwrap();
    let (status, _, body) = send(&runtime, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

// Slash commands.

#[tokio::test]
async fn test_kudosstats_command() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, body) = send(&runtime, slash_request("command=%2Fkudosstats&text=&user_id=U1&channel_id=C1&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2F1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "You get some stats!");
}

#[tokio::test]
async fn test_unknown_command_is_server_error() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, body) = send(&runtime, slash_request("command=%2Fnope&text=hi")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_bad_command_signature_is_rejected() {
    let runtime = setup_test_environment(silent_chat());

    let request = signed_request("/slash", "application/x-www-form-urlencoded", "command=%2Fkudosstats", now(), "not_the_secret");
    let (status, _, body) = send(&runtime, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());

    let request = Request::post("/slash").body(Body::from("command=%2Fkudosstats")).unwrap();
    let (status, _, _) = send(&runtime, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stale_command_is_rejected() {
    let runtime = setup_test_environment(silent_chat());

    let request = signed_request("/slash", "application/x-www-form-urlencoded", "command=%2Fkudosstats", now() - 3600, SECRET);
    let (status, _, body) = send(&runtime, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_unparseable_command_is_server_error() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, _) = send(&runtime, slash_request("text=no+command+here")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// Misc.

#[tokio::test]
async fn test_health() {
    let runtime = setup_test_environment(silent_chat());

    let (status, _, body) = send(&runtime, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_directory_listings() {
    let mut chat = MockChat::new();

    chat.expect_list_users().returning(|| {
        Ok(vec![
            ChatUser { id: "U1".to_string(), name: "ada".to_string(), ..Default::default() },
            ChatUser { id: "U2".to_string(), name: "grace".to_string(), ..Default::default() },
        ])
    });
    chat.expect_user_info().with(eq("U1")).returning(|_| {
        Ok(ChatUser {
            id: "U1".to_string(),
            name: "ada".to_string(),
            real_name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
        })
    });
    chat.expect_list_user_groups().returning(|| {
        Ok(vec![ChatUserGroup {
            id: "S1".to_string(),
            name: "oncall".to_string(),
            users: vec!["U1".to_string(), "U2".to_string()],
        }])
    });

    let chat = ChatClient::new(Arc::new(chat));

    assert_eq!(directory::list_users(&chat).await.unwrap(), vec!["Name: ada, ID: U1", "Name: grace, ID: U2"]);
    assert_eq!(directory::user_info(&chat, "U1").await.unwrap(), "ID: U1, Fullname: Ada Lovelace, Email: ada@example.com");
    assert_eq!(directory::list_groups(&chat).await.unwrap(), vec!["ID: S1, Name: oncall, Users: U1, U2"]);
}

#[tokio::test]
async fn test_directory_errors_propagate() {
    let mut chat = MockChat::new();
    chat.expect_list_users().returning(|| Err(anyhow::anyhow!("invalid_auth")));

    let chat = ChatClient::new(Arc::new(chat));

    assert!(directory::list_users(&chat).await.is_err());
}

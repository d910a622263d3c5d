#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use soulace_core::config::MatchingConfig;
use soulace_core::{MoodPreference, MoodSet};
use soulace_server::auth::{JwtManager, Role};
use soulace_server::registry::{ConnectionHub, InMemoryPresenceRegistry};
use soulace_server::router::RelayRouter;
use soulace_server::server::{AppState, build_router};
use soulace_server::storage::SoulaceDatabase;

struct TestApp {
    router: Router,
    jwt: Arc<JwtManager>,
    db: SoulaceDatabase,
}

async fn app() -> TestApp {
    app_with(MatchingConfig::default()).await
}

async fn app_with(matching: MatchingConfig) -> TestApp {
    let db = SoulaceDatabase::open_in_memory().await.unwrap();
    let jwt = Arc::new(JwtManager::new(b"test-secret", 3600));
    let relay = RelayRouter::new(
        Arc::new(InMemoryPresenceRegistry::new()),
        ConnectionHub::new(),
        16,
    );
    let router = build_router(AppState::new(
        db.clone(),
        Arc::clone(&jwt),
        relay,
        matching,
    ));
    TestApp { router, jwt, db }
}

impl TestApp {
    fn token(&self, id: &str, role: Role) -> String {
        self.jwt.issue(id, id, role).unwrap()
    }

    /// Send a request and return (status, JSON body).
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Online user with a stored mood set.
    async fn seed_user(&self, id: &str, codes: &[&str], preference: MoodPreference) {
        self.db.upsert_user(id, id, Some(30)).await.unwrap();
        self.db
            .update_user_mood(id, &MoodSet::parse(codes).unwrap(), preference)
            .await
            .unwrap();
        self.db.set_online(id, true).await.unwrap();
    }

    async fn seed_listener(&self, id: &str, age: u32) {
        self.db.upsert_listener(id, id, age).await.unwrap();
        self.db.set_online(id, true).await.unwrap();
    }
}

// === Health and auth ===

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let (status, body) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["online"], 0);
    assert_eq!(body["connections"], 0);
}

#[tokio::test]
async fn api_requires_valid_token() {
    let app = app().await;

    let (status, body) = app.send(Method::GET, "/api/online", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .send(Method::GET, "/api/online", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = JwtManager::new(b"other-secret", 3600);
    let forged = other.issue("u1", "u1", Role::User).unwrap();
    let (status, _) = app
        .send(Method::GET, "/api/online", Some(&forged), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_cookie_is_accepted() {
    let app = app().await;
    let token = app.token("u1", Role::User);
    let req = Request::builder()
        .uri("/api/online")
        .header("cookie", format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// === Profile and mood ===

#[tokio::test]
async fn listener_profile_requires_age() {
    let app = app().await;
    let token = app.token("l1", Role::Listener);

    let (status, _) = app
        .send(Method::PUT, "/api/profile", Some(&token), Some(json!({ "name": "kim" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/profile",
            Some(&token),
            Some(json!({ "name": "kim", "age": 33 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["age"], 33);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app().await;
    let token = app.token("u1", Role::User);
    let req = Request::builder()
        .method(Method::PUT)
        .uri("/api/profile")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mood_update_and_history() {
    let app = app().await;
    let token = app.token("u1", Role::User);

    let (status, _) = app
        .send(Method::PUT, "/api/profile", Some(&token), Some(json!({ "name": "alice" })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::PUT,
            "/api/mood",
            Some(&token),
            Some(json!({ "moods": ["10", "00"], "preferedMood": "different" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moodGroup"], "bad");

    let (status, body) = app.send(Method::GET, "/api/mood", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moods"], json!(["10", "00"]));
    assert_eq!(body["preferedMood"], "different");
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn mood_update_rejects_unknown_tag() {
    let app = app().await;
    let token = app.token("u1", Role::User);
    let (status, body) = app
        .send(Method::PUT, "/api/mood", Some(&token), Some(json!({ "moods": ["12"] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("12"));
}

// === Mood matching ===

#[tokio::test]
async fn empty_moods_rejected_before_lookup() {
    let app = app().await;
    // No profile exists; validation still comes first.
    let token = app.token("ghost", Role::User);
    let (status, body) = app
        .send(
            Method::POST,
            "/api/match/mood",
            Some(&token),
            Some(json!({ "moods": [], "preferedMood": "similar" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn similar_match_prefers_full_overlap() {
    let app = app().await;
    app.seed_user("me", &["11"], MoodPreference::Similar).await;
    app.seed_user("calm", &["01"], MoodPreference::Similar).await;
    app.seed_user("energized", &["11"], MoodPreference::Similar).await;
    app.seed_user("tense", &["10"], MoodPreference::Similar).await;
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/match/mood",
            Some(&token),
            Some(json!({ "moods": ["11"], "preferedMood": "similar" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match"]["userId"], "energized");
    assert_eq!(body["match"]["moodGroup"], "good");
}

#[tokio::test]
async fn different_match_picks_opposite_group() {
    let app = app().await;
    app.seed_user("me", &["11"], MoodPreference::Different).await;
    app.seed_user("calm", &["01"], MoodPreference::Similar).await;
    app.seed_user("drained", &["00"], MoodPreference::Similar).await;
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/match/mood",
            Some(&token),
            Some(json!({ "moods": ["11"], "preferedMood": "different" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["match"]["userId"], "drained");
    assert_eq!(body["match"]["score"], 12);
}

#[tokio::test]
async fn match_never_returns_caller() {
    let app = app().await;
    app.seed_user("me", &["11"], MoodPreference::Similar).await;
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/match/mood",
            Some(&token),
            Some(json!({ "moods": ["11"] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("AI companion"));
}

#[tokio::test]
async fn offline_users_are_not_matched() {
    let app = app().await;
    app.seed_user("other", &["11"], MoodPreference::Similar).await;
    app.db.set_online("other", false).await.unwrap();
    let token = app.token("me", Role::User);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/match/mood",
            Some(&token),
            Some(json!({ "moods": ["11"] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// === Listener matching ===

#[tokio::test]
async fn listener_match_picks_nearest_age_and_claims() {
    let app = app().await;
    app.db.upsert_user("me", "me", Some(30)).await.unwrap();
    app.seed_listener("l25", 25).await;
    app.seed_listener("l40", 40).await;
    app.seed_listener("l31", 31).await;
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listener"]["id"], "l31");
    assert_eq!(app.db.get_listener("l31").await.unwrap().is_busy, 1);

    let (status, body) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listener"]["id"], "l25");

    let listener_token = app.token("l31", Role::Listener);
    let (status, body) = app
        .send(Method::POST, "/api/listener/release", Some(&listener_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["released"], true);

    let (_, body) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(body["listener"]["id"], "l31");
}

#[tokio::test]
async fn listener_match_without_free_listener_is_not_found() {
    let app = app().await;
    app.db.upsert_user("me", "me", Some(30)).await.unwrap();
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn listener_match_with_zero_claim_attempts_is_not_found() {
    let app = app_with(MatchingConfig {
        listener_claim_attempts: 0,
        ..MatchingConfig::default()
    })
    .await;
    app.db.upsert_user("me", "me", Some(30)).await.unwrap();
    app.seed_listener("l30", 30).await;
    let token = app.token("me", Role::User);

    let (status, body) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], MatchingConfig::default().fallback_message);
    assert_eq!(app.db.get_listener("l30").await.unwrap().is_busy, 0);
}

#[tokio::test]
async fn listener_match_requires_age_and_user_role() {
    let app = app().await;
    app.db.upsert_user("me", "me", None).await.unwrap();
    app.seed_listener("l1", 30).await;

    let token = app.token("me", Role::User);
    let (status, _) = app
        .send(Method::POST, "/api/match/listener", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let listener_token = app.token("l1", Role::Listener);
    let (status, _) = app
        .send(Method::POST, "/api/match/listener", Some(&listener_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// === Chat requests ===

#[tokio::test]
async fn chat_request_lifecycle() {
    let app = app().await;
    app.db.upsert_user("alice", "alice", None).await.unwrap();
    app.db.upsert_user("bob", "bob", None).await.unwrap();
    let alice = app.token("alice", Role::User);
    let bob = app.token("bob", Role::User);
    let carol = app.token("carol", Role::User);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/chat-requests",
            Some(&alice),
            Some(json!({ "receiverId": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "pending");
    let id = body["request"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(Method::GET, "/api/chat-requests/incoming", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"][0]["id"], id.as_str());
    assert_eq!(body["requests"][0]["senderId"], "alice");

    let uri = format!("/api/chat-requests/{id}");
    let (status, _) = app.send(Method::GET, &uri, Some(&carol), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let respond = format!("/api/chat-requests/{id}/respond");
    let (status, _) = app
        .send(
            Method::POST,
            &respond,
            Some(&alice),
            Some(json!({ "action": "accepted" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            Method::POST,
            &respond,
            Some(&bob),
            Some(json!({ "action": "declined" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "declined");

    let (status, _) = app
        .send(
            Method::POST,
            &respond,
            Some(&bob),
            Some(json!({ "action": "accepted" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.send(Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], "declined");
}

#[tokio::test]
async fn chat_request_validation() {
    let app = app().await;
    app.db.upsert_user("alice", "alice", None).await.unwrap();
    let alice = app.token("alice", Role::User);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/chat-requests",
            Some(&alice),
            Some(json!({ "receiverId": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/chat-requests",
            Some(&alice),
            Some(json!({ "receiverId": "nobody" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::GET, "/api/chat-requests/missing", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/chat-requests/missing/respond",
            Some(&alice),
            Some(json!({ "action": "maybe" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

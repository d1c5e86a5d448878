use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use workout_tally::{
    dao::league_store::MemoryStore,
    routes,
    state::{AppState, cooldown::DEFAULT_COOLDOWN},
};

async fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::load(store.clone(), DEFAULT_COOLDOWN)
        .await
        .expect("empty store loads");
    (routes::router(state), store)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json, retry_after)
}

async fn register(app: &Router, name: &str, id: Value) -> StatusCode {
    send(app, Method::POST, "/groups", Some(json!({ "name": name, "id": id })))
        .await
        .0
}

async fn join(app: &Router, group: &str, member_id: &str, display_name: &str) -> StatusCode {
    send(
        app,
        Method::POST,
        &format!("/groups/{group}/members"),
        Some(json!({ "member_id": member_id, "display_name": display_name })),
    )
    .await
    .0
}

#[tokio::test]
async fn healthcheck_reports_ok_with_group_count() {
    let (app, _store) = app().await;
    assert_eq!(register(&app, "Eagles", json!(-100123)).await, StatusCode::CREATED);

    let (status, body, _) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "groups": 1 }));
}

#[tokio::test]
async fn registering_twice_conflicts() {
    let (app, store) = app().await;
    assert_eq!(register(&app, "Eagles", json!("-100123")).await, StatusCode::CREATED);
    assert_eq!(register(&app, "Eagles", json!("-100123")).await, StatusCode::CONFLICT);
    assert_eq!(register(&app, "Hawks", json!("-100123")).await, StatusCode::CONFLICT);
    assert_eq!(store.save_count(), 1);

    let (status, body, _) = send(&app, Method::GET, "/groups/Eagles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Eagles", "id": "-100123", "members": 0 }));
}

#[tokio::test]
async fn empty_group_name_is_rejected() {
    let (app, _store) = app().await;
    let status = register(&app, "", json!("1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn workout_flow_scores_then_rate_limits() {
    let (app, store) = app().await;
    register(&app, "Eagles", json!(-100123)).await;
    assert_eq!(join(&app, "Eagles", "42", "Sam").await, StatusCode::CREATED);
    assert_eq!(join(&app, "Eagles", "42", "Sam").await, StatusCode::CONFLICT);

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/groups/Eagles/workouts",
        Some(json!({ "member_id": "42", "category": "field" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 5);
    assert_eq!(body["total"], 5);

    let saves = store.save_count();
    let (status, body, retry_after) = send(
        &app,
        Method::POST,
        "/groups/Eagles/workouts",
        Some(json!({ "member_id": "42", "category": "gym" })),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].is_string());
    let secs: u64 = retry_after
        .expect("retry-after header")
        .parse()
        .expect("numeric retry-after");
    assert!(secs > 0 && secs <= 3600);
    assert_eq!(store.save_count(), saves);
}

#[tokio::test]
async fn unknown_group_and_member_are_not_found() {
    let (app, _store) = app().await;
    let (status, _, _) = send(&app, Method::GET, "/groups/Nobody/leaderboard", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(join(&app, "Nobody", "1", "Kim").await, StatusCode::NOT_FOUND);

    register(&app, "Eagles", json!(7)).await;
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/groups/Eagles/workouts",
        Some(json!({ "member_id": "99", "category": "track" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn leaderboard_ranks_by_points() {
    let (app, _store) = app().await;
    register(&app, "Eagles", json!(-100123)).await;
    join(&app, "Eagles", "1", "Kim").await;
    join(&app, "Eagles", "2", "Lee").await;
    for (member, category) in [("1", "gym"), ("2", "field")] {
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/groups/Eagles/workouts",
            Some(json!({ "member_id": member, "category": category })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body, _) = send(&app, Method::GET, "/groups/Eagles/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "group": "Eagles",
            "entries": [
                { "rank": 1, "member_id": "2", "display_name": "Lee", "points": 5 },
                { "rank": 2, "member_id": "1", "display_name": "Kim", "points": 1 },
            ]
        })
    );
}

#[tokio::test]
async fn removing_member_reports_points_and_frees_the_slot() {
    let (app, _store) = app().await;
    register(&app, "Eagles", json!(-100123)).await;
    join(&app, "Eagles", "1", "Kim").await;
    send(
        &app,
        Method::POST,
        "/groups/Eagles/workouts",
        Some(json!({ "member_id": "1", "category": "track" })),
    )
    .await;

    let (status, body, _) = send(&app, Method::DELETE, "/groups/Eagles/members/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "member_id": "1", "points_at_removal": 2 }));

    let (status, _, _) = send(&app, Method::DELETE, "/groups/Eagles/members/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(join(&app, "Eagles", "1", "Kim").await, StatusCode::CREATED);
}

#[tokio::test]
async fn unregistering_group_forgets_it() {
    let (app, _store) = app().await;
    register(&app, "Eagles", json!(-100123)).await;

    let (status, _, _) = send(&app, Method::DELETE, "/groups/Eagles", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _, _) = send(&app, Method::GET, "/groups/Eagles", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::DELETE, "/groups/Eagles", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_save_degrades_health_and_returns_unavailable() {
    let (app, store) = app().await;
    store.fail_saves(true);

    assert_eq!(
        register(&app, "Eagles", json!(-100123)).await,
        StatusCode::SERVICE_UNAVAILABLE
    );
    let (_, body, _) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["groups"], 1);

    store.fail_saves(false);
    assert_eq!(join(&app, "Eagles", "1", "Kim").await, StatusCode::CREATED);
    let (_, body, _) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn chat_updates_drive_the_league() {
    let (app, _store) = app().await;
    let chat = json!({ "id": -100123, "title": "Eagles", "kind": "supergroup" });
    let sam = json!({ "id": 42, "username": "sam", "full_name": "Sam Doe" });

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/chat/updates",
        Some(json!({
            "chat": chat,
            "from": sam,
            "event": { "type": "bot_membership", "was_member": false, "is_member": true }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["reply"].is_string());

    for text in ["/join", "/field@tally_bot"] {
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/chat/updates",
            Some(json!({
                "chat": chat,
                "from": sam,
                "event": { "type": "message", "text": text }
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/chat/updates",
        Some(json!({
            "chat": chat,
            "from": sam,
            "event": { "type": "message", "text": "/leaderboard" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Leaderboard for Eagles:\n1. sam - 5 points");

    let (status, body, _) = send(
        &app,
        Method::POST,
        "/chat/updates",
        Some(json!({
            "chat": chat,
            "from": sam,
            "event": { "type": "message", "text": "great session today" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "reply": null }));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _store) = app().await;
    let (status, body, _) = send(&app, Method::GET, "/api-doc/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/groups/{name}/workouts"].is_object());
}

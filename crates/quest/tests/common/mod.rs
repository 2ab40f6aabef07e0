//! Test utilities and common setup.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use serde_json::Value;
use tower::ServiceExt;

use quest::api::{self, AppState};
use quest::bridge::{BridgeConfig, BridgeService};
use quest::player::{PlayerConfig, PlayerKeys};
use quest::program::{self, Console, Program, ProgramError, QuestParams, SubquestProgram};
use quest::scores::ScoreLog;

const TEST_SECRET: &str = "test-secret-for-integration-tests-minimum-32-chars";

/// A two-step program: greets the team, asks one question, says goodbye.
pub fn greeter() -> Arc<dyn Program> {
    program::from_fn(
        "greeter",
        |params: &QuestParams, console: &mut dyn Console| -> Result<(), ProgramError> {
            console.print(&format!("Welcome, team {}", params.team));
            let name = console.read("Name?")?;
            console.print(&format!("Hello {}", name.trim()));
            console.print("Bye");
            Ok(())
        },
    )
}

fn app_with_program(program: Arc<dyn Program>) -> Router {
    let bridge = BridgeService::new(program, BridgeConfig::default());
    let players = PlayerKeys::new(TEST_SECRET, &PlayerConfig::default());
    api::create_router(AppState::new(bridge, players))
}

/// Create a test application driving the greeter program.
pub fn test_app() -> Router {
    app_with_program(greeter())
}

/// Create a test application driving the bundled quiz, scoring into `scores`.
pub fn quiz_app(scores: &Path) -> Router {
    let log = Arc::new(ScoreLog::new(scores));
    app_with_program(Arc::new(SubquestProgram::new(log)))
}

/// POST a JSON body, optionally with a cookie.
pub async fn post_json(app: &Router, uri: &str, body: Value, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// `name=value` part of the response's `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(';').next())
        .unwrap_or_default()
        .to_string()
}

/// Register a team and return its session cookie.
pub async fn register(app: &Router, team: &str, players: &str) -> String {
    let response = post_json(
        app,
        "/start_quest",
        serde_json::json!({ "team": team, "players": players }),
        None,
    )
    .await;
    assert!(response.status().is_success());
    session_cookie(&response)
}

/// One `/play` poll; returns `(output, finished)`.
pub async fn play(app: &Router, body: Value, cookie: Option<&str>) -> (String, bool) {
    let response = post_json(app, "/play", body, cookie).await;
    assert!(response.status().is_success());
    let json = body_json(response).await;
    (
        json["output"].as_str().unwrap_or_default().to_string(),
        json["finished"].as_bool().unwrap(),
    )
}

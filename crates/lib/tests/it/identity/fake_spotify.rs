//! Loopback stand-in for the Spotify Web API and accounts service
//!
//! Behaviour is keyed on the bearer token:
//! - `good`: profile, an active device, a playing track
//! - `noname`: profile without a display name
//! - `idle`: no active device, nothing playing (204)
//! - `paused`: a track that is not playing
//! - `broken`: HTTP 500 everywhere
//! - `garbage`: 200 with a body that is not JSON
//! - `slow`: answers after two seconds
//! - anything else: 401

use std::time::Duration;

use axum::{
    Form, Json, Router,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "shh";

fn bearer(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("")
}

/// Shared handling of the special tokens; `None` means "answer normally".
async fn special(token: &str) -> Option<Response> {
    match token {
        "broken" => Some(StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        "garbage" => Some((StatusCode::OK, "definitely not json").into_response()),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Some(Json(json!({})).into_response())
        }
        "good" | "noname" | "idle" | "paused" => None,
        _ => Some(StatusCode::UNAUTHORIZED.into_response()),
    }
}

async fn profile(headers: HeaderMap) -> Response {
    let token = bearer(&headers);
    if let Some(response) = special(token).await {
        return response;
    }
    let display_name = if token == "noname" {
        json!(null)
    } else {
        json!("Alice Example")
    };
    Json(json!({ "id": "alice01", "display_name": display_name, "country": "FR" })).into_response()
}

async fn devices(headers: HeaderMap) -> Response {
    let token = bearer(&headers);
    if let Some(response) = special(token).await {
        return response;
    }
    let active = token != "idle";
    Json(json!({
        "devices": [
            {
                "id": "tv-1",
                "is_active": false,
                "is_private_session": false,
                "is_restricted": false,
                "name": "Living Room TV",
                "supports_volume": false,
                "type": "TV",
                "volume_percent": null
            },
            {
                "id": "laptop-1",
                "is_active": active,
                "is_private_session": false,
                "is_restricted": false,
                "name": "Laptop",
                "supports_volume": true,
                "type": "Computer",
                "volume_percent": 65
            }
        ]
    }))
    .into_response()
}

async fn currently_playing(headers: HeaderMap) -> Response {
    let token = bearer(&headers);
    if let Some(response) = special(token).await {
        return response;
    }
    if token == "idle" {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(json!({
        "is_playing": token != "paused",
        "progress_ms": 1234,
        "item": {
            "name": "Harder, Better, Faster, Stronger",
            "artists": [{ "name": "Daft Punk" }, { "name": "Kanye West" }],
            "album": { "name": "Discovery" }
        }
    }))
    .into_response()
}

#[derive(Deserialize)]
struct TokenForm {
    grant_type: String,
    code: String,
    redirect_uri: String,
}

async fn token(headers: HeaderMap, Form(form): Form<TokenForm>) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if form.grant_type != "authorization_code" || form.redirect_uri.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    if form.code == "bad-code" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
            .into_response();
    }
    Json(json!({
        "access_token": format!("access-for-{}", form.code),
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

/// Start the stand-in and return its base URL.
pub async fn spawn() -> String {
    let app = Router::new()
        .route("/v1/me", get(profile))
        .route("/v1/me/player/devices", get(devices))
        .route("/v1/me/player/currently-playing", get(currently_playing))
        .route("/api/token", post(token));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

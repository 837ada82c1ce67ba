//! Serve command - runs the YSpotify web server.

use std::{sync::Arc, time::Duration};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};

use yspotify::{
    Error, Hub, SessionUser,
    identity::{AccountLinker, IdentityProvider, SpotifyClient, SpotifyConfig},
};

use crate::cli::ServeArgs;
use crate::session::{SessionStore, SessionToken, WebSession};
use crate::store::create_hub;

const SESSION_COOKIE: &str = "yspotify_session";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub identity: Arc<dyn IdentityProvider>,
    pub linker: Arc<dyn AccountLinker>,
    pub sessions: SessionStore,
    /// Whether OAuth client credentials are configured
    pub can_link: bool,
}

/// Sign-in form data
#[derive(Deserialize)]
struct SignInForm {
    username: String,
    password: String,
}

/// Signup form data
#[derive(Deserialize)]
struct SignUpForm {
    username: String,
    password: String,
    password_confirm: Option<String>,
}

/// Join form data
#[derive(Deserialize)]
struct JoinForm {
    group: String,
}

/// OAuth callback parameters
#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Run the YSpotify server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let hub = create_hub(args).await?;

    let spotify = Arc::new(SpotifyClient::new(SpotifyConfig {
        client_id: args.client_id.clone(),
        client_secret: args.client_secret.clone(),
        redirect_uri: args.redirect_uri.clone(),
        timeout: Duration::from_secs(args.identity_timeout),
        ..SpotifyConfig::default()
    })?);
    let can_link = spotify.can_link();
    if !can_link {
        tracing::warn!(
            "CLIENT_ID, CLIENT_SECRET or REDIRECT_URI missing; Spotify linking is disabled"
        );
    }

    let app_state = AppState {
        hub: Arc::new(hub),
        identity: spotify.clone(),
        linker: spotify,
        sessions: SessionStore::new(),
        can_link,
    };
    let groups = app_state.hub.catalog().names().join(", ");
    let app = router(app_state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("YSpotify server started");
    println!();
    println!("Web Interface: http://localhost:{}", local_addr.port());
    println!("Groups:        {groups}");
    println!();
    println!("Available endpoints:");
    println!("  GET  /                      - Redirect to sign-in or dashboard");
    println!("  GET  /signup, /signin       - Account pages");
    println!("  GET  /main                  - Dashboard (requires sign-in)");
    println!("  GET  /loginspotify          - Link a Spotify account");
    println!("  POST /groups/join           - Join a group");
    println!("  GET  /groups/{{name}}/members - Member list");
    println!("  GET  /api/groups            - Group summary as JSON");
    println!("  GET  /health                - Health probe");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for SIGINT: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
        _ = terminate => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route("/signup", get(handle_signup_page).post(handle_signup_submit))
        .route("/signin", get(handle_signin_page).post(handle_signin_submit))
        .route("/logout", post(handle_logout))
        .route("/main", get(handle_main))
        .route("/loginspotify", get(handle_link_start))
        .route("/callback", get(handle_link_callback))
        .route("/unlinkspotify", post(handle_unlink))
        .route("/groups/join", post(handle_join))
        .route("/groups/{name}/members", get(handle_members))
        .route("/api/groups", get(handle_api_groups))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

// ============================================================================
// Session helpers
// ============================================================================

async fn current_session(
    state: &AppState,
    cookies: &Cookies,
) -> Option<(SessionToken, WebSession)> {
    let token = cookies.get(SESSION_COOKIE)?.value().to_string();
    let session = state.sessions.get(&token).await?;
    Some((token, session))
}

fn set_session_cookie(cookies: &Cookies, token: SessionToken) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);
}

fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}

/// Map a library error to an HTTP response.
fn error_response(err: &Error) -> Response {
    if err.is_unauthorized() {
        tracing::info!("Spotify token rejected; sending user to relink");
        return Redirect::to("/loginspotify").into_response();
    }

    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() || err.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else if err.is_invalid_credentials() {
        StatusCode::UNAUTHORIZED
    } else if matches!(err, Error::Identity(_)) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    if status.is_server_error() {
        tracing::error!(module = err.module(), "Request failed: {err}");
    } else {
        tracing::debug!(module = err.module(), "Request rejected: {err}");
    }
    (status, err.to_string()).into_response()
}

// ============================================================================
// Account Handlers
// ============================================================================

/// Handler for GET / - Root redirect
async fn handle_root_request(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if current_session(&state, &cookies).await.is_some() {
        return Redirect::to("/main");
    }
    Redirect::to("/signin")
}

/// Handler for GET /signup - Show signup page
async fn handle_signup_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if current_session(&state, &cookies).await.is_some() {
        return Redirect::to("/main").into_response();
    }
    Html(crate::templates::signup_page(None)).into_response()
}

/// Handler for POST /signup - Create account and open a session
async fn handle_signup_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SignUpForm>,
) -> Response {
    if let Some(confirm) = &form.password_confirm
        && confirm != &form.password
    {
        return (
            StatusCode::BAD_REQUEST,
            Html(crate::templates::signup_page(Some("Passwords do not match"))),
        )
            .into_response();
    }

    match state.hub.signup(&form.username, &form.password).await {
        Ok(user) => {
            let token = state.sessions.create_session(user).await;
            set_session_cookie(&cookies, token);
            Redirect::to("/main").into_response()
        }
        Err(e) if e.is_conflict() => (
            StatusCode::BAD_REQUEST,
            Html(crate::templates::signup_page(Some("Username already taken"))),
        )
            .into_response(),
        Err(e) if e.is_invalid_input() => (
            StatusCode::BAD_REQUEST,
            Html(crate::templates::signup_page(Some(
                "Username and password are required",
            ))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handler for GET /signin - Show sign-in page
async fn handle_signin_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if current_session(&state, &cookies).await.is_some() {
        return Redirect::to("/main").into_response();
    }
    Html(crate::templates::signin_page(None)).into_response()
}

/// Handler for POST /signin - Authenticate and refresh Spotify state
async fn handle_signin_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SignInForm>,
) -> Response {
    let result = state
        .hub
        .sign_in(&form.username, &form.password, state.identity.as_ref())
        .await;

    match result {
        Ok(sign_in) => {
            let token = state.sessions.create_session(sign_in.session).await;
            set_session_cookie(&cookies, token);
            if sign_in.relink_required && state.can_link {
                Redirect::to("/loginspotify").into_response()
            } else {
                Redirect::to("/main").into_response()
            }
        }
        Err(e) if e.is_invalid_credentials() || e.is_invalid_input() => (
            StatusCode::UNAUTHORIZED,
            Html(crate::templates::signin_page(Some(
                "Invalid username or password",
            ))),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        clear_session_cookie(&cookies);
    }
    Redirect::to("/signin")
}

// ============================================================================
// Dashboard Handlers
// ============================================================================

/// Handler for GET /main - Show dashboard
async fn handle_main(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some((token, session)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };
    let username = session.user.username;

    let user = match state.hub.session_for(&username).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            state.sessions.destroy_session(&token).await;
            clear_session_cookie(&cookies);
            return Redirect::to("/signin").into_response();
        }
        Err(e) => return error_response(&e),
    };
    state.sessions.update_user(&token, user.clone()).await;

    match state.hub.group_summary(&username).await {
        Ok(groups) => Html(crate::templates::main_page(
            &user,
            &groups,
            state.can_link,
            None,
        ))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handler for GET /api/groups - Group summary for the caller as JSON
async fn handle_api_groups(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some((_, session)) = current_session(&state, &cookies).await else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    match state.hub.group_summary(&session.user.username).await {
        Ok(groups) => Json(groups).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Spotify Link Handlers
// ============================================================================

/// Handler for GET /loginspotify - Start the OAuth link flow
async fn handle_link_start(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some((token, _)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };
    if !state.can_link {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Spotify linking is not configured",
        )
            .into_response();
    }

    let Some(oauth_state) = state.sessions.begin_oauth(&token).await else {
        return Redirect::to("/signin").into_response();
    };
    match state.linker.authorize_url(&oauth_state) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Handler for GET /callback - Finish the OAuth link flow
async fn handle_link_callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some((token, session)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };

    let expected = state.sessions.take_oauth_state(&token).await;
    if expected.is_none() || query.state != expected {
        tracing::warn!(
            username = %session.user.username,
            "OAuth callback with mismatched state"
        );
        return (StatusCode::FORBIDDEN, "State mismatch").into_response();
    }

    if let Some(error) = query.error {
        tracing::info!(username = %session.user.username, "Spotify authorization declined: {error}");
        return Redirect::to("/main").into_response();
    }
    let Some(code) = query.code else {
        return (StatusCode::BAD_REQUEST, "Missing authorization code").into_response();
    };

    let username = session.user.username;
    let access_token = match state.linker.exchange_code(&code).await {
        Ok(access_token) => access_token,
        Err(e) => return error_response(&e),
    };
    if let Err(e) = state.hub.link_identity(&username, &access_token).await {
        return error_response(&e);
    }

    match state
        .hub
        .refresh_identity(&username, state.identity.as_ref())
        .await
    {
        Ok(sign_in) => {
            state.sessions.update_user(&token, sign_in.session).await;
            Redirect::to("/main").into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Handler for POST /unlinkspotify - Drop the Spotify link and the group membership
async fn handle_unlink(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some((token, session)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };
    update_from(&state, &token, state.hub.unlink_identity(&session.user.username).await).await
}

// ============================================================================
// Group Handlers
// ============================================================================

/// Handler for POST /groups/join - Join a group
async fn handle_join(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<JoinForm>,
) -> Response {
    let Some((token, session)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };
    let result = state
        .hub
        .join_group(&session.user.username, form.group.trim())
        .await;
    update_from(&state, &token, result).await
}

/// Store a mutation result in the session and go back to the dashboard.
async fn update_from(
    state: &AppState,
    token: &str,
    result: yspotify::Result<SessionUser>,
) -> Response {
    match result {
        Ok(user) => {
            state.sessions.update_user(token, user).await;
            Redirect::to("/main").into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Handler for GET /groups/{name}/members - Show a group's members
async fn handle_members(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(name): Path<String>,
) -> Response {
    let Some((_, session)) = current_session(&state, &cookies).await else {
        return Redirect::to("/signin").into_response();
    };
    if !session.user.has_group() {
        return (StatusCode::BAD_REQUEST, "Join a group first").into_response();
    }

    match state.hub.group_members(&name).await {
        Ok(members) => Html(crate::templates::members_page(&name, &members)).into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Health Handler
// ============================================================================

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    store: String,
    groups: usize,
    sessions: usize,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Response {
    match state.hub.snapshot().await {
        Ok(_) => Json(HealthResponse {
            status: "healthy",
            store: state.hub.store().describe(),
            groups: state.hub.catalog().names().len(),
            sessions: state.sessions.session_count().await,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Health check could not read the record store: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unhealthy", "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

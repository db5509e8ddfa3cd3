// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::{anon_hash, hash_password, verify_password, SessionStore};
use crate::news::types::{Article, NormalizedQuery};
use crate::news::{Aggregator, Facets};
use crate::store::{FavoriteRecord, SavedArticle, Store, ToggleStatus, UserRecord};

pub const SESSION_COOKIE: &str = "newsdesk_session";

#[derive(Clone)]
pub struct AppState {
    pub news: Arc<Aggregator>,
    pub store: Arc<Store>,
    pub sessions: Arc<SessionStore>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/news", get(browse))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/favorite", post(toggle_favorite))
        .route("/favorites", get(list_favorites))
        .route("/saved", get(list_saved).post(toggle_saved))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// ---- session plumbing ----

fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').map(str::trim).find_map(|kv| {
        let (k, v) = kv.split_once('=')?;
        (k == SESSION_COOKIE).then(|| v.to_string())
    })
}

fn current_user(state: &AppState, headers: &HeaderMap) -> Option<UserRecord> {
    let token = session_token(headers)?;
    let user_id = state.sessions.user_for(&token)?;
    state.store.user_by_id(user_id)
}

fn set_session_cookie(token: &str) -> [(header::HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"),
    )]
}

fn clear_session_cookie() -> [(header::HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    )]
}

// ---- shared response shapes ----

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

#[derive(serde::Serialize)]
struct SessionResp {
    status: &'static str,
    username: String,
}

// ---- browsing ----

#[derive(serde::Deserialize, Default)]
struct BrowseParams {
    category: Option<String>,
    q: Option<String>,
    source: Option<String>,
}

#[derive(serde::Serialize)]
struct BrowseResp {
    articles: Vec<Article>,
    facets: Facets,
    favorites: Vec<FavoriteRecord>,
}

async fn browse(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(p): Query<BrowseParams>,
) -> Json<BrowseResp> {
    let query = NormalizedQuery::from_request(p.category, p.q, p.source);
    let result = state.news.aggregate(&query).await;
    let favorites = current_user(&state, &headers)
        .map(|u| state.store.favorites_for(u.id))
        .unwrap_or_default();
    Json(BrowseResp {
        articles: result.articles,
        facets: result.facets,
        favorites,
    })
}

// ---- accounts ----

#[derive(serde::Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn register(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    let username = body.username.trim().to_string();
    if username.is_empty() || body.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "username and password are required");
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = ?e, "password hashing failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not create account");
        }
    };

    match state.store.create_user(&username, &password_hash) {
        Ok(Some(user)) => {
            info!(user = %anon_hash(&user.username), "user registered");
            let token = state.sessions.open(user.id);
            (
                StatusCode::CREATED,
                set_session_cookie(&token),
                Json(SessionResp {
                    status: "ok",
                    username: user.username,
                }),
            )
                .into_response()
        }
        Ok(None) => error_response(
            StatusCode::CONFLICT,
            "username already exists. please choose another",
        ),
        Err(e) => {
            tracing::error!(error = ?e, "storing user failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not save the account")
        }
    }
}

async fn login(State(state): State<AppState>, Json(body): Json<Credentials>) -> Response {
    let user = state.store.user_by_name(body.username.trim());
    match user {
        Some(user) if verify_password(&user.password_hash, &body.password) => {
            info!(user = %anon_hash(&user.username), "user logged in");
            let token = state.sessions.open(user.id);
            (
                set_session_cookie(&token),
                Json(SessionResp {
                    status: "ok",
                    username: user.username,
                }),
            )
                .into_response()
        }
        _ => error_response(
            StatusCode::UNAUTHORIZED,
            "login failed. check your username and password",
        ),
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "not logged in");
    };
    state.sessions.close(&token);
    (
        clear_session_cookie(),
        Json(SessionResp {
            status: "ok",
            username: String::new(),
        }),
    )
        .into_response()
}

// ---- favorites ----

#[derive(serde::Deserialize)]
struct FavoriteReq {
    source: Option<String>,
    category: Option<String>,
}

#[derive(serde::Serialize)]
struct FavoriteResp {
    status: ToggleStatus,
    favorites: Vec<FavoriteRecord>,
}

async fn toggle_favorite(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<FavoriteReq>,
) -> Response {
    let Some(user) = current_user(&state, &headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "login required");
    };

    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let source = clean(body.source);
    let category = clean(body.category);
    if source.is_none() && category.is_none() {
        return error_response(StatusCode::BAD_REQUEST, "no source/category provided");
    }

    match state.store.toggle_favorite(user.id, source, category) {
        Ok(status) => Json(FavoriteResp {
            status,
            favorites: state.store.favorites_for(user.id),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "storing favorite failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not save the favorite")
        }
    }
}

async fn list_favorites(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(user) = current_user(&state, &headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "login required");
    };
    Json(state.store.favorites_for(user.id)).into_response()
}

// ---- saved articles ----

#[derive(serde::Deserialize)]
struct SavedReq {
    title: String,
    url: String,
    image_url: Option<String>,
}

#[derive(serde::Serialize)]
struct SavedResp {
    status: ToggleStatus,
    saved: Vec<SavedArticle>,
}

async fn toggle_saved(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SavedReq>,
) -> Response {
    let Some(user) = current_user(&state, &headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "login required");
    };
    let url = body.url.trim().to_string();
    if url.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "no article url provided");
    }

    match state
        .store
        .toggle_saved(user.id, body.title, url, body.image_url)
    {
        Ok(status) => Json(SavedResp {
            status,
            saved: state.store.saved_for(user.id),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "storing saved article failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "could not save the article")
        }
    }
}

async fn list_saved(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(user) = current_user(&state, &headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "login required");
    };
    Json(state.store.saved_for(user.id)).into_response()
}

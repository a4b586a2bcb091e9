use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::cli::globals::GlobalArgs;

pub mod guard;
pub mod handlers;
pub mod provider;
pub mod routes;
pub mod session;

use guard::GuardConfig;
use provider::IdentityClient;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: IdentityClient,
    pub guard: GuardConfig,
    pub cookie_secure: bool,
}

/// Build the application router around a shared state.
#[must_use]
pub fn app(state: Arc<AppState>) -> Router {
    let guard_state = state.clone();

    Router::new()
        .route(routes::HOME, get(handlers::pages::home))
        .route(
            routes::LOGIN,
            get(handlers::pages::login).post(handlers::login::login),
        )
        .route(
            routes::REGISTER,
            get(handlers::pages::register).post(handlers::register::register),
        )
        .route(routes::LOGOUT, post(handlers::logout::logout))
        .route(routes::DASHBOARD, get(handlers::pages::dashboard))
        .route(routes::HEALTH, get(handlers::health::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn(move |req, next| {
                    guard::guard(guard_state.clone(), req, next)
                }))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, globals: &GlobalArgs) -> Result<()> {
    let client = IdentityClient::new(&globals.provider_url, globals.api_key.clone())
        .context("Failed to build identity provider client")?;

    let state = Arc::new(AppState {
        client,
        guard: GuardConfig::default(),
        cookie_secure: globals.production,
    });

    let app = app(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

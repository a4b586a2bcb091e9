//! Route access guard.
//!
//! Intercepts every request, classifies the path public/protected and turns
//! the session cookie's verification result into allow/redirect decisions.
//! The token is re-verified against the provider on every request; nothing
//! is cached locally.

use axum::{
    body::Body,
    http::{header::SET_COOKIE, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;
use url::form_urlencoded;

use crate::portero::{provider::IdentityClient, routes, session, AppState};

#[derive(Debug, Clone)]
pub struct GuardConfig {
    public_routes: Vec<String>,
    exempt_prefixes: Vec<String>,
    login_path: String,
    dashboard_path: String,
}

impl GuardConfig {
    #[must_use]
    pub fn new(
        public_routes: Vec<String>,
        exempt_prefixes: Vec<String>,
        login_path: &str,
        dashboard_path: &str,
    ) -> Self {
        Self {
            public_routes,
            exempt_prefixes,
            login_path: login_path.to_string(),
            dashboard_path: dashboard_path.to_string(),
        }
    }

    /// A bare `/` entry matches only the home page; everything else matches
    /// by prefix, same as the browser-router convention this replaces.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_routes.iter().any(|route| {
            if route == "/" {
                path == "/"
            } else {
                path.starts_with(route.as_str())
            }
        })
    }

    /// Paths the guard never inspects: configured prefixes and static assets
    /// (a dot in the final segment).
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        if self
            .exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return true;
        }

        path.rsplit('/').next().is_some_and(|last| last.contains('.'))
    }

    /// Login URL carrying the original path so the client can navigate back.
    #[must_use]
    pub fn login_redirect(&self, path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect", path)
            .finish();

        format!("{}?{query}", self.login_path)
    }

    #[must_use]
    pub fn dashboard_path(&self) -> &str {
        &self.dashboard_path
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self::new(
            routes::public_routes(),
            routes::exempt_prefixes(),
            routes::LOGIN,
            routes::DASHBOARD,
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToDashboard,
    RedirectToLogin { clear_cookie: bool },
}

/// Classify one request.
///
/// A verification failure on a public path falls through to `Allow` and
/// leaves the cookie alone; only the protected-path failure clears it.
pub async fn decide(
    config: &GuardConfig,
    client: &IdentityClient,
    path: &str,
    token: Option<&str>,
) -> GuardDecision {
    if config.is_exempt(path) {
        return GuardDecision::Allow;
    }

    if config.is_public(path) {
        if let Some(token) = token {
            if client.verify_token(token).await {
                return GuardDecision::RedirectToDashboard;
            }

            debug!("Session verification failed on public path {path}");
        }

        return GuardDecision::Allow;
    }

    let Some(token) = token else {
        return GuardDecision::RedirectToLogin {
            clear_cookie: false,
        };
    };

    if client.verify_token(token).await {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin { clear_cookie: true }
    }
}

/// Axum middleware wrapping [`decide`].
pub async fn guard(state: Arc<AppState>, request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let token = session::extract_session_token(request.headers());

    match decide(&state.guard, &state.client, &path, token.as_deref()).await {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::RedirectToDashboard => {
            Redirect::temporary(state.guard.dashboard_path()).into_response()
        }
        GuardDecision::RedirectToLogin { clear_cookie } => {
            let mut response =
                Redirect::temporary(&state.guard.login_redirect(&path)).into_response();

            if clear_cookie {
                if let Ok(cookie) = session::clear_session_cookie(state.cookie_secure) {
                    response.headers_mut().insert(SET_COOKIE, cookie);
                }
            }

            response
        }
    }
}

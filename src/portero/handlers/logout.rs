use axum::{
    extract::Extension,
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::error;

use crate::portero::{routes, session, AppState};

/// Clear the session cookie and send the browser back to the login page.
/// Runs the same way whatever the prior cookie state; there is no failure mode.
pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> Response {
    let mut response = Redirect::to(routes::LOGIN).into_response();

    match session::clear_session_cookie(state.cookie_secure) {
        Ok(cookie) => {
            response.headers_mut().insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Error building clear cookie: {err}");
        }
    }

    response
}

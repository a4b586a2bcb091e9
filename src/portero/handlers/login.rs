use axum::{extract::Extension, http::StatusCode, response::Response, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    accept, password_long_enough, reject, valid_email, MSG_INVALID_EMAIL, MSG_INVALID_LOGIN,
    MSG_LOGIN_FALLBACK, MSG_MISSING_CREDENTIALS, MSG_SHORT_PASSWORD, MSG_UNEXPECTED,
};
use crate::portero::{
    provider::{ProviderError, INVALID_LOGIN_CREDENTIALS},
    AppState,
};

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// axum handler for the login action; validation runs before any network call
#[instrument(skip(state, form))]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.email.is_empty() || form.password.is_empty() {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_MISSING_CREDENTIALS);
    }

    if !valid_email(&form.email) {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_INVALID_EMAIL);
    }

    if !password_long_enough(&form.password) {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_SHORT_PASSWORD);
    }

    match state
        .client
        .sign_in_with_password(&form.email, &form.password)
        .await
    {
        Ok(payload) => accept(&payload.id_token, state.cookie_secure),
        Err(ProviderError::Api { code }) => {
            let message = if code == INVALID_LOGIN_CREDENTIALS {
                MSG_INVALID_LOGIN
            } else {
                MSG_LOGIN_FALLBACK
            };

            reject(StatusCode::UNAUTHORIZED, message)
        }
        Err(ProviderError::Network(err)) => {
            error!("Login error: {err:?}");

            reject(StatusCode::BAD_GATEWAY, MSG_UNEXPECTED)
        }
    }
}

use axum::{extract::Extension, http::StatusCode, response::Response, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};

use super::{
    accept, password_long_enough, reject, valid_email, MSG_ALL_FIELDS_REQUIRED, MSG_EMAIL_EXISTS,
    MSG_INVALID_EMAIL, MSG_OPERATION_NOT_ALLOWED, MSG_PASSWORD_MISMATCH, MSG_REGISTER_FALLBACK,
    MSG_SHORT_PASSWORD, MSG_UNEXPECTED, MSG_WEAK_PASSWORD,
};
use crate::portero::{
    provider::{ProviderError, EMAIL_EXISTS, INVALID_EMAIL, OPERATION_NOT_ALLOWED, WEAK_PASSWORD},
    AppState,
};

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

// axum handler for the register action; validation runs before any network call
#[instrument(skip(state, form))]
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.email.is_empty() || form.password.is_empty() || form.confirm_password.is_empty() {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_ALL_FIELDS_REQUIRED);
    }

    if !valid_email(&form.email) {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_INVALID_EMAIL);
    }

    if !password_long_enough(&form.password) {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_SHORT_PASSWORD);
    }

    if form.password != form.confirm_password {
        return reject(StatusCode::UNPROCESSABLE_ENTITY, MSG_PASSWORD_MISMATCH);
    }

    match state.client.sign_up(&form.email, &form.password).await {
        Ok(payload) => accept(&payload.id_token, state.cookie_secure),
        Err(ProviderError::Api { code }) => {
            let message = match code.as_str() {
                EMAIL_EXISTS => MSG_EMAIL_EXISTS,
                INVALID_EMAIL => MSG_INVALID_EMAIL,
                WEAK_PASSWORD => MSG_WEAK_PASSWORD,
                OPERATION_NOT_ALLOWED => MSG_OPERATION_NOT_ALLOWED,
                _ => MSG_REGISTER_FALLBACK,
            };

            reject(StatusCode::BAD_REQUEST, message)
        }
        Err(ProviderError::Network(err)) => {
            error!("Registration error: {err:?}");

            reject(StatusCode::BAD_GATEWAY, MSG_UNEXPECTED)
        }
    }
}

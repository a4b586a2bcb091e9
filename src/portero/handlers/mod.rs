pub mod health;
pub mod login;
pub mod logout;
pub mod pages;
pub mod register;


// common pieces for the form handlers
use axum::{
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::portero::session;

pub const MIN_PASSWORD_CHARS: usize = 6;

// user-facing messages; the strings are the contract, the status codes are not
pub const MSG_MISSING_CREDENTIALS: &str = "Email and password are required";
pub const MSG_ALL_FIELDS_REQUIRED: &str = "All fields are required";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_SHORT_PASSWORD: &str = "Password must be at least 6 characters";
pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_INVALID_LOGIN: &str = "Invalid email or password";
pub const MSG_LOGIN_FALLBACK: &str = "Authentication failed. Please try again.";
pub const MSG_EMAIL_EXISTS: &str = "An account with this email already exists";
pub const MSG_WEAK_PASSWORD: &str = "Password is too weak";
pub const MSG_OPERATION_NOT_ALLOWED: &str =
    "Email/password accounts are not enabled. Please contact support.";
pub const MSG_REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";

/// Outcome of one form submission, returned to the browser-side caller, which
/// is responsible for navigating away on success.
#[derive(Serialize, Debug)]
pub struct AuthReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthReply {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            error: Some(message.to_string()),
        }
    }
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    email.contains('@')
}

#[must_use]
pub fn password_long_enough(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_CHARS
}

pub(super) fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(AuthReply::error(message))).into_response()
}

/// Persist the provider token in the session cookie and signal success.
pub(super) fn accept(token: &str, secure: bool) -> Response {
    match session::session_cookie(token, secure) {
        Ok(cookie) => {
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);

            (StatusCode::OK, headers, Json(AuthReply::ok())).into_response()
        }
        Err(err) => {
            error!("Error building session cookie: {err}");

            reject(StatusCode::INTERNAL_SERVER_ERROR, MSG_UNEXPECTED)
        }
    }
}

//! Identity provider REST client.
//!
//! One POST per operation against the provider's `accounts:*` endpoints, no
//! retries. Credentials are injected at construction so tests can point the
//! client at a fake provider.

use anyhow::Result;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, instrument};
use url::Url;

use crate::portero::APP_USER_AGENT;

/// Provider sign-in/sign-up error codes with user-facing mappings.
pub const INVALID_LOGIN_CREDENTIALS: &str = "INVALID_LOGIN_CREDENTIALS";
pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";
pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD";
pub const OPERATION_NOT_ALLOWED: &str = "OPERATION_NOT_ALLOWED";

#[derive(Debug)]
pub enum ProviderError {
    /// The provider answered with an error envelope; `code` carries its
    /// `error.message` string (empty when the envelope was unreadable).
    Api { code: String },
    /// Transport or parse failure talking to the provider.
    Network(anyhow::Error),
}

/// Success envelope of the password sign-in/sign-up calls.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub id_token: String,
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: String,
}

#[derive(Clone, Debug)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl IdentityClient {
    /// Build a client for the given provider base URL and API key.
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self> {
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, operation: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/accounts:{operation}", self.base_url))
            .map_err(|err| ProviderError::Network(err.into()))?;

        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        Ok(url)
    }

    /// Sign in with email and password.
    /// # Errors
    /// `ProviderError::Api` for provider-reported failures,
    /// `ProviderError::Network` for transport/parse failures.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionPayload, ProviderError> {
        self.credential_call("signInWithPassword", email, password)
            .await
    }

    /// Create a new account with email and password.
    /// # Errors
    /// Same contract as [`Self::sign_in_with_password`].
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionPayload, ProviderError> {
        self.credential_call("signUp", email, password).await
    }

    async fn credential_call(
        &self,
        operation: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionPayload, ProviderError> {
        let url = self.endpoint(operation)?;

        let payload = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| ProviderError::Network(err.into()))?;

        let status = response.status();

        let body: Value = response
            .json()
            .await
            .map_err(|err| ProviderError::Network(err.into()))?;

        if !status.is_success() || body.get("error").is_some() {
            let code = body["error"]["message"].as_str().unwrap_or("").to_string();

            return Err(ProviderError::Api { code });
        }

        serde_json::from_value(body).map_err(|err| ProviderError::Network(err.into()))
    }

    /// Ask the provider whether a session token is still valid.
    ///
    /// Every failure mode counts as invalid: the callers fail closed.
    #[instrument(skip(self, token))]
    pub async fn verify_token(&self, token: &str) -> bool {
        let url = match self.endpoint("lookup") {
            Ok(url) => url,
            Err(err) => {
                error!("Error building provider URL: {err:?}");

                return false;
            }
        };

        let payload = json!({ "idToken": token });

        match self.http.post(url).json(&payload).send().await {
            Ok(response) => {
                let status = response.status();

                if !status.is_success() {
                    error!("Token verification failed: {status}");

                    return false;
                }

                match response.json::<Value>().await {
                    Ok(body) => {
                        if body.get("error").is_some() {
                            error!(
                                "Token verification rejected: {}",
                                body["error"]["message"].as_str().unwrap_or("")
                            );

                            return false;
                        }

                        body["users"].as_array().is_some_and(|users| !users.is_empty())
                    }
                    Err(err) => {
                        error!("Error parsing verification response: {err:?}");

                        false
                    }
                }
            }
            Err(err) => {
                error!("Error verifying token: {err:?}");

                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(base_url: &str) -> IdentityClient {
        IdentityClient::new(base_url, SecretString::from("test-api-key")).unwrap()
    }

    #[tokio::test]
    async fn sign_in_returns_session_payload() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:signInWithPassword"))
            .and(query_param("key", "test-api-key"))
            .and(body_json(serde_json::json!({
                "email": "user@example.com",
                "password": "hunter22",
                "returnSecureToken": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "identitytoolkit#VerifyPasswordResponse",
                "localId": "uid-1",
                "email": "user@example.com",
                "idToken": "token-abc",
                "registered": true,
                "refreshToken": "refresh-xyz",
                "expiresIn": "3600",
            })))
            .mount(&server)
            .await;

        let payload = client(&server.uri())
            .sign_in_with_password("user@example.com", "hunter22")
            .await
            .unwrap();

        assert_eq!(payload.id_token, "token-abc");
        assert_eq!(payload.local_id, "uid-1");
        assert_eq!(payload.email, "user@example.com");
        assert_eq!(payload.refresh_token, "refresh-xyz");
        assert_eq!(payload.expires_in, "3600");
    }

    #[tokio::test]
    async fn sign_in_surfaces_provider_error_code() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:signInWithPassword"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "code": 400,
                    "message": "INVALID_LOGIN_CREDENTIALS",
                    "errors": [],
                }
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .sign_in_with_password("user@example.com", "wrong-pass")
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { code } => assert_eq!(code, INVALID_LOGIN_CREDENTIALS),
            ProviderError::Network(err) => panic!("expected api error, got {err:?}"),
        }
    }

    #[tokio::test]
    async fn sign_up_surfaces_email_exists() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:signUp"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "EMAIL_EXISTS", "errors": [] }
            })))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .sign_up("user@example.com", "hunter22")
            .await
            .unwrap_err();

        match err {
            ProviderError::Api { code } => assert_eq!(code, EMAIL_EXISTS),
            ProviderError::Network(err) => panic!("expected api error, got {err:?}"),
        }
    }

    #[tokio::test]
    async fn sign_in_maps_transport_failure_to_network() {
        let err = client("http://127.0.0.1:1")
            .sign_in_with_password("user@example.com", "hunter22")
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn verify_token_accepts_known_user() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .and(body_json(serde_json::json!({ "idToken": "token-abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "users": [{ "localId": "uid-1", "email": "user@example.com" }]
            })))
            .mount(&server)
            .await;

        assert!(client(&server.uri()).verify_token("token-abc").await);
    }

    #[tokio::test]
    async fn verify_token_fails_closed() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 400, "message": "INVALID_ID_TOKEN", "errors": [] }
            })))
            .mount(&server)
            .await;

        assert!(!client(&server.uri()).verify_token("expired").await);

        // transport failure is also "invalid"
        assert!(!client("http://127.0.0.1:1").verify_token("token-abc").await);
    }

    #[tokio::test]
    async fn verify_token_requires_a_matched_user() {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return;
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/accounts:lookup"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "users": [] })),
            )
            .mount(&server)
            .await;

        assert!(!client(&server.uri()).verify_token("token-abc").await);
    }
}

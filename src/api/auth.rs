//! Auth backend client
//!
//! Register, login and logout against the account backend, plus the
//! [`TokenPropagator`] that attaches the stored bearer token to outgoing
//! backend requests.

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Request, StatusCode, Url};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::http_client;
use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::models::{ApiErrorBody, AuthResponse, LoginRequest, Preferences, RegisterRequest};
use crate::store::PrefsStore;

pub const REGISTER_PATH: &str = "api/register";
pub const LOGIN_PATH: &str = "api/login";
pub const LOGOUT_PATH: &str = "api/logout";

pub const REGISTER_FAILED: &str = "Registration failed";
pub const LOGIN_FAILED: &str = "Login failed. Invalid credentials or server error.";
pub const LOGOUT_FAILED: &str = "Logout failed";

/// Auth error types. `Display` is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Couldn't reach server. Check your internet connection.")]
    Connection,

    #[error("{message}")]
    Rejected { status: u16, message: String },
}

/// Attaches `Authorization: Bearer <token>` to backend requests.
///
/// Only requests under the backend base URL are touched, and never the
/// login or register endpoints. The token comes from the preference
/// store's watch channel and is read without blocking.
#[derive(Clone)]
pub struct TokenPropagator {
    /// `None` when the configured base does not parse; nothing is decorated then
    base: Option<Url>,
    prefs: watch::Receiver<Preferences>,
}

impl TokenPropagator {
    pub fn new(base_url: impl Into<String>, prefs: watch::Receiver<Preferences>) -> Self {
        let base_url = normalize_base(base_url.into());
        let base = match Url::parse(&base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(%base_url, error = %e, "auth base URL does not parse, tokens will not be attached");
                None
            }
        };
        Self { base, prefs }
    }

    /// Return the request with credentials attached when they apply
    pub fn decorate(&self, mut request: Request) -> Request {
        let Some(path) = self.relative_path(request.url()) else {
            return request;
        };
        if path == LOGIN_PATH || path == REGISTER_PATH {
            return request;
        }

        let token = self.prefs.borrow().auth_token.clone();
        let Some(token) = token else {
            return request;
        };

        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                let headers = request.headers_mut();
                headers.insert(AUTHORIZATION, value);
                headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
            }
            Err(_) => warn!("stored auth token is not a valid header value, sending without it"),
        }
        request
    }

    /// Path below the backend base URL, `None` for other origins.
    ///
    /// Compares parsed origins, so host case and default ports don't matter.
    fn relative_path<'a>(&self, url: &'a Url) -> Option<&'a str> {
        let base = self.base.as_ref()?;
        if url.scheme() != base.scheme()
            || url.host_str() != base.host_str()
            || url.port_or_known_default() != base.port_or_known_default()
        {
            return None;
        }
        let rest = url.path().strip_prefix(base.path())?;
        Some(rest.trim_end_matches('/'))
    }
}

/// Auth backend client
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    client: reqwest::Client,
    propagator: TokenPropagator,
}

impl AuthClient {
    /// Create a client for `base_url` reading tokens from `prefs`
    pub fn new(base_url: impl Into<String>, prefs: &PrefsStore) -> Self {
        let base_url = normalize_base(base_url.into());
        Self {
            propagator: TokenPropagator::new(base_url.clone(), prefs.subscribe()),
            base_url,
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    pub fn from_config(config: &Config, prefs: &PrefsStore) -> Self {
        Self::new(config.auth_base_url.as_str(), prefs).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    pub fn propagator(&self) -> &TokenPropagator {
        &self.propagator
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        let (status, body) = self.post(REGISTER_PATH, Some(request)).await?;
        let response = parse_auth_response(status, &body, REGISTER_FAILED)?;
        info!(email = %request.email, "registered");
        Ok(response)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let (status, body) = self.post(LOGIN_PATH, Some(request)).await?;
        let response = parse_auth_response(status, &body, LOGIN_FAILED)?;
        info!(email = %request.email, "logged in");
        Ok(response)
    }

    /// Invalidate the current token on the backend
    pub async fn logout(&self) -> Result<(), AuthError> {
        let (status, body) = self.post::<()>(LOGOUT_PATH, None).await?;
        if status.is_success() {
            info!("logged out");
            Ok(())
        } else {
            Err(rejection(status, &body, LOGOUT_FAILED))
        }
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, String), AuthError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "auth request");

        let mut builder = self.client.post(&url).header(ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let request = builder.build().map_err(|e| {
            warn!(error = %e, "failed to build auth request");
            AuthError::Connection
        })?;
        let request = self.propagator.decorate(request);

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(error = %e, "auth request failed");
            AuthError::Connection
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "failed to read auth response");
            AuthError::Connection
        })?;
        Ok((status, body))
    }
}

fn parse_auth_response(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> Result<AuthResponse, AuthError> {
    if !status.is_success() {
        return Err(rejection(status, body, fallback));
    }

    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "unreadable auth response");
        AuthError::Rejected {
            status: status.as_u16(),
            message: fallback.to_string(),
        }
    })
}

fn rejection(status: StatusCode, body: &str, fallback: &str) -> AuthError {
    AuthError::Rejected {
        status: status.as_u16(),
        message: error_message(status, body, fallback),
    }
}

/// Pick the message shown for a rejected request.
///
/// 422 with email field errors -> those errors; else the body's message;
/// else `fallback`.
pub fn error_message(status: StatusCode, body: &str, fallback: &str) -> String {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();

    if status == StatusCode::UNPROCESSABLE_ENTITY {
        if let Some(errors) = parsed.as_ref().and_then(|b| b.field_errors("email")) {
            if !errors.is_empty() {
                return errors.join(", ");
            }
        }
    }

    parsed
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn normalize_base(base_url: String) -> String {
    if base_url.ends_with('/') {
        base_url
    } else {
        format!("{}/", base_url)
    }
}

//! Sign-in state for the UI
//!
//! Registration and login each publish a [`Resource<AuthResponse>`]. On
//! success the token and user name are written to the preference store,
//! which is where the token propagator picks them up.

use anyhow::Result;
use tokio::sync::watch;
use tracing::warn;

use crate::api::AuthClient;
use crate::models::{AuthResponse, LoginRequest, Preferences, RegisterRequest, Resource};
use crate::store::PrefsStore;

pub struct AuthViewModel {
    client: AuthClient,
    prefs: PrefsStore,
    registration: watch::Sender<Resource<AuthResponse>>,
    login: watch::Sender<Resource<AuthResponse>>,
}

impl AuthViewModel {
    pub fn new(client: AuthClient, prefs: PrefsStore) -> Self {
        Self {
            client,
            prefs,
            registration: watch::channel(Resource::Initial).0,
            login: watch::channel(Resource::Initial).0,
        }
    }

    pub fn registration_state(&self) -> watch::Receiver<Resource<AuthResponse>> {
        self.registration.subscribe()
    }

    pub fn login_state(&self) -> watch::Receiver<Resource<AuthResponse>> {
        self.login.subscribe()
    }

    /// Live session values (token, user name)
    pub fn session(&self) -> watch::Receiver<Preferences> {
        self.prefs.subscribe()
    }

    pub fn auth_token(&self) -> Option<String> {
        self.prefs.auth_token()
    }

    pub fn user_name(&self) -> Option<String> {
        self.prefs.user_name()
    }

    pub fn is_signed_in(&self) -> bool {
        self.prefs.auth_token().is_some()
    }

    pub async fn register(&self, request: RegisterRequest) -> Resource<AuthResponse> {
        self.registration.send_replace(Resource::Loading);
        let result = self.client.register(&request).await;
        let state = self.settle(result).await;
        self.registration.send_replace(state.clone());
        state
    }

    pub async fn login(&self, request: LoginRequest) -> Resource<AuthResponse> {
        self.login.send_replace(Resource::Loading);
        let result = self.client.login(&request).await;
        let state = self.settle(result).await;
        self.login.send_replace(state.clone());
        state
    }

    /// Sign out locally, telling the backend first when a token exists.
    ///
    /// A failed backend call does not keep the user signed in.
    pub async fn logout(&self) -> Result<()> {
        if self.is_signed_in() {
            if let Err(e) = self.client.logout().await {
                warn!(error = %e, "backend logout failed, clearing local session anyway");
            }
        }

        self.prefs.clear_auth().await?;
        self.reset_login_state();
        self.reset_registration_state();
        Ok(())
    }

    pub fn reset_registration_state(&self) {
        self.registration.send_replace(Resource::Initial);
    }

    pub fn reset_login_state(&self) {
        self.login.send_replace(Resource::Initial);
    }

    async fn settle(
        &self,
        result: Result<AuthResponse, crate::api::AuthError>,
    ) -> Resource<AuthResponse> {
        let response = match result {
            Ok(response) => response,
            Err(e) => return Resource::Error(e.to_string()),
        };

        if let Some(token) = &response.token {
            let user_name = response.user.as_ref().map(|u| u.name.clone());
            if let Err(e) = self.prefs.save_session(token.as_str(), user_name).await {
                warn!(error = %e, "failed to persist session");
                return Resource::Error(format!("Failed to save session: {}", e));
            }
        }

        Resource::Success(response)
    }
}

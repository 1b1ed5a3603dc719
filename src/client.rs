//! Instagram Auth Client
//!
//! High-level client combining the authorization flow and authenticated sessions.

use std::sync::Arc;

use crate::core::{HttpTransport, InMemoryStateManager, ReqwestHttpTransport, StateManager};
use crate::error::AuthResult;
use crate::flows::{AuthorizationCodeFlow, AuthorizationCodeFlowImpl};
use crate::session::AuthSession;
use crate::types::{AccessToken, AuthorizationUrl, CallbackParams, InstagramConfig, ScopeSet};

/// Instagram login client.
///
/// Shared by all visitors; holds only read-only configuration, the transport
/// and the per-session state store. Everything belonging to one login lives
/// in the [`AuthSession`] it hands out.
pub struct InstagramAuthClient<
    T: HttpTransport = ReqwestHttpTransport,
    S: StateManager = InMemoryStateManager,
> {
    config: Arc<InstagramConfig>,
    transport: Arc<T>,
    state_manager: Arc<S>,
}

impl InstagramAuthClient<ReqwestHttpTransport, InMemoryStateManager> {
    /// Create a new client with default implementations.
    pub fn new(config: InstagramConfig) -> AuthResult<Self> {
        let transport = ReqwestHttpTransport::from_config(&config)?;
        Ok(Self::with_components(
            config,
            transport,
            InMemoryStateManager::new(),
        ))
    }
}

impl<T: HttpTransport, S: StateManager> InstagramAuthClient<T, S> {
    /// Create a client with custom implementations.
    pub fn with_components(config: InstagramConfig, transport: T, state_manager: S) -> Self {
        Self::with_shared_components(config, Arc::new(transport), Arc::new(state_manager))
    }

    /// Create a client sharing existing transport and state store.
    pub fn with_shared_components(
        config: InstagramConfig,
        transport: Arc<T>,
        state_manager: Arc<S>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            state_manager,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &InstagramConfig {
        &self.config
    }

    /// Scopes requested on every login.
    pub fn scopes(&self) -> &ScopeSet {
        &self.config.scopes
    }

    fn flow(&self) -> AuthorizationCodeFlowImpl<T, S> {
        AuthorizationCodeFlowImpl::new(
            self.config.clone(),
            self.transport.clone(),
            self.state_manager.clone(),
        )
    }

    /// Build the authorization URL for a visitor's session.
    pub fn build_authorization_url(&self, session_id: &str) -> AuthResult<AuthorizationUrl> {
        self.flow().build_authorization_url(session_id)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken> {
        self.flow().exchange_code(code).await
    }

    /// Handle the redirect back from Instagram and open a session.
    pub async fn handle_callback(
        &self,
        session_id: &str,
        callback: CallbackParams,
    ) -> AuthResult<AuthSession<T>> {
        let token = self.flow().handle_callback(session_id, callback).await?;
        Ok(self.session_from_token(token))
    }

    /// Open a session for an access token obtained elsewhere.
    pub fn session_from_token(&self, token: AccessToken) -> AuthSession<T> {
        AuthSession::new(self.config.clone(), self.transport.clone(), token)
    }
}

impl<T: HttpTransport, S: StateManager> std::fmt::Debug for InstagramAuthClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramAuthClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Create a new Instagram auth client.
pub fn instagram_client(config: InstagramConfig) -> AuthResult<InstagramAuthClient> {
    InstagramAuthClient::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::instagram_config;
    use crate::core::MockHttpTransport;
    use crate::error::AuthError;

    fn create_test_config() -> InstagramConfig {
        instagram_config()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://example.com/user/login/instagram/callback")
            .build()
            .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = InstagramAuthClient::new(create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_authorization_url() {
        let client = InstagramAuthClient::new(create_test_config()).unwrap();

        let auth_url = client.build_authorization_url("session").unwrap();
        assert!(auth_url.url.starts_with("https://api.instagram.com/oauth/authorize?"));
        assert!(!auth_url.state.is_empty());
        assert_eq!(client.scopes().as_slice(), &["basic"]);
    }

    #[tokio::test]
    async fn test_handle_callback_opens_session() {
        let client = InstagramAuthClient::with_components(
            create_test_config(),
            MockHttpTransport::new(),
            InMemoryStateManager::new(),
        );
        let auth_url = client.build_authorization_url("session").unwrap();
        client
            .transport
            .queue_json_response(200, &serde_json::json!({"access_token": "canned-token"}));

        let callback = CallbackParams {
            code: Some("good-code".to_string()),
            state: Some(auth_url.state),
            ..Default::default()
        };
        let session = client.handle_callback("session", callback).await.unwrap();

        assert_eq!(session.access_token().secret(), "canned-token");
    }

    #[tokio::test]
    async fn test_handle_callback_state_mismatch() {
        let client = InstagramAuthClient::with_components(
            create_test_config(),
            MockHttpTransport::new(),
            InMemoryStateManager::new(),
        );
        client.build_authorization_url("session").unwrap();

        let callback = CallbackParams {
            code: Some("good-code".to_string()),
            state: Some("forged".to_string()),
            ..Default::default()
        };
        let result = client.handle_callback("session", callback).await;

        assert!(matches!(result, Err(AuthError::StateMismatch)));
        assert_eq!(client.transport.request_count(), 0);
    }
}

//! Authorization Code Flow
//!
//! RFC 6749 Section 4.1 as spoken by Instagram: authorization redirect,
//! callback validation and code-for-token exchange.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::core::{generate_state, validate_state, HttpRequest, HttpTransport, StateManager};
use crate::error::{map_token_error, AuthError, AuthResult};
use crate::types::{
    AccessToken, AuthorizationUrl, CallbackParams, InstagramConfig, PendingAuthorization,
    TokenResponse,
};

/// Grant type sent to the token endpoint.
pub const GRANT_TYPE: &str = "authorization_code";

/// Authorization Code Flow interface.
#[async_trait]
pub trait AuthorizationCodeFlow: Send + Sync {
    /// Build the authorization URL and remember its state for `session_id`.
    fn build_authorization_url(&self, session_id: &str) -> AuthResult<AuthorizationUrl>;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken>;

    /// Validate the callback against the session's state, then exchange its code.
    async fn handle_callback(
        &self,
        session_id: &str,
        callback: CallbackParams,
    ) -> AuthResult<AccessToken>;
}

/// Authorization Code Flow implementation.
pub struct AuthorizationCodeFlowImpl<T: HttpTransport, S: StateManager> {
    config: Arc<InstagramConfig>,
    transport: Arc<T>,
    state_manager: Arc<S>,
}

impl<T: HttpTransport, S: StateManager> AuthorizationCodeFlowImpl<T, S> {
    /// Create new Authorization Code Flow.
    pub fn new(config: Arc<InstagramConfig>, transport: Arc<T>, state_manager: Arc<S>) -> Self {
        Self {
            config,
            transport,
            state_manager,
        }
    }

    fn authorization_url_with_state(&self, state: &str) -> AuthResult<String> {
        let mut url = Url::parse(&self.config.provider.authorization_endpoint).map_err(|e| {
            AuthError::InvalidConfig {
                message: format!("invalid authorization endpoint: {}", e),
            }
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.credentials.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.to_param())
            .append_pair("state", state);

        Ok(url.into())
    }

    fn build_token_request_body(&self, code: &str) -> String {
        let credentials = &self.config.credentials;
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &credentials.client_id)
            .append_pair("client_secret", credentials.client_secret().unwrap_or_default())
            .append_pair("grant_type", GRANT_TYPE)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("code", code)
            .finish()
    }
}

#[async_trait]
impl<T: HttpTransport, S: StateManager> AuthorizationCodeFlow for AuthorizationCodeFlowImpl<T, S> {
    fn build_authorization_url(&self, session_id: &str) -> AuthResult<AuthorizationUrl> {
        self.config.credentials.ensure_configured()?;
        Url::parse(&self.config.redirect_uri).map_err(|e| AuthError::InvalidConfig {
            message: format!("invalid redirect_uri: {}", e),
        })?;

        let state = generate_state();
        let url = self.authorization_url_with_state(&state)?;

        self.state_manager.store(
            session_id,
            PendingAuthorization::new(
                state.clone(),
                self.config.redirect_uri.clone(),
                self.config.scopes.clone(),
            ),
        );
        debug!(scopes = %self.config.scopes.to_param(), "built authorization url");

        Ok(AuthorizationUrl { url, state })
    }

    #[instrument(name = "instagram.exchange_code", skip_all)]
    async fn exchange_code(&self, code: &str) -> AuthResult<AccessToken> {
        self.config.credentials.ensure_configured()?;
        if code.trim().is_empty() {
            return Err(AuthError::MissingCode);
        }

        let request = HttpRequest::post_form(
            self.config.provider.token_endpoint.clone(),
            self.build_token_request_body(code),
        )
        .header("accept", "application/json")
        .timeout(self.config.timeout);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error = map_token_error(response.status, &response.body);
            warn!(status = response.status, code = error.error_code(), "token exchange rejected");
            return Err(error);
        }

        let token_response: TokenResponse =
            serde_json::from_str(&response.body).map_err(|e| AuthError::InvalidResponse {
                message: format!("invalid token response: {}", e),
            })?;

        info!("authorization code exchanged for access token");
        Ok(AccessToken::from_response(&token_response))
    }

    #[instrument(name = "instagram.handle_callback", skip_all)]
    async fn handle_callback(
        &self,
        session_id: &str,
        callback: CallbackParams,
    ) -> AuthResult<AccessToken> {
        if callback.is_error() {
            // The attempt is over; drop its state.
            self.state_manager.consume(session_id);
            warn!(
                error = callback.error.as_deref().unwrap_or_default(),
                reason = callback.error_reason.as_deref().unwrap_or_default(),
                "authorization denied by provider"
            );
            return Err(AuthError::AccessDenied {
                reason: callback.error_reason.or(callback.error),
                description: callback.error_description,
            });
        }

        validate_state(
            self.state_manager.as_ref(),
            session_id,
            callback.state.as_deref(),
        )?;

        let code = callback.code.ok_or(AuthError::MissingCode)?;
        self.exchange_code(&code).await
    }
}

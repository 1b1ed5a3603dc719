//! Authenticated Session
//!
//! Everything that happens after a successful code exchange: the user's
//! profile, single API requests, and the configured batch of endpoints.
//!
//! A session belongs to exactly one login. It owns the access token and the
//! cached profile; both are dropped with it.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::core::{HttpRequest, HttpTransport};
use crate::error::{map_api_error, AuthError, AuthResult};
use crate::types::{AccessToken, EndpointResults, EndpointSpec, InstagramConfig, UserProfile};

/// Path of the authenticated user's profile.
pub const PROFILE_PATH: &str = "/users/self";

/// One authenticated login session.
pub struct AuthSession<T: HttpTransport> {
    config: Arc<InstagramConfig>,
    transport: Arc<T>,
    token: AccessToken,
    profile: OnceCell<UserProfile>,
}

impl<T: HttpTransport> AuthSession<T> {
    /// Create a session around an access token.
    pub fn new(config: Arc<InstagramConfig>, transport: Arc<T>, token: AccessToken) -> Self {
        Self {
            config,
            transport,
            token,
            profile: OnceCell::new(),
        }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.token
    }

    /// The authenticated user's profile.
    ///
    /// Fetched on first call; later calls return the cached value without a
    /// network request. A failed fetch is not cached.
    pub async fn user_info(&self) -> AuthResult<&UserProfile> {
        self.profile
            .get_or_try_init(|| async {
                let body = self.request_endpoint(PROFILE_PATH).await?;
                let profile = UserProfile::from_response_body(&body)?;
                debug!(user_id = profile.id().unwrap_or_default(), "fetched user profile");
                Ok::<_, AuthError>(profile)
            })
            .await
    }

    /// Profile if already fetched.
    pub fn cached_user_info(&self) -> Option<&UserProfile> {
        self.profile.get()
    }

    /// Issue an authenticated GET against `<host>/v1<path>` and return the raw body.
    ///
    /// The body is neither parsed nor validated.
    #[instrument(name = "instagram.request_endpoint", skip(self))]
    pub async fn request_endpoint(&self, path: &str) -> AuthResult<String> {
        self.config.credentials.ensure_configured()?;

        let url = self.authenticated_url(path)?;
        let request = HttpRequest::get(url)
            .header("accept", "application/json")
            .timeout(self.config.timeout);

        let response = self.transport.send(request).await?;

        if !response.is_success() {
            let error = map_api_error(response.status, &response.body);
            warn!(status = response.status, code = error.error_code(), "API request rejected");
            return Err(error);
        }

        Ok(response.body)
    }

    /// Fetch every endpoint in order, keyed by name.
    ///
    /// Fail-fast: the first failing endpoint aborts the batch and its error is
    /// returned; nothing collected so far is kept. A name repeated later in the
    /// list overwrites the earlier body.
    pub async fn request_endpoints(&self, specs: &[EndpointSpec]) -> AuthResult<EndpointResults> {
        let mut results = EndpointResults::new();

        for spec in specs {
            let body = self.request_endpoint(&spec.path).await.map_err(|e| {
                warn!(endpoint = %spec.name, error = %e, "endpoint batch aborted");
                e
            })?;
            results.insert(spec.name.clone(), body);
        }

        Ok(results)
    }

    /// Fetch the endpoints from the configuration.
    ///
    /// Returns `Ok(None)` when none are configured.
    pub async fn fetch_configured_endpoints(&self) -> AuthResult<Option<EndpointResults>> {
        if self.config.endpoints.is_empty() {
            return Ok(None);
        }

        let results = self.request_endpoints(&self.config.endpoints).await?;
        info!(count = results.len(), "fetched configured endpoints");
        Ok(Some(results))
    }

    /// The token is only ever sent below `<host>/v1/`; paths that normalize
    /// outside of it (`..` segments, encoded or not) are rejected.
    fn authenticated_url(&self, path: &str) -> AuthResult<String> {
        let invalid = |reason: String| AuthError::InvalidConfig {
            message: format!("invalid API path {:?}: {}", path, reason),
        };

        let base = Url::parse(&self.config.api_url("/")).map_err(|e| invalid(e.to_string()))?;
        let mut url = Url::parse(&self.config.api_url(path)).map_err(|e| invalid(e.to_string()))?;

        if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
            warn!(path, "API path escapes the versioned prefix");
            return Err(invalid(format!("resolves outside of {}", base.path())));
        }

        url.query_pairs_mut()
            .append_pair("access_token", self.token.secret());
        Ok(url.into())
    }
}

impl<T: HttpTransport> std::fmt::Debug for AuthSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &self.token)
            .field("profile", &self.profile.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::instagram_config;
    use crate::core::MockHttpTransport;

    fn session_with(endpoints: &str) -> (AuthSession<MockHttpTransport>, Arc<MockHttpTransport>) {
        let config = instagram_config()
            .client_id("test-client")
            .client_secret("test-secret")
            .redirect_uri("https://example.com/callback")
            .endpoints(endpoints)
            .build()
            .unwrap();
        let transport = Arc::new(MockHttpTransport::new());
        let session = AuthSession::new(
            Arc::new(config),
            transport.clone(),
            AccessToken::new("token-123", None),
        );
        (session, transport)
    }

    #[tokio::test]
    async fn test_request_endpoint_url() {
        let (session, transport) = session_with("");
        transport.queue_text_response(200, r#"{"data":[]}"#);

        let body = session.request_endpoint(" /users/self/media/recent ").await.unwrap();

        assert_eq!(body, r#"{"data":[]}"#);
        assert_eq!(
            transport.get_last_request().unwrap().url,
            "https://api.instagram.com/v1/users/self/media/recent?access_token=token-123"
        );
    }

    #[tokio::test]
    async fn test_request_endpoint_keeps_existing_query() {
        let (session, transport) = session_with("");
        transport.queue_text_response(200, "{}");

        session.request_endpoint("/tags/search?q=snow").await.unwrap();

        assert_eq!(
            transport.get_last_request().unwrap().url,
            "https://api.instagram.com/v1/tags/search?q=snow&access_token=token-123"
        );
    }

    #[tokio::test]
    async fn test_request_endpoint_unauthorized() {
        let (session, transport) = session_with("");
        transport.queue_json_response(
            400,
            &serde_json::json!({"meta": {"error_type": "OAuthAccessTokenException", "code": 400, "error_message": "invalid token"}}),
        );

        let result = session.request_endpoint("/users/self").await;
        assert!(matches!(result, Err(AuthError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_user_info_is_memoized() {
        let (session, transport) = session_with("");
        transport.queue_json_response(
            200,
            &serde_json::json!({"data": {"id": "1574083", "username": "snoopdogg"}}),
        );

        assert!(session.cached_user_info().is_none());
        let first = session.user_info().await.unwrap().clone();
        let second = session.user_info().await.unwrap();

        assert_eq!(first.username(), Some("snoopdogg"));
        assert_eq!(&first, second);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_user_info_failure_not_cached() {
        let (session, transport) = session_with("");
        transport.queue_text_response(500, "oops");
        transport.queue_json_response(200, &serde_json::json!({"data": {"id": "1"}}));

        assert!(session.user_info().await.is_err());
        assert_eq!(session.user_info().await.unwrap().id(), Some("1"));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_collects_by_name() {
        let (session, transport) = session_with(
            "/users/self/media/recent|media_recent\n/users/self/media/liked|media_liked",
        );
        transport.queue_text_response(200, "recent-body");
        transport.queue_text_response(200, "liked-body");

        let results = session.fetch_configured_endpoints().await.unwrap().unwrap();

        assert_eq!(results.get("media_recent"), Some("recent-body"));
        assert_eq!(results.get("media_liked"), Some("liked-body"));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_without_endpoints() {
        let (session, transport) = session_with("");

        assert!(session.fetch_configured_endpoints().await.unwrap().is_none());
        assert!(session.request_endpoints(&[]).await.unwrap().is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_aborts_on_first_failure() {
        let (session, transport) = session_with("/a|first\n/b|second\n/c|third");
        transport.queue_text_response(200, "ok");
        transport.queue_text_response(404, "missing");

        let result = session.fetch_configured_endpoints().await;

        assert!(matches!(result, Err(AuthError::Provider { status: 404, .. })));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_batch_duplicate_name_last_wins() {
        let (session, transport) = session_with("");
        transport.queue_text_response(200, "one");
        transport.queue_text_response(200, "two");

        let specs = vec![EndpointSpec::new("/a", "dup"), EndpointSpec::new("/b", "dup")];
        let results = session.request_endpoints(&specs).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.get("dup"), Some("two"));
    }

    #[tokio::test]
    async fn test_request_endpoint_rejects_path_traversal() {
        let (session, transport) = session_with("");

        for path in ["/../oauth/access_token", "/users/../../x", "/%2e%2e/oauth/x"] {
            let result = session.request_endpoint(path).await;
            assert!(
                matches!(result, Err(AuthError::InvalidConfig { .. })),
                "{} was accepted",
                path
            );
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_batch_with_traversal_path_fails_before_sending() {
        let (session, transport) = session_with("/users/self|me\n/../oauth/authorize|escape");
        transport.queue_text_response(200, "me");

        let result = session.fetch_configured_endpoints().await;

        assert!(matches!(result, Err(AuthError::InvalidConfig { .. })));
        assert_eq!(transport.request_count(), 1);
    }
}

//! Configuration Types
//!
//! Instagram client configuration types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::error;

use crate::error::{AuthError, AuthResult};
use crate::types::{EndpointSpec, ScopeSet};

/// Instagram authorization endpoint.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://api.instagram.com/oauth/authorize";

/// Instagram token endpoint.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.instagram.com/oauth/access_token";

/// Instagram API host.
pub const DEFAULT_API_HOST: &str = "https://api.instagram.com";

/// API version prefix inserted between host and resource path.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Route Instagram redirects back to, relative to the site base URL.
pub const CALLBACK_PATH: &str = "/user/login/instagram/callback";

/// Default configuration values.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Redirect URI to register with Instagram for a site served at `base_url`.
pub fn callback_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CALLBACK_PATH)
}

/// Instagram client configuration, built once at startup.
#[derive(Clone, Debug)]
pub struct InstagramConfig {
    /// Provider configuration.
    pub provider: ProviderConfig,
    /// Client credentials.
    pub credentials: ClientCredentials,
    /// Absolute callback URL.
    pub redirect_uri: String,
    /// Scopes requested on every login.
    pub scopes: ScopeSet,
    /// Endpoints fetched after login.
    pub endpoints: Vec<EndpointSpec>,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Outbound HTTP(S) proxy.
    pub proxy: Option<String>,
    /// Largest accepted response body.
    pub max_response_size: usize,
}

impl InstagramConfig {
    /// Full URL for an API path: `<host>/<version><path>`.
    pub fn api_url(&self, path: &str) -> String {
        let path = path.trim();
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!(
            "{}/{}{}{}",
            self.provider.api_host.trim_end_matches('/'),
            self.provider.api_version,
            separator,
            path
        )
    }
}

/// Instagram endpoint configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Authorization endpoint URL.
    pub authorization_endpoint: String,
    /// Token endpoint URL.
    pub token_endpoint: String,
    /// API host, without version.
    pub api_host: String,
    /// API version prefix.
    pub api_version: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            authorization_endpoint: DEFAULT_AUTHORIZATION_ENDPOINT.to_string(),
            token_endpoint: DEFAULT_TOKEN_ENDPOINT.to_string(),
            api_host: DEFAULT_API_HOST.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ProviderConfig {
    /// Point every endpoint at `base_url` (stub servers, regional mirrors).
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            authorization_endpoint: format!("{}/oauth/authorize", base_url),
            token_endpoint: format!("{}/oauth/access_token", base_url),
            api_host: base_url.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

/// Client credentials issued by Instagram.
///
/// May be empty when the site is not configured yet.
#[derive(Clone, Default)]
pub struct ClientCredentials {
    /// Client identifier.
    pub client_id: String,
    client_secret: Option<SecretString>,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        let client_secret = client_secret.into();
        Self {
            client_id: client_id.into(),
            client_secret: (!client_secret.is_empty()).then(|| SecretString::new(client_secret)),
        }
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_ref().map(|s| s.expose_secret().as_str())
    }

    /// Both id and secret are present.
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && self.client_secret.is_some()
    }

    /// Fail with `ConfigMissing` unless both id and secret are present.
    pub fn ensure_configured(&self) -> AuthResult<()> {
        let missing = if self.client_id.trim().is_empty() {
            Some("client_id")
        } else if self.client_secret.is_none() {
            Some("client_secret")
        } else {
            None
        };

        match missing {
            Some(field) => {
                error!(field, "Define Client ID and Client Secret on module settings.");
                Err(AuthError::ConfigMissing {
                    field: field.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

//! Settings
//!
//! The configuration surface as persisted by the site's config store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::builders::InstagramConfigBuilder;
use crate::error::{AuthError, AuthResult};
use crate::types::{callback_url, InstagramConfig};

/// Raw Instagram login settings.
///
/// Every field is optional so that a half-filled settings form still loads.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstagramSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Extra scopes, comma separated.
    #[serde(default)]
    pub scopes: Option<String>,
    /// Endpoints, one `path|name` per line.
    #[serde(default)]
    pub endpoints: Option<String>,
    /// Absolute callback URL. Derived from `base_url` when absent.
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Site base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Outbound HTTP(S) proxy.
    #[serde(default)]
    pub proxy: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl InstagramSettings {
    /// Load settings from a JSON document.
    pub fn from_json_str(json: &str) -> AuthResult<Self> {
        serde_json::from_str(json).map_err(|e| AuthError::InvalidConfig {
            message: format!("invalid settings document: {}", e),
        })
    }

    /// Load settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `INSTAGRAM_CLIENT_ID`, `INSTAGRAM_CLIENT_SECRET`
    /// - `INSTAGRAM_SCOPES` (optional): comma-separated extra scopes
    /// - `INSTAGRAM_ENDPOINTS` (optional): newline-separated `path|name` lines
    /// - `INSTAGRAM_REDIRECT_URI` or `INSTAGRAM_BASE_URL`
    /// - `INSTAGRAM_PROXY` (optional)
    /// - `INSTAGRAM_TIMEOUT` (optional): request timeout in seconds
    pub fn from_env() -> AuthResult<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let timeout_secs = match var("INSTAGRAM_TIMEOUT") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| AuthError::InvalidConfig {
                message: format!("INSTAGRAM_TIMEOUT is not a number of seconds: {}", raw),
            })?),
            None => None,
        };

        Ok(Self {
            client_id: var("INSTAGRAM_CLIENT_ID").unwrap_or_default(),
            client_secret: var("INSTAGRAM_CLIENT_SECRET").unwrap_or_default(),
            scopes: var("INSTAGRAM_SCOPES"),
            endpoints: var("INSTAGRAM_ENDPOINTS"),
            redirect_uri: var("INSTAGRAM_REDIRECT_URI"),
            base_url: var("INSTAGRAM_BASE_URL"),
            proxy: var("INSTAGRAM_PROXY"),
            timeout_secs,
        })
    }

    /// Redirect URI, falling back to the callback route under `base_url`.
    pub fn resolved_redirect_uri(&self) -> Option<String> {
        self.redirect_uri
            .clone()
            .or_else(|| self.base_url.as_deref().map(callback_url))
    }

    /// Validated builder pre-filled from these settings.
    pub fn to_builder(&self) -> AuthResult<InstagramConfigBuilder> {
        let redirect_uri = self.resolved_redirect_uri().ok_or_else(|| AuthError::InvalidConfig {
            message: "either redirect_uri or base_url must be set".to_string(),
        })?;

        let mut builder = InstagramConfigBuilder::new()
            .client_id(&self.client_id)
            .client_secret(&self.client_secret)
            .redirect_uri(redirect_uri);

        if let Some(scopes) = &self.scopes {
            builder = builder.scopes(scopes);
        }
        if let Some(endpoints) = &self.endpoints {
            builder = builder.endpoints(endpoints);
        }
        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(builder)
    }

    /// Build the immutable client configuration.
    pub fn into_config(self) -> AuthResult<InstagramConfig> {
        self.to_builder()?.build()
    }
}

impl std::fmt::Debug for InstagramSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstagramSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("endpoints", &self.endpoints)
            .field("redirect_uri", &self.redirect_uri)
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "client_id": "abc",
            "client_secret": "def",
            "scopes": "likes,comments",
            "endpoints": "/users/self/media/recent|media_recent",
            "base_url": "https://example.com"
        }"#;

        let settings = InstagramSettings::from_json_str(json).unwrap();
        assert_eq!(
            settings.resolved_redirect_uri().unwrap(),
            "https://example.com/user/login/instagram/callback"
        );

        let config = settings.into_config().unwrap();
        assert_eq!(config.scopes.as_slice(), &["basic", "likes", "comments"]);
        assert_eq!(config.endpoints.len(), 1);
        assert!(config.credentials.is_configured());
    }

    #[test]
    fn test_unconfigured_settings_still_load() {
        let settings = InstagramSettings::from_json_str(r#"{"base_url":"https://example.com"}"#).unwrap();
        let config = settings.into_config().unwrap();
        assert!(!config.credentials.is_configured());
    }

    #[test]
    fn test_redirect_uri_required() {
        let error = InstagramSettings::default().into_config().unwrap_err();
        assert!(matches!(error, AuthError::InvalidConfig { .. }));
    }

    #[test]
    fn test_explicit_redirect_uri_wins() {
        let settings = InstagramSettings {
            redirect_uri: Some("https://auth.example.com/cb".to_string()),
            base_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolved_redirect_uri().unwrap(), "https://auth.example.com/cb");
    }

    #[test]
    fn test_malformed_json() {
        assert!(InstagramSettings::from_json_str("{").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let settings = InstagramSettings {
            client_secret: "hunter2".to_string(),
            ..Default::default()
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}

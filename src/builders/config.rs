//! Configuration Builder
//!
//! Fluent builder for Instagram client configuration.

use std::time::Duration;
use url::Url;

use crate::error::{AuthError, AuthResult};
use crate::types::{
    parse_endpoints, ClientCredentials, InstagramConfig, ProviderConfig, ScopeSet,
    DEFAULT_MAX_RESPONSE_SIZE, DEFAULT_TIMEOUT,
};

/// Instagram configuration builder.
#[derive(Default)]
pub struct InstagramConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    provider: ProviderConfig,
    scopes: Option<String>,
    endpoints: Option<String>,
    timeout: Option<Duration>,
    proxy: Option<String>,
    max_response_size: Option<usize>,
}

impl InstagramConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the absolute callback URL.
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Replace all provider endpoints.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    /// Set authorization endpoint.
    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider.authorization_endpoint = endpoint.into();
        self
    }

    /// Set token endpoint.
    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.provider.token_endpoint = endpoint.into();
        self
    }

    /// Set API host.
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.provider.api_host = host.into();
        self
    }

    /// Set extra scopes (comma separated).
    pub fn scopes(mut self, scopes: impl Into<String>) -> Self {
        self.scopes = Some(scopes.into());
        self
    }

    /// Set endpoints to fetch after login (`path|name` per line).
    pub fn endpoints(mut self, endpoints: impl Into<String>) -> Self {
        self.endpoints = Some(endpoints.into());
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route outbound requests through a proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the largest accepted response body.
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = Some(size);
        self
    }

    /// Build the Instagram configuration.
    ///
    /// Missing credentials are accepted here; operations that need them fail
    /// with [`AuthError::ConfigMissing`].
    pub fn build(self) -> AuthResult<InstagramConfig> {
        let redirect_uri = self.redirect_uri.ok_or_else(|| AuthError::InvalidConfig {
            message: "Missing required field: redirect_uri".to_string(),
        })?;
        validate_url("redirect_uri", &redirect_uri)?;
        validate_url("authorization_endpoint", &self.provider.authorization_endpoint)?;
        validate_url("token_endpoint", &self.provider.token_endpoint)?;
        validate_url("api_host", &self.provider.api_host)?;

        let proxy = self.proxy.filter(|p| !p.trim().is_empty());
        if let Some(proxy) = &proxy {
            validate_url("proxy", proxy)?;
        }

        let endpoints = match self.endpoints.as_deref() {
            Some(raw) => parse_endpoints(raw)?,
            None => Vec::new(),
        };

        Ok(InstagramConfig {
            provider: self.provider,
            credentials: ClientCredentials::new(
                self.client_id.unwrap_or_default(),
                self.client_secret.unwrap_or_default(),
            ),
            redirect_uri,
            scopes: ScopeSet::from_config(self.scopes.as_deref()),
            endpoints,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            proxy,
            max_response_size: self.max_response_size.unwrap_or(DEFAULT_MAX_RESPONSE_SIZE),
        })
    }
}

fn validate_url(field: &str, value: &str) -> AuthResult<()> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| AuthError::InvalidConfig {
            message: format!("{} is not a valid absolute URL ({}): {}", field, e, value),
        })
}

/// Create a new Instagram configuration builder.
pub fn instagram_config() -> InstagramConfigBuilder {
    InstagramConfigBuilder::new()
}

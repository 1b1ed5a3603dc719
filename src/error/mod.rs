//! Instagram Auth Error Types
//!
//! Error taxonomy for the login flow, plus mapping of provider error bodies.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Root error type for the Instagram login integration.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Client credentials are absent; no network call was attempted.
    #[error("Missing required credential: {field}")]
    ConfigMissing { field: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// An `endpoints` line without the `|name` suffix.
    #[error("Malformed endpoint definition: {line:?}")]
    MalformedEndpointSpec { line: String },

    #[error("State parameter mismatch (possible CSRF attack)")]
    StateMismatch,

    #[error("State parameter missing or expired")]
    MissingState,

    #[error("Missing authorization code in callback")]
    MissingCode,

    #[error("Access denied by user")]
    AccessDenied {
        reason: Option<String>,
        description: Option<String>,
    },

    /// Authorization code invalid, expired or already used.
    #[error("Invalid grant: {message}")]
    InvalidGrant { message: String },

    /// Access token rejected by the API.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    #[error("Request timeout after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    ConfigMissing,
    Configuration,
    MalformedEndpointSpec,
    Csrf,
    InvalidGrant,
    Unauthorized,
    Provider,
    NetworkFailure,
    Protocol,
}

impl AuthError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigMissing { .. } => "INSTAGRAM_CONFIG_MISSING",
            Self::InvalidConfig { .. } => "INSTAGRAM_CONFIG",
            Self::MalformedEndpointSpec { .. } => "INSTAGRAM_ENDPOINT_SPEC",
            Self::StateMismatch | Self::MissingState => "INSTAGRAM_STATE",
            Self::MissingCode | Self::AccessDenied { .. } => "INSTAGRAM_CALLBACK",
            Self::InvalidGrant { .. } => "INSTAGRAM_INVALID_GRANT",
            Self::Unauthorized { .. } => "INSTAGRAM_UNAUTHORIZED",
            Self::Provider { .. } => "INSTAGRAM_PROVIDER",
            Self::NetworkFailure { .. } | Self::Timeout { .. } => "INSTAGRAM_NETWORK",
            Self::InvalidResponse { .. } => "INSTAGRAM_PROTOCOL",
        }
    }

    /// Classify the error.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::ConfigMissing { .. } => AuthErrorKind::ConfigMissing,
            Self::InvalidConfig { .. } => AuthErrorKind::Configuration,
            Self::MalformedEndpointSpec { .. } => AuthErrorKind::MalformedEndpointSpec,
            Self::StateMismatch | Self::MissingState => AuthErrorKind::Csrf,
            Self::MissingCode | Self::AccessDenied { .. } => AuthErrorKind::Protocol,
            Self::InvalidGrant { .. } => AuthErrorKind::InvalidGrant,
            Self::Unauthorized { .. } => AuthErrorKind::Unauthorized,
            Self::Provider { .. } => AuthErrorKind::Provider,
            Self::NetworkFailure { .. } | Self::Timeout { .. } => AuthErrorKind::NetworkFailure,
            Self::InvalidResponse { .. } => AuthErrorKind::Protocol,
        }
    }

    /// Transport-level failure (connection, TLS, timeout).
    pub fn is_network_failure(&self) -> bool {
        self.kind() == AuthErrorKind::NetworkFailure
    }

    /// Check if the user has to restart the login.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            Self::InvalidGrant { .. }
                | Self::Unauthorized { .. }
                | Self::StateMismatch
                | Self::MissingState
                | Self::AccessDenied { .. }
        )
    }

    /// Generic message safe to show to site visitors.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ConfigMissing { .. } | Self::InvalidConfig { .. } => {
                "Instagram login is not configured on this site. Please contact the administrator."
            }
            Self::AccessDenied { .. } => {
                "You could not be authenticated because access was not granted on Instagram."
            }
            Self::StateMismatch | Self::MissingState => {
                "Security validation failed. Please restart the sign-in process."
            }
            _ => "You could not be authenticated. Please try again.",
        }
    }
}

/// Result type for Instagram auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Error body returned by Instagram.
///
/// Covers the OAuth2 shape (`error`, `error_description`) and Instagram's own
/// (`error_type`, `error_message`, `code`), either at the top level or nested
/// under `meta`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub meta: Option<Box<ProviderErrorResponse>>,
}

impl ProviderErrorResponse {
    /// Error identifier, preferring the OAuth2 field.
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_deref().or(self.error_type.as_deref())
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        self.error_description
            .clone()
            .or_else(|| self.error_message.clone())
            .or_else(|| self.error_code().map(String::from))
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Parse error response from HTTP body.
pub fn parse_error_response(body: &str) -> Option<ProviderErrorResponse> {
    let mut response: ProviderErrorResponse = serde_json::from_str(body).ok()?;
    if let Some(meta) = response.meta.take() {
        response = *meta;
    }
    response.error_code().is_some().then_some(response)
}

/// Map a failed token endpoint response.
pub fn map_token_error(status: u16, body: &str) -> AuthError {
    let parsed = parse_error_response(body);
    let message = parsed
        .as_ref()
        .map(ProviderErrorResponse::message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    // Rejected client credentials are a provider answer, not a revoked token.
    match parsed.as_ref().and_then(ProviderErrorResponse::error_code) {
        Some("invalid_grant") | Some("OAuthException") => AuthError::InvalidGrant { message },
        Some("invalid_client") | Some("unauthorized_client") => {
            AuthError::Provider { status, message }
        }
        _ => match status {
            400 => AuthError::InvalidGrant { message },
            _ => AuthError::Provider { status, message },
        },
    }
}

/// Map a failed API (resource) response.
pub fn map_api_error(status: u16, body: &str) -> AuthError {
    let parsed = parse_error_response(body);
    let message = parsed
        .as_ref()
        .map(ProviderErrorResponse::message)
        .unwrap_or_else(|| format!("HTTP {}", status));

    match parsed.as_ref().and_then(ProviderErrorResponse::error_code) {
        Some("OAuthAccessTokenException") | Some("invalid_token") => {
            AuthError::Unauthorized { message }
        }
        _ => match status {
            401 | 403 => AuthError::Unauthorized { message },
            _ => AuthError::Provider { status, message },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_oauth2_error_response() {
        let body = r#"{"error":"invalid_grant","error_description":"Code expired"}"#;
        let response = parse_error_response(body).unwrap();
        assert_eq!(response.error_code(), Some("invalid_grant"));
        assert_eq!(response.message(), "Code expired");
    }

    #[test]
    fn test_parse_meta_envelope() {
        let body = r#"{"meta":{"error_type":"OAuthAccessTokenException","code":400,"error_message":"The access_token provided is invalid."}}"#;
        let response = parse_error_response(body).unwrap();
        assert_eq!(response.error_code(), Some("OAuthAccessTokenException"));
        assert_eq!(response.code, Some(400));
    }

    #[test]
    fn test_parse_non_error_body() {
        assert!(parse_error_response(r#"{"data":{}}"#).is_none());
        assert!(parse_error_response("<html>").is_none());
    }

    #[test]
    fn test_map_token_error_instagram_shape() {
        let body = r#"{"error_type":"OAuthException","code":400,"error_message":"Matching code was not found or was already used."}"#;
        let error = map_token_error(400, body);
        assert!(matches!(error, AuthError::InvalidGrant { .. }));
        assert_eq!(error.kind(), AuthErrorKind::InvalidGrant);
    }

    #[test]
    fn test_map_token_error_by_status() {
        assert!(matches!(map_token_error(400, ""), AuthError::InvalidGrant { .. }));
        assert!(matches!(
            map_token_error(401, ""),
            AuthError::Provider { status: 401, .. }
        ));
        assert!(matches!(
            map_token_error(503, "unavailable"),
            AuthError::Provider { status: 503, .. }
        ));
    }

    #[test]
    fn test_map_api_error() {
        let body = r#"{"meta":{"error_type":"OAuthAccessTokenException","code":400,"error_message":"invalid"}}"#;
        assert!(matches!(map_api_error(400, body), AuthError::Unauthorized { .. }));
        assert!(matches!(
            map_api_error(404, r#"{"meta":{"error_type":"APINotFoundError","code":404,"error_message":"not found"}}"#),
            AuthError::Provider { status: 404, .. }
        ));
    }

    #[test]
    fn test_user_message_does_not_leak_details() {
        let error = AuthError::InvalidGrant {
            message: "Matching code was not found".to_string(),
        };
        assert!(!error.user_message().contains("Matching"));
        assert!(error.needs_reauth());
    }
}

//! Instagram Auth Integration Module
//!
//! Lets site visitors sign in with Instagram using the OAuth2 Authorization
//! Code grant.
//!
//! # Features
//!
//! - Authorization URL with the mandatory `basic` scope plus configured extras
//! - Per-session `state` parameter, validated in constant time on callback
//! - Authorization code exchange (RFC 6749 Section 4.1)
//! - Memoized profile fetch for the authenticated user
//! - Authenticated requests against `https://api.instagram.com/v1/...`
//! - Batch fetch of configured `path|name` endpoints after login
//!
//! # Example
//!
//! ```rust,ignore
//! use instagram_auth_integration::{instagram_config, CallbackParams, InstagramAuthClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = instagram_config()
//!         .client_id("my-client-id")
//!         .client_secret("my-client-secret")
//!         .redirect_uri("https://example.com/user/login/instagram/callback")
//!         .scopes("likes,comments")
//!         .endpoints("/users/self/media/recent|media_recent")
//!         .build()?;
//!
//!     let client = InstagramAuthClient::new(config)?;
//!
//!     // Step 1: redirect the visitor.
//!     let auth_url = client.build_authorization_url("visitor-session-id")?;
//!     println!("Redirect to: {}", auth_url.url);
//!
//!     // Step 2: Instagram redirects back.
//!     let callback = CallbackParams::from_url_str(
//!         "https://example.com/user/login/instagram/callback?code=...&state=...",
//!     )?;
//!     let session = client.handle_callback("visitor-session-id", callback).await?;
//!
//!     let profile = session.user_info().await?;
//!     println!("Signed in as {:?}", profile.username());
//!
//!     if let Some(extra) = session.fetch_configured_endpoints().await? {
//!         println!("{}", extra.to_json()?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: configuration, settings, scopes, tokens, callback, endpoint and profile types
//! - `error`: error taxonomy and provider error mapping
//! - `core`: HTTP transport and per-session state management
//! - `flows`: the Authorization Code flow
//! - `session`: profile, authenticated requests and endpoint batches for one login
//! - `builders`: fluent configuration builder
//! - `client`: high-level client combining all of the above

pub mod builders;
pub mod client;
pub mod core;
pub mod error;
pub mod flows;
pub mod session;
pub mod types;

// Re-export main client
pub use client::{instagram_client, InstagramAuthClient};

// Re-export builders
pub use builders::{instagram_config, InstagramConfigBuilder};

// Re-export errors
pub use error::{
    map_api_error, map_token_error, parse_error_response, AuthError, AuthErrorKind, AuthResult,
    ProviderErrorResponse,
};

// Re-export types
pub use types::{
    // Config
    callback_url, ClientCredentials, InstagramConfig, InstagramSettings, ProviderConfig,
    // Scopes
    ScopeSet, BASE_SCOPE,
    // Token
    AccessToken, TokenResponse,
    // Auth / callback
    AuthorizationUrl, CallbackParams, PendingAuthorization,
    // Endpoints
    parse_endpoints, EndpointResults, EndpointSpec,
    // Profile
    UserProfile,
};

// Re-export core components
pub use core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // State
    generate_state, validate_state, InMemoryStateManager, StateManager,
};

// Re-export flows
pub use flows::{AuthorizationCodeFlow, AuthorizationCodeFlowImpl};

// Re-export session
pub use session::AuthSession;

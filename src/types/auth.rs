//! Authorization Types

/// Result of authorization URL generation.
#[derive(Clone, Debug)]
pub struct AuthorizationUrl {
    /// The authorization URL to redirect the user to.
    pub url: String,
    /// State parameter for CSRF validation.
    pub state: String,
}

//! Callback Types
//!
//! Types for handling the redirect back from Instagram.

use chrono::{DateTime, Duration, Utc};
use std::borrow::Cow;
use url::Url;

use crate::types::ScopeSet;

/// Callback parameters from the authorization redirect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code (if success).
    pub code: Option<String>,
    /// State parameter.
    pub state: Option<String>,
    /// Error code (if authorization failed), e.g. `access_denied`.
    pub error: Option<String>,
    /// Instagram's reason, e.g. `user_denied`.
    pub error_reason: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse callback parameters from URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_pairs(url.query_pairs())
    }

    /// Parse callback parameters from URL string.
    pub fn from_url_str(url_str: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(url_str)?;
        Ok(Self::from_url(&url))
    }

    /// Parse a raw query string (without the leading `?`).
    pub fn from_query(query: &str) -> Self {
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = Self::default();

        for (key, value) in pairs {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "code" => params.code = value,
                "state" => params.state = value,
                "error" => params.error = value,
                "error_reason" => params.error_reason = value,
                "error_description" => params.error_description = value,
                _ => {}
            }
        }

        params
    }

    /// Check if callback contains an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Check if callback is successful.
    pub fn is_success(&self) -> bool {
        self.code.is_some() && self.error.is_none()
    }
}

/// An authorization attempt waiting for its callback.
#[derive(Clone, Debug)]
pub struct PendingAuthorization {
    /// CSRF token sent as `state`.
    pub state: String,
    /// Redirect URI used in the authorization request.
    pub redirect_uri: String,
    /// Scopes requested.
    pub scopes: ScopeSet,
    pub created_at: DateTime<Utc>,
}

impl PendingAuthorization {
    pub fn new(state: String, redirect_uri: String, scopes: ScopeSet) -> Self {
        Self {
            state,
            redirect_uri,
            scopes,
            created_at: Utc::now(),
        }
    }

    /// Check if the attempt is older than `max_age`.
    pub fn is_expired(&self, max_age: std::time::Duration) -> bool {
        match Duration::from_std(max_age) {
            Ok(max_age) => Utc::now() - self.created_at > max_age,
            Err(_) => false,
        }
    }
}

//! Endpoint Types
//!
//! Extra API endpoints fetched right after login, configured as
//! newline-separated `path|name` lines.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AuthError, AuthResult};

/// One configured endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Path relative to the versioned API root, e.g. `/users/self/media/recent`.
    pub path: String,
    /// Key under which the response body is collected.
    pub name: String,
}

impl EndpointSpec {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }

    /// Parse a single `path|name` line.
    pub fn parse_line(line: &str) -> AuthResult<Self> {
        let malformed = || AuthError::MalformedEndpointSpec {
            line: line.to_string(),
        };

        let (path, name) = line.split_once('|').ok_or_else(malformed)?;
        let (path, name) = (path.trim(), name.trim());
        if path.is_empty() || name.is_empty() {
            return Err(malformed());
        }

        Ok(Self::new(path, name))
    }
}

/// Parse the `endpoints` setting. Blank lines are ignored.
pub fn parse_endpoints(raw: &str) -> AuthResult<Vec<EndpointSpec>> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(EndpointSpec::parse_line)
        .collect()
}

/// Raw response bodies keyed by endpoint name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointResults {
    bodies: BTreeMap<String, String>,
}

impl EndpointResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a body; a repeated name replaces the earlier body.
    pub fn insert(&mut self, name: impl Into<String>, body: String) {
        self.bodies.insert(name.into(), body);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bodies.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bodies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize the aggregate as a JSON object of name to raw body.
    pub fn to_json(&self) -> AuthResult<String> {
        serde_json::to_string(&self.bodies).map_err(|e| AuthError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_endpoints_in_order() {
        let raw = "/users/self/media/recent|media_recent\n/users/self/media/liked|media_liked";
        let specs = parse_endpoints(raw).unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0], EndpointSpec::new("/users/self/media/recent", "media_recent"));
        assert_eq!(specs[1], EndpointSpec::new("/users/self/media/liked", "media_liked"));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_endpoints("").unwrap().is_empty());
        assert!(parse_endpoints("\n  \r\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_windows_line_endings() {
        let specs = parse_endpoints("/users/self|me\r\n/tags/nofilter|tag\r\n").unwrap();
        assert_eq!(specs[1].name, "tag");
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let error = parse_endpoints("/users/self|me\n/users/self/media/recent").unwrap_err();
        match error {
            AuthError::MalformedEndpointSpec { line } => {
                assert_eq!(line, "/users/self/media/recent")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(EndpointSpec::parse_line("/users/self|").is_err());
        assert!(EndpointSpec::parse_line("|name").is_err());
    }

    #[test]
    fn test_results_serialize_as_object() {
        let mut results = EndpointResults::new();
        results.insert("media_recent", r#"{"data":[]}"#.to_string());

        let json = results.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["media_recent"], r#"{"data":[]}"#);
    }
}

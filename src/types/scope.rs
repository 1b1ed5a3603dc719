//! Scope Types
//!
//! The set of permissions requested from Instagram.

use serde::{Deserialize, Serialize};

/// Scope always requested, whatever the configuration says.
pub const BASE_SCOPE: &str = "basic";

/// Separator Instagram expects between scopes in the authorization URL.
pub const SCOPE_SEPARATOR: &str = " ";

/// Ordered, duplicate-free set of scopes, always starting with [`BASE_SCOPE`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSet {
    scopes: Vec<String>,
}

impl ScopeSet {
    /// Scope set holding only the base scope.
    pub fn base() -> Self {
        Self {
            scopes: vec![BASE_SCOPE.to_string()],
        }
    }

    /// Build from the comma-separated `scopes` setting.
    ///
    /// Entries are trimmed; blanks and repeats (including `basic`) are dropped.
    pub fn from_config(extra: Option<&str>) -> Self {
        let mut set = Self::base();
        if let Some(extra) = extra {
            for scope in extra.split(',') {
                set.insert(scope);
            }
        }
        set
    }

    /// Add a scope, keeping insertion order.
    pub fn insert(&mut self, scope: &str) -> bool {
        let scope = scope.trim();
        if scope.is_empty() || self.contains(scope) {
            return false;
        }
        self.scopes.push(scope.to_string());
        true
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Never true: the base scope is always present.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.scopes
    }

    /// Value of the `scope` query parameter.
    pub fn to_param(&self) -> String {
        self.scopes.join(SCOPE_SEPARATOR)
    }
}

impl Default for ScopeSet {
    fn default() -> Self {
        Self::base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_only_when_unset() {
        assert_eq!(ScopeSet::from_config(None).as_slice(), &["basic"]);
        assert_eq!(ScopeSet::from_config(Some("")).as_slice(), &["basic"]);
    }

    #[test]
    fn test_comma_separated_extras() {
        let scopes = ScopeSet::from_config(Some("likes,comments"));
        assert_eq!(scopes.as_slice(), &["basic", "likes", "comments"]);
        assert_eq!(scopes.to_param(), "basic likes comments");
    }

    #[test]
    fn test_single_extra_scope() {
        let scopes = ScopeSet::from_config(Some("public_content"));
        assert_eq!(scopes.as_slice(), &["basic", "public_content"]);
    }

    #[test]
    fn test_base_scope_never_duplicated() {
        let scopes = ScopeSet::from_config(Some("basic,likes, basic ,likes,,"));
        assert_eq!(scopes.as_slice(), &["basic", "likes"]);
        assert_eq!(scopes.iter().filter(|s| *s == BASE_SCOPE).count(), 1);
    }
}

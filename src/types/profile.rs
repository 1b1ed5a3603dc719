//! Profile Types
//!
//! The authenticated Instagram user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AuthError, AuthResult};

/// Identity data returned by `users/self`.
///
/// Field set is provider-defined; the well-known ones get accessors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile {
    fields: Map<String, Value>,
}

impl UserProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a `users/self` body, unwrapping the `data` envelope.
    pub fn from_response_body(body: &str) -> AuthResult<Self> {
        let value: Value = serde_json::from_str(body).map_err(|e| AuthError::InvalidResponse {
            message: e.to_string(),
        })?;

        let data = match value {
            Value::Object(mut object) => match object.remove("data") {
                Some(Value::Object(data)) => data,
                Some(_) => {
                    return Err(AuthError::InvalidResponse {
                        message: "profile `data` is not an object".to_string(),
                    })
                }
                None => object,
            },
            _ => {
                return Err(AuthError::InvalidResponse {
                    message: "profile response is not an object".to_string(),
                })
            }
        };

        Ok(Self::new(data))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
    }

    pub fn full_name(&self) -> Option<&str> {
        self.get_str("full_name")
    }

    pub fn profile_picture(&self) -> Option<&str> {
        self.get_str("profile_picture")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

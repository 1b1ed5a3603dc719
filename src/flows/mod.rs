//! Flows
//!
//! Instagram only offers the Authorization Code grant for site logins.

pub mod authorization_code;

pub use authorization_code::{AuthorizationCodeFlow, AuthorizationCodeFlowImpl, GRANT_TYPE};

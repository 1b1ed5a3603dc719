//! Instagram Auth Types
//!
//! Core type definitions for the login flow.

pub mod auth;
pub mod callback;
pub mod config;
pub mod endpoint;
pub mod profile;
pub mod scope;
pub mod settings;
pub mod token;

pub use auth::*;
pub use callback::*;
pub use config::*;
pub use endpoint::*;
pub use profile::*;
pub use scope::*;
pub use settings::*;
pub use token::*;

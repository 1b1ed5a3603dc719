//! Core Components
//!
//! HTTP transport and per-session state management.

pub mod state;
pub mod transport;

pub use state::*;
pub use transport::*;
